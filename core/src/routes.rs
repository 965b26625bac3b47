//! Route declarations handed to the hosting UI framework.
//!
//! A route names a path and either redirects or lazily produces a view. `V`
//! is whatever the host uses as a view handle; the table never constructs a
//! view until `Route::load` is called.

pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub layout: Option<String>,
}

#[derive(Debug, Clone)]
pub enum RouteTarget<V> {
    Redirect(&'static str),
    View(fn() -> V),
}

#[derive(Debug, Clone)]
pub struct Route<V> {
    pub path: &'static str,
    pub title: &'static str,
    pub meta: RouteMeta,
    pub target: RouteTarget<V>,
}

impl<V> Route<V> {
    pub fn redirect(path: &'static str, title: &'static str, to: &'static str) -> Self {
        Route {
            path,
            title,
            meta: RouteMeta::default(),
            target: RouteTarget::Redirect(to),
        }
    }

    pub fn view(path: &'static str, title: &'static str, meta: RouteMeta, view: fn() -> V) -> Self {
        Route {
            path,
            title,
            meta,
            target: RouteTarget::View(view),
        }
    }

    /// Produce the view, or `None` for a redirect.
    pub fn load(&self) -> Option<V> {
        match self.target {
            RouteTarget::View(view) => Some(view()),
            RouteTarget::Redirect(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable<V> {
    routes: Vec<Route<V>>,
}

impl<V> RouteTable<V> {
    pub fn new(routes: Vec<Route<V>>) -> Self {
        RouteTable { routes }
    }

    pub fn routes(&self) -> &[Route<V>] {
        &self.routes
    }

    /// Exact-path lookup without following redirects.
    pub fn get(&self, path: &str) -> Option<&Route<V>> {
        let path = normalize(path);
        self.routes.iter().find(|route| route.path == path)
    }

    /// Lookup that follows redirects to the route that renders a view.
    /// Unknown targets and redirect loops resolve to `None`.
    pub fn resolve(&self, path: &str) -> Option<&Route<V>> {
        let mut route = self.get(path)?;

        for _ in 0..MAX_REDIRECTS {
            match route.target {
                RouteTarget::View(_) => return Some(route),
                RouteTarget::Redirect(to) => route = self.get(to)?,
            }
        }

        None
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// The product's route table: `/` sends the user to the cloud view, which
/// needs a signed-in user and the landing layout.
pub fn cloud_routes<V>(cloud_view: fn() -> V) -> RouteTable<V> {
    RouteTable::new(vec![
        Route::redirect("/", "Dashboard", "/cloud"),
        Route::view(
            "/cloud",
            "Cloud",
            RouteMeta {
                requires_auth: true,
                layout: Some("landing".to_string()),
            },
            cloud_view,
        ),
    ])
}
