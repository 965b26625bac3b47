//! Executes `HttpRequest` values over the network.
//!
//! One `reqwest::Client` (and with it one connection pool) backs every call.
//! A request is sent exactly once: no retries, no interceptors, and the only
//! timeout is the one fixed in `ClientConfig`.

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};

#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Transport { client })
    }

    /// Send `req` and collect the whole response.
    ///
    /// A 2xx answer comes back as `HttpResponse`. Any other status is an
    /// `ApiError::HttpError` holding the status and raw body; connection and
    /// timeout failures are `ApiError::Transport`.
    pub async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = req.method.as_str(), url = %req.path, "sending request");

        let mut builder = self.client.request(method(req.method), &req.path);

        for (name, value) in &req.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::InvalidHeader(name.clone()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(name.clone()))?;
            builder = builder.header(header_name, header_value);
        }

        builder = match req.body {
            Some(RequestBody::Json(text)) => builder.body(text),
            Some(RequestBody::Multipart(form)) => builder.multipart(multipart(form)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        tracing::debug!(status, url = %req.path, "received response");

        let response = HttpResponse {
            status,
            headers,
            body,
        };

        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::HttpError {
                status: response.status,
                body: response.body,
            })
        }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn multipart(form: MultipartForm) -> Result<Form, ApiError> {
    let mut out = Form::new();

    for part in form.parts() {
        out = match part {
            FormPart::Text { name, value } => out.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)?;
                out.part(name.clone(), part)
            }
        };
    }

    Ok(out)
}
