// ============================================================================
// HTTP TRANSPORT - Requests crudos (gloo-net en el navegador)
// ============================================================================

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::JsValue;

use crate::error::{AppError, AppResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

/// Archivo adjunto para subir como multipart
#[derive(Clone, Debug, PartialEq)]
pub struct MultipartFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Multipart { field: String, file: MultipartFile },
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> AppResult<Self> {
        self.body = RequestBody::Json(serde_json::to_string(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, field: &str, file: MultipartFile) -> Self {
        self.body = RequestBody::Multipart {
            field: field.to_string(),
            file,
        };
        self
    }

    /// ¿Lleva credenciales? (un 401 solo fuerza logout en ese caso)
    pub fn carries_token(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_str(&self.body).map_err(AppError::from)
    }

    /// Campo `detail` del cuerpo de error (formato FastAPI)
    pub fn detail(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(detail) => Some(detail.clone()),
            // Errores de validación: lista de {msg, loc, ...}
            serde_json::Value::Array(items) => {
                let mensajes: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if mensajes.is_empty() {
                    None
                } else {
                    Some(mensajes.join("; "))
                }
            }
            _ => None,
        }
    }
}

/// Transporte HTTP (inyectable para tests)
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> AppResult<HttpResponse>;
}

/// Transporte real: gloo-net sobre fetch
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

impl GlooTransport {
    fn builder(request: &HttpRequest) -> RequestBuilder {
        let mut builder = match request.method {
            HttpMethod::Get => Request::get(&request.url),
            HttpMethod::Post => Request::post(&request.url),
            HttpMethod::Patch => Request::patch(&request.url),
            HttpMethod::Delete => Request::delete(&request.url),
        };
        if !request.query.is_empty() {
            builder = builder.query(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder
    }

    fn form_data(field: &str, file: &MultipartFile) -> Result<web_sys::FormData, JsValue> {
        let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&bytes);
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(&file.content_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let form = web_sys::FormData::new()?;
        form.append_with_blob_and_filename(field, &blob, &file.file_name)?;
        Ok(form)
    }
}

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        let builder = Self::builder(&request);
        let built = match &request.body {
            RequestBody::Empty => builder.build(),
            RequestBody::Json(json) => builder
                .header("Content-Type", "application/json")
                .body(json.clone()),
            RequestBody::Multipart { field, file } => {
                // El navegador arma el boundary del Content-Type
                let form = Self::form_data(field, file)
                    .map_err(|e| AppError::Network(format!("FormData: {:?}", e)))?;
                builder.body(form)
            }
        }
        .map_err(|e| AppError::Network(e.to_string()))?;

        let response = built
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_reads_fastapi_string() {
        let response = HttpResponse {
            status: 400,
            body: r#"{"detail": "El usuario ya existe"}"#.to_string(),
        };
        assert_eq!(response.detail().as_deref(), Some("El usuario ya existe"));
    }

    #[test]
    fn detail_joins_validation_messages() {
        let response = HttpResponse {
            status: 422,
            body: r#"{"detail": [{"msg": "field required"}, {"msg": "value is not a valid email"}]}"#
                .to_string(),
        };
        assert_eq!(
            response.detail().as_deref(),
            Some("field required; value is not a valid email")
        );
    }

    #[test]
    fn detail_absent_on_html_body() {
        let response = HttpResponse {
            status: 502,
            body: "<html>Bad gateway</html>".to_string(),
        };
        assert_eq!(response.detail(), None);
    }

    #[test]
    fn carries_token_is_case_insensitive() {
        let request = HttpRequest::new(HttpMethod::Get, "/x").header("authorization", "Bearer t");
        assert!(request.carries_token());
        assert!(!HttpRequest::new(HttpMethod::Get, "/x").carries_token());
    }
}
