//! Request descriptors and buffered responses

use crate::error::{ClientError, error_message};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Description of an outbound API call.
///
/// A descriptor is rebuilt into a transport request for every attempt, so the
/// same call can be replayed after the access token has been refreshed.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Value>,
    refresh_on_unauthorized: bool,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` on `path` (relative to the base URL)
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        Self {
            method,
            path,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            refresh_on_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query string parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append several query string parameters
    #[must_use]
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set an extra header. `Authorization` is always overwritten by the session token.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Never attempt a token refresh when this call answers 401.
    ///
    /// Used for the login call, where a 401 means bad credentials.
    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_unauthorized = false;
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub const fn refresh_on_unauthorized(&self) -> bool {
        self.refresh_on_unauthorized
    }
}

/// A successful response, fully buffered and returned unchanged
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub(crate) const fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Buffer a transport response, mapping non-success statuses to [`ClientError`]
    pub(crate) async fn from_response(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        if status.is_success() {
            Ok(Self::new(status, headers, body))
        } else {
            Err(ClientError::from_status(status, error_message(status, &body)))
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, with invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        if self.body.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_normalizes_path() {
        let descriptor = RequestDescriptor::get("assets");
        assert_eq!(descriptor.path(), "/assets");
        assert_eq!(RequestDescriptor::delete("/users/4").path(), "/users/4");
    }

    #[test]
    fn descriptor_collects_query_and_body() {
        let descriptor = RequestDescriptor::post("/assets")
            .query("page", "2")
            .query_pairs([("status", "available")])
            .json(&json!({ "name": "ThinkPad T14" }))
            .unwrap();

        assert_eq!(descriptor.method(), &Method::POST);
        assert_eq!(descriptor.query_params().len(), 2);
        assert_eq!(descriptor.body().unwrap()["name"], "ThinkPad T14");
        assert!(descriptor.refresh_on_unauthorized());
        assert!(!descriptor.without_refresh().refresh_on_unauthorized());
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let response = ApiResponse::new(StatusCode::NO_CONTENT, HeaderMap::new(), Bytes::new());
        let value: Option<Value> = response.json().unwrap();
        assert!(value.is_none());
    }
}
