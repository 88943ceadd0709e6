//! Per-request context: one value bundling both sides of an HTTP exchange.
//!
//! Handlers never touch the transport. They receive a [`Context`] that holds
//! the parsed request on one side and a pending response on the other, take
//! ownership of it for the duration of the call, and hand it back when done.
//! The server renders whatever was written into it after the filter chain
//! returns.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// The request body as stored in the context.
///
/// Boxed so tests can substitute an in-memory body for hyper's `Incoming`.
pub(crate) type Body = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// A single in-flight HTTP exchange.
///
/// One `Context` is created per request, immediately before dispatch, and
/// discarded once the response has been rendered. It is owned by exactly one
/// task and never shared.
///
/// The write side follows a first-commit-wins discipline: the first write
/// fixes the status code, and later writes can only append body bytes. This
/// mirrors the underlying transport, where a status line already on the wire
/// cannot be recalled.
pub struct Context {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Body>,
    status: Option<StatusCode>,
    response_headers: HeaderMap,
    response_body: Vec<u8>,
}

impl Context {
    pub(crate) fn new(req: hyper::Request<hyper::body::Incoming>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: Some(body.boxed()),
            status: None,
            response_headers: HeaderMap::new(),
            response_body: Vec::new(),
        }
    }

    /// Request method, verbatim as received (`"GET"`, `"PURGE"`, …).
    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Request path, without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Case-insensitive request header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Reads the entire request body and deserializes it as JSON.
    ///
    /// The body is consumed: a second call sees it empty. No size limit is
    /// enforced — body-size limits belong to the proxy in front of you.
    ///
    /// # Errors
    ///
    /// [`Error::BodyRead`] if the transport read fails, [`Error::Decode`] if
    /// the bytes are not valid JSON for `T`. On either error no value is
    /// produced, so the caller's state is untouched.
    pub async fn read_json<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let bytes = match self.body.take() {
            Some(body) => body.collect().await.map_err(Error::BodyRead)?.to_bytes(),
            None => Bytes::new(),
        };
        serde_json::from_slice(&bytes).map_err(Error::Decode)
    }

    /// Serializes `payload` as JSON and writes it with the given status.
    ///
    /// Serialization happens before anything is committed, so an
    /// [`Error::Encode`] leaves the response untouched. If a status was
    /// already committed by an earlier write it stays; the new bytes are
    /// appended to the body.
    pub fn write_json<T: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        payload: &T,
    ) -> Result<(), Error> {
        let bytes = serde_json::to_vec(payload).map_err(Error::Encode)?;
        if !self.response_headers.contains_key(http::header::CONTENT_TYPE) {
            self.response_headers
                .insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        self.commit(status);
        self.response_body.extend_from_slice(&bytes);
        Ok(())
    }

    /// [`write_json`](Context::write_json) with `200 OK`.
    pub fn write_ok<T: Serialize + ?Sized>(&mut self, payload: &T) -> Result<(), Error> {
        self.write_json(StatusCode::OK, payload)
    }

    /// [`write_json`](Context::write_json) with `400 Bad Request`.
    pub fn write_bad<T: Serialize + ?Sized>(&mut self, payload: &T) -> Result<(), Error> {
        self.write_json(StatusCode::BAD_REQUEST, payload)
    }

    /// Writes raw bytes with the given status, bypassing JSON encoding.
    ///
    /// Used by the dispatcher's 404 fallback; available to handlers that
    /// need a non-JSON body. Sets no content-type.
    pub fn write_bytes(&mut self, status: StatusCode, bytes: &[u8]) {
        self.commit(status);
        self.response_body.extend_from_slice(bytes);
    }

    fn commit(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    /// Renders the written response. A context nothing was written to
    /// becomes an empty `200 OK`, matching the transport default.
    pub(crate) fn into_response(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.response_body)));
        *res.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *res.headers_mut() = self.response_headers;
        res
    }

    #[cfg(test)]
    pub(crate) fn fake(method: &str, path: &str, body: &str) -> Self {
        let body: Body = Full::new(Bytes::from(body.to_owned()))
            .map_err(|e: std::convert::Infallible| match e {})
            .boxed();
        Self {
            method: Method::from_bytes(method.as_bytes()).expect("invalid method"),
            uri: path.parse().expect("invalid path"),
            headers: HeaderMap::new(),
            body: Some(body),
            status: None,
            response_headers: HeaderMap::new(),
            response_body: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn committed_status(&self) -> Option<StatusCode> {
        self.status
    }

    #[cfg(test)]
    pub(crate) fn written_body(&self) -> &[u8] {
        &self.response_body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn read_json_deserializes_the_body() {
        let mut ctx = Context::fake("POST", "/", r#"{"name":"alice","count":3}"#);
        let got: Payload = ctx.read_json().await.unwrap();
        assert_eq!(got, Payload { name: "alice".to_owned(), count: 3 });
    }

    #[tokio::test]
    async fn read_json_rejects_malformed_bodies() {
        let mut ctx = Context::fake("POST", "/", "{not json");
        let err = ctx.read_json::<Payload>().await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn second_read_sees_an_empty_body() {
        let mut ctx = Context::fake("POST", "/", r#"{"name":"a","count":1}"#);
        let _: Payload = ctx.read_json().await.unwrap();
        assert!(matches!(ctx.read_json::<Payload>().await, Err(Error::Decode(_))));
    }

    #[test]
    fn write_json_round_trips() {
        let mut ctx = Context::fake("GET", "/", "");
        let payload = Payload { name: "bob".to_owned(), count: 7 };
        ctx.write_ok(&payload).unwrap();

        assert_eq!(ctx.committed_status(), Some(StatusCode::OK));
        let got: Payload = serde_json::from_slice(ctx.written_body()).unwrap();
        assert_eq!(got, payload);
    }

    #[test]
    fn first_commit_wins() {
        let mut ctx = Context::fake("GET", "/", "");
        ctx.write_bad(&"nope").unwrap();
        ctx.write_ok(&"too late").unwrap();
        assert_eq!(ctx.committed_status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn json_write_after_raw_write_still_sets_content_type() {
        let mut ctx = Context::fake("GET", "/", "");
        ctx.write_bytes(StatusCode::ACCEPTED, b"raw");
        ctx.write_ok(&"json").unwrap();

        // The raw write committed the status, but the first JSON write is
        // still the one that owns the content-type.
        assert_eq!(ctx.committed_status(), Some(StatusCode::ACCEPTED));
        let res = ctx.into_response();
        assert_eq!(
            res.headers().get(http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut ctx = Context::fake("GET", "/", "");
        ctx.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        assert_eq!(ctx.header("Content-Type"), Some("application/json"));
        assert_eq!(ctx.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(ctx.header("content-type"), Some("application/json"));
        assert_eq!(ctx.header("x-missing"), None);
    }

    #[test]
    fn untouched_context_renders_as_empty_ok() {
        let ctx = Context::fake("GET", "/", "");
        let res = ctx.into_response();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn path_excludes_the_query_string() {
        let ctx = Context::fake("GET", "/items?page=2", "");
        assert_eq!(ctx.path(), "/items");
    }
}
