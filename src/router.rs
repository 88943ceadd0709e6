//! Exact-match request routing.
//!
//! One flat `HashMap`, keyed on `"{method}#{path}"`. O(1) lookup, no magic:
//! you register a method and a path, you get a handler back for exactly that
//! method and path. `/foo` and `/foo/` are different routes, `GET` and `Get`
//! are different methods, and nothing is a wildcard.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler};

/// Body of the built-in 404 fallback. Raw bytes, not JSON.
const NOT_FOUND_BODY: &[u8] = b"NOT FOUND";

/// The registration capability, separated from serving.
///
/// [`Server`](crate::Server) implements this by delegating to its router, so
/// an alternative table (a radix tree, say) can slot in without touching the
/// server or filter logic.
pub trait Routable {
    /// Registers `handler` for an exact method + path pair.
    ///
    /// Registration is last-wins: a second registration under the same pair
    /// silently replaces the first. Neither string is validated — empty
    /// strings are legal keys, and no character is special.
    fn route<H: Handler>(&mut self, method: &str, pattern: &str, handler: H);
}

/// The map-based route table.
///
/// Build it (directly or through a [`Server`](crate::Server)) during setup;
/// once serving begins it is only ever read, so no locking is needed.
pub struct MapRouter {
    handlers: HashMap<String, BoxedHandler>,
}

impl MapRouter {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// `#` never appears in a transmitted method or path, so the composite
    /// key cannot collide across distinct pairs.
    fn key(method: &str, path: &str) -> String {
        format!("{method}#{path}")
    }

    fn lookup(&self, method: &str, path: &str) -> Option<BoxedHandler> {
        self.handlers.get(&Self::key(method, path)).map(Arc::clone)
    }

    /// The terminal link of every filter chain: looks up the inbound
    /// method + path and invokes the matched handler, or answers with the
    /// fixed 404 fallback. A miss never reaches application code.
    pub async fn dispatch(&self, mut ctx: Context) -> Context {
        let found = self.lookup(ctx.method(), ctx.path());
        match found {
            Some(handler) => handler.call(ctx).await,
            None => {
                ctx.write_bytes(StatusCode::NOT_FOUND, NOT_FOUND_BODY);
                ctx
            }
        }
    }
}

impl Routable for MapRouter {
    fn route<H: Handler>(&mut self, method: &str, pattern: &str, handler: H) {
        self.handlers.insert(Self::key(method, pattern), handler.into_boxed_handler());
    }
}

impl Default for MapRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(hits: Arc<AtomicUsize>) -> impl Handler {
        move |ctx: Context| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                ctx
            }
        }
    }

    #[tokio::test]
    async fn dispatch_invokes_the_registered_handler_exactly_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = MapRouter::new();
        router.route("GET", "/", counting_handler(Arc::clone(&hits)));

        router.dispatch(Context::fake("GET", "/", "")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn miss_writes_404_and_invokes_nothing() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = MapRouter::new();
        router.route("GET", "/", counting_handler(Arc::clone(&hits)));

        let ctx = router.dispatch(Context::fake("POST", "/", "")).await;
        assert_eq!(ctx.committed_status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(ctx.written_body(), b"NOT FOUND");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_registration_is_last_wins() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut router = MapRouter::new();
        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            router.route("GET", "/dup", move |ctx: Context| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push(tag);
                    ctx
                }
            });
        }

        router.dispatch(Context::fake("GET", "/dup", "")).await;
        assert_eq!(*order.lock().unwrap(), vec!["second"]);
    }

    #[tokio::test]
    async fn trailing_slash_is_a_distinct_key() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = MapRouter::new();
        router.route("GET", "/foo", counting_handler(Arc::clone(&hits)));

        let ctx = router.dispatch(Context::fake("GET", "/foo/", "")).await;
        assert_eq!(ctx.committed_status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_method_and_pattern_are_legal_keys() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = MapRouter::new();
        router.route("", "", counting_handler(Arc::clone(&hits)));

        // Stored under the bare separator, reachable only by an equally
        // empty method + path pair — ordinary requests still miss.
        assert_eq!(MapRouter::key("", ""), "#");
        assert!(router.lookup("", "").is_some());

        let ctx = router.dispatch(Context::fake("GET", "/", "")).await;
        assert_eq!(ctx.committed_status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn method_comparison_is_case_sensitive() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = MapRouter::new();
        router.route("Get", "/", counting_handler(Arc::clone(&hits)));

        // Wire methods arrive uppercase; a route registered as "Get" can
        // never match them.
        let ctx = router.dispatch(Context::fake("GET", "/", "")).await;
        assert_eq!(ctx.committed_status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
