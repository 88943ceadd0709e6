//! HTTP server: setup, then serve.
//!
//! A [`Server`] has two phases. While configuring, routes and filters
//! accumulate on the value. [`Server::start`] consumes it, freezes the route
//! table and the composed filter chain into shared read-only state, and
//! blocks forever accepting connections. There is no way back: once serving
//! begins the table cannot be touched, which is also why no lock guards it.
//!
//! The only exits are a bind failure (returned as [`Error::Bind`]) and
//! process termination. Shutdown draining, request timeouts, and retry
//! logic all live in whatever runs in front of this toolkit.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::context::Context;
use crate::error::Error;
use crate::filter::{Filter, FilterBuilder, chain, filter_fn};
use crate::handler::Handler;
use crate::router::{MapRouter, Routable};

/// The HTTP server.
///
/// ```rust,no_run
/// use waku::{Context, Routable, Server, timing};
///
/// async fn hello(mut ctx: Context) -> Context {
///     let _ = ctx.write_ok(&"hello");
///     ctx
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let mut server = Server::new("demo").wrap(timing);
///     server.route("GET", "/", hello);
///     server.start("127.0.0.1:8080").await.expect("server failed");
/// }
/// ```
pub struct Server {
    name: String,
    router: MapRouter,
    builders: Vec<FilterBuilder>,
}

impl Server {
    /// A fresh server with an empty route table and no filters.
    ///
    /// The name only shows up in the startup log line; run several servers
    /// in one process and it tells their logs apart.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            router: MapRouter::new(),
            builders: Vec::new(),
        }
    }

    /// Installs a filter builder around everything registered so far and
    /// after. The first `wrap` call becomes the outermost layer.
    pub fn wrap(mut self, builder: impl FnOnce(Filter) -> Filter + Send + 'static) -> Self {
        self.builders.push(Box::new(builder));
        self
    }

    /// Binds `addr` and serves forever.
    ///
    /// Every accepted connection runs on its own task; every request on it
    /// gets a fresh [`Context`] and flows through the filter chain into the
    /// route dispatcher.
    ///
    /// Returns only on a bind failure ([`Error::Bind`]). There is no
    /// graceful-stop path.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub async fn start(self, addr: &str) -> Result<(), Error> {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        let listener = TcpListener::bind(addr).await.map_err(Error::Bind)?;
        info!(name = %self.name, addr = %addr, "waku listening");
        self.run(listener).await
    }

    pub(crate) async fn run(self, listener: TcpListener) -> Result<(), Error> {
        let Server { router, builders, .. } = self;

        // Freeze the table, plant the dispatcher as the innermost link, and
        // fold the filters around it. From here on everything is shared
        // read-only state.
        let router = Arc::new(router);
        let terminal: Filter = filter_fn(move |ctx: Context| {
            let router = Arc::clone(&router);
            async move { router.dispatch(ctx).await }
        });
        let root = chain(builders, terminal);

        loop {
            let (stream, remote_addr) = match listener.accept().await {
                Ok(v) => v,
                Err(e) => {
                    error!("accept error: {e}");
                    continue;
                }
            };

            let root = Arc::clone(&root);
            // TokioIo adapts tokio's AsyncRead/AsyncWrite to the hyper IO
            // traits.
            let io = TokioIo::new(stream);

            tokio::spawn(async move {
                // `service_fn` turns a plain async function into a hyper
                // `Service`. The closure runs once per request on the
                // connection, not once per connection.
                let svc = service_fn(move |req| {
                    let root = Arc::clone(&root);
                    async move { Ok::<_, Infallible>(handle(root, req).await) }
                });

                // `auto::Builder` handles both HTTP/1.1 and HTTP/2 —
                // whatever the client negotiates.
                if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(io, svc)
                    .await
                {
                    error!(peer = %remote_addr, "connection error: {e}");
                }
            });
        }
    }
}

impl Routable for Server {
    fn route<H: Handler>(&mut self, method: &str, pattern: &str, handler: H) {
        self.router.route(method, pattern, handler);
    }
}

/// Core hot path: one request in, one fresh context through the chain, one
/// response out. All failures are rendered into the response, so hyper
/// never sees an error.
async fn handle(
    root: Filter,
    req: hyper::Request<hyper::body::Incoming>,
) -> http::Response<Full<Bytes>> {
    let ctx = Context::new(req);
    let ctx = root.call(ctx).await;
    ctx.into_response()
}
