//! # waku
//!
//! A minimal HTTP server toolkit built from three ideas. Nothing more.
//!
//! 1. **Context** — the response writer and the request bundled into one
//!    per-call value, with JSON read/write helpers ([`Context`]).
//! 2. **Exact-match routing** — a `(method, path)` lookup table with a
//!    built-in 404 fallback ([`MapRouter`]).
//! 3. **Filter chains** — cross-cutting behavior (timing, logging, auth) as
//!    handler-wrapping functions folded around the dispatcher ([`Filter`]).
//!
//! ## The contract
//!
//! waku is deliberately small: no path parameters, no wildcards, no graceful
//! shutdown, no timeouts, no hot route reload. Routes are registered during
//! setup; [`Server::start`] freezes them and serves until the process dies.
//! If you need radix-tree routing or connection draining, you want a bigger
//! framework — or a proxy in front.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use serde::{Deserialize, Serialize};
//! use waku::{Context, Routable, Server, timing};
//!
//! #[derive(Deserialize)]
//! struct SignUpReq {
//!     name: String,
//!     password: String,
//! }
//!
//! #[derive(Serialize)]
//! struct BizResponse {
//!     biz_code: i32,
//!     msg: String,
//!     data: i32,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut server = Server::new("signup").wrap(timing);
//!     server.route("POST", "/sign-up", sign_up);
//!     server.start("127.0.0.1:8080").await.expect("server failed");
//! }
//!
//! async fn sign_up(mut ctx: Context) -> Context {
//!     let _req: SignUpReq = match ctx.read_json().await {
//!         Ok(req) => req,
//!         Err(e) => {
//!             let _ = ctx.write_bad(&e.to_string());
//!             return ctx;
//!         }
//!     };
//!     let _ = ctx.write_ok(&BizResponse {
//!         biz_code: 0,
//!         msg: String::new(),
//!         data: 123,
//!     });
//!     ctx
//! }
//! ```

mod context;
mod error;
mod filter;
mod handler;
mod router;
mod server;

pub use context::Context;
pub use error::Error;
pub use filter::{Filter, FilterBuilder, chain, filter_fn, timing};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use router::{MapRouter, Routable};
pub use server::Server;
