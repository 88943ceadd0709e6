//! Filter chain: cross-cutting behavior as nested handler wrappers.
//!
//! A [`Filter`] has the same callable shape as a route handler. A
//! [`FilterBuilder`] takes "the next link" and returns a new link that runs
//! its own logic before and/or after delegating. [`chain`] folds a list of
//! builders around a terminal handler from last to first, so the
//! first-declared builder becomes the outermost layer: its pre-logic runs
//! first, its post-logic runs last (classic nested-call semantics).
//!
//! A wrapper receives the fully materialized next link and may skip it —
//! short-circuiting everything inside, including the terminal dispatcher —
//! or call it more than once. Neither is prevented.
//!
//! ```rust
//! use waku::{Context, ErasedHandler, Filter, filter_fn};
//! use std::sync::Arc;
//!
//! fn request_id(next: Filter) -> Filter {
//!     filter_fn(move |ctx: Context| {
//!         let next = Arc::clone(&next);
//!         async move {
//!             // pre-logic here
//!             let ctx = next.call(ctx).await;
//!             // post-logic here
//!             ctx
//!         }
//!     })
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler};

/// One link in the composed chain. Same shape as a stored route handler.
pub type Filter = BoxedHandler;

/// A wrapper constructor: given the next link, produce the enclosing one.
pub type FilterBuilder = Box<dyn FnOnce(Filter) -> Filter + Send>;

/// Turns any [`Handler`]-shaped closure into a [`Filter`].
pub fn filter_fn<H: Handler>(handler: H) -> Filter {
    handler.into_boxed_handler()
}

/// Folds `builders` around `terminal`, last builder innermost.
///
/// With builders `[a, b]` and terminal `t`, the result is `a(b(t))`:
/// a-pre, b-pre, t, b-post, a-post.
pub fn chain(builders: Vec<FilterBuilder>, terminal: Filter) -> Filter {
    builders.into_iter().rev().fold(terminal, |next, builder| builder(next))
}

/// Built-in timing filter: reports how long the inner chain took.
///
/// Measured with a single monotonic [`Instant`], so the reading stays
/// correct when the call straddles a second boundary.
pub fn timing(next: Filter) -> Filter {
    filter_fn(move |ctx: Context| {
        let next = Arc::clone(&next);
        async move {
            let start = Instant::now();
            let ctx = next.call(ctx).await;
            info!(
                method = ctx.method(),
                path = ctx.path(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "request handled"
            );
            ctx
        }
    })
}
