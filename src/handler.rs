//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The route table needs to hold handlers of *different* concrete types in a
//! single `HashMap`. Rust collections hold one type, so handlers are erased
//! behind a trait object (`dyn ErasedHandler`) and stored uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn sign_up(ctx: Context) -> Context { … }   ← user writes this
//!        ↓ server.route("POST", "/sign-up", sign_up)
//! sign_up.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(sign_up))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(ctx)  at request time                ← one vtable dispatch
//! ```
//!
//! The only runtime cost per request is one `Arc` clone (atomic inc) plus
//! one virtual call — negligible next to network I/O.
//!
//! The context flows by value: a handler takes ownership of the [`Context`],
//! reads and writes through it, and returns it so the outer filter layers
//! (and finally the server) get it back.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

// ── Erased types ──────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to the [`Context`] it
/// was given.
///
/// `Pin<Box<…>>` because the runtime must be able to poll the future
/// in-place; `Send + 'static` so tokio may move it across threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Context> + Send + 'static>>;

/// Dispatch interface every stored handler is reduced to.
///
/// Filter authors call this on their `next` link; everyone else goes through
/// the [`Handler`] trait and never names it.
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `Arc` gives cheap, thread-safe shared ownership without copying the
/// handler. The same type doubles as a link in the filter chain — see
/// [`Filter`](crate::Filter).
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(ctx: Context) -> Context
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it, which keeps the API surface stable.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin((self.0)(ctx))
    }
}
