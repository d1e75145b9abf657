//! Scope-bound debouncer
//!
//! Owns a [`Debouncer`] for the lifetime of some owner (a UI component, a
//! connection, a session) and tears it down when dropped.

use crate::debouncer::Debouncer;
use crate::error::DebounceError;
use crate::options::DebounceOptions;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

type Callback<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;
type SharedCallback<A, R> = Arc<RwLock<Callback<A, R>>>;

/// A debouncer tied to its owner's scope
///
/// - [`set_callback`](Self::set_callback) swaps the wrapped function in
///   place; calls already pending run the new one
/// - [`reconfigure`](Self::reconfigure) rebuilds the debouncer only when
///   the options actually changed
/// - dropping cancels the debouncer exactly once
pub struct ScopedDebounce<A, R> {
    callback: SharedCallback<A, R>,
    debouncer: Debouncer<A, R>,
    runtime: Handle,
}

impl<A, R> ScopedDebounce<A, R>
where
    A: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Create on the current tokio runtime
    pub fn new<F>(func: F, options: DebounceOptions) -> Result<Self, DebounceError>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| DebounceError::NoRuntime)?;
        let func: Callback<A, R> = Arc::new(func);
        let callback = Arc::new(RwLock::new(func));
        let debouncer = Self::build(&callback, options, runtime.clone());

        Ok(Self {
            callback,
            debouncer,
            runtime,
        })
    }

    fn build(callback: &SharedCallback<A, R>, options: DebounceOptions, runtime: Handle) -> Debouncer<A, R> {
        let current = Arc::clone(callback);
        Debouncer::with_handle(
            move |args| {
                // Released before the call so the callback may swap itself
                let func = current.read().clone();
                func(args)
            },
            options,
            runtime,
        )
    }

    /// Replace the wrapped function without touching scheduling state
    pub fn set_callback<F>(&self, func: F)
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let func: Callback<A, R> = Arc::new(func);
        *self.callback.write() = func;
    }

    /// Rebuild with new options if they differ from the current ones
    ///
    /// The old debouncer is cancelled, dropping any pending call. Returns
    /// whether a rebuild happened.
    pub fn reconfigure(&mut self, options: DebounceOptions) -> bool {
        if *self.debouncer.options() == options {
            return false;
        }

        debug!(?options, "options changed, rebuilding debouncer");
        self.debouncer.cancel();
        self.debouncer = Self::build(&self.callback, options, self.runtime.clone());
        true
    }

    pub fn call(&self, args: A) -> Option<R> {
        self.debouncer.call(args)
    }

    pub fn flush(&self) -> Option<R> {
        self.debouncer.flush()
    }

    pub fn cancel(&self) {
        self.debouncer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// The current underlying debouncer
    pub fn debouncer(&self) -> &Debouncer<A, R> {
        &self.debouncer
    }
}

impl<A, R> Drop for ScopedDebounce<A, R> {
    fn drop(&mut self) {
        self.debouncer.cancel();
    }
}
