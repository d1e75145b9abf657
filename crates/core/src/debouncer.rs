//! Debounce scheduler
//!
//! Collapses bursts of calls into deferred invocations of a wrapped
//! function. Two independent timers drive it:
//!
//! - the **quiet timer**, reset by every call, fires `wait` after the last
//!   call of a burst (trailing edge)
//! - the **ceiling timer**, anchored to the first call of a burst, fires
//!   `max_wait` after it no matter how many calls follow
//!
//! A burst is a run of calls with no invocation between them. The leading
//! edge fires on the first call of a burst when enabled.
//!
//! Timers are tokio tasks. Each timer carries a generation id and its expiry
//! only acts while it is still the current slot, so a cleared timer never
//! runs its callback even if its task was already woken.

use crate::error::DebounceError;
use crate::options::DebounceOptions;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

type Callback<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// Stand-in deadline for delays past what `Instant` can represent
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `now + delay`, clamped to a far-future instant instead of overflowing
fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Which of the two timers fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Quiet,
    Ceiling,
}

/// An outstanding scheduled callback
struct TimerSlot {
    id: u64,
    handle: AbortHandle,
}

impl TimerSlot {
    fn clear(self) {
        self.handle.abort();
    }
}

/// Mutable scheduling state, guarded by one lock
struct State<A> {
    /// Arguments of the latest call not yet invoked
    pending: Option<A>,
    quiet: Option<TimerSlot>,
    ceiling: Option<TimerSlot>,
    /// Generation counter for timer ids
    next_timer_id: u64,
    /// Bumped by `cancel`; results of invocations started in an older epoch are dropped
    epoch: u64,
}

impl<A> State<A> {
    fn clear_timers(&mut self) {
        if let Some(timer) = self.quiet.take() {
            timer.clear();
        }
        self.clear_ceiling();
    }

    fn clear_ceiling(&mut self) {
        if let Some(timer) = self.ceiling.take() {
            timer.clear();
        }
    }
}

struct Inner<A, R> {
    func: Callback<A, R>,
    options: DebounceOptions,
    runtime: Handle,
    state: Mutex<State<A>>,
    /// Last result; `None` until the first invocation and after `cancel`
    result: watch::Sender<Option<R>>,
}

impl<A, R> Inner<A, R>
where
    A: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Spawn a timer task firing `delay` from now
    fn schedule(self: &Arc<Self>, state: &mut State<A>, kind: TimerKind, delay: Duration) -> TimerSlot {
        let id = state.next_timer_id;
        state.next_timer_id += 1;

        let deadline = deadline_after(delay);
        let inner = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            inner.on_expired(kind, id);
        });

        trace!(?kind, id, ?delay, "timer scheduled");
        TimerSlot {
            id,
            handle: task.abort_handle(),
        }
    }

    fn on_expired(&self, kind: TimerKind, id: u64) {
        let mut state = self.state.lock();

        let slot = match kind {
            TimerKind::Quiet => &mut state.quiet,
            TimerKind::Ceiling => &mut state.ceiling,
        };
        if slot.as_ref().map(|timer| timer.id) != Some(id) {
            trace!(?kind, id, "stale timer ignored");
            return;
        }
        // This task is the timer; it finishes on its own
        *slot = None;

        let args = match kind {
            TimerKind::Quiet => {
                state.clear_ceiling();
                let pending = state.pending.take();
                if self.options.is_trailing() {
                    pending
                } else {
                    if pending.is_some() {
                        debug!("quiet period elapsed, trailing edge disabled; dropping pending call");
                    }
                    None
                }
            }
            TimerKind::Ceiling => {
                if let Some(quiet) = state.quiet.take() {
                    quiet.clear();
                }
                state.pending.take()
            }
        };
        let epoch = state.epoch;
        drop(state);

        if let Some(args) = args {
            match kind {
                TimerKind::Quiet => debug!("trailing edge"),
                TimerKind::Ceiling => debug!("max wait reached"),
            }
            self.invoke(args, epoch);
        }
    }

    /// Run the wrapped function without holding the state lock
    ///
    /// The result is recorded only if no `cancel` happened meanwhile.
    fn invoke(&self, args: A, epoch: u64) -> R {
        let result = (self.func)(args);

        let state = self.state.lock();
        if state.epoch == epoch {
            self.result.send_replace(Some(result.clone()));
        } else {
            trace!("invocation finished after cancel; result discarded");
        }
        result
    }
}

/// A debounced wrapper around `Fn(A) -> R`
///
/// Handles are cheap to clone and share one scheduler. Every operation
/// returns immediately; deferred invocations run on the tokio runtime the
/// debouncer was created on.
///
/// The function takes a single argument. Pass a tuple to carry several
/// arguments or a caller context alongside them.
///
/// # Example
/// ```no_run
/// use quiesce_core::{Debouncer, DebounceOptions};
/// use std::time::Duration;
///
/// # async fn demo() -> quiesce_core::Result<()> {
/// let search = Debouncer::new(
///     |query: String| println!("searching for {query}"),
///     DebounceOptions::new(Duration::from_millis(300)),
/// )?;
///
/// search.call("r".into());
/// search.call("ru".into());
/// search.call("rust".into()); // only this one runs, 300ms from now
/// # Ok(())
/// # }
/// ```
pub struct Debouncer<A, R> {
    inner: Arc<Inner<A, R>>,
}

impl<A, R> Clone for Debouncer<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R> Debouncer<A, R>
where
    A: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Wrap `func`, scheduling timers on the current tokio runtime
    ///
    /// Fails with [`DebounceError::NoRuntime`] outside a runtime.
    pub fn new<F>(func: F, options: DebounceOptions) -> Result<Self, DebounceError>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| DebounceError::NoRuntime)?;
        Ok(Self::with_handle(func, options, runtime))
    }

    /// Wrap `func`, scheduling timers on the given runtime
    pub fn with_handle<F>(func: F, options: DebounceOptions, runtime: Handle) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        debug!(
            wait = ?options.wait(),
            leading = options.is_leading(),
            trailing = options.is_trailing(),
            max_wait = ?options.effective_max_wait(),
            "debouncer created"
        );

        let (result, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                func: Arc::new(func),
                options,
                runtime,
                state: Mutex::new(State {
                    pending: None,
                    quiet: None,
                    ceiling: None,
                    next_timer_id: 0,
                    epoch: 0,
                }),
                result,
            }),
        }
    }

    /// Record a call and (re)schedule the invocation
    ///
    /// Returns the last recorded result, which is stale unless this call
    /// fired the leading edge.
    pub fn call(&self, args: A) -> Option<R> {
        let inner = &self.inner;
        let options = &inner.options;
        let mut state = inner.state.lock();

        state.pending = Some(args);

        // Decided before the quiet timer is replaced
        let should_lead = options.is_leading() && state.quiet.is_none();

        if let Some(quiet) = state.quiet.take() {
            quiet.clear();
        }
        let quiet = inner.schedule(&mut state, TimerKind::Quiet, options.wait());
        state.quiet = Some(quiet);

        if let Some(max_wait) = options.effective_max_wait() {
            if state.ceiling.is_none() {
                let ceiling = inner.schedule(&mut state, TimerKind::Ceiling, max_wait);
                state.ceiling = Some(ceiling);
            }
        }

        if should_lead {
            // The quiet timer stays armed: it marks the burst as active
            if !options.is_trailing() {
                state.clear_ceiling();
            }
            let args = state.pending.take();
            let epoch = state.epoch;
            drop(state);

            if let Some(args) = args {
                debug!("leading edge");
                inner.invoke(args, epoch);
            }
        }

        self.last_result()
    }

    /// Invoke a pending call now instead of waiting for its timer
    ///
    /// Returns the new result, or the last recorded one when nothing is
    /// scheduled.
    pub fn flush(&self) -> Option<R> {
        let mut state = self.inner.state.lock();

        let Some(quiet) = state.quiet.take() else {
            return self.last_result();
        };
        quiet.clear();
        state.clear_ceiling();

        let args = state.pending.take();
        let epoch = state.epoch;
        drop(state);

        match args {
            Some(args) => {
                debug!("flushed");
                Some(self.inner.invoke(args, epoch))
            }
            None => self.last_result(),
        }
    }

    /// Result of the most recent invocation, `None` if there was none since
    /// creation or the last `cancel`
    pub fn last_result(&self) -> Option<R> {
        self.inner.result.borrow().clone()
    }
}

// Operations that never spawn or invoke; also usable from `Drop` impls
impl<A, R> Debouncer<A, R> {
    /// Drop any pending call and both timers, and forget the last result
    ///
    /// Safe to call at any time and any number of times.
    pub fn cancel(&self) {
        let mut state = self.inner.state.lock();
        let had_pending = state.pending.take().is_some();
        state.clear_timers();
        state.epoch += 1;
        self.inner.result.send_if_modified(|result| result.take().is_some());

        debug!(had_pending, "debouncer cancelled");
    }

    /// Whether a call is waiting for a trailing or max-wait invocation
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// Watch every recorded result, including ones produced by timers
    pub fn subscribe(&self) -> watch::Receiver<Option<R>> {
        self.inner.result.subscribe()
    }

    pub fn options(&self) -> &DebounceOptions {
        &self.inner.options
    }
}

impl<A, R> fmt::Debug for Debouncer<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Debouncer")
            .field("options", &self.inner.options)
            .field("pending", &state.pending.is_some())
            .field("quiet_armed", &state.quiet.is_some())
            .field("ceiling_armed", &state.ceiling.is_some())
            .finish()
    }
}
