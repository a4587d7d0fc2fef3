// thunk.rs — The action thunk factory and its lifecycle algorithm.
//
// An ActionThunk wraps work under an operation name. Binding arguments
// yields a BoundThunk; running it against a ThunkContext dispatches:
//
//   STARTED [args] → work(args, ctx) → SUCCEEDED | FAILED → ENDED {elapsed}
//
// Synchronous work settles inside `run`. Deferred work gets the success
// and failure continuations chained onto its future, and `run` returns
// that future without waiting for it.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::FutureExt;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ThunkConfig;
use crate::context::{Dispatch, ThunkContext};
use crate::error::{ThunkError, WorkFault};
use crate::notification::Notification;
use crate::types::ActionTypes;
use crate::work::{Completion, WorkOutput, WorkResult};

/// Signature of wrapped work: bound arguments plus the invocation context.
pub type WorkFn<S> =
    dyn Fn(&[Value], &ThunkContext<S>) -> Result<WorkOutput, WorkFault> + Send + Sync;

/// Create an action thunk. Shorthand for
/// `ActionThunk::new(name, work)?.suppress_failures(suppress_failures)`.
pub fn create_action_thunk<S, W>(
    name: impl Into<String>,
    work: W,
    suppress_failures: bool,
) -> Result<ActionThunk<S>, ThunkError>
where
    W: Fn(&[Value], &ThunkContext<S>) -> Result<WorkOutput, WorkFault> + Send + Sync + 'static,
{
    Ok(ActionThunk::new(name, work)?.suppress_failures(suppress_failures))
}

/// The bound invoker for one operation.
///
/// Holds the operation's identifiers and its work. `bind` pre-binds call
/// arguments and returns the dispatchable unit; nothing runs until that
/// unit is handed a context.
pub struct ActionThunk<S> {
    types: Arc<ActionTypes>,
    work: Arc<WorkFn<S>>,
    suppress_failures: bool,
}

impl<S> ActionThunk<S> {
    pub fn new<W>(name: impl Into<String>, work: W) -> Result<Self, ThunkError>
    where
        W: Fn(&[Value], &ThunkContext<S>) -> Result<WorkOutput, WorkFault>
            + Send
            + Sync
            + 'static,
    {
        Ok(Self {
            types: Arc::new(ActionTypes::new(name)?),
            work: Arc::new(work),
            suppress_failures: false,
        })
    }

    /// When true, faults are reported in FAILED but not returned to the
    /// caller; the invocation settles with `Value::Null` instead.
    pub fn suppress_failures(mut self, suppress: bool) -> Self {
        self.suppress_failures = suppress;
        self
    }

    /// Apply settings from a loaded [`ThunkConfig`].
    pub fn with_config(self, config: &ThunkConfig) -> Self {
        self.suppress_failures(config.suppress_failures)
    }

    pub fn suppresses_failures(&self) -> bool {
        self.suppress_failures
    }

    /// Pre-bind call arguments, producing the dispatchable unit.
    pub fn bind(&self, args: impl IntoIterator<Item = Value>) -> BoundThunk<S> {
        BoundThunk {
            types: Arc::clone(&self.types),
            work: Arc::clone(&self.work),
            suppress_failures: self.suppress_failures,
            args: args.into_iter().collect(),
        }
    }

    pub fn types(&self) -> &ActionTypes {
        &self.types
    }

    pub fn name(&self) -> &str {
        self.types.name()
    }

    pub fn started(&self) -> &str {
        self.types.started()
    }

    pub fn succeeded(&self) -> &str {
        self.types.succeeded()
    }

    pub fn failed(&self) -> &str {
        self.types.failed()
    }

    pub fn ended(&self) -> &str {
        self.types.ended()
    }
}

impl<S> Clone for ActionThunk<S> {
    fn clone(&self) -> Self {
        Self {
            types: Arc::clone(&self.types),
            work: Arc::clone(&self.work),
            suppress_failures: self.suppress_failures,
        }
    }
}

impl<S> fmt::Debug for ActionThunk<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionThunk")
            .field("types", &self.types)
            .field("suppress_failures", &self.suppress_failures)
            .finish_non_exhaustive()
    }
}

impl<'a, S> IntoIterator for &'a ActionThunk<S> {
    type Item = &'a str;
    type IntoIter = std::array::IntoIter<&'a str, 4>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

/// A thunk with its arguments bound, ready to be run by a dispatcher.
pub struct BoundThunk<S> {
    types: Arc<ActionTypes>,
    work: Arc<WorkFn<S>>,
    suppress_failures: bool,
    args: Vec<Value>,
}

impl<S> BoundThunk<S> {
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Run the unit against a per-invocation context.
    ///
    /// STARTED is dispatched before the work is called. For synchronous
    /// work (or a synchronous fault) every notification has been dispatched
    /// by the time this returns; for deferred work the returned
    /// [`Completion::Pending`] dispatches the rest as it settles. Dropping
    /// it unsettled dispatches FAILED with a `cancelled` fault, then ENDED.
    ///
    /// The guarantee covers faults returned as `Err`; a panic in the work
    /// unwinds without FAILED or ENDED.
    pub fn run(self, ctx: &ThunkContext<S>) -> Completion {
        let invocation = Invocation::begin(
            Arc::clone(&self.types),
            ctx.dispatcher(),
            self.suppress_failures,
        );
        let span = invocation.span.clone();
        let _entered = span.enter();

        invocation.emit(Notification::started(&self.types, &self.args));
        tracing::debug!(args = self.args.len(), "started");

        match (self.work)(&self.args, ctx) {
            Ok(WorkOutput::Ready(data)) => Completion::Ready(Ok(invocation.succeed(data))),
            Ok(WorkOutput::Deferred(pending)) => {
                tracing::debug!("work deferred");
                let settle = async move {
                    match pending.await {
                        Ok(data) => Ok(invocation.succeed(data)),
                        Err(fault) => invocation.fail(fault),
                    }
                };
                Completion::Pending(settle.instrument(span.clone()).boxed())
            }
            Err(fault) => Completion::Ready(invocation.fail(fault)),
        }
    }
}

impl<S> fmt::Debug for BoundThunk<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundThunk")
            .field("name", &self.types.name())
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// State of one in-flight invocation.
///
/// `succeed` and `fail` take `self` by value, so an invocation can reach a
/// terminal notification at most once. An invocation dropped before either
/// runs reports itself as cancelled.
struct Invocation {
    types: Arc<ActionTypes>,
    dispatcher: Arc<dyn Dispatch>,
    started_at: Instant,
    suppress_failures: bool,
    settled: bool,
    span: tracing::Span,
}

impl Invocation {
    fn begin(
        types: Arc<ActionTypes>,
        dispatcher: Arc<dyn Dispatch>,
        suppress_failures: bool,
    ) -> Self {
        let span = tracing::info_span!(
            "action_thunk",
            name = %types.name(),
            invocation_id = %Uuid::new_v4()
        );
        Self {
            types,
            dispatcher,
            started_at: Instant::now(),
            suppress_failures,
            settled: false,
            span,
        }
    }

    fn emit(&self, notification: Notification) {
        self.dispatcher.dispatch(notification);
    }

    fn succeed(mut self, data: Value) -> Value {
        self.settled = true;
        self.emit(Notification::succeeded(&self.types, &data));
        let elapsed_ms = self.end();
        tracing::debug!(elapsed_ms, "succeeded");
        data
    }

    fn fail(mut self, fault: WorkFault) -> WorkResult {
        self.settled = true;
        self.emit(Notification::failed(&self.types, &fault));
        let elapsed_ms = self.end();
        tracing::warn!(
            elapsed_ms,
            suppressed = self.suppress_failures,
            "work failed: {}",
            fault
        );
        if self.suppress_failures {
            Ok(Value::Null)
        } else {
            Err(fault)
        }
    }

    fn end(&self) -> u64 {
        let elapsed_ms = u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.emit(Notification::ended(&self.types, elapsed_ms));
        elapsed_ms
    }
}

impl Drop for Invocation {
    fn drop(&mut self) {
        if self.settled || std::thread::panicking() {
            return;
        }
        let _entered = self.span.enter();
        self.emit(Notification::failed(&self.types, &WorkFault::new("cancelled")));
        let elapsed_ms = self.end();
        tracing::warn!(elapsed_ms, "pending work dropped before it settled");
    }
}
