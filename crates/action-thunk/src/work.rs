// work.rs — What work returns, and what a dispatchable unit hands back.
//
// Work either finishes on the spot (`WorkOutput::Ready`) or returns a
// future (`WorkOutput::Deferred`). The thunk mirrors that in `Completion`:
// a ready result, or a pending future that settles after SUCCEEDED/FAILED
// and ENDED have been dispatched.

use std::fmt;
use std::future::{Future, IntoFuture};

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;

use crate::error::WorkFault;

/// Result type of deferred work and of a settled [`Completion`].
pub type WorkResult = Result<Value, WorkFault>;

/// The value produced by wrapped work.
pub enum WorkOutput {
    /// Synchronous result. `Value::Null` stands for "no result".
    Ready(Value),
    /// Deferred result; the thunk attaches its continuations and returns
    /// without waiting.
    Deferred(BoxFuture<'static, WorkResult>),
}

impl WorkOutput {
    /// Wrap any `Send + 'static` future as deferred work.
    pub fn deferred<F>(fut: F) -> Self
    where
        F: Future<Output = WorkResult> + Send + 'static,
    {
        WorkOutput::Deferred(fut.boxed())
    }

    /// A synchronous result with no value.
    pub fn empty() -> Self {
        WorkOutput::Ready(Value::Null)
    }
}

impl From<Value> for WorkOutput {
    fn from(value: Value) -> Self {
        WorkOutput::Ready(value)
    }
}

impl fmt::Debug for WorkOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkOutput::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            WorkOutput::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Outcome of running a dispatchable unit.
///
/// `Ready` is returned for synchronous work (and for synchronous faults);
/// every lifecycle notification has already been dispatched. `Pending` is
/// returned for deferred work; SUCCEEDED/FAILED and ENDED are dispatched
/// when it is driven to completion, or FAILED (`cancelled`) and ENDED when
/// it is dropped first. A `Completion` can be awaited directly.
#[must_use = "a pending completion is cancelled unless awaited"]
pub enum Completion {
    Ready(WorkResult),
    Pending(BoxFuture<'static, WorkResult>),
}

impl Completion {
    pub fn is_pending(&self) -> bool {
        matches!(self, Completion::Pending(_))
    }

    /// The result, if the work completed synchronously.
    pub fn ready(self) -> Option<WorkResult> {
        match self {
            Completion::Ready(result) => Some(result),
            Completion::Pending(_) => None,
        }
    }
}

impl IntoFuture for Completion {
    type Output = WorkResult;
    type IntoFuture = BoxFuture<'static, WorkResult>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Completion::Ready(result) => future::ready(result).boxed(),
            Completion::Pending(fut) => fut,
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Completion::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_convert_into_ready_output() {
        let output = WorkOutput::from(json!(3));
        assert!(matches!(output, WorkOutput::Ready(v) if v == json!(3)));
        assert!(matches!(WorkOutput::empty(), WorkOutput::Ready(Value::Null)));
    }

    #[test]
    fn deferred_output_is_flagged() {
        let output = WorkOutput::deferred(async { Ok(json!(10)) });
        assert!(matches!(output, WorkOutput::Deferred(_)));
        assert_eq!(format!("{:?}", output), "Deferred(..)");
    }

    #[tokio::test]
    async fn ready_completion_can_be_awaited() {
        let completion = Completion::Ready(Ok(json!("done")));
        assert!(!completion.is_pending());
        assert_eq!(completion.await.unwrap(), json!("done"));
    }

    #[test]
    fn pending_completion_has_no_ready_value() {
        let completion = Completion::Pending(async { Ok(Value::Null) }.boxed());
        assert!(completion.is_pending());
        assert!(completion.ready().is_none());
    }
}
