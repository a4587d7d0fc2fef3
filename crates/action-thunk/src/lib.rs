//! # action-thunk
//!
//! Wrap a unit of work, synchronous or deferred, into a dispatchable thunk
//! that announces its lifecycle to a unidirectional state store.
//!
//! Every invocation dispatches, in order:
//!
//! 1. `<NAME>_STARTED` with the bound arguments as payload
//! 2. `<NAME>_SUCCEEDED` with the result, or `<NAME>_FAILED` with the fault
//! 3. `<NAME>_ENDED` with `{"elapsed": <ms>}`
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//! use action_thunk::{ActionRecorder, ActionThunk, ThunkContext};
//! use serde_json::json;
//!
//! let recorder = Arc::new(ActionRecorder::new());
//! let ctx = ThunkContext::stateless(recorder.clone());
//!
//! let fetch = ActionThunk::new("FETCH", |_, _: &ThunkContext<()>| Ok(json!(3).into())).unwrap();
//! let result = fetch.bind([]).run(&ctx).ready().unwrap().unwrap();
//!
//! assert_eq!(result, json!(3));
//! assert_eq!(recorder.types(), vec!["FETCH_STARTED", "FETCH_SUCCEEDED", "FETCH_ENDED"]);
//! ```
//!
//! ## Key components
//!
//! - [`ActionThunk`] — the factory / bound invoker; [`BoundThunk`] is the
//!   dispatchable unit it produces
//! - [`ThunkContext`] — per-invocation dispatch, state, and extra data
//! - [`WorkOutput`] / [`Completion`] — ready or deferred results
//! - [`Notification`] — the `{type, payload?, meta?, error?}` record
//! - [`NotificationDispatcher`], [`JsonlSink`], [`ActionRecorder`] — sinks

pub mod config;
pub mod context;
pub mod error;
pub mod notification;
pub mod phase;
pub mod sink;
pub mod thunk;
pub mod types;
pub mod work;

pub use config::{SinkConfig, ThunkConfig};
pub use context::{Dispatch, ThunkContext};
pub use error::{BoxError, ThunkError, WorkFault};
pub use notification::{Notification, SuccessShape};
pub use phase::{identifier, Phase};
pub use sink::{
    ActionRecorder, JsonlSink, LoggedNotification, NotificationDispatcher, NotificationSink,
};
pub use thunk::{create_action_thunk, ActionThunk, BoundThunk, WorkFn};
pub use types::ActionTypes;
pub use work::{Completion, WorkOutput, WorkResult};
