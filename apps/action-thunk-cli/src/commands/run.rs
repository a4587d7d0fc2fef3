// run.rs — Run a demo operation through an action thunk.
//
// The work is synthesized from flags: it returns `--value` or fails with
// `--fail`, optionally after `--delay-ms` (which takes the deferred path).
// Every notification is printed to stdout as a JSON line and, when an
// events log is configured, appended there too.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use action_thunk::{
    ActionThunk, JsonlSink, Notification, NotificationDispatcher, NotificationSink, ThunkConfig,
    ThunkContext, ThunkError, WorkFault, WorkOutput,
};
use clap::Args;
use serde_json::{json, Value};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Operation name, e.g. FETCH.
    pub name: String,

    /// Argument passed to the work (JSON, or a bare string). Repeatable.
    #[arg(long = "arg")]
    pub args: Vec<String>,

    /// Value the work returns (JSON, or a bare string).
    #[arg(long)]
    pub value: Option<String>,

    /// Make the work fail with this message.
    #[arg(long, conflicts_with = "value")]
    pub fail: Option<String>,

    /// Settle the work after this many milliseconds instead of immediately.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Report failures in FAILED but exit successfully.
    #[arg(long)]
    pub suppress: bool,

    /// Append notifications to this JSONL file (overrides the config).
    #[arg(long)]
    pub events_log: Option<PathBuf>,
}

/// Prints each notification as one JSON line on stdout.
struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn send(&self, notification: &Notification) -> Result<(), ThunkError> {
        println!("{}", serde_json::to_string(notification)?);
        Ok(())
    }
}

pub fn execute(args: &RunArgs, config: &ThunkConfig) -> anyhow::Result<()> {
    let thunk = build_thunk(args, config)?;
    let dispatcher = build_dispatcher(args, config).with_sink(Box::new(StdoutSink));
    let ctx = ThunkContext::stateless(Arc::new(dispatcher));
    let bound = thunk.bind(args.args.iter().map(String::as_str).map(parse_json));
    tracing::info!(args = ?bound.args(), "running {}", thunk.name());

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(async { bound.run(&ctx).await }) {
        Ok(value) => {
            println!("{}", json!({ "result": value }));
            Ok(())
        }
        Err(fault) => Err(anyhow::Error::new(fault).context(format!("{} failed", thunk.name()))),
    }
}

/// Build the thunk described by the flags.
pub fn build_thunk(args: &RunArgs, config: &ThunkConfig) -> anyhow::Result<ActionThunk<()>> {
    let outcome: Result<Value, String> = match &args.fail {
        Some(message) => Err(message.clone()),
        None => Ok(args.value.as_deref().map(parse_json).unwrap_or(Value::Null)),
    };
    let delay = args.delay_ms.map(Duration::from_millis);

    let thunk = ActionThunk::new(args.name.clone(), move |_, _: &ThunkContext<()>| {
        let outcome = outcome.clone().map_err(WorkFault::new);
        match delay {
            None => outcome.map(WorkOutput::from),
            Some(delay) => Ok(WorkOutput::deferred(async move {
                tokio::time::sleep(delay).await;
                outcome
            })),
        }
    })?
    .with_config(config);

    if args.suppress {
        return Ok(thunk.suppress_failures(true));
    }
    Ok(thunk)
}

/// Sinks other than stdout: the events log from the flag or the config.
pub fn build_dispatcher(args: &RunArgs, config: &ThunkConfig) -> NotificationDispatcher {
    let mut dispatcher = NotificationDispatcher::new();
    if let Some(path) = args.events_log.as_ref().or(config.sink.events_log.as_ref()) {
        let sink = JsonlSink::new(path);
        tracing::info!("mirroring notifications to {}", sink.path().display());
        dispatcher.add_sink(Box::new(sink));
    }
    dispatcher
}

/// Parse a flag value as JSON, falling back to a plain string.
fn parse_json(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
