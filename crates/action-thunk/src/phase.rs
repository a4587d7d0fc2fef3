// phase.rs — The four lifecycle phases and identifier construction.
//
// Every invocation walks the same path:
//   Started → (Succeeded | Failed) → Ended
// Identifiers are `<NAME>_<SUFFIX>`, built by one pure function so reducers
// and the factory can never disagree on spelling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lifecycle phase of one thunk invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Emitted before the work begins executing.
    Started,
    /// The work (or its deferred value) produced a result.
    Succeeded,
    /// The work faulted or its deferred value was rejected.
    Failed,
    /// Always last; carries the elapsed duration.
    Ended,
}

impl Phase {
    /// All phases in emission/iteration order.
    pub const ALL: [Phase; 4] = [Phase::Started, Phase::Succeeded, Phase::Failed, Phase::Ended];

    /// The suffix appended to the operation name.
    pub fn suffix(self) -> &'static str {
        match self {
            Phase::Started => "STARTED",
            Phase::Succeeded => "SUCCEEDED",
            Phase::Failed => "FAILED",
            Phase::Ended => "ENDED",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|phase| phase.suffix() == suffix)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Build the notification identifier for `name` in `phase`.
///
/// ```
/// use action_thunk::{identifier, Phase};
/// assert_eq!(identifier("FETCH", Phase::Started), "FETCH_STARTED");
/// ```
pub fn identifier(name: &str, phase: Phase) -> String {
    format!("{}_{}", name, phase.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_use_name_as_prefix() {
        assert_eq!(identifier("FETCH", Phase::Started), "FETCH_STARTED");
        assert_eq!(identifier("FETCH", Phase::Succeeded), "FETCH_SUCCEEDED");
        assert_eq!(identifier("FETCH", Phase::Failed), "FETCH_FAILED");
        assert_eq!(identifier("FETCH", Phase::Ended), "FETCH_ENDED");
    }

    #[test]
    fn name_is_used_verbatim() {
        assert_eq!(identifier("users/load", Phase::Ended), "users/load_ENDED");
    }

    #[test]
    fn suffix_lookup_is_inverse_of_suffix() {
        for phase in Phase::ALL {
            assert_eq!(Phase::from_suffix(phase.suffix()), Some(phase));
        }
        assert_eq!(Phase::from_suffix("FINISHED"), None);
    }

    #[test]
    fn phase_serializes_as_suffix() {
        let json = serde_json::to_string(&Phase::Succeeded).unwrap();
        assert_eq!(json, "\"SUCCEEDED\"");
        assert_eq!(Phase::Failed.to_string(), "FAILED");
    }
}
