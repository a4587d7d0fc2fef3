// types.rs — The identifier set of one operation.
//
// Reducers match on these strings. They are computed once when the thunk
// is constructed and never change afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ThunkError;
use crate::phase::{identifier, Phase};

/// The operation name and its four notification identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTypes {
    name: String,
    started: String,
    succeeded: String,
    failed: String,
    ended: String,
}

impl ActionTypes {
    /// Compute the identifiers for `name`. Fails if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ThunkError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ThunkError::EmptyName);
        }
        Ok(Self {
            started: identifier(&name, Phase::Started),
            succeeded: identifier(&name, Phase::Succeeded),
            failed: identifier(&name, Phase::Failed),
            ended: identifier(&name, Phase::Ended),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn started(&self) -> &str {
        &self.started
    }

    pub fn succeeded(&self) -> &str {
        &self.succeeded
    }

    pub fn failed(&self) -> &str {
        &self.failed
    }

    pub fn ended(&self) -> &str {
        &self.ended
    }

    /// Identifier for a given phase.
    pub fn get(&self, phase: Phase) -> &str {
        match phase {
            Phase::Started => &self.started,
            Phase::Succeeded => &self.succeeded,
            Phase::Failed => &self.failed,
            Phase::Ended => &self.ended,
        }
    }

    /// Map an identifier back to its phase, if it belongs to this operation.
    pub fn phase_of(&self, identifier: &str) -> Option<Phase> {
        identifier
            .strip_prefix(self.name.as_str())?
            .strip_prefix('_')
            .and_then(Phase::from_suffix)
    }

    /// The four identifiers in order: STARTED, SUCCEEDED, FAILED, ENDED.
    pub fn iter(&self) -> std::array::IntoIter<&str, 4> {
        [
            self.started.as_str(),
            self.succeeded.as_str(),
            self.failed.as_str(),
            self.ended.as_str(),
        ]
        .into_iter()
    }
}

impl<'a> IntoIterator for &'a ActionTypes {
    type Item = &'a str;
    type IntoIter = std::array::IntoIter<&'a str, 4>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
