//! Named policies for unrecognized enumerated inputs.

use serde::{Deserialize, Serialize};

/// How to treat an input value outside the recognized enumeration.
///
/// The same question comes up in more than one place (host architecture,
/// stack selection). Callers name the policy they want instead of mixing
/// silent and fatal handling across similar cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownValuePolicy {
    /// Resolve the unrecognized value to a documented default.
    FallbackDefault,
    /// Reject the unrecognized value with an error.
    FailClosed,
}

impl Default for UnknownValuePolicy {
    fn default() -> Self {
        UnknownValuePolicy::FallbackDefault
    }
}
