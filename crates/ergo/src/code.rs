use serde::{Deserialize, Serialize};
use std::fmt;

/// Code of an error within its domain.
///
/// Codes are only unique per domain: `[net:1]` and `[db:1]` are unrelated.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ErrCode(pub i32);

impl ErrCode {
    /// Whether this is the zero code, which serialization omits.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ErrCode {
    fn from(code: i32) -> Self {
        ErrCode(code)
    }
}

impl From<ErrCode> for i32 {
    fn from(code: ErrCode) -> Self {
        code.0
    }
}

impl fmt::Display for ErrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
