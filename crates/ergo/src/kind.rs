//! Kinds of configuration errors raised while setting up domains.

use strum_macros::{Display, IntoStaticStr};

/// The kind of configuration error that occurred.
///
/// Every kind is a programming or deployment mistake that should be caught at
/// startup, never a condition a running program recovers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ConfigErrorKind {
    /// A domain name was registered twice
    DomainConflict,

    /// A message template failed to compile
    TemplateInvalid,

    /// A compiled template failed while rendering an error's info
    RenderFailed,

    /// A domain file is not valid TOML or has a non-integer code
    DomainFileInvalid,

    /// A domain file could not be read
    IoFailed,
}

impl ConfigErrorKind {
    /// Returns the kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}
