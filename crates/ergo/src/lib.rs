//! # ergo
//!
//! Structured errors for programs that want both a machine-checkable
//! classification and a friendly message.
//!
//! ## Design Philosophy
//!
//! - **Domain + Code**: know what failed; codes are unique within a domain
//! - **Info**: named values that feed the message template and stay inspectable
//! - **Context**: a stack snapshot frozen when the error is created
//! - **Chain**: each error may wrap its cause; the innermost one is the root
//!
//! ## Usage
//!
//! ```rust
//! use ergo::{DomainMap, DomainRegistry, ErrCode, Error, chain};
//!
//! let registry = DomainRegistry::new();
//! let mut map = DomainMap::new();
//! map.insert(ErrCode(2), "The {{ name }} failed".to_string());
//! registry.register("disk", &map);
//!
//! let root = ergo::wrap("no space left on device").unwrap();
//! let err = chain(root, Error::make(0, "disk", 2, [("name", "flush")]));
//!
//! assert_eq!(err.message_in(&registry), "The flush failed");
//! assert_eq!(err.cause().message_in(&registry), "Error: no space left on device");
//! ```
//!
//! ## Principles
//!
//! - Domains are registered once, at startup; collisions and malformed
//!   templates are fatal configuration errors
//! - Only [`Error::message`] is meant for end users; [`Error::full_text`]
//!   carries stack context for developers and logs
//! - Foreign errors are normalized with [`wrap`] and linked with [`chain`]

mod code;
mod config;
mod domain_file;
mod error;
mod info;
mod kind;
mod registry;
mod stack;
mod wrap;

pub use code::ErrCode;
pub use config::ConfigError;
pub use domain_file::DomainFile;
pub use error::{ChainIter, Error, cause, chain, make};
pub use info::Info;
pub use kind::ConfigErrorKind;
pub use registry::{
    DomainMap, DomainRegistry, FALLBACK_DOMAIN, FormatFunc, UNKNOWN_ERROR, WRAPPED_KEY, domain,
    domain_func, registry,
};
pub use stack::{BacktraceCapturer, FixedCapturer, MAX_FRAMES, NoopCapturer, StackCapturer};
pub use wrap::{Displayed, Native, Wrappable, Wrapped, wrap, wrap_using, wrap_with};

/// Result type alias using ergo Error
pub type Result<T> = std::result::Result<T, Error>;
