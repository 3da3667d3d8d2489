//! The ergo Error type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::{BacktraceCapturer, DomainRegistry, ErrCode, Info, StackCapturer, registry};

/// A structured error: domain, code, info, stack context and an optional
/// inner error.
///
/// Errors are serializable and keep two audiences apart:
/// - [`Error::message`] is the friendly text for end users, rendered from the
///   domain's template and the error's info.
/// - [`Error::full_text`] (also `Display`) is the developer view: every link
///   of the chain, root cause first, each with its stack context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Error {
    #[serde(skip_serializing_if = "String::is_empty")]
    domain: String,

    #[serde(skip_serializing_if = "ErrCode::is_zero")]
    code: ErrCode,

    #[serde(skip_serializing_if = "Info::is_empty")]
    info: Info,

    /// Stack snapshot taken when the error was created.
    #[serde(skip_serializing_if = "String::is_empty")]
    context: String,

    /// The error this one wraps. The innermost error is the original one.
    #[serde(skip_serializing_if = "Option::is_none")]
    inner: Option<Box<Error>>,
}

impl Error {
    /// Create a new error.
    ///
    /// `skip` drops stack frames from the context: `0` starts it at the
    /// caller of `make`. The domain does not have to be registered yet; an
    /// unknown domain only shows when the message is rendered.
    ///
    /// ```rust
    /// use ergo::Error;
    ///
    /// let err = Error::make(0, "net", 3, [("host", "example.org")]);
    /// assert_eq!(err.info().get_str("host"), Some("example.org"));
    /// ```
    #[inline(never)]
    pub fn make<I, K, V>(skip: usize, domain: impl Into<String>, code: impl Into<ErrCode>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::build(&BacktraceCapturer::new(), skip + 1, domain, code, pairs)
    }

    /// Same as [`Error::make`], with the stack context taken from `capturer`.
    #[inline(never)]
    pub fn make_with<I, K, V>(
        capturer: &dyn StackCapturer,
        skip: usize,
        domain: impl Into<String>,
        code: impl Into<ErrCode>,
        pairs: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::build(capturer, skip + 1, domain, code, pairs)
    }

    /// Every public constructor reaches this with `skip` already counting
    /// its own frame; the extra two are the capturer entry and `build`.
    #[inline(never)]
    pub(crate) fn build<I, K, V>(
        capturer: &dyn StackCapturer,
        skip: usize,
        domain: impl Into<String>,
        code: impl Into<ErrCode>,
        pairs: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            domain: domain.into(),
            code: code.into(),
            info: pairs.into_iter().collect(),
            context: capturer.capture(skip + 2),
            inner: None,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn code(&self) -> ErrCode {
        self.code
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Mutable access to the info.
    ///
    /// Meant for the code that builds the error, before handing it out.
    pub fn info_mut(&mut self) -> &mut Info {
        &mut self.info
    }

    /// Stack snapshot taken at creation. Never meant for end users.
    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn inner(&self) -> Option<&Error> {
        self.inner.as_deref()
    }

    /// Detach the inner error, leaving this one as a single link.
    pub fn take_inner(&mut self) -> Option<Error> {
        self.inner.take().map(|inner| *inner)
    }

    /// Make `inner` the cause of this error and return this error.
    ///
    /// An inner error already present is replaced.
    pub fn with_inner(mut self, inner: Error) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// The innermost error of the chain: the original cause.
    pub fn cause(&self) -> &Error {
        let mut err = self;
        while let Some(inner) = err.inner.as_deref() {
            err = inner;
        }
        err
    }

    /// Iterate the chain from this error down to its cause.
    pub fn chain_iter(&self) -> ChainIter<'_> {
        ChainIter { next: Some(self) }
    }

    /// The friendly message, without context, rendered by the global registry.
    pub fn message(&self) -> String {
        self.message_in(registry())
    }

    pub fn message_in(&self, registry: &DomainRegistry) -> String {
        registry.message(self)
    }

    /// The whole chain with stack context, rendered by the global registry.
    pub fn full_text(&self) -> String {
        self.full_text_in(registry())
    }

    /// One `[domain:code] message` block per link, followed by its context.
    /// Blocks run from the root cause to this error.
    pub fn full_text_in(&self, registry: &DomainRegistry) -> String {
        let mut links: Vec<&Error> = self.chain_iter().collect();
        links.reverse();

        links
            .into_iter()
            .map(|err| {
                format!(
                    "[{}:{}] {}\n{}",
                    err.domain,
                    err.code,
                    err.message_in(registry),
                    err.context
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_text())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Iterator over the links of a chain, outermost first.
#[derive(Debug, Clone)]
pub struct ChainIter<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.inner.as_deref();
        Some(current)
    }
}

/// Create a new error; see [`Error::make`].
#[inline(never)]
pub fn make<I, K, V>(skip: usize, domain: impl Into<String>, code: impl Into<ErrCode>, pairs: I) -> Error
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    Error::build(&BacktraceCapturer::new(), skip + 1, domain, code, pairs)
}

/// Link an inner error to an outer one. The result is the outer error.
pub fn chain(inner: Error, outer: Error) -> Error {
    outer.with_inner(inner)
}

/// The innermost error of a chain.
pub fn cause(err: &Error) -> &Error {
    err.cause()
}

/// Create an error with context starting at the macro call site.
///
/// ```rust
/// let err = ergo::err!("net", 3, "host" => "example.org", "port" => 443);
/// assert_eq!(err.info().to_string(), "map[host:example.org port:443]");
/// ```
#[macro_export]
macro_rules! err {
    ($domain:expr, $code:expr $(,)?) => {
        $crate::Error::make(0, $domain, $code, $crate::Info::new())
    };
    ($domain:expr, $code:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $crate::Error::make(0, $domain, $code, $crate::err_info!($($key => $value),+))
    };
}
