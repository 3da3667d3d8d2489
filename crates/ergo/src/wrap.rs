//! Normalizing arbitrary values into [`Error`].

use serde_json::Value;
use std::any::Any;
use std::fmt;

use crate::{BacktraceCapturer, ErrCode, Error, FALLBACK_DOMAIN, StackCapturer, WRAPPED_KEY};

/// What [`wrap`] sees of a value.
#[derive(Debug)]
pub enum Wrapped {
    /// Nothing to wrap.
    Absent,
    /// Already an ergo error.
    Structured(Error),
    /// A foreign error or any other value, reduced to its message text.
    Message(String),
}

/// Values that [`wrap`] accepts.
///
/// Implemented for ergo errors, `Option`s of wrappable values, common std
/// error types, strings and primitives. Other types go through [`Native`]
/// (any `std::error::Error`) or [`Displayed`] (any `Display`).
pub trait Wrappable {
    fn into_wrapped(self) -> Wrapped;
}

/// Adapter wrapping any `std::error::Error`.
#[derive(Debug)]
pub struct Native<E>(pub E);

/// Adapter wrapping any `Display` value.
#[derive(Debug)]
pub struct Displayed<T>(pub T);

impl Wrappable for Error {
    fn into_wrapped(self) -> Wrapped {
        Wrapped::Structured(self)
    }
}

impl Wrappable for Box<Error> {
    fn into_wrapped(self) -> Wrapped {
        Wrapped::Structured(*self)
    }
}

impl<T: Wrappable> Wrappable for Option<T> {
    fn into_wrapped(self) -> Wrapped {
        match self {
            Some(x) => x.into_wrapped(),
            None => Wrapped::Absent,
        }
    }
}

impl<E: std::error::Error + 'static> Wrappable for Native<E> {
    fn into_wrapped(self) -> Wrapped {
        match (&self.0 as &dyn Any).downcast_ref::<Error>() {
            Some(err) => Wrapped::Structured(err.clone()),
            None => Wrapped::Message(self.0.to_string()),
        }
    }
}

// Type-erased errors may hide an ergo error, which passes through unchanged.
macro_rules! impl_wrappable_for_boxed_dyn {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Wrappable for $ty {
                fn into_wrapped(self) -> Wrapped {
                    match self.downcast::<Error>() {
                        Ok(err) => Wrapped::Structured(*err),
                        Err(other) => Wrapped::Message(other.to_string()),
                    }
                }
            }
        )*
    };
}

impl_wrappable_for_boxed_dyn!(
    Box<dyn std::error::Error>,
    Box<dyn std::error::Error + Send>,
    Box<dyn std::error::Error + Send + Sync>,
);

impl<T: fmt::Display> Wrappable for Displayed<T> {
    fn into_wrapped(self) -> Wrapped {
        Wrapped::Message(self.0.to_string())
    }
}

macro_rules! impl_wrappable_by_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Wrappable for $ty {
                fn into_wrapped(self) -> Wrapped {
                    Wrapped::Message(self.to_string())
                }
            }
        )*
    };
}

impl_wrappable_by_display!(
    std::io::Error,
    std::fmt::Error,
    std::num::ParseIntError,
    std::num::ParseFloatError,
    std::str::ParseBoolError,
    std::str::Utf8Error,
    std::string::FromUtf8Error,
    &str,
    String,
    char,
    bool,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

/// Normalize `x` into an [`Error`].
///
/// - `None` gives `None`.
/// - An [`Error`] is returned unchanged.
/// - Anything else becomes an error of the [`FALLBACK_DOMAIN`] with code 0,
///   whose `_err` info holds the message or string form of `x`.
///
/// The stack context starts at the caller of `wrap`.
#[inline(never)]
pub fn wrap<T: Wrappable>(x: T) -> Option<Error> {
    normalize(&BacktraceCapturer::new(), 1, x, std::iter::empty::<(String, Value)>())
}

/// Same as [`wrap`], appending `extra` pairs to the info of a new error.
///
/// When `x` already is an [`Error`], `extra` is ignored.
#[inline(never)]
pub fn wrap_with<T, I, K, V>(x: T, extra: I) -> Option<Error>
where
    T: Wrappable,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    normalize(&BacktraceCapturer::new(), 1, x, extra)
}

/// Same as [`wrap_with`], with the stack context taken from `capturer`.
#[inline(never)]
pub fn wrap_using<T, I, K, V>(capturer: &dyn StackCapturer, x: T, extra: I) -> Option<Error>
where
    T: Wrappable,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    normalize(capturer, 1, x, extra)
}

#[inline(never)]
fn normalize<T, I, K, V>(capturer: &dyn StackCapturer, skip: usize, x: T, extra: I) -> Option<Error>
where
    T: Wrappable,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    match x.into_wrapped() {
        Wrapped::Absent => None,
        Wrapped::Structured(err) => Some(err),
        Wrapped::Message(text) => {
            let pairs = std::iter::once((WRAPPED_KEY.to_string(), Value::String(text)))
                .chain(extra.into_iter().map(|(k, v)| (k.into(), v.into())));
            Some(Error::build(
                capturer,
                skip + 1,
                FALLBACK_DOMAIN,
                ErrCode(0),
                pairs,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DomainRegistry, FixedCapturer, Info, NoopCapturer, chain};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_wrap_none() {
        assert!(wrap(None::<Error>).is_none());
        assert!(wrap(None::<std::io::Error>).is_none());
    }

    #[test]
    fn test_wrap_error_is_identity() {
        let err = Error::make_with(&NoopCapturer, 0, "ergo", 1, [("k", "v")]);
        assert_eq!(wrap(err.clone()), Some(err.clone()));
        assert_eq!(wrap_with(Some(err.clone()), [("ignored", 1)]), Some(err));
    }

    #[test]
    fn test_wrap_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "EOF");
        let err = wrap(io_err).expect("wrapped");
        assert_eq!(err.domain(), FALLBACK_DOMAIN);
        assert_eq!(err.code(), ErrCode(0));
        assert_eq!(err.info().get_str(WRAPPED_KEY), Some("EOF"));

        let registry = DomainRegistry::new();
        assert_eq!(err.message_in(&registry), "Error: EOF");
        assert_eq!(
            err.full_text_in(&registry).lines().next(),
            Some("[rust:0] Error: EOF")
        );
    }

    #[test]
    fn test_wrap_context_starts_at_caller() {
        let err = wrap("Random error").expect("wrapped");
        let frame = err.context().lines().nth(1).unwrap_or_default();
        assert!(
            frame.ends_with("test_wrap_context_starts_at_caller"),
            "unexpected context: {}",
            err.context()
        );

        let err = wrap_with(Native(std::fmt::Error), [("n", 1)]).expect("wrapped");
        let frame = err.context().lines().nth(1).unwrap_or_default();
        assert!(frame.ends_with("test_wrap_context_starts_at_caller"));
    }

    #[test]
    fn test_wrap_values() {
        let err = wrap("Random error").expect("wrapped");
        assert_eq!(err.info().get_str(WRAPPED_KEY), Some("Random error"));
        assert_eq!(
            err.message_in(&DomainRegistry::new()),
            "Error: Random error"
        );

        let err = wrap(42).expect("wrapped");
        assert_eq!(err.info().get_str(WRAPPED_KEY), Some("42"));

        let err = wrap(Displayed(std::net::Ipv4Addr::LOCALHOST)).expect("wrapped");
        assert_eq!(err.info().get_str(WRAPPED_KEY), Some("127.0.0.1"));

        let err = wrap("x".parse::<i32>().unwrap_err()).expect("wrapped");
        assert_eq!(
            err.info().get_str(WRAPPED_KEY),
            Some("invalid digit found in string")
        );
    }

    #[test]
    fn test_wrap_extra_pairs() {
        let capturer = FixedCapturer("f.rs:1\n\tf\n".to_string());
        let err = wrap_using(&capturer, "boom", [("path", json!("/tmp/x")), ("tries", json!(3))])
            .expect("wrapped");
        assert_eq!(err.info().to_string(), "map[_err:boom path:/tmp/x tries:3]");
        assert_eq!(err.context(), "f.rs:1\n\tf\n");
    }

    #[test]
    fn test_wrap_boxed() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = "boxed failure".into();
        let err = wrap_using(&NoopCapturer, boxed, Info::new()).expect("wrapped");
        assert_eq!(err.info().get_str(WRAPPED_KEY), Some("boxed failure"));

        let inner = Box::new(Error::make_with(&NoopCapturer, 0, "a", 1, Info::new()));
        assert_eq!(wrap(inner.clone()), Some(*inner));
    }

    #[test]
    fn test_wrap_type_erased_error_is_identity() {
        let inner = Error::make_with(&NoopCapturer, 0, "net", 3, [("host", "db1")]);
        let err = chain(inner, Error::make(0, "ergo", 1, [("k", "v")]));

        let erased = Box::new(err.clone()) as Box<dyn std::error::Error + Send + Sync>;
        assert_eq!(wrap(erased), Some(err.clone()));

        let erased = Box::new(err.clone()) as Box<dyn std::error::Error>;
        assert_eq!(wrap_with(erased, [("ignored", 1)]), Some(err.clone()));

        assert_eq!(wrap(Native(err.clone())), Some(err));
    }

    #[test]
    fn test_wrap_native_foreign_error() {
        let err = wrap(Native(std::fmt::Error)).expect("wrapped");
        assert_eq!(err.domain(), FALLBACK_DOMAIN);
        assert_eq!(
            err.info().get_str(WRAPPED_KEY),
            Some("an error occurred when formatting an argument")
        );
    }
}
