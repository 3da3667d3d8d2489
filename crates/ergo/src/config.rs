//! Configuration errors: the fatal category of failures.

use crate::ConfigErrorKind;
use std::fmt;

/// Error raised while configuring domains.
///
/// Registration functions that have no `try_` prefix escalate this error
/// through [`ConfigError::fatal`], which aborts the initializing context.
pub struct ConfigError {
    kind: ConfigErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ConfigError {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ConfigErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context key-value pairs
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Get the source error (if any).
    pub fn source_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_ref().map(|e| e.as_ref())
    }

    /// Add context to the error
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set the source error.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if source was already set.
    pub fn set_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(Box::new(source));
        self
    }

    /// Abort the current context with this error.
    ///
    /// A configuration error means the registry would be left incomplete;
    /// continuing would hide every later error of the affected domain.
    pub fn fatal(self) -> ! {
        tracing::error!(kind = %self.kind, error = %self, "fatal configuration error");
        panic!("{self}")
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }

        Ok(())
    }
}

impl fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl ConfigError {
    /// Create a DomainConflict error
    pub fn domain_conflict(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self::new(
            ConfigErrorKind::DomainConflict,
            format!("domain '{}' is already registered", domain),
        )
        .with_context("domain", domain)
    }

    /// Create a TemplateInvalid error for one code of a domain
    pub fn template_invalid(domain: &str, code: crate::ErrCode) -> Self {
        Self::new(
            ConfigErrorKind::TemplateInvalid,
            format!("template [{}:{}] does not compile", domain, code),
        )
        .with_context("domain", domain)
        .with_context("code", code.to_string())
    }

    /// Create a RenderFailed error for one code of a domain
    pub fn render_failed(domain: &str, code: crate::ErrCode) -> Self {
        Self::new(
            ConfigErrorKind::RenderFailed,
            format!("template [{}:{}] failed to render", domain, code),
        )
        .with_context("domain", domain)
        .with_context("code", code.to_string())
    }

    /// Create a DomainFileInvalid error
    pub fn domain_file_invalid(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::DomainFileInvalid, message)
    }

    /// Create an IoFailed error for a path
    pub fn io_failed(path: impl Into<String>, err: std::io::Error) -> Self {
        let path = path.into();
        Self::new(
            ConfigErrorKind::IoFailed,
            format!("cannot read '{}'", path),
        )
        .with_context("path", path)
        .set_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrCode;

    #[test]
    fn test_domain_conflict() {
        let err = ConfigError::domain_conflict("ergo");
        assert_eq!(err.kind(), ConfigErrorKind::DomainConflict);
        assert_eq!(err.context()[0], ("domain", "ergo".to_string()));
        assert_eq!(
            err.to_string(),
            "DomainConflict, context { domain: ergo } => domain 'ergo' is already registered"
        );
    }

    #[test]
    fn test_template_context() {
        let err = ConfigError::template_invalid("net", ErrCode(7));
        assert_eq!(err.kind(), ConfigErrorKind::TemplateInvalid);
        assert_eq!(err.context().len(), 2);
        assert_eq!(err.context()[1], ("code", "7".to_string()));
        assert!(err.message().contains("[net:7]"));
    }

    #[test]
    fn test_set_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ConfigError::io_failed("domains.toml", io_err);

        assert!(err.source_ref().is_some());
        assert!(err.to_string().ends_with(": no such file"));
    }

    #[test]
    #[should_panic(expected = "DomainConflict")]
    fn test_fatal_panics() {
        ConfigError::domain_conflict("twice").fatal();
    }
}
