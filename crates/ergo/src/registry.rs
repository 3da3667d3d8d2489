//! Domain registry: domain name -> message renderer.
//!
//! Domains are registered once, during initialization. A second registration
//! under the same name, or a template that does not compile, is a
//! [`ConfigError`] and the non-`try` registration functions treat it as fatal.

use minijinja::{Environment, UndefinedBehavior};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::{ConfigError, DomainFile, ErrCode, Error};

/// Renders the end-user message of an error.
pub type FormatFunc = Arc<dyn Fn(&Error) -> String + Send + Sync>;

/// Message templates of a domain, keyed by code.
pub type DomainMap = BTreeMap<ErrCode, String>;

/// Domain of errors produced by [`crate::wrap`] from foreign values.
pub const FALLBACK_DOMAIN: &str = "rust";

/// Info key holding the message of a wrapped foreign value.
pub const WRAPPED_KEY: &str = "_err";

/// Message of a code that its domain does not declare.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Table of domain renderers.
///
/// Renderers are cloned out of the table before they run, so no lock is held
/// while a template renders.
pub struct DomainRegistry {
    domains: RwLock<HashMap<String, FormatFunc>>,
}

impl DomainRegistry {
    /// Create a registry holding only the [`FALLBACK_DOMAIN`].
    pub fn new() -> Self {
        let mut domains: HashMap<String, FormatFunc> = HashMap::new();
        domains.insert(FALLBACK_DOMAIN.to_string(), Arc::new(fallback_message));
        Self {
            domains: RwLock::new(domains),
        }
    }

    /// Register a renderer under `name`.
    pub fn try_register_func<F>(&self, name: impl Into<String>, format: F) -> Result<(), ConfigError>
    where
        F: Fn(&Error) -> String + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(format))
    }

    /// Register a renderer under `name`; a name conflict is fatal.
    pub fn register_func<F>(&self, name: impl Into<String>, format: F)
    where
        F: Fn(&Error) -> String + Send + Sync + 'static,
    {
        if let Err(err) = self.try_register_func(name, format) {
            err.fatal();
        }
    }

    /// Compile the templates of `map` and register them under `name`.
    pub fn try_register(&self, name: &str, map: &DomainMap) -> Result<(), ConfigError> {
        let format = compile_domain(name, map)?;
        self.insert(name.to_string(), format)
    }

    /// Compile the templates of `map` and register them under `name`; an
    /// invalid template or a name conflict is fatal.
    pub fn register(&self, name: &str, map: &DomainMap) {
        if let Err(err) = self.try_register(name, map) {
            err.fatal();
        }
    }

    /// Register every domain of a domain file.
    ///
    /// Stops at the first failing domain; domains registered before it stay.
    pub fn try_register_file(&self, file: &DomainFile) -> Result<(), ConfigError> {
        for (name, map) in file.domains() {
            self.try_register(name, map)?;
        }
        Ok(())
    }

    fn insert(&self, name: String, format: FormatFunc) -> Result<(), ConfigError> {
        match self.domains.write().entry(name) {
            Entry::Occupied(entry) => Err(ConfigError::domain_conflict(entry.key().as_str())),
            Entry::Vacant(entry) => {
                tracing::trace!(domain = %entry.key(), "registering domain");
                entry.insert(format);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<FormatFunc> {
        self.domains.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.domains.read().contains_key(name)
    }

    /// Registered domain names, sorted.
    pub fn domains(&self) -> Vec<String> {
        let mut names: Vec<String> = self.domains.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Render the end-user message of `err`.
    pub fn message(&self, err: &Error) -> String {
        match self.lookup(err.domain()) {
            Some(format) => format(err),
            None => {
                tracing::debug!(domain = err.domain(), code = %err.code(), "domain missing");
                format!(
                    "Domain missing: [{}:{}] {}",
                    err.domain(),
                    err.code(),
                    err.info()
                )
            }
        }
    }
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("domains", &self.domains())
            .finish()
    }
}

static GLOBAL: LazyLock<DomainRegistry> = LazyLock::new(DomainRegistry::new);

/// The process-wide registry used by [`Error::message`] and [`Error::full_text`].
pub fn registry() -> &'static DomainRegistry {
    &GLOBAL
}

/// Register a domain from message templates in the global registry.
///
/// Templates use MiniJinja syntax and render against the error's info:
/// `"The {{ name }} failed"`. A key missing from the info renders as empty
/// text. Fatal on an invalid template or a name conflict.
pub fn domain(name: &str, map: &DomainMap) {
    registry().register(name, map);
}

/// Register a custom renderer in the global registry. Fatal on a name conflict.
pub fn domain_func<F>(name: impl Into<String>, format: F)
where
    F: Fn(&Error) -> String + Send + Sync + 'static,
{
    registry().register_func(name, format);
}

fn template_name(domain: &str, code: ErrCode) -> String {
    format!("[{}:{}]", domain, code)
}

fn compile_domain(name: &str, map: &DomainMap) -> Result<FormatFunc, ConfigError> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Chainable);

    for (code, text) in map {
        env.add_template_owned(template_name(name, *code), text.clone())
            .map_err(|e| ConfigError::template_invalid(name, *code).set_source(e))?;
    }

    let domain = name.to_string();
    Ok(Arc::new(move |err: &Error| {
        let Ok(template) = env.get_template(&template_name(&domain, err.code())) else {
            return UNKNOWN_ERROR.to_string();
        };
        match template.render(err.info()) {
            Ok(text) => text,
            Err(e) => ConfigError::render_failed(&domain, err.code())
                .set_source(e)
                .fatal(),
        }
    }))
}

fn fallback_message(err: &Error) -> String {
    match err.info().get(WRAPPED_KEY) {
        Some(Value::String(text)) => format!("Error: {}", text),
        Some(other) => format!("Error: {}", other),
        None => "Error: ".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigErrorKind, FixedCapturer};
    use pretty_assertions::assert_eq;

    fn domain_map(entries: &[(i32, &str)]) -> DomainMap {
        entries
            .iter()
            .map(|(code, text)| (ErrCode(*code), text.to_string()))
            .collect()
    }

    fn error(domain: &str, code: i32, pairs: &[(&str, &str)]) -> Error {
        Error::make_with(
            &FixedCapturer::default(),
            0,
            domain,
            code,
            pairs.iter().copied(),
        )
    }

    #[test]
    fn test_new_has_fallback_domain() {
        let registry = DomainRegistry::new();
        assert!(registry.contains(FALLBACK_DOMAIN));
        assert_eq!(registry.domains(), vec![FALLBACK_DOMAIN.to_string()]);
    }

    #[test]
    fn test_template_rendering() {
        let registry = DomainRegistry::new();
        registry
            .try_register("ergo", &domain_map(&[(0, "My error 0"), (2, "The {{name}} failed")]))
            .unwrap();

        assert_eq!(registry.message(&error("ergo", 0, &[])), "My error 0");
        assert_eq!(
            registry.message(&error("ergo", 2, &[("name", "x")])),
            "The x failed"
        );
    }

    #[test]
    fn test_missing_key_renders_empty() {
        let registry = DomainRegistry::new();
        registry
            .try_register("ergo", &domain_map(&[(2, "The {{ name }} failed{{ a.b }}")]))
            .unwrap();
        assert_eq!(registry.message(&error("ergo", 2, &[])), "The  failed");
    }

    #[test]
    fn test_unknown_code() {
        let registry = DomainRegistry::new();
        registry
            .try_register("ergo", &domain_map(&[(0, "My error 0")]))
            .unwrap();
        assert_eq!(registry.message(&error("ergo", 9, &[])), UNKNOWN_ERROR);
    }

    #[test]
    fn test_domain_missing() {
        let registry = DomainRegistry::new();
        assert_eq!(
            registry.message(&error("x", 1, &[("arg", "x")])),
            "Domain missing: [x:1] map[arg:x]"
        );
    }

    #[test]
    fn test_conflict_rejected() {
        let registry = DomainRegistry::new();
        registry.try_register_func("net", |_| "net".to_string()).unwrap();

        let err = registry
            .try_register_func("net", |_| "again".to_string())
            .unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::DomainConflict);
        assert_eq!(registry.message(&error("net", 0, &[])), "net");

        let err = registry.try_register(FALLBACK_DOMAIN, &DomainMap::new()).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::DomainConflict);
    }

    #[test]
    #[should_panic(expected = "DomainConflict")]
    fn test_conflict_is_fatal() {
        let registry = DomainRegistry::new();
        registry.register("net", &DomainMap::new());
        registry.register("net", &DomainMap::new());
    }

    #[test]
    fn test_invalid_template() {
        let registry = DomainRegistry::new();
        let err = registry
            .try_register("bad", &domain_map(&[(3, "oops {{ name")]))
            .unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::TemplateInvalid);
        assert!(err.source_ref().is_some());
        assert!(!registry.contains("bad"));
    }

    #[test]
    #[should_panic(expected = "TemplateInvalid")]
    fn test_invalid_template_is_fatal() {
        DomainRegistry::new().register("bad", &domain_map(&[(0, "{% if %}")]));
    }

    #[test]
    #[should_panic(expected = "RenderFailed")]
    fn test_render_failure_is_fatal() {
        let registry = DomainRegistry::new();
        registry
            .try_register("math", &domain_map(&[(0, "{% for x in 42 %}{{ x }}{% endfor %}")]))
            .unwrap();
        registry.message(&error("math", 0, &[]));
    }

    #[test]
    fn test_fallback_message() {
        let registry = DomainRegistry::new();
        let err = error(FALLBACK_DOMAIN, 0, &[(WRAPPED_KEY, "EOF")]);
        assert_eq!(registry.message(&err), "Error: EOF");

        let err = error(FALLBACK_DOMAIN, 0, &[]);
        assert_eq!(registry.message(&err), "Error: ");
    }

    #[test]
    fn test_custom_func_sees_error() {
        let registry = DomainRegistry::new();
        registry
            .try_register_func("custom", |err: &Error| {
                format!("{} #{}", err.info().get_str("who").unwrap_or("?"), err.code())
            })
            .unwrap();
        assert_eq!(
            registry.message(&error("custom", 4, &[("who", "disk")])),
            "disk #4"
        );
    }
}
