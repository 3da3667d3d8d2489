//! Domain maps loaded from TOML.
//!
//! One table per domain, one entry per code:
//!
//! ```toml
//! [ergo]
//! 0 = "My error 0"
//! 2 = "The {{ name }} failed"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::{ConfigError, DomainMap, ErrCode};

#[derive(Deserialize)]
#[serde(transparent)]
struct RawDomainFile(BTreeMap<String, BTreeMap<String, String>>);

/// A set of domain maps, keyed by domain name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainFile {
    domains: BTreeMap<String, DomainMap>,
}

impl DomainFile {
    /// Parse a domain file. Every key of a domain table must be an integer code.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawDomainFile = toml::from_str(text).map_err(|e| {
            ConfigError::domain_file_invalid("domain file is not a table of code tables")
                .set_source(e)
        })?;

        let mut domains = BTreeMap::new();
        for (name, entries) in raw.0 {
            let mut map = DomainMap::new();
            for (key, template) in entries {
                let code = key.trim().parse::<i32>().map_err(|e| {
                    ConfigError::domain_file_invalid(format!("code '{}' is not an integer", key))
                        .with_context("domain", name.as_str())
                        .set_source(e)
                })?;
                map.insert(ErrCode(code), template);
            }
            domains.insert(name, map);
        }

        Ok(Self { domains })
    }

    /// Read and parse a domain file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io_failed(path.display().to_string(), e))?;
        tracing::trace!(path = %path.display(), "loading domain file");
        Self::from_toml_str(&text).map_err(|e| e.with_context("path", path.display().to_string()))
    }

    /// Domains in name order.
    pub fn domains(&self) -> impl Iterator<Item = (&str, &DomainMap)> {
        self.domains.iter().map(|(name, map)| (name.as_str(), map))
    }

    pub fn get(&self, name: &str) -> Option<&DomainMap> {
        self.domains.get(name)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Add a domain map, replacing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, map: DomainMap) -> Option<DomainMap> {
        self.domains.insert(name.into(), map)
    }
}
