//! Persisted default values for command parameters.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CliError;
use crate::storage;

pub const OPTIONS_FILE_NAME: &str = "options.json";

pub const ADDRESS: &str = "address";
pub const PORT: &str = "port";
pub const ORGANIZATION_ID: &str = "organization_id";

#[derive(Debug, Clone)]
pub struct Options {
    dir: PathBuf,
    values: BTreeMap<String, String>,
}

impl Options {
    /// Open the store under `base_path`; a missing file is an empty store.
    pub fn open(base_path: &Path) -> Result<Self, CliError> {
        let path = base_path.join(OPTIONS_FILE_NAME);
        let values = match fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|source| CliError::CorruptOptions {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == IoErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(CliError::Storage { path, source }),
        };

        Ok(Self {
            dir: base_path.to_path_buf(),
            values,
        })
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CliError> {
        if key.trim().is_empty() {
            return Err(CliError::invalid("key", "cannot be empty"));
        }
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns whether the key was present.
    pub fn delete(&mut self, key: &str) -> Result<bool, CliError> {
        let existed = self.values.remove(key).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// An explicit non-empty value wins, then the stored one, else empty.
    pub fn resolve(&self, key: &str, explicit: Option<&str>) -> String {
        match explicit.filter(|v| !v.is_empty()) {
            Some(value) => value.to_string(),
            None => {
                let stored = self.get(key).unwrap_or_default();
                if !stored.is_empty() {
                    tracing::debug!(key, value = stored, "using stored option");
                }
                stored.to_string()
            }
        }
    }

    fn save(&self) -> Result<(), CliError> {
        let raw = serde_json::to_vec_pretty(&self.values).map_err(|source| CliError::CorruptOptions {
            path: self.dir.join(OPTIONS_FILE_NAME),
            source,
        })?;
        storage::write_private_files(&self.dir, &[(OPTIONS_FILE_NAME, raw.as_slice())])
    }
}
