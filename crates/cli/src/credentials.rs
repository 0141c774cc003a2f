//! Session store: the caller's bearer and refresh tokens on disk.
//!
//! Two flat files, `token` and `refresh_token`, under the base path. Both are
//! owner read/write only and are only ever written by [`Credentials::store`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gateway_core::{CallContext, CallMetadata};

use crate::error::CliError;
use crate::storage;

pub const TOKEN_FILE_NAME: &str = "token";
pub const REFRESH_TOKEN_FILE_NAME: &str = "refresh_token";

/// Header carrying the bearer token on every authenticated call.
pub const AUTH_HEADER: &str = "authorization";

/// Deadline imposed on calls that do not ask for one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// `~/.gateway`, when a home directory is known.
pub fn default_base_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gateway"))
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    base_path: PathBuf,
    token: String,
    refresh_token: String,
}

impl Credentials {
    /// Credentials not loaded yet; call [`Credentials::load`] before use.
    pub fn empty(base_path: impl Into<PathBuf>) -> Self {
        Self::new(base_path, String::new(), String::new())
    }

    pub fn new(base_path: impl Into<PathBuf>, token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            token: token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    pub fn from_disk(base_path: impl Into<PathBuf>) -> Result<Self, CliError> {
        let mut credentials = Self::empty(base_path);
        credentials.load()?;
        Ok(credentials)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Read both files; either one missing or unreadable is `NotFound`.
    pub fn load(&mut self) -> Result<(), CliError> {
        let token = read_secret(&self.base_path.join(TOKEN_FILE_NAME))?;
        let refresh_token = read_secret(&self.base_path.join(REFRESH_TOKEN_FILE_NAME))?;
        self.token = token;
        self.refresh_token = refresh_token;
        Ok(())
    }

    /// Persist both tokens, creating the base path on demand.
    pub fn store(&self) -> Result<(), CliError> {
        storage::write_private_files(
            &self.base_path,
            &[
                (TOKEN_FILE_NAME, self.token.as_bytes()),
                (REFRESH_TOKEN_FILE_NAME, self.refresh_token.as_bytes()),
            ],
        )?;
        tracing::debug!(base_path = %self.base_path.display(), "credentials stored");
        Ok(())
    }

    /// Authenticated call context with an absolute deadline of `timeout`
    /// from now, or [`DEFAULT_TIMEOUT`] when none is given.
    pub fn build_context(&self, timeout: Option<Duration>) -> CallContext {
        let metadata = CallMetadata::new().with(AUTH_HEADER, format!("Bearer {}", self.token));
        CallContext::with_metadata(metadata).with_timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_path", &self.base_path)
            .field("token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

fn read_secret(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::CredentialsNotFound {
        path: path.to_path_buf(),
        source,
    })
}
