//! # Credential Store
//!
//! Username/password accounts kept in a single JSON object keyed by username.
//!
//! Every operation loads the whole table, changes it, and writes it back.
//! There is no locking: two processes writing at once lose one update.
//! The tool runs as a single local process, so this is tolerated.

use crate::error::{self, Error, Result};
use crate::password;
use crate::timestamp;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Shortest password accepted at registration and reset
pub const MIN_PASSWORD_LEN: usize = 6;

/// One stored account.
///
/// Field names on disk are kept compatible with older credential files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "password")]
    pub password_hash: String,
    pub email: String,
    #[serde(rename = "creation_date", with = "timestamp::required")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "timestamp::optional")]
    pub last_login: Option<NaiveDateTime>,
}

/// All accounts, keyed by username, in file order
pub type UserTable = IndexMap<String, UserRecord>;

/// An account without its password hash
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub created_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

/// Account inserted when the credential file is first created
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Backends
// =============================================================================

/// Where the user table lives
pub trait CredentialBackend: Send + Sync {
    /// Whether a table has been written yet
    fn exists(&self) -> bool;

    /// Read the whole table
    fn load(&self) -> Result<UserTable>;

    /// Replace the whole table
    fn save(&self, users: &UserTable) -> Result<()>;

    /// Get backend name for debugging
    fn backend_name(&self) -> &'static str;
}

/// JSON file backend
///
/// The file is pretty-printed with 4-space indentation.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                error::io_error(format!("Failed to create credentials dir: {}", e))
                    .with_context("path", parent.display().to_string())
            })?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialBackend for JsonFileBackend {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<UserTable> {
        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::from(e)
                .with_operation("credentials::load")
                .with_context("path", self.path.display().to_string())
        })?;
        serde_json::from_str(&json).map_err(|e| {
            error::serialization_error(format!("Failed to parse credentials: {}", e))
                .with_context("path", self.path.display().to_string())
                .set_source(e)
        })
    }

    fn save(&self, users: &UserTable) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        users
            .serialize(&mut ser)
            .map_err(|e| error::serialization_error(e.to_string()))?;
        std::fs::write(&self.path, buf).map_err(|e| {
            error::io_error(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// In-memory backend (useful for testing)
#[derive(Default)]
pub struct MemoryBackend {
    users: RwLock<Option<UserTable>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialBackend for MemoryBackend {
    fn exists(&self) -> bool {
        self.users.read().map(|u| u.is_some()).unwrap_or(false)
    }

    fn load(&self) -> Result<UserTable> {
        let users = self
            .users
            .read()
            .map_err(|_| error::storage_failed("credential table lock poisoned"))?;
        Ok(users.clone().unwrap_or_default())
    }

    fn save(&self, users: &UserTable) -> Result<()> {
        let mut slot = self
            .users
            .write()
            .map_err(|_| error::storage_failed("credential table lock poisoned"))?;
        *slot = Some(users.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// Store
// =============================================================================

/// Registration, login and password reset over a [`CredentialBackend`]
pub struct CredentialStore {
    backend: Box<dyn CredentialBackend>,
}

impl CredentialStore {
    /// Open the JSON credential file, creating it when absent.
    pub fn open(path: impl AsRef<Path>, seed: Option<&SeedAccount>) -> Result<Self> {
        Self::with_backend(JsonFileBackend::new(path)?, seed)
    }

    /// Store backed by memory only
    pub fn in_memory() -> Result<Self> {
        Self::with_backend(MemoryBackend::new(), None)
    }

    /// Wrap a backend, writing an initial table if it has none.
    ///
    /// The seed account is only inserted when the table is created here.
    pub fn with_backend(
        backend: impl CredentialBackend + 'static,
        seed: Option<&SeedAccount>,
    ) -> Result<Self> {
        if !backend.exists() {
            let mut users = UserTable::new();
            if let Some(seed) = seed {
                users.insert(
                    seed.username.clone(),
                    UserRecord {
                        password_hash: password::hash_password(&seed.password)?,
                        email: seed.email.clone(),
                        created_at: timestamp::now(),
                        last_login: None,
                    },
                );
                info!(username = %seed.username, "seeded initial account");
            }
            backend
                .save(&users)
                .map_err(|e| e.with_operation("credentials::initialize"))?;
            info!(backend = backend.backend_name(), "created credential store");
        }
        Ok(Self {
            backend: Box::new(backend),
        })
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Create an account.
    ///
    /// Fails with `DuplicateUsername` before `DuplicateEmail` when both clash.
    pub fn register(&self, username: &str, password: &str, email: &str) -> Result<()> {
        if username.is_empty() || password.is_empty() || email.is_empty() {
            return Err(error::invalid_argument("Please fill in all fields"));
        }
        validate_password(password)?;
        if !email.contains('@') || !email.contains('.') {
            return Err(error::invalid_argument("Please enter a valid email address")
                .with_context("email", email));
        }

        let mut users = self.load("credentials::register")?;
        if users.contains_key(username) {
            return Err(Error::duplicate_username(username).with_operation("credentials::register"));
        }
        if users.values().any(|u| u.email == email) {
            return Err(Error::duplicate_email(email).with_operation("credentials::register"));
        }

        users.insert(
            username.to_string(),
            UserRecord {
                password_hash: password::hash_password(password)?,
                email: email.to_string(),
                created_at: timestamp::now(),
                last_login: None,
            },
        );
        self.save(&users, "credentials::register")?;
        info!(%username, "user registered");
        Ok(())
    }

    /// Check a username/password pair.
    ///
    /// Returns `Ok(false)` for an unknown user or a wrong password. A match
    /// stamps `last_login` and upgrades a legacy hash.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        if username.is_empty() || password.is_empty() {
            return Err(error::invalid_argument("Please enter both username and password"));
        }

        let mut users = self.load("credentials::authenticate")?;
        let Some(record) = users.get_mut(username) else {
            debug!(%username, "login for unknown user");
            return Ok(false);
        };

        let matched = password::verify_password(password, &record.password_hash).map_err(|e| {
            e.with_operation("credentials::authenticate")
                .with_context("username", username)
        })?;
        if !matched {
            debug!(%username, "password mismatch");
            return Ok(false);
        }

        if password::needs_rehash(&record.password_hash) {
            record.password_hash = password::hash_password(password)?;
            info!(%username, "upgraded legacy password hash");
        }
        record.last_login = Some(timestamp::now());
        self.save(&users, "credentials::authenticate")?;
        info!(%username, "user logged in");
        Ok(true)
    }

    /// Replace the password of the first account registered under `email`.
    pub fn reset_password(&self, email: &str, new_password: &str) -> Result<()> {
        if email.is_empty() || new_password.is_empty() {
            return Err(error::invalid_argument("Please fill in all fields"));
        }
        validate_password(new_password)?;

        let mut users = self.load("credentials::reset_password")?;
        let record = users
            .values_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| Error::email_not_found(email).with_operation("credentials::reset_password"))?;
        record.password_hash = password::hash_password(new_password)?;
        self.save(&users, "credentials::reset_password")?;
        info!(%email, "password reset");
        Ok(())
    }

    /// Public view of one account
    pub fn user(&self, username: &str) -> Result<Option<UserProfile>> {
        let users = self.load("credentials::user")?;
        Ok(users.get(username).map(|r| UserProfile {
            username: username.to_string(),
            email: r.email.clone(),
            created_at: r.created_at,
            last_login: r.last_login,
        }))
    }

    /// Number of stored accounts
    pub fn len(&self) -> Result<usize> {
        Ok(self.load("credentials::len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn load(&self, operation: &'static str) -> Result<UserTable> {
        self.backend.load().map_err(|e| e.with_operation(operation))
    }

    fn save(&self, users: &UserTable, operation: &'static str) -> Result<()> {
        self.backend.save(users).map_err(|e| e.with_operation(operation))
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(error::invalid_argument(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
