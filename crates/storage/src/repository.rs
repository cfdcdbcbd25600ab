use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::model::UserId;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The authenticated identity persisted at login and read back before
/// submission. Absence of either field is a hard precondition failure
/// for submitting a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: UserId,
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

impl Credentials {
    #[must_use]
    pub fn new(user_id: UserId, token: impl Into<String>, saved_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            token: token.into(),
            saved_at,
        }
    }
}

/// Repository contract for the persisted login session.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored credentials, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn read_credentials(&self) -> Result<Option<Credentials>, StorageError>;

    /// Persist credentials, replacing any previous ones.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credentials cannot be stored.
    async fn write_credentials(&self, credentials: &Credentials) -> Result<(), StorageError>;

    /// Remove stored credentials (logout).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    async fn clear_credentials(&self) -> Result<(), StorageError>;
}

/// Simple in-memory credential store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    slot: Arc<Mutex<Option<Credentials>>>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Store pre-filled with the given credentials.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(credentials))),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn read_credentials(&self) -> Result<Option<Credentials>, StorageError> {
        let guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn write_credentials(&self, credentials: &Credentials) -> Result<(), StorageError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(credentials.clone());
        Ok(())
    }

    async fn clear_credentials(&self) -> Result<(), StorageError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates storage adapters behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub credentials: Arc<dyn CredentialStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            credentials: Arc::new(InMemoryCredentialStore::new()),
        }
    }
}
