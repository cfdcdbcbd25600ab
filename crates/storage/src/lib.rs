#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{CredentialStore, Credentials, InMemoryCredentialStore, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteRepository};
