//! Credential storage for the two provider API keys.
//!
//! Scout needs exactly two secrets: the search-provider key and the
//! LLM-provider key. Both are resolved from the OS credential store first
//! and the environment second; if neither holds a value, report generation
//! is disabled with a [`ConfigError::MissingKey`] before any network call.
//!
//! Two [`CredentialStore`] implementations are provided:
//! - `KeyringCredentialStore`: OS-native store (macOS Keychain, Windows
//!   Credential Manager, Linux Secret Service).
//! - `InMemoryCredentialStore`: in-memory store for testing.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Errors from credential storage operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credential not found for {service}:{account}")]
    NotFound { service: String, account: String },

    #[error("Failed to store credential: {message}")]
    StoreFailed { message: String },

    #[error("Failed to delete credential: {message}")]
    DeleteFailed { message: String },

    #[error("Keyring backend not available: {message}")]
    BackendUnavailable { message: String },
}

/// Trait for credential storage backends.
pub trait CredentialStore: Send + Sync {
    /// Store an API key for the given provider.
    fn store_key(&self, provider: &str, api_key: &str) -> Result<(), CredentialError>;

    /// Retrieve the API key for the given provider.
    fn get_key(&self, provider: &str) -> Result<String, CredentialError>;

    /// Delete the API key for the given provider.
    fn delete_key(&self, provider: &str) -> Result<(), CredentialError>;

    /// Check whether a key exists for the given provider.
    fn has_key(&self, provider: &str) -> bool {
        self.get_key(provider).is_ok()
    }
}

/// Resolve a provider key: credential store first, environment second.
///
/// `store_key` is the provider's name in the credential store (skipped when
/// `None`); `env_var` is the environment variable consulted as the fallback.
pub fn resolve_key(
    store: &dyn CredentialStore,
    store_key: Option<&str>,
    env_var: &str,
    provider: &str,
) -> Result<String, ConfigError> {
    if let Some(name) = store_key
        && let Ok(key) = store.get_key(name)
    {
        return Ok(key);
    }
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingKey {
            provider: provider.to_string(),
        })
}

/// OS-native credential store using the `keyring` crate.
///
/// Stores credentials under service `"scout"` with account names formatted
/// as `"provider:{name}"`.
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    /// Create a new keyring-backed credential store.
    pub fn new() -> Self {
        Self {
            service: "scout".to_string(),
        }
    }

    /// Format the account name for a given provider.
    pub fn account_name(provider: &str) -> String {
        format!("provider:{provider}")
    }

    fn entry(&self, provider: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(&self.service, &Self::account_name(provider)).map_err(|e| {
            CredentialError::BackendUnavailable {
                message: e.to_string(),
            }
        })
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn store_key(&self, provider: &str, api_key: &str) -> Result<(), CredentialError> {
        self.entry(provider)?
            .set_password(api_key)
            .map_err(|e| CredentialError::StoreFailed {
                message: e.to_string(),
            })
    }

    fn get_key(&self, provider: &str) -> Result<String, CredentialError> {
        self.entry(provider)?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => CredentialError::NotFound {
                service: self.service.clone(),
                account: Self::account_name(provider),
            },
            other => CredentialError::StoreFailed {
                message: other.to_string(),
            },
        })
    }

    fn delete_key(&self, provider: &str) -> Result<(), CredentialError> {
        self.entry(provider)?
            .delete_credential()
            .map_err(|e| CredentialError::DeleteFailed {
                message: e.to_string(),
            })
    }
}

/// In-memory credential store for testing.
///
/// Thread-safe via `Mutex<HashMap>`. Does not persist across process restarts.
pub struct InMemoryCredentialStore {
    store: Mutex<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    /// Create an empty in-memory credential store.
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn store_key(&self, provider: &str, api_key: &str) -> Result<(), CredentialError> {
        self.store
            .lock()
            .unwrap()
            .insert(provider.to_string(), api_key.to_string());
        Ok(())
    }

    fn get_key(&self, provider: &str) -> Result<String, CredentialError> {
        self.store
            .lock()
            .unwrap()
            .get(provider)
            .cloned()
            .ok_or_else(|| CredentialError::NotFound {
                service: "scout".to_string(),
                account: KeyringCredentialStore::account_name(provider),
            })
    }

    fn delete_key(&self, provider: &str) -> Result<(), CredentialError> {
        self.store.lock().unwrap().remove(provider);
        Ok(())
    }
}
