//! Language registry
//!
//! Maps language identifiers to their entries. The map lives behind a single
//! mutex and is never handed out; callers get cloned `Arc`s or a snapshot of
//! the key set, so no lock is held while a language builds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::language::Language;
use crate::error::RegistryError;

/// Thread-safe registry of language build targets
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    langs: Mutex<HashMap<String, Arc<Language>>>,
}

impl LanguageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-updated,
    // so a poisoned lock is still safe to use.
    fn langs(&self) -> MutexGuard<'_, HashMap<String, Arc<Language>>> {
        self.langs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a language; identifiers must be unique
    pub fn register(&self, language: Language) -> Result<(), RegistryError> {
        let mut langs = self.langs();
        if langs.contains_key(language.id()) {
            return Err(RegistryError::AlreadyRegistered {
                language: language.id().to_string(),
            });
        }
        tracing::debug!(language = %language.id(), "registered language");
        langs.insert(language.id().to_string(), Arc::new(language));
        Ok(())
    }

    /// Look up a language by identifier
    pub fn lookup(&self, id: &str) -> Option<Arc<Language>> {
        self.langs().get(id).cloned()
    }

    /// Sorted identifiers of all currently registered languages
    pub fn snapshot(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.langs().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered languages
    pub fn len(&self) -> usize {
        self.langs().len()
    }

    /// Whether no language is registered
    pub fn is_empty(&self) -> bool {
        self.langs().is_empty()
    }
}
