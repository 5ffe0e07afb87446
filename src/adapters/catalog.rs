use crate::domain::model::DataFrame;
use crate::domain::ports::Catalog;
use crate::utils::error::{ReaderError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A dataset published under a name.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub dataset: DataFrame,
    pub registered_at: DateTime<Utc>,
}

/// Shared in-memory catalog. Clones point at the same views.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    views: Arc<RwLock<HashMap<String, View>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single insert or remove, so a poisoned map is
    // still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, View>> {
        self.views.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, View>> {
        self.views.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<DataFrame> {
        self.view(name).map(|view| view.dataset)
    }

    pub fn view(&self, name: &str) -> Option<View> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn drop_view(&self, name: &str) -> Option<DataFrame> {
        self.write().remove(name).map(|view| view.dataset)
    }
}

impl Catalog<DataFrame> for MemoryCatalog {
    fn register(&self, name: &str, dataset: DataFrame) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ReaderError::RegistrationError {
                name: name.to_string(),
                message: "view name cannot be empty".to_string(),
            });
        }

        let replaced = self
            .write()
            .insert(
                name.to_string(),
                View {
                    dataset,
                    registered_at: Utc::now(),
                },
            )
            .is_some();

        tracing::debug!(view = name, replaced, "View registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(value: i64) -> DataFrame {
        DataFrame::new(vec!["v".to_string()], vec![vec![json!(value)]]).unwrap()
    }

    #[test]
    fn test_register_replaces_existing_view() {
        let catalog = MemoryCatalog::new();
        catalog.register("numbers", frame(1)).unwrap();
        let first = catalog.view("numbers").unwrap();

        catalog.register("numbers", frame(2)).unwrap();
        let second = catalog.view("numbers").unwrap();

        assert_eq!(second.dataset, frame(2));
        assert!(second.registered_at >= first.registered_at);
        assert_eq!(catalog.names(), ["numbers"]);
    }

    #[test]
    fn test_clones_share_views() {
        let catalog = MemoryCatalog::new();
        let shared = catalog.clone();
        shared.register("b", frame(1)).unwrap();
        shared.register("a", frame(2)).unwrap();

        assert!(catalog.contains("a"));
        assert_eq!(catalog.names(), ["a", "b"]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let catalog = MemoryCatalog::new();
        let err = catalog.register(" ", frame(1)).unwrap_err();
        assert!(matches!(err, ReaderError::RegistrationError { .. }));
        assert!(catalog.names().is_empty());
    }

    #[test]
    fn test_drop_view() {
        let catalog = MemoryCatalog::new();
        catalog.register("tmp", frame(3)).unwrap();
        assert_eq!(catalog.drop_view("tmp"), Some(frame(3)));
        assert_eq!(catalog.drop_view("tmp"), None);
        assert!(catalog.get("tmp").is_none());
    }

    #[test]
    fn test_poisoned_lock_still_serves_reads_and_writes() {
        let catalog = MemoryCatalog::new();
        catalog.register("kept", frame(1)).unwrap();

        let views = Arc::clone(&catalog.views);
        let outcome = std::thread::spawn(move || {
            let _guard = views.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(outcome.is_err());
        assert!(catalog.views.is_poisoned());

        assert!(catalog.contains("kept"));
        assert_eq!(catalog.get("kept"), Some(frame(1)));
        assert_eq!(catalog.names(), ["kept"]);

        catalog.register("after", frame(2)).unwrap();
        assert_eq!(catalog.names(), ["after", "kept"]);
        assert_eq!(catalog.drop_view("after"), Some(frame(2)));
    }
}
