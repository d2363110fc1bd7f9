use uuid::Uuid;

use crate::core::time::Clock;
use crate::domain::{CategoryEntry, Mode};
use crate::storage::KeyValueStore;

use super::{ServiceError, ServiceResult};

/// The user-maintained list of category names offered on the entry screen.
pub struct CategoryService;

impl CategoryService {
    /// Stored list, or the defaults when nothing usable is stored. The
    /// defaults are written back so later reads see the same list.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> ServiceResult<Vec<CategoryEntry>> {
        let parsed = match store.get(key)? {
            Some(blob) => match serde_json::from_str::<Vec<CategoryEntry>>(&blob) {
                Ok(list) => Some(list),
                Err(err) => {
                    tracing::warn!(key, %err, "category list unreadable; reseeding defaults");
                    None
                }
            },
            None => None,
        };
        match parsed {
            Some(list) if !list.is_empty() => Ok(list),
            _ => {
                let defaults = CategoryEntry::defaults();
                Self::save(store, key, &defaults)?;
                Ok(defaults)
            }
        }
    }

    pub fn add(
        store: &dyn KeyValueStore,
        key: &str,
        clock: &dyn Clock,
        mode: Mode,
        name: &str,
    ) -> ServiceResult<CategoryEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Category name cannot be empty".into()));
        }
        let mut categories = Self::load(store, key)?;
        if categories.iter().any(|entry| entry.matches_name(mode, name)) {
            return Err(ServiceError::Invalid(format!(
                "Category `{}` already exists",
                name
            )));
        }
        let entry = CategoryEntry::new(Self::new_id(clock, mode), name, mode);
        categories.push(entry.clone());
        Self::save(store, key, &categories)?;
        Ok(entry)
    }

    /// Unknown ids are ignored. The last category of a mode cannot be removed.
    pub fn remove(
        store: &dyn KeyValueStore,
        key: &str,
        id: &str,
    ) -> ServiceResult<Vec<CategoryEntry>> {
        let categories = Self::load(store, key)?;
        let Some(target) = categories.iter().find(|entry| entry.id == id) else {
            return Ok(categories);
        };
        let same_mode = categories
            .iter()
            .filter(|entry| entry.mode == target.mode)
            .count();
        if same_mode <= 1 {
            return Err(ServiceError::Invalid(
                "The last category of a mode cannot be removed".into(),
            ));
        }
        let updated: Vec<CategoryEntry> = categories
            .into_iter()
            .filter(|entry| entry.id != id)
            .collect();
        Self::save(store, key, &updated)?;
        Ok(updated)
    }

    /// `<mode>_<unix-millis>_<8 hex digits>`.
    pub fn new_id(clock: &dyn Clock, mode: Mode) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}_{}_{}", mode.as_str(), clock.now().timestamp_millis(), &suffix[..8])
    }

    pub fn names_for(categories: &[CategoryEntry], mode: Mode) -> Vec<&str> {
        categories
            .iter()
            .filter(|entry| entry.mode == mode)
            .map(|entry| entry.name.as_str())
            .collect()
    }

    fn save(store: &dyn KeyValueStore, key: &str, categories: &[CategoryEntry]) -> ServiceResult<()> {
        let json = serde_json::to_string(categories).map_err(|err| ServiceError::Storage(err.into()))?;
        store.set(key, &json)?;
        tracing::debug!(key, count = categories.len(), "saved categories");
        Ok(())
    }
}
