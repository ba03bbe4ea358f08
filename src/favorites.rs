//! Favorite photo ids, written through to a [`KeyValueStore`].

use std::collections::BTreeSet;

use crate::storage::KeyValueStore;

/// Key the favorites array is stored under.
pub const FAVORITES_KEY: &str = "vitrine:favorites";

/// The in-memory set is authoritative; the store is a best-effort mirror.
pub struct Favorites<S: KeyValueStore> {
    ids: BTreeSet<String>,
    store: S,
}

impl<S: KeyValueStore> Favorites<S> {
    /// Load favorites from `store`. Anything other than a JSON array of
    /// strings (missing, empty, malformed, wrong type) reads as no favorites.
    pub fn load(store: S) -> Self {
        let ids = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => parse_ids(&raw),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!("Could not read favorites: {}", e);
                BTreeSet::new()
            }
        };
        tracing::debug!("Loaded {} favorites", ids.len());
        Self { ids, store }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Flip membership of `id`. Returns whether it is now a favorite.
    pub fn toggle(&mut self, id: &str) -> bool {
        let now_favorite = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        };
        self.persist();
        now_favorite
    }

    /// Drop `id` if present, e.g. when its photo goes away.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.ids.remove(id);
        if removed {
            self.persist();
        }
        removed
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.ids) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!("Could not encode favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(FAVORITES_KEY, encoded) {
            tracing::warn!("Could not save favorites: {}", e);
        }
    }
}

fn parse_ids(raw: &str) -> BTreeSet<String> {
    if raw.trim().is_empty() {
        return BTreeSet::new();
    }
    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Ignoring malformed favorites value: {}", e);
            BTreeSet::new()
        }
    }
}
