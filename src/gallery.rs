//! Gallery state: the photo list and everything that narrows or shows it.
//!
//! Every user action is one method here. None of them touch the terminal,
//! so the whole flow can be exercised from tests.

use chrono::Utc;

use crate::add_image::{self, AddImageError, AddImageSource};
use crate::blob::{self, Blob, BlobRegistry};
use crate::config::AddImageConfig;
use crate::favorites::Favorites;
use crate::filter::{self, FilterState};
use crate::photo::Photo;
use crate::storage::KeyValueStore;
use crate::viewer::Viewer;

pub struct Gallery<S: KeyValueStore> {
    /// Client-added photos first (newest first), then the seed catalog.
    photos: Vec<Photo>,
    filter: FilterState,
    favorites: Favorites<S>,
    viewer: Viewer,
    blobs: BlobRegistry,
    add_config: AddImageConfig,
    /// Distinguishes this session's added ids from earlier sessions'.
    session: String,
    added_count: u64,
}

/// Prefix of every client-added photo id.
pub const ADDED_ID_PREFIX: &str = "added-";

impl<S: KeyValueStore> Gallery<S> {
    pub fn new(seed: Vec<Photo>, store: S, add_config: AddImageConfig) -> Self {
        let mut favorites = Favorites::load(store);

        // Added photos never outlive their session, so neither do their favorites.
        let stale: Vec<String> = favorites
            .ids()
            .iter()
            .filter(|id| id.starts_with(ADDED_ID_PREFIX) && !seed.iter().any(|p| &p.id == *id))
            .cloned()
            .collect();
        for id in &stale {
            favorites.remove(id);
        }
        if !stale.is_empty() {
            tracing::debug!("Dropped {} favorites of earlier added photos", stale.len());
        }

        tracing::info!(
            "Gallery ready with {} photos, {} favorites",
            seed.len(),
            favorites.len()
        );
        Self {
            photos: seed,
            filter: FilterState::default(),
            favorites,
            viewer: Viewer::default(),
            blobs: BlobRegistry::new(),
            add_config,
            session: Utc::now().format("%y%m%d%H%M%S%3f").to_string(),
            added_count: 0,
        }
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// The filtered list, in display order.
    pub fn visible(&self) -> Vec<&Photo> {
        filter::filter_photos(&self.photos, &self.filter, self.favorites.ids())
    }

    pub fn visible_len(&self) -> usize {
        self.visible().len()
    }

    pub fn visible_photo(&self, index: usize) -> Option<&Photo> {
        self.visible().get(index).copied()
    }

    pub fn all_tags(&self) -> Vec<String> {
        filter::all_tags(&self.photos)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn favorites(&self) -> &Favorites<S> {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    pub fn blob(&self, handle: &str) -> Option<&Blob> {
        self.blobs.get(handle)
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    // Filters

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.set_query(query);
        self.after_filter_change();
    }

    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let selected = self.filter.toggle_tag(tag);
        self.after_filter_change();
        selected
    }

    pub fn clear_tags(&mut self) {
        self.filter.clear_tags();
        self.after_filter_change();
    }

    pub fn toggle_favorites_only(&mut self) -> bool {
        let on = self.filter.toggle_favorites_only();
        self.after_filter_change();
        on
    }

    pub fn reset_filters(&mut self) {
        self.filter.reset();
        self.after_filter_change();
    }

    /// Flip the favorite flag of `id`. With favorites-only on, this can
    /// remove the photo from the visible list.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        let now = self.favorites.toggle(id);
        tracing::debug!("Favorite {} -> {}", id, now);
        self.after_filter_change();
        now
    }

    fn after_filter_change(&mut self) {
        let len = self.visible_len();
        if self.viewer.reconcile(len) {
            tracing::debug!("Viewer closed, filtered list shrank to {}", len);
        }
    }

    // Viewer

    pub fn open(&mut self, index: usize) {
        let len = self.visible_len();
        self.viewer.open(index, len);
    }

    pub fn close(&mut self) {
        self.viewer.close();
    }

    pub fn next(&mut self) {
        let len = self.visible_len();
        self.viewer.next(len);
    }

    pub fn prev(&mut self) {
        self.viewer.prev();
    }

    pub fn current_photo(&self) -> Option<&Photo> {
        self.viewer.index().and_then(|i| self.visible_photo(i))
    }

    /// Keep the viewer on the same photo after the list was edited.
    fn reanchor_viewer(&mut self, shown: Option<String>) {
        let Some(id) = shown else {
            return;
        };
        let position = self.visible().iter().position(|p| p.id == id);
        match position {
            Some(i) => self.viewer = Viewer::Open(i),
            None => self.viewer.close(),
        }
    }

    // Adding and removing

    pub fn add(&mut self, source: AddImageSource) -> Result<&Photo, AddImageError> {
        let shown = self.current_photo().map(|p| p.id.clone());
        let id = format!(
            "{}{}-{}",
            ADDED_ID_PREFIX,
            self.session,
            self.added_count + 1
        );

        let photo = match source {
            AddImageSource::Url(input) => {
                let url = add_image::validate_url(&input)?;
                add_image::photo_from_url(id, &url, &self.add_config)
            }
            AddImageSource::File(path) => {
                let file = add_image::read_image_file(&path, self.add_config.max_file_bytes)?;
                let handle = self.blobs.register(file.mime, file.bytes.clone());
                add_image::photo_from_file(id, &file, &handle, &self.add_config)
            }
        };

        self.added_count += 1;
        tracing::info!("Added {} ({})", photo.id, photo.full_url);
        self.photos.insert(0, photo);
        self.reanchor_viewer(shown);

        Ok(&self.photos[0])
    }

    pub fn add_url(&mut self, input: &str) -> Result<&Photo, AddImageError> {
        self.add(AddImageSource::Url(input.to_string()))
    }

    pub fn add_file(&mut self, path: impl Into<std::path::PathBuf>) -> Result<&Photo, AddImageError> {
        self.add(AddImageSource::File(path.into()))
    }

    /// Remove a client-added photo and release what it holds. Seed photos
    /// cannot be removed.
    pub fn remove_added(&mut self, id: &str) -> bool {
        let Some(index) = self.photos.iter().position(|p| p.id == id && p.client_added) else {
            return false;
        };

        let shown = self
            .current_photo()
            .map(|p| p.id.clone())
            .filter(|shown| shown != id);
        let photo = self.photos.remove(index);

        if blob::is_blob_url(&photo.full_url) {
            self.blobs.revoke(&photo.full_url);
        }
        self.favorites.remove(id);
        tracing::info!("Removed {}", id);

        if self.viewer.is_open() {
            if shown.is_some() {
                self.reanchor_viewer(shown);
            } else {
                self.viewer.close();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FAVORITES_KEY;
    use crate::photo::seed_photos;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::tempdir;

    fn gallery() -> Gallery<MemoryStore> {
        Gallery::new(seed_photos(), MemoryStore::new(), AddImageConfig::default())
    }

    fn visible_ids(gallery: &Gallery<MemoryStore>) -> Vec<String> {
        gallery.visible().iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_everything_visible_by_default() {
        let gallery = gallery();
        assert_eq!(gallery.visible_len(), gallery.photos().len());
        assert!(!gallery.viewer().is_open());
    }

    #[test]
    fn test_favorites_load_from_store() {
        let store = MemoryStore::new().with_entry(FAVORITES_KEY, r#"["p-10", "p-57"]"#);
        let mut gallery = Gallery::new(seed_photos(), store, AddImageConfig::default());

        assert!(gallery.is_favorite("p-10"));
        gallery.toggle_favorites_only();
        assert_eq!(visible_ids(&gallery), vec!["p-10", "p-57"]);
    }

    #[test]
    fn test_next_clamps_on_filtered_list() {
        let mut gallery = gallery();
        gallery.set_query("a");
        gallery.toggle_tag("Nature");
        let len = gallery.visible_len();
        assert!(len > 1);

        gallery.open(0);
        for _ in 0..(len + 5) {
            gallery.next();
        }
        assert_eq!(gallery.viewer(), Viewer::Open(len - 1));
    }

    #[test]
    fn test_five_photos_next_nine_times() {
        let photos: Vec<Photo> = seed_photos().into_iter().take(5).collect();
        let mut gallery = Gallery::new(photos, MemoryStore::new(), AddImageConfig::default());

        gallery.open(0);
        for _ in 0..9 {
            gallery.next();
        }
        assert_eq!(gallery.viewer(), Viewer::Open(4));
        assert_eq!(gallery.current_photo().unwrap().id, gallery.visible()[4].id);
    }

    #[test]
    fn test_filter_change_closes_viewer_when_out_of_range() {
        let mut gallery = gallery();
        gallery.open(5);
        assert!(gallery.viewer().is_open());

        // Nature matches four seed photos, so index 5 is gone
        gallery.toggle_tag("Nature");
        assert!(gallery.visible_len() <= 5);
        assert_eq!(gallery.viewer(), Viewer::Closed);
    }

    #[test]
    fn test_filter_change_keeps_viewer_in_range() {
        let mut gallery = gallery();
        gallery.open(1);
        gallery.toggle_tag("Nature");
        assert_eq!(gallery.viewer(), Viewer::Open(1));
    }

    #[test]
    fn test_unfavorite_in_favorites_only_closes_viewer() {
        let mut gallery = gallery();
        gallery.toggle_favorite("p-15");
        gallery.toggle_favorites_only();
        gallery.open(0);

        gallery.toggle_favorite("p-15");
        assert_eq!(gallery.visible_len(), 0);
        assert_eq!(gallery.viewer(), Viewer::Closed);
    }

    #[test]
    fn test_toggle_favorite_twice_persists_final_state() {
        let mut gallery = gallery();
        gallery.toggle_favorite("p-29");
        gallery.toggle_favorite("p-29");

        assert!(!gallery.is_favorite("p-29"));
        let stored = gallery.favorites().store().get(FAVORITES_KEY).unwrap().unwrap();
        assert_eq!(stored, "[]");
    }

    #[test]
    fn test_add_url_prepends_and_is_tagged() {
        let mut gallery = gallery();
        let before = gallery.photos().len();

        let id = gallery.add_url("https://example.com/new.jpg").unwrap().id.clone();
        assert!(id.starts_with(ADDED_ID_PREFIX));
        assert!(id.ends_with("-1"));
        assert_eq!(gallery.photos().len(), before + 1);
        assert_eq!(gallery.photos()[0].id, id);

        assert!(gallery.all_tags().contains(&"Added".to_string()));
        gallery.toggle_tag("Added");
        assert_eq!(visible_ids(&gallery), vec![id]);
    }

    #[test]
    fn test_rejected_url_adds_nothing() {
        let mut gallery = gallery();
        let before = gallery.photos().len();

        assert!(matches!(
            gallery.add_url("javascript:alert('hi')"),
            Err(AddImageError::UnsupportedScheme(_))
        ));
        assert!(gallery.add_url("").is_err());
        assert!(gallery.add_url("ftp://example.com/a.jpg").is_err());
        assert_eq!(gallery.photos().len(), before);
    }

    #[test]
    fn test_add_and_remove_file_releases_blob() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cat.png");
        image::RgbImage::new(4, 4).save(&path).unwrap();

        let mut gallery = gallery();
        let photo = gallery.add_file(&path).unwrap();
        let id = photo.id.clone();
        let handle = photo.full_url.clone();

        assert!(blob::is_blob_url(&handle));
        assert_eq!(gallery.blob(&handle).unwrap().mime, "image/png");
        assert_eq!(gallery.blobs().len(), 1);

        gallery.toggle_favorite(&id);
        assert!(gallery.remove_added(&id));
        assert!(gallery.blob(&handle).is_none());
        assert!(gallery.blobs().is_empty());
        assert!(!gallery.is_favorite(&id));
        assert!(!gallery.remove_added(&id));
    }

    #[test]
    fn test_non_image_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readme.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut gallery = gallery();
        let before = gallery.photos().len();
        assert!(matches!(gallery.add_file(&path), Err(AddImageError::NotAnImage(_))));
        assert_eq!(gallery.photos().len(), before);
        assert!(gallery.blobs().is_empty());
    }

    #[test]
    fn test_seed_photos_cannot_be_removed() {
        let mut gallery = gallery();
        assert!(!gallery.remove_added("p-10"));
        assert_eq!(gallery.photos().len(), seed_photos().len());
    }

    #[test]
    fn test_viewer_follows_photo_when_one_is_added() {
        let mut gallery = gallery();
        gallery.open(2);
        let shown = gallery.current_photo().unwrap().id.clone();

        gallery.add_url("https://example.com/x.png").unwrap();
        assert_eq!(gallery.viewer(), Viewer::Open(3));
        assert_eq!(gallery.current_photo().unwrap().id, shown);
    }

    #[test]
    fn test_removing_shown_photo_closes_viewer() {
        let mut gallery = gallery();
        let id = gallery.add_url("https://example.com/x.png").unwrap().id.clone();
        gallery.open(0);

        assert!(gallery.remove_added(&id));
        assert_eq!(gallery.viewer(), Viewer::Closed);
    }

    #[test]
    fn test_added_favorite_does_not_carry_into_next_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut first = Gallery::new(seed_photos(), FileStore::new(&path), AddImageConfig::default());
        let old_id = first
            .add_url("https://example.com/first-session.jpg")
            .unwrap()
            .id
            .clone();
        first.toggle_favorite(&old_id);
        first.toggle_favorite("p-10");
        drop(first);

        let mut second = Gallery::new(seed_photos(), FileStore::new(&path), AddImageConfig::default());
        assert!(!second.is_favorite(&old_id));
        assert!(second.is_favorite("p-10"));

        let new_id = second
            .add_url("https://other.example/unrelated.png")
            .unwrap()
            .id
            .clone();
        assert!(!second.is_favorite(&new_id));

        // The stale id is gone from disk too
        let stored = FileStore::new(&path).get(FAVORITES_KEY).unwrap().unwrap();
        assert_eq!(stored, r#"["p-10"]"#);
    }

    #[test]
    fn test_catalog_ids_with_added_prefix_keep_favorites() {
        let mut seed = seed_photos();
        seed[0].id = "added-by-hand".to_string();
        let store = MemoryStore::new().with_entry(FAVORITES_KEY, r#"["added-by-hand"]"#);

        let gallery = Gallery::new(seed, store, AddImageConfig::default());
        assert!(gallery.is_favorite("added-by-hand"));
    }

    #[test]
    fn test_added_ids_are_unique() {
        let mut gallery = gallery();
        let a = gallery.add_url("https://example.com/a.png").unwrap().id.clone();
        gallery.remove_added(&a);
        let b = gallery.add_url("https://example.com/a.png").unwrap().id.clone();
        assert_ne!(a, b);
    }
}
