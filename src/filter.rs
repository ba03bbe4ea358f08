//! Derives the visible photo list from the search query, selected tags
//! and the favorites-only switch.

use std::collections::BTreeSet;

use crate::photo::Photo;

/// Filter controls shown above the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    /// Tags are OR-combined against a photo's tags.
    pub selected_tags: BTreeSet<String>,
    pub favorites_only: bool,
}

impl FilterState {
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Flip the selection of a tag. Returns whether it is now selected.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        if self.selected_tags.remove(tag) {
            false
        } else {
            self.selected_tags.insert(tag.to_string());
            true
        }
    }

    pub fn clear_tags(&mut self) {
        self.selected_tags.clear();
    }

    pub fn toggle_favorites_only(&mut self) -> bool {
        self.favorites_only = !self.favorites_only;
        self.favorites_only
    }

    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || !self.selected_tags.is_empty() || self.favorites_only
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a single photo passes all three constraints.
    pub fn matches(&self, photo: &Photo, favorites: &BTreeSet<String>) -> bool {
        if self.favorites_only && !favorites.contains(&photo.id) {
            return false;
        }

        let query = self.query.trim();
        if !query.is_empty() && !matches_query(photo, &query.to_lowercase()) {
            return false;
        }

        // Exact, case-sensitive tag comparison.
        if !self.selected_tags.is_empty()
            && !photo.tags.iter().any(|t| self.selected_tags.contains(t))
        {
            return false;
        }

        true
    }
}

/// `needle` must already be lowercased.
fn matches_query(photo: &Photo, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(&photo.title)
        || contains(&photo.caption)
        || contains(&photo.photographer)
        || contains(&photo.id)
        || contains(&photo.tags.join(" "))
        || photo
            .metadata
            .as_ref()
            .map(|meta| {
                let joined = meta
                    .iter()
                    .map(|(k, v)| format!("{} {}", k, v))
                    .collect::<Vec<_>>()
                    .join(" ");
                contains(&joined)
            })
            .unwrap_or(false)
}

/// Return the photos visible under `state`, keeping their order.
pub fn filter_photos<'a>(
    photos: &'a [Photo],
    state: &FilterState,
    favorites: &BTreeSet<String>,
) -> Vec<&'a Photo> {
    photos
        .iter()
        .filter(|photo| state.matches(photo, favorites))
        .collect()
}

/// Every distinct tag across `photos`, sorted.
pub fn all_tags(photos: &[Photo]) -> Vec<String> {
    photos
        .iter()
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::seed_photos;

    fn ids<'a>(photos: &[&'a Photo]) -> Vec<&'a str> {
        photos.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_inactive_filter_returns_everything() {
        let photos = seed_photos();
        let state = FilterState::default();

        let visible = filter_photos(&photos, &state, &BTreeSet::new());
        assert_eq!(visible.len(), photos.len());
        assert!(!state.is_active());

        // Whitespace-only queries do not filter either
        let state = FilterState {
            query: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_photos(&photos, &state, &BTreeSet::new()).len(), photos.len());
    }

    #[test]
    fn test_query_without_matches_is_empty() {
        let photos = seed_photos();
        let mut state = FilterState::default();
        state.set_query("zzzz-no-such-thing");

        assert!(filter_photos(&photos, &state, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive_across_fields() {
        let photos = seed_photos();
        let mut state = FilterState::default();

        state.set_query("MISTY");
        assert_eq!(ids(&filter_photos(&photos, &state, &BTreeSet::new())), vec!["p-10"]);

        // photographer
        state.set_query("luke chesser");
        assert_eq!(
            ids(&filter_photos(&photos, &state, &BTreeSet::new())),
            vec!["p-42", "p-48"]
        );

        // metadata value
        state.set_query("tokyo");
        assert_eq!(ids(&filter_photos(&photos, &state, &BTreeSet::new())), vec!["p-57"]);

        // metadata key
        state.set_query("altitude");
        assert_eq!(ids(&filter_photos(&photos, &state, &BTreeSet::new())), vec!["p-29"]);

        // identifier
        state.set_query("p-1018");
        assert_eq!(ids(&filter_photos(&photos, &state, &BTreeSet::new())), vec!["p-1018"]);

        // tags
        state.set_query("landscape");
        assert_eq!(ids(&filter_photos(&photos, &state, &BTreeSet::new())), vec!["p-1018"]);
    }

    #[test]
    fn test_tag_selection_is_exact() {
        let photos = seed_photos();
        let mut state = FilterState::default();
        state.toggle_tag("Nature");

        let visible = filter_photos(&photos, &state, &BTreeSet::new());
        assert!(!visible.is_empty());
        assert!(visible.iter().all(|p| p.has_tag("Nature")));
        assert_eq!(
            visible.len(),
            photos.iter().filter(|p| p.has_tag("Nature")).count()
        );

        let mut lower = FilterState::default();
        lower.toggle_tag("nature");
        assert!(filter_photos(&photos, &lower, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_selected_tags_are_ored() {
        let photos = seed_photos();
        let mut state = FilterState::default();
        state.toggle_tag("Food");
        state.toggle_tag("Pets");

        let visible = filter_photos(&photos, &state, &BTreeSet::new());
        assert_eq!(ids(&visible), vec!["p-42", "p-102", "p-169", "p-237"]);
    }

    #[test]
    fn test_toggle_tag_twice_restores_selection() {
        let mut state = FilterState::default();
        state.toggle_tag("City");
        let before = state.selected_tags.clone();

        assert!(state.toggle_tag("Water"));
        assert!(!state.toggle_tag("Water"));
        assert_eq!(state.selected_tags, before);
    }

    #[test]
    fn test_constraints_are_anded() {
        let photos = seed_photos();
        let favorites: BTreeSet<String> =
            ["p-15", "p-57", "p-76"].iter().map(|s| s.to_string()).collect();

        let mut state = FilterState::default();
        state.toggle_favorites_only();
        assert_eq!(ids(&filter_photos(&photos, &state, &favorites)), vec!["p-15", "p-57", "p-76"]);

        state.toggle_tag("Water");
        assert_eq!(ids(&filter_photos(&photos, &state, &favorites)), vec!["p-15", "p-76"]);

        state.set_query("bridge");
        assert_eq!(ids(&filter_photos(&photos, &state, &favorites)), vec!["p-76"]);

        state.reset();
        assert!(!state.is_active());
    }

    #[test]
    fn test_favorites_only_with_no_favorites() {
        let photos = seed_photos();
        let mut state = FilterState::default();
        state.toggle_favorites_only();

        assert!(filter_photos(&photos, &state, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_all_tags_sorted_and_distinct() {
        let tags = all_tags(&seed_photos());
        let mut sorted = tags.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(tags, sorted);
        assert!(tags.contains(&"Nature".to_string()));
    }
}
