use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::time::Duration;

use crate::blob;
use crate::config::Config;
use crate::gallery::Gallery;
use crate::storage::KeyValueStore;
use crate::ui;
use crate::ui::add_dialog::AddDialog;
use crate::ui::preview::ImagePreview;
use crate::ui::text_input::TextInput;

pub type Store = Box<dyn KeyValueStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Moving around the grid
    Browse,
    /// Search box has focus
    Searching,
    /// Tag chips have focus
    TagPicking,
    /// Modal viewer is open
    Viewing,
    Adding,
    Help,
}

pub struct App {
    pub config: Config,
    pub gallery: Gallery<Store>,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Grid cursor, an index into the filtered list
    pub selected: usize,
    /// First visible grid row
    pub scroll_offset: usize,
    /// Grid geometry from the last render
    pub columns: usize,
    pub visible_rows: usize,
    pub search: TextInput,
    pub tag_cursor: usize,
    pub add_dialog: Option<AddDialog>,
    pub preview: ImagePreview,
    /// Force a full clear after terminal graphics were on screen
    pub clear_on_next_render: bool,
}

impl App {
    pub fn new(config: Config, gallery: Gallery<Store>) -> Self {
        let preview = ImagePreview::new(&config.preview);
        Self {
            config,
            gallery,
            mode: AppMode::Browse,
            should_quit: false,
            status_message: None,
            selected: 0,
            scroll_offset: 0,
            columns: 1,
            visible_rows: 1,
            search: TextInput::new(),
            tag_cursor: 0,
            add_dialog: None,
            preview,
            clear_on_next_render: false,
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.preview.poll();

            if self.clear_on_next_render {
                terminal.clear()?;
                self.clear_on_next_render = false;
            }

            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.mode {
            AppMode::Browse => self.handle_browse_key(key),
            AppMode::Searching => self.handle_search_key(key),
            AppMode::TagPicking => self.handle_tag_key(key),
            AppMode::Viewing => self.handle_viewer_key(key),
            AppMode::Adding => self.handle_add_key(key),
            AppMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.mode = AppMode::Browse;
                }
            }
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Esc => {
                if self.gallery.filter().is_active() {
                    self.reset_filters();
                } else {
                    self.status_message = None;
                }
            }

            // Navigation
            KeyCode::Char('h') | KeyCode::Left => self.move_left(),
            KeyCode::Char('l') | KeyCode::Right => self.move_right(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.gallery.visible_len().saturating_sub(1);
            }
            KeyCode::PageUp => {
                let page = self.columns * self.visible_rows;
                self.selected = self.selected.saturating_sub(page);
            }
            KeyCode::PageDown => {
                let page = self.columns * self.visible_rows;
                let last = self.gallery.visible_len().saturating_sub(1);
                self.selected = (self.selected + page).min(last);
            }

            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('f') => {
                if let Some(id) = self.selected_id() {
                    self.toggle_favorite(&id);
                }
            }
            KeyCode::Char('F') => {
                let on = self.gallery.toggle_favorites_only();
                self.after_filter_change();
                let label = if on { "Showing favorites only" } else { "Showing all photos" };
                self.status_message = Some(format!("{} ({})", label, self.count_label()));
            }
            KeyCode::Char('/') => self.mode = AppMode::Searching,
            KeyCode::Char('t') => {
                let tag_count = self.gallery.all_tags().len();
                if tag_count == 0 {
                    self.status_message = Some("No tags to filter by".to_string());
                } else {
                    // The tag list shrinks when added photos are removed
                    self.tag_cursor = self.tag_cursor.min(tag_count - 1);
                    self.mode = AppMode::TagPicking;
                }
            }
            KeyCode::Char('a') => {
                self.add_dialog = Some(AddDialog::new());
                self.mode = AppMode::Adding;
            }
            KeyCode::Char('d') => self.remove_selected(),
            KeyCode::Char('r') => self.reset_filters(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => {
                self.mode = AppMode::Browse;
                return;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.search.clear(),
            KeyCode::Char(c) => self.search.handle_char(c),
            KeyCode::Backspace => self.search.backspace(),
            KeyCode::Delete => self.search.delete(),
            KeyCode::Left => {
                self.search.move_left();
                return;
            }
            KeyCode::Right => {
                self.search.move_right();
                return;
            }
            KeyCode::Home => {
                self.search.move_home();
                return;
            }
            KeyCode::End => {
                self.search.move_end();
                return;
            }
            _ => return,
        }

        if self.search.value() != self.gallery.filter().query {
            self.gallery.set_query(self.search.value());
            self.after_filter_change();
        }
    }

    fn handle_tag_key(&mut self, key: KeyEvent) {
        let tags = self.gallery.all_tags();
        if tags.is_empty() {
            self.mode = AppMode::Browse;
            return;
        }
        self.tag_cursor = self.tag_cursor.min(tags.len() - 1);

        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('t') | KeyCode::Tab => {
                self.mode = AppMode::Browse;
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.tag_cursor = self.tag_cursor.saturating_sub(1);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.tag_cursor + 1 < tags.len() {
                    self.tag_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                let tag = &tags[self.tag_cursor];
                let selected = self.gallery.toggle_tag(tag);
                self.after_filter_change();
                let verb = if selected { "Filtering by" } else { "Removed" };
                self.status_message = Some(format!("{} tag {} ({})", verb, tag, self.count_label()));
            }
            KeyCode::Char('c') => {
                self.gallery.clear_tags();
                self.after_filter_change();
                self.status_message = Some(format!("Tags cleared ({})", self.count_label()));
            }
            _ => {}
        }
    }

    fn handle_viewer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.gallery.close(),
            KeyCode::Char('h') | KeyCode::Left => self.gallery.prev(),
            KeyCode::Char('l') | KeyCode::Right => self.gallery.next(),
            KeyCode::Char('f') => {
                if let Some(id) = self.gallery.current_photo().map(|p| p.id.clone()) {
                    self.toggle_favorite(&id);
                }
            }
            _ => {}
        }

        if let Some(index) = self.gallery.viewer().index() {
            self.selected = index;
        }
        self.sync_viewer_mode();
    }

    fn handle_add_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.add_dialog.as_mut() else {
            self.mode = AppMode::Browse;
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.add_dialog = None;
                self.mode = AppMode::Browse;
            }
            KeyCode::Tab | KeyCode::BackTab => dialog.toggle_mode(),
            KeyCode::Enter => self.submit_add(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                dialog.input_mut().clear();
            }
            KeyCode::Char(c) => {
                dialog.input_mut().handle_char(c);
                dialog.error = None;
            }
            KeyCode::Backspace => dialog.input_mut().backspace(),
            KeyCode::Delete => dialog.input_mut().delete(),
            KeyCode::Left => dialog.input_mut().move_left(),
            KeyCode::Right => dialog.input_mut().move_right(),
            KeyCode::Home => dialog.input_mut().move_home(),
            KeyCode::End => dialog.input_mut().move_end(),
            _ => {}
        }
    }

    fn submit_add(&mut self) {
        let Some(source) = self.add_dialog.as_ref().map(AddDialog::source) else {
            return;
        };

        match self.gallery.add(source) {
            Ok(photo) => {
                let id = photo.id.clone();
                self.status_message = Some(format!("Added \"{}\"", photo.title));
                self.add_dialog = None;
                self.mode = AppMode::Browse;
                self.after_filter_change();
                if let Some(pos) = self.gallery.visible().iter().position(|p| p.id == id) {
                    self.selected = pos;
                } else {
                    self.status_message = Some(format!(
                        "Added image (hidden by current filters, {})",
                        self.count_label()
                    ));
                }
            }
            Err(e) => {
                tracing::debug!("Add image rejected: {}", e);
                if let Some(dialog) = self.add_dialog.as_mut() {
                    dialog.error = Some(e.to_string());
                }
            }
        }
    }

    fn open_selected(&mut self) {
        self.gallery.open(self.selected);
        if self.gallery.viewer().is_open() {
            self.mode = AppMode::Viewing;
        } else {
            self.status_message = Some("Nothing to open".to_string());
        }
    }

    fn toggle_favorite(&mut self, id: &str) {
        let now = self.gallery.toggle_favorite(id);
        self.after_filter_change();
        self.status_message = Some(if now {
            "Added to favorites".to_string()
        } else {
            "Removed from favorites".to_string()
        });
    }

    fn remove_selected(&mut self) {
        let Some(photo) = self.gallery.visible_photo(self.selected) else {
            return;
        };
        if !photo.client_added {
            self.status_message = Some("Only added images can be removed".to_string());
            return;
        }
        let id = photo.id.clone();
        let url = photo.full_url.clone();

        if self.gallery.remove_added(&id) {
            if blob::is_blob_url(&url) {
                self.preview.forget(&url);
            }
            self.after_filter_change();
            self.status_message = Some(format!("Removed image ({})", self.count_label()));
        }
    }

    fn reset_filters(&mut self) {
        self.gallery.reset_filters();
        self.search.clear();
        self.after_filter_change();
        self.status_message = Some(format!("Filters cleared ({})", self.count_label()));
    }

    /// Keep the grid cursor and mode consistent with the new filtered list.
    fn after_filter_change(&mut self) {
        let len = self.gallery.visible_len();
        self.selected = self.selected.min(len.saturating_sub(1));
        self.sync_viewer_mode();
    }

    fn sync_viewer_mode(&mut self) {
        if self.mode == AppMode::Viewing && !self.gallery.viewer().is_open() {
            self.mode = AppMode::Browse;
            self.clear_on_next_render = true;
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.gallery.visible_photo(self.selected).map(|p| p.id.clone())
    }

    pub fn count_label(&self) -> String {
        format!(
            "{} of {} photos",
            self.gallery.visible_len(),
            self.gallery.photos().len()
        )
    }

    fn move_left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn move_right(&mut self) {
        if self.selected + 1 < self.gallery.visible_len() {
            self.selected += 1;
        }
    }

    fn move_up(&mut self) {
        if self.selected >= self.columns {
            self.selected -= self.columns;
        }
    }

    fn move_down(&mut self) {
        let new_idx = self.selected + self.columns;
        if new_idx < self.gallery.visible_len() {
            self.selected = new_idx;
        }
    }

    /// Scroll so the selected tile's row is on screen.
    pub fn ensure_visible(&mut self) {
        let columns = self.columns.max(1);
        let rows = self.visible_rows.max(1);
        let selected_row = self.selected / columns;

        if selected_row < self.scroll_offset {
            self.scroll_offset = selected_row;
        }
        if selected_row >= self.scroll_offset + rows {
            self.scroll_offset = selected_row + 1 - rows;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageProtocol;
    use crate::photo::seed_photos;
    use crate::storage::MemoryStore;
    use crate::viewer::Viewer;

    fn app_with(photos: Vec<crate::photo::Photo>) -> App {
        let mut config = Config::default();
        config.preview.image_preview = false;
        config.preview.protocol = ImageProtocol::None;
        let store: Store = Box::new(MemoryStore::new());
        let gallery = Gallery::new(photos, store, config.add_image.clone());
        App::new(config, gallery)
    }

    fn app() -> App {
        app_with(seed_photos())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_search_box_captures_navigation_letters() {
        let mut app = app();
        app.columns = 3;
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, AppMode::Searching);

        type_text(&mut app, "jl");
        press(&mut app, KeyCode::Left);
        assert_eq!(app.selected, 0);
        assert_eq!(app.gallery.filter().query, "jl");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Browse);
        assert_eq!(app.gallery.filter().query, "jl");
    }

    #[test]
    fn test_search_filters_live() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "pets");
        assert_eq!(app.gallery.visible_len(), 2);

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.gallery.visible_len(), seed_photos().len());
    }

    #[test]
    fn test_viewer_keys_clamp_and_close() {
        let mut app = app_with(seed_photos().into_iter().take(5).collect());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Viewing);

        for _ in 0..9 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.gallery.viewer(), Viewer::Open(4));

        press(&mut app, KeyCode::Left);
        assert_eq!(app.gallery.viewer(), Viewer::Open(3));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Browse);
        assert_eq!(app.gallery.viewer(), Viewer::Closed);
        assert_eq!(app.selected, 3);

        // Arrows move the grid again, not the closed viewer
        press(&mut app, KeyCode::Left);
        assert_eq!(app.selected, 2);
        assert_eq!(app.gallery.viewer(), Viewer::Closed);
    }

    #[test]
    fn test_unfavorite_in_viewer_with_favorites_only_returns_to_grid() {
        let mut app = app();
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('F'));
        assert_eq!(app.gallery.visible_len(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Viewing);
        press(&mut app, KeyCode::Char('f'));

        assert_eq!(app.gallery.visible_len(), 0);
        assert_eq!(app.mode, AppMode::Browse);
        assert!(app.clear_on_next_render);
    }

    #[test]
    fn test_tag_chip_toggle_twice() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.mode, AppMode::TagPicking);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.gallery.filter().selected_tags.len(), 1);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.gallery.filter().selected_tags.is_empty());

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('c'));
        assert!(app.gallery.filter().selected_tags.is_empty());
    }

    #[test]
    fn test_add_rejects_script_url() {
        let mut app = app();
        let before = app.gallery.photos().len();

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "javascript:alert(1)");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, AppMode::Adding);
        assert!(app.add_dialog.as_ref().unwrap().error.is_some());
        assert_eq!(app.gallery.photos().len(), before);
    }

    #[test]
    fn test_add_url_selects_new_photo() {
        let mut app = app();
        press(&mut app, KeyCode::Char('j'));

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "https://example.com/fresh.jpg");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, AppMode::Browse);
        assert!(app.add_dialog.is_none());
        assert_eq!(app.selected, 0);
        assert_eq!(app.gallery.visible()[0].title, "fresh");

        // Added photos can be removed again, seed photos cannot
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.gallery.photos().len(), seed_photos().len());
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.gallery.photos().len(), seed_photos().len());
    }

    #[test]
    fn test_tag_cursor_clamped_after_tags_disappear() {
        let mut app = app();
        let seed_tags = app.gallery.all_tags().len();

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "https://example.com/fresh.jpg");
        press(&mut app, KeyCode::Enter);
        assert!(app.gallery.all_tags().len() > seed_tags);

        // Park the cursor on the last chip, then remove the photo carrying it
        press(&mut app, KeyCode::Char('t'));
        for _ in 0..app.gallery.all_tags().len() {
            press(&mut app, KeyCode::Right);
        }
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.selected, 0);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.gallery.all_tags().len(), seed_tags);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.mode, AppMode::TagPicking);
        assert_eq!(app.tag_cursor, seed_tags - 1);

        // Toggling the chip under the cursor must not go out of bounds
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.gallery.filter().selected_tags.len(), 1);
    }

    #[test]
    fn test_escape_resets_active_filters() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "zzz");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.gallery.visible_len(), 0);

        press(&mut app, KeyCode::Esc);
        assert!(!app.gallery.filter().is_active());
        assert!(app.search.is_empty());
        assert_eq!(app.gallery.visible_len(), seed_photos().len());
    }

    #[test]
    fn test_grid_cursor_clamped_after_filter() {
        let mut app = app();
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.selected, seed_photos().len() - 1);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "nature");
        assert!(app.selected < app.gallery.visible_len());
    }

    #[test]
    fn test_ensure_visible_scrolls() {
        let mut app = app();
        app.columns = 2;
        app.visible_rows = 2;
        app.selected = 9;
        app.ensure_visible();
        assert_eq!(app.scroll_offset, 3);

        app.selected = 0;
        app.ensure_visible();
        assert_eq!(app.scroll_offset, 0);
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
