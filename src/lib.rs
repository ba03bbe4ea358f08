//! Terminal photo gallery: a tile grid with search, tag and favorite
//! filters, a modal viewer, and images added for the current session.
//!
//! The gallery logic (`filter`, `viewer`, `favorites`, `add_image`,
//! `gallery`) has no terminal dependencies; `app` and `ui` drive it from
//! crossterm key events and draw it with ratatui.

pub mod add_image;
pub mod app;
pub mod blob;
pub mod config;
pub mod favorites;
pub mod filter;
pub mod gallery;
pub mod logging;
pub mod photo;
pub mod storage;
pub mod ui;
pub mod viewer;
