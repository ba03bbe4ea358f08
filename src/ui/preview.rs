//! Terminal rendering of uploaded images.
//!
//! Only blob-backed photos have bytes on hand; URL photos are never
//! fetched. Decoding happens on a background thread and results come
//! back over a channel that is drained once per frame.

use image::{imageops::FilterType, DynamicImage};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::collections::{HashMap, HashSet};
use std::sync::{mpsc, Arc};

use crate::config::{ImageProtocol, PreviewConfig};

type Decoded = (String, Option<DynamicImage>);

pub enum PreviewStatus<'a> {
    Ready(&'a mut StatefulProtocol),
    Loading,
    Failed,
    Unavailable,
}

pub struct ImagePreview {
    picker: Option<Picker>,
    /// Keyed by blob handle
    cache: HashMap<String, StatefulProtocol>,
    loading: HashSet<String>,
    failed: HashSet<String>,
    receiver: mpsc::Receiver<Decoded>,
    sender: mpsc::Sender<Decoded>,
    max_size: u32,
}

impl ImagePreview {
    pub fn new(config: &PreviewConfig) -> Self {
        let picker = if config.image_preview {
            Self::create_picker(config.protocol)
        } else {
            None
        };
        let (sender, receiver) = mpsc::channel();
        Self {
            picker,
            cache: HashMap::new(),
            loading: HashSet::new(),
            failed: HashSet::new(),
            receiver,
            sender,
            max_size: config.max_size,
        }
    }

    fn create_picker(protocol: ImageProtocol) -> Option<Picker> {
        match protocol {
            ImageProtocol::None => None,
            ImageProtocol::Halfblocks => Some(Picker::from_fontsize((8, 16))),
            ImageProtocol::Auto => match Picker::from_query_stdio() {
                Ok(picker) => Some(picker),
                Err(e) => {
                    tracing::warn!("Terminal image protocol detection failed: {:?}", e);
                    None
                }
            },
        }
    }

    pub fn is_available(&self) -> bool {
        self.picker.is_some()
    }

    /// Move finished decodes into the cache.
    pub fn poll(&mut self) {
        while let Ok((handle, decoded)) = self.receiver.try_recv() {
            // Forgotten while decoding; the blob is gone.
            if !self.loading.remove(&handle) {
                tracing::debug!("Discarding decode of released {}", handle);
                continue;
            }
            match (decoded, self.picker.as_mut()) {
                (Some(img), Some(picker)) => {
                    let protocol = picker.new_resize_protocol(img);
                    self.cache.insert(handle, protocol);
                }
                _ => {
                    self.failed.insert(handle);
                }
            }
        }
    }

    /// Look up the rendered image for `handle`, starting a decode of
    /// `bytes` the first time it is asked for.
    pub fn request(&mut self, handle: &str, bytes: &Arc<[u8]>) -> PreviewStatus<'_> {
        if self.picker.is_none() {
            return PreviewStatus::Unavailable;
        }
        if self.failed.contains(handle) {
            return PreviewStatus::Failed;
        }
        if self.cache.contains_key(handle) {
            return match self.cache.get_mut(handle) {
                Some(protocol) => PreviewStatus::Ready(protocol),
                None => PreviewStatus::Loading,
            };
        }

        if self.loading.insert(handle.to_string()) {
            let handle = handle.to_string();
            let bytes = Arc::clone(bytes);
            let sender = self.sender.clone();
            let size = self.max_size;

            std::thread::spawn(move || {
                let decoded = match image::load_from_memory(&bytes) {
                    Ok(img) => Some(img.resize(size, size, FilterType::Triangle)),
                    Err(e) => {
                        tracing::warn!("Failed to decode {}: {}", handle, e);
                        None
                    }
                };
                let _ = sender.send((handle, decoded));
            });
        }

        PreviewStatus::Loading
    }

    /// Drop anything held for `handle` once its blob is released.
    pub fn forget(&mut self, handle: &str) {
        self.cache.remove(handle);
        self.failed.remove(handle);
        self.loading.remove(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halfblocks() -> ImagePreview {
        ImagePreview::new(&PreviewConfig {
            image_preview: true,
            protocol: ImageProtocol::Halfblocks,
            max_size: 64,
        })
    }

    #[test]
    fn test_disabled_preview_is_unavailable() {
        let mut preview = ImagePreview::new(&PreviewConfig {
            image_preview: false,
            ..PreviewConfig::default()
        });
        let bytes: Arc<[u8]> = Arc::from(&b"not an image"[..]);
        assert!(!preview.is_available());
        assert!(matches!(
            preview.request("blob:vitrine/1", &bytes),
            PreviewStatus::Unavailable
        ));
    }

    #[test]
    fn test_decode_finishing_after_forget_is_dropped() {
        let mut preview = halfblocks();
        let handle = "blob:vitrine/1";
        let bytes: Arc<[u8]> = Arc::from(&b"not an image"[..]);

        assert!(matches!(preview.request(handle, &bytes), PreviewStatus::Loading));
        assert!(preview.loading.contains(handle));

        preview.forget(handle);
        assert!(!preview.loading.contains(handle));

        // A result arriving after the blob was released
        preview
            .sender
            .send((handle.to_string(), Some(DynamicImage::new_rgb8(2, 2))))
            .unwrap();
        preview.poll();

        assert!(preview.cache.is_empty());
        assert!(preview.failed.is_empty());
        assert!(!preview.loading.contains(handle));
    }

    #[test]
    fn test_pending_decode_lands_in_cache() {
        let mut preview = halfblocks();
        let handle = "blob:vitrine/2";
        let bytes: Arc<[u8]> = Arc::from(&b"not an image"[..]);

        preview.request(handle, &bytes);
        preview
            .sender
            .send((handle.to_string(), Some(DynamicImage::new_rgb8(2, 2))))
            .unwrap();
        preview.poll();

        assert!(preview.cache.contains_key(handle));
        assert!(!preview.loading.contains(handle));
    }
}
