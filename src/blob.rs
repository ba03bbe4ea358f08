//! In-memory image bytes for uploaded files.
//!
//! Each upload is registered under a `blob:vitrine/<n>` handle that the
//! photo record uses as its URL. Bytes stay alive until the handle is
//! revoked or the registry is dropped.

use std::collections::HashMap;
use std::sync::Arc;

pub const BLOB_PREFIX: &str = "blob:vitrine/";

#[derive(Debug, Clone)]
pub struct Blob {
    pub mime: &'static str,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Default)]
pub struct BlobRegistry {
    blobs: HashMap<String, Blob>,
    next_id: u64,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` and return the handle that refers to them.
    pub fn register(&mut self, mime: &'static str, bytes: Vec<u8>) -> String {
        self.next_id += 1;
        let handle = format!("{}{}", BLOB_PREFIX, self.next_id);
        tracing::debug!("Registered {} ({} bytes, {})", handle, bytes.len(), mime);
        self.blobs.insert(
            handle.clone(),
            Blob {
                mime,
                bytes: Arc::from(bytes),
            },
        );
        handle
    }

    pub fn get(&self, handle: &str) -> Option<&Blob> {
        self.blobs.get(handle)
    }

    /// Release the bytes behind `handle`. Returns false for unknown handles.
    pub fn revoke(&mut self, handle: &str) -> bool {
        let removed = self.blobs.remove(handle).is_some();
        if removed {
            tracing::debug!("Revoked {}", handle);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.blobs.values().map(|b| b.bytes.len()).sum()
    }
}

pub fn is_blob_url(url: &str) -> bool {
    url.starts_with(BLOB_PREFIX)
}

impl Drop for BlobRegistry {
    fn drop(&mut self) {
        if !self.blobs.is_empty() {
            tracing::debug!("Releasing {} blobs ({} bytes)", self.blobs.len(), self.total_bytes());
        }
    }
}
