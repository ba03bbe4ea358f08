//! Validation and record construction for images added during a session.

use chrono::Utc;
use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::config::AddImageConfig;
use crate::photo::Photo;

/// What the user asked to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddImageSource {
    Url(String),
    File(PathBuf),
}

/// Reasons an add is refused. Shown inline; never fatal.
#[derive(Debug, Error)]
pub enum AddImageError {
    #[error("Enter an image URL")]
    EmptyUrl,
    #[error("Not a valid URL: {0}")]
    MalformedUrl(String),
    #[error("Only http and https URLs are allowed (got {0}:)")]
    UnsupportedScheme(String),
    #[error("Enter a file path")]
    EmptyPath,
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("File is too large ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },
    #[error("Not an image file ({0})")]
    NotAnImage(&'static str),
}

/// Parse and check a user-supplied image URL.
pub fn validate_url(input: &str) -> Result<Url, AddImageError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AddImageError::EmptyUrl);
    }

    let url = Url::parse(input).map_err(|e| AddImageError::MalformedUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(AddImageError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(AddImageError::MalformedUrl("missing host".to_string()));
    }

    Ok(url)
}

/// MIME type of `bytes` if they look like an image format we can decode.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

fn describe_non_image(bytes: &[u8]) -> &'static str {
    if std::str::from_utf8(bytes).is_ok() {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

/// A local file that passed validation, with its bytes loaded.
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

pub fn read_image_file(path: &Path, limit: u64) -> Result<LoadedFile, AddImageError> {
    if path.as_os_str().is_empty() {
        return Err(AddImageError::EmptyPath);
    }

    let io_err = |source: std::io::Error| AddImageError::Io {
        path: path.display().to_string(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > limit {
        return Err(AddImageError::TooLarge { size, limit });
    }

    let bytes = std::fs::read(path).map_err(io_err)?;
    let mime = match sniff_image_mime(&bytes) {
        Some(mime) => mime,
        None => return Err(AddImageError::NotAnImage(describe_non_image(&bytes))),
    };

    Ok(LoadedFile {
        path: path.to_path_buf(),
        mime,
        bytes,
    })
}

/// Expand a leading `~/` so paths typed into the dialog behave as in a shell.
pub fn expand_home(input: &str) -> PathBuf {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

fn title_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            Path::new(decoded.as_ref())
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| decoded.to_string())
        })
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "Untitled".to_string())
}

fn added_metadata(source: &str) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert("added".to_string(), Utc::now().to_rfc3339());
    metadata.insert("source".to_string(), source.to_string());
    metadata
}

pub fn photo_from_url(id: String, url: &Url, config: &AddImageConfig) -> Photo {
    Photo {
        id,
        title: title_from_url(url),
        caption: format!("Added from {}", url.host_str().unwrap_or("the web")),
        photographer: "You".to_string(),
        tags: vec![config.tag.clone(), "Url".to_string()],
        metadata: Some(added_metadata("url")),
        thumbnail_url: url.to_string(),
        full_url: url.to_string(),
        client_added: true,
    }
}

/// Build the record for an uploaded file whose bytes live at `handle`.
pub fn photo_from_file(id: String, file: &LoadedFile, handle: &str, config: &AddImageConfig) -> Photo {
    let title = file
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());
    let file_name = file
        .path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut metadata = added_metadata("file");
    metadata.insert("mime".to_string(), file.mime.to_string());
    metadata.insert("bytes".to_string(), file.bytes.len().to_string());

    Photo {
        id,
        title,
        caption: format!("Uploaded {}", file_name),
        photographer: "You".to_string(),
        tags: vec![config.tag.clone(), "Upload".to_string()],
        metadata: Some(metadata),
        thumbnail_url: handle.to_string(),
        full_url: handle.to_string(),
        client_added: true,
    }
}
