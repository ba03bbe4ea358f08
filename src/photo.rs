//! Photo records and the seed catalog.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// One entry in the gallery, either from the seed catalog or added
/// during the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub photographer: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
    pub thumbnail_url: String,
    pub full_url: String,
    /// Added in this session; never persisted.
    #[serde(default, skip_serializing)]
    pub client_added: bool,
}

impl Photo {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key).map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate photo id {0:?} in catalog")]
    DuplicateId(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "photo")]
    photos: Vec<Photo>,
}

/// Parse a TOML catalog made of `[[photo]]` tables.
pub fn parse_catalog(content: &str) -> Result<Vec<Photo>, CatalogError> {
    let file: CatalogFile = toml::from_str(content)?;
    let mut seen = HashSet::new();
    let mut photos = Vec::with_capacity(file.photos.len());
    for mut photo in file.photos {
        if !seen.insert(photo.id.clone()) {
            return Err(CatalogError::DuplicateId(photo.id));
        }
        photo.client_added = false;
        photos.push(photo);
    }
    Ok(photos)
}

pub fn load_catalog(path: &Path) -> Result<Vec<Photo>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&content)
}

fn seed(
    id: &str,
    title: &str,
    caption: &str,
    photographer: &str,
    tags: &[&str],
    metadata: &[(&str, &str)],
) -> Photo {
    let metadata = if metadata.is_empty() {
        None
    } else {
        Some(
            metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    };
    Photo {
        id: id.to_string(),
        title: title.to_string(),
        caption: caption.to_string(),
        photographer: photographer.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        metadata,
        thumbnail_url: format!("https://picsum.photos/id/{}/400/300", id.trim_start_matches("p-")),
        full_url: format!("https://picsum.photos/id/{}/1600/1200", id.trim_start_matches("p-")),
        client_added: false,
    }
}

/// The built-in catalog shown when no catalog file is configured.
pub fn seed_photos() -> Vec<Photo> {
    vec![
        seed(
            "p-10",
            "Misty Forest",
            "Fog rolling between pines at dawn",
            "Paul Jarvis",
            &["Nature", "Forest"],
            &[("camera", "Canon EOS 5D"), ("location", "Oregon")],
        ),
        seed(
            "p-15",
            "Waterfall Steps",
            "Water cascading over mossy rocks",
            "Paul Jarvis",
            &["Nature", "Water"],
            &[("camera", "Canon EOS 5D")],
        ),
        seed(
            "p-29",
            "Mountain Ridge",
            "Snow on the ridge above the clouds",
            "Go Wild",
            &["Nature", "Mountains"],
            &[("location", "Alps"), ("altitude", "3200m")],
        ),
        seed(
            "p-42",
            "Coffee Break",
            "A quiet cafe corner in the morning",
            "Luke Chesser",
            &["City", "Food"],
            &[],
        ),
        seed(
            "p-48",
            "Workspace",
            "Laptop and notebook on a wooden desk",
            "Luke Chesser",
            &["Work", "Interior"],
            &[("lens", "35mm")],
        ),
        seed(
            "p-57",
            "Night Street",
            "Neon signs reflected on wet asphalt",
            "Nathan Anderson",
            &["City", "Night"],
            &[("camera", "Sony A7 III"), ("location", "Tokyo")],
        ),
        seed(
            "p-64",
            "Portrait in Shade",
            "Soft light under a tree canopy",
            "Alexander Shustov",
            &["People", "Portrait"],
            &[],
        ),
        seed(
            "p-76",
            "Old Bridge",
            "Stone arches over a slow river",
            "Ryan McGuire",
            &["Architecture", "Water"],
            &[("location", "Prague")],
        ),
        seed(
            "p-102",
            "Raspberries",
            "Fresh berries in a white bowl",
            "Ben Moore",
            &["Food"],
            &[("lens", "100mm macro")],
        ),
        seed(
            "p-169",
            "Golden Retriever",
            "A dog waiting by the door",
            "Charlie Foster",
            &["Animals", "Pets"],
            &[],
        ),
        seed(
            "p-237",
            "Puppy Eyes",
            "Black puppy looking up",
            "André Spieker",
            &["Animals", "Pets"],
            &[("camera", "Nikon D750")],
        ),
        seed(
            "p-1018",
            "Valley Light",
            "Sunbeams across a green valley",
            "Andrew Ridley",
            &["Nature", "Mountains", "Landscape"],
            &[("location", "Scotland")],
        ),
    ]
}
