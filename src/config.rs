use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "VITRINE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub add_image: AddImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the key-value store (favorites live here).
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vitrine")
        .join("storage.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// TOML file with seed photos. The built-in catalog is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageProtocol {
    #[default]
    Auto,
    Halfblocks,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Draw uploaded images in the viewer when the terminal supports it.
    #[serde(default = "default_preview_enabled")]
    pub image_preview: bool,

    #[serde(default)]
    pub protocol: ImageProtocol,

    /// Longest edge, in pixels, images are downscaled to before display.
    #[serde(default = "default_preview_size")]
    pub max_size: u32,
}

fn default_preview_enabled() -> bool {
    true
}

fn default_preview_size() -> u32 {
    1024
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            image_preview: default_preview_enabled(),
            protocol: ImageProtocol::default(),
            max_size: default_preview_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_tile_width")]
    pub tile_width: u16,

    #[serde(default = "default_tile_height")]
    pub tile_height: u16,
}

fn default_tile_width() -> u16 {
    28
}

fn default_tile_height() -> u16 {
    7
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_width: default_tile_width(),
            tile_height: default_tile_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddImageConfig {
    /// Tag attached to every image added during the session.
    #[serde(default = "default_added_tag")]
    pub tag: String,

    /// Files larger than this are refused.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_added_tag() -> String {
    "Added".to_string()
}

fn default_max_file_bytes() -> u64 {
    50 * 1024 * 1024
}

impl Default for AddImageConfig {
    fn default() -> Self {
        Self {
            tag: default_added_tag(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl Config {
    /// Load from the default location, writing a default file on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vitrine")
    }

    fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join("config.toml"))
    }
}
