use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const NEAR_DISTANCE: f32 = 300.0;
pub const FAR_DISTANCE: f32 = 2000.0;
pub const MAX_TEXTURE_SIZE: u32 = 1024;
pub const MIN_TEXTURE_SIZE: u32 = 256;
/// Size delta a new render target must exceed before it is reallocated.
pub const RESIZE_HYSTERESIS: u32 = 32;
/// Distance the clip plane is pushed past the target surface to hide its edge pixels.
pub const CLIP_PLANE_OFFSET: f32 = 0.3;

const TEXTURE_SIZE_LIMIT: u32 = 8192;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    #[serde(default = "default_near_distance")]
    pub near_distance: f32,
    #[serde(default = "default_far_distance")]
    pub far_distance: f32,
    #[serde(default = "default_max_texture_size")]
    pub max_texture_size: u32,
    #[serde(default = "default_min_texture_size")]
    pub min_texture_size: u32,
    #[serde(default = "default_resize_hysteresis")]
    pub resize_hysteresis: u32,
    #[serde(default = "default_clip_plane_offset")]
    pub clip_plane_offset: f32,
}

fn default_near_distance() -> f32 {
    NEAR_DISTANCE
}

fn default_far_distance() -> f32 {
    FAR_DISTANCE
}

fn default_max_texture_size() -> u32 {
    MAX_TEXTURE_SIZE
}

fn default_min_texture_size() -> u32 {
    MIN_TEXTURE_SIZE
}

fn default_resize_hysteresis() -> u32 {
    RESIZE_HYSTERESIS
}

fn default_clip_plane_offset() -> f32 {
    CLIP_PLANE_OFFSET
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            near_distance: default_near_distance(),
            far_distance: default_far_distance(),
            max_texture_size: default_max_texture_size(),
            min_texture_size: default_min_texture_size(),
            resize_hysteresis: default_resize_hysteresis(),
            clip_plane_offset: default_clip_plane_offset(),
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Read {
        path: PathBuf,
        source: io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Serialize(toml::ser::Error),
    Write {
        path: PathBuf,
        source: io::Error,
    },
}

impl SettingsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read capture settings {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse capture settings {}: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize capture settings: {err}"),
            Self::Write { path, source } => {
                write!(f, "failed to write capture settings {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SettingsError {}

impl CaptureSettings {
    pub fn sanitize(mut self) -> Self {
        if !self.near_distance.is_finite() || self.near_distance < 0.0 {
            self.near_distance = default_near_distance();
        }
        if !self.far_distance.is_finite() || self.far_distance <= self.near_distance {
            self.far_distance = self.near_distance + 1.0;
        }
        self.min_texture_size = round_texture_size(self.min_texture_size);
        self.max_texture_size = round_texture_size(self.max_texture_size).max(self.min_texture_size);
        if !self.clip_plane_offset.is_finite() || self.clip_plane_offset < 0.0 {
            self.clip_plane_offset = default_clip_plane_offset();
        }
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(contents).map(Self::sanitize)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let settings = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&settings).map_err(SettingsError::Serialize)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(path, serialized).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads settings from `path`, falling back to defaults when the file is
    /// missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) if err.is_not_found() => Self::default(),
            Err(err) => {
                warn!("{err}; using default capture settings");
                Self::default()
            }
        }
    }
}

fn round_texture_size(size: u32) -> u32 {
    size.clamp(1, TEXTURE_SIZE_LIMIT).next_power_of_two()
}
