// TOML config adapter - Typed configuration loaded from TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::archive::DEFAULT_HISTORY_CAPACITY;
use crate::domain::model::DAYS_PER_WEEK;
use crate::domain::rules::EligibilityPolicy;
use crate::error::ConfigError;
use crate::planner::{ColorGrade, RenderProfile, DEFAULT_AUDIO_VOLUME, DEFAULT_SPEED_FACTOR};
use crate::utils::logging::LoggingConfig;

/// Name of the config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "weekreel.toml";

/// Complete application configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub store: StoreSection,
    pub capture: CaptureSection,
    pub render: RenderSection,
    pub audio: AudioSection,
    pub paths: PathsSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Clips needed before a week can be stitched (1..=7)
    pub eligibility_threshold: usize,
    pub history_capacity: usize,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            eligibility_threshold: DAYS_PER_WEEK,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSection {
    /// Duration recorded for clips registered without one
    pub clip_seconds: f64,
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self { clip_seconds: 1.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub pixel_format: String,
    pub speed_factor: f64,
    pub grade: bool,
    pub video_codec: String,
    pub crf: u8,
    pub preset: String,
}

impl Default for RenderSection {
    fn default() -> Self {
        let profile = RenderProfile::default();
        Self {
            width: profile.width,
            height: profile.height,
            frame_rate: profile.frame_rate,
            pixel_format: profile.pixel_format,
            speed_factor: DEFAULT_SPEED_FACTOR,
            grade: true,
            video_codec: "libx264".to_string(),
            crf: 23,
            preset: "medium".to_string(),
        }
    }
}

impl RenderSection {
    pub fn profile(&self) -> RenderProfile {
        RenderProfile {
            width: self.width,
            height: self.height,
            frame_rate: self.frame_rate,
            pixel_format: self.pixel_format.clone(),
            grade: self.grade.then(ColorGrade::default),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSection {
    /// Background track mixed under every film
    pub track: Option<PathBuf>,
    pub volume: f64,
    pub bitrate: String,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            track: None,
            volume: DEFAULT_AUDIO_VOLUME,
            bitrate: "192k".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Holds the snapshot (`state.json`)
    pub data_dir: PathBuf,
    /// Where finished films are written as `<week id>.mp4`
    pub output_dir: PathBuf,
    /// ffmpeg binary name or path
    pub ffmpeg: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".weekreel"),
            output_dir: PathBuf::from(".weekreel/weekly"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl AppConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Eligibility policy built from `[store]`
    pub fn eligibility_policy(&self) -> Result<EligibilityPolicy, ConfigError> {
        EligibilityPolicy::new(self.store.eligibility_threshold)
            .map_err(|e| ConfigError::invalid("store.eligibility_threshold", e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.eligibility_policy()?;

        if self.store.history_capacity == 0 {
            return Err(ConfigError::invalid(
                "store.history_capacity",
                "must keep at least one week",
            ));
        }
        if !self.capture.clip_seconds.is_finite() || self.capture.clip_seconds <= 0.0 {
            return Err(ConfigError::invalid(
                "capture.clip_seconds",
                format!("must be positive, got {}", self.capture.clip_seconds),
            ));
        }

        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(ConfigError::invalid("render", "frame size cannot be zero"));
        }
        if render.width % 2 != 0 || render.height % 2 != 0 {
            return Err(ConfigError::invalid(
                "render",
                format!("frame size must be even, got {}x{}", render.width, render.height),
            ));
        }
        if render.frame_rate == 0 {
            return Err(ConfigError::invalid("render.frame_rate", "cannot be zero"));
        }
        if !render.speed_factor.is_finite() || render.speed_factor <= 0.0 {
            return Err(ConfigError::invalid(
                "render.speed_factor",
                format!("must be positive, got {}", render.speed_factor),
            ));
        }
        if render.crf > 51 {
            return Err(ConfigError::invalid(
                "render.crf",
                format!("cannot exceed 51, got {}", render.crf),
            ));
        }

        let volume = self.audio.volume;
        if !volume.is_finite() || volume <= 0.0 || volume > 1.0 {
            return Err(ConfigError::invalid(
                "audio.volume",
                format!("must be within (0, 1], got {}", volume),
            ));
        }

        Ok(())
    }
}

/// Loads [`AppConfig`] from disk
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Load `path`, or `weekreel.toml` in the working directory when it
    /// exists, or the built-in defaults
    pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load_file(default_path)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(AppConfig::default())
                }
            }
        }
    }

    pub fn load_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = AppConfig::from_toml_str(&text)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
