//! Stitch planning: turns a week's clips into an engine-agnostic plan

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::model::{ClipDescriptor, DayIndex, WeekId};

pub mod stitch;

pub use stitch::StitchPlanner;

/// Default slow-motion factor (output runs twice as long as the source)
pub const DEFAULT_SPEED_FACTOR: f64 = 2.0;

/// Default gain applied to the background track
pub const DEFAULT_AUDIO_VOLUME: f64 = 0.5;

/// Fixed "lo-fi" look applied after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorGrade {
    /// Saturation multiplier (1.0 = unchanged)
    pub saturation: f64,
    /// Vignette lens angle in radians
    pub vignette_angle: f64,
    /// Temporal grain strength (0 = none)
    pub grain_strength: u32,
}

impl Default for ColorGrade {
    fn default() -> Self {
        Self {
            saturation: 0.5,
            vignette_angle: std::f64::consts::FRAC_PI_4,
            grain_strength: 8,
        }
    }
}

/// Canonical output format every clip is normalized to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderProfile {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub pixel_format: String,
    pub grade: Option<ColorGrade>,
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            frame_rate: 30,
            pixel_format: "yuv420p".to_string(),
            grade: Some(ColorGrade::default()),
        }
    }
}

/// One per-clip processing step, applied in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TransformStep {
    /// Scale to fit inside the frame, then pad to exactly this size
    FitFrame { width: u32, height: u32 },
    /// Force a 1:1 sample aspect ratio
    SquarePixels,
    /// Multiply presentation timestamps (factor > 1 slows down)
    Stretch { factor: f64 },
    /// Resample to a constant frame rate
    FrameRate { fps: u32 },
    /// Convert pixel format
    PixelFormat { format: String },
    /// Apply the fixed color grade
    Grade(ColorGrade),
}

/// Processing instructions for one input clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformSpec {
    /// Position of this clip among the plan's video inputs
    pub input_index: usize,
    pub day_index: DayIndex,
    pub source_path: PathBuf,
    pub source_duration_seconds: f64,
    pub output_duration_seconds: f64,
    pub steps: Vec<TransformStep>,
}

/// How the transformed clips are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcatStrategy {
    /// Back to back in ascending day order, no transitions
    SequentialAppend,
}

/// Background track instructions.
///
/// The executor must loop the source when it is shorter than
/// `target_duration_seconds` and cut it when longer, so the audio ends
/// exactly with the video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioMixPlan {
    /// Input position after all video inputs
    pub input_index: usize,
    pub source_path: PathBuf,
    pub target_duration_seconds: f64,
    pub volume: f64,
}

/// Immutable execution plan for one stitch attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StitchPlan {
    week_id: WeekId,
    ordered_clips: Vec<ClipDescriptor>,
    transforms: Vec<TransformSpec>,
    concat: ConcatStrategy,
    audio: Option<AudioMixPlan>,
    output_duration_seconds: f64,
    output_path: PathBuf,
    profile: RenderProfile,
}

impl StitchPlan {
    pub fn week_id(&self) -> &WeekId {
        &self.week_id
    }

    /// Clips in concatenation order
    pub fn ordered_clips(&self) -> &[ClipDescriptor] {
        &self.ordered_clips
    }

    pub fn transforms(&self) -> &[TransformSpec] {
        &self.transforms
    }

    pub fn concat_strategy(&self) -> ConcatStrategy {
        self.concat
    }

    pub fn audio(&self) -> Option<&AudioMixPlan> {
        self.audio.as_ref()
    }

    pub fn output_duration_seconds(&self) -> f64 {
        self.output_duration_seconds
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    /// Every file the plan reads
    pub fn input_paths(&self) -> impl Iterator<Item = &Path> {
        self.transforms
            .iter()
            .map(|t| t.source_path.as_path())
            .chain(self.audio.iter().map(|a| a.source_path.as_path()))
    }
}
