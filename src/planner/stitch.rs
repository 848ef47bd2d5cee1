//! Stitch planner implementation

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::PlanError;
use crate::domain::model::{ClipDescriptor, WeekId};
use crate::planner::{
    AudioMixPlan, ConcatStrategy, RenderProfile, StitchPlan, TransformSpec, TransformStep,
    DEFAULT_AUDIO_VOLUME, DEFAULT_SPEED_FACTOR,
};

/// Builds stitch plans from clip metadata. Never touches the filesystem.
#[derive(Debug, Clone)]
pub struct StitchPlanner {
    profile: RenderProfile,
    speed_factor: f64,
    audio_volume: f64,
}

impl Default for StitchPlanner {
    fn default() -> Self {
        Self::new(RenderProfile::default())
    }
}

impl StitchPlanner {
    /// Create a planner targeting `profile` at the default speed factor
    pub fn new(profile: RenderProfile) -> Self {
        Self {
            profile,
            speed_factor: DEFAULT_SPEED_FACTOR,
            audio_volume: DEFAULT_AUDIO_VOLUME,
        }
    }

    /// Set the slow-motion factor; validated when a plan is built
    pub fn with_speed_factor(mut self, speed_factor: f64) -> Self {
        self.speed_factor = speed_factor;
        self
    }

    /// Set background track gain, clamped to 0.0..=1.0
    pub fn with_audio_volume(mut self, volume: f64) -> Self {
        self.audio_volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            DEFAULT_AUDIO_VOLUME
        };
        self
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    /// Build the plan for `clips`.
    ///
    /// Clips may arrive in any order; they are concatenated by ascending
    /// day index so the film follows the week, not the recording order.
    pub fn build_plan(
        &self,
        week_id: &WeekId,
        clips: &[ClipDescriptor],
        audio_track: Option<&Path>,
        output_path: impl Into<PathBuf>,
    ) -> Result<StitchPlan, PlanError> {
        if clips.is_empty() {
            return Err(PlanError::Empty);
        }
        if !self.speed_factor.is_finite() || self.speed_factor <= 0.0 {
            return Err(PlanError::InvalidSpeedFactor(self.speed_factor));
        }

        let mut seen = BTreeSet::new();
        for clip in clips {
            if !seen.insert(clip.day_index()) {
                return Err(PlanError::DuplicateDay(clip.day_index()));
            }
        }

        let mut ordered_clips = clips.to_vec();
        ordered_clips.sort_by_key(|c| c.day_index());

        let transforms: Vec<TransformSpec> = ordered_clips
            .iter()
            .enumerate()
            .map(|(input_index, clip)| self.transform_for(input_index, clip))
            .collect();

        let output_duration_seconds: f64 = transforms
            .iter()
            .map(|t| t.output_duration_seconds)
            .sum();

        let audio = audio_track.map(|source| AudioMixPlan {
            input_index: transforms.len(),
            source_path: source.to_path_buf(),
            target_duration_seconds: output_duration_seconds,
            volume: self.audio_volume,
        });

        debug!(
            week = %week_id,
            clips = transforms.len(),
            duration = output_duration_seconds,
            audio = audio.is_some(),
            "Built stitch plan"
        );

        Ok(StitchPlan {
            week_id: week_id.clone(),
            ordered_clips,
            transforms,
            concat: ConcatStrategy::SequentialAppend,
            audio,
            output_duration_seconds,
            output_path: output_path.into(),
            profile: self.profile.clone(),
        })
    }

    /// Per-clip steps: geometry first, then timing, then format and look
    fn transform_for(&self, input_index: usize, clip: &ClipDescriptor) -> TransformSpec {
        let mut steps = vec![
            TransformStep::FitFrame {
                width: self.profile.width,
                height: self.profile.height,
            },
            TransformStep::SquarePixels,
            TransformStep::Stretch {
                factor: self.speed_factor,
            },
            TransformStep::FrameRate {
                fps: self.profile.frame_rate,
            },
            TransformStep::PixelFormat {
                format: self.profile.pixel_format.clone(),
            },
        ];
        if let Some(grade) = &self.profile.grade {
            steps.push(TransformStep::Grade(grade.clone()));
        }

        TransformSpec {
            input_index,
            day_index: clip.day_index(),
            source_path: clip.source_path().to_path_buf(),
            source_duration_seconds: clip.duration_seconds(),
            output_duration_seconds: clip.duration_seconds() * self.speed_factor,
            steps,
        }
    }
}
