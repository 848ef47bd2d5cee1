use std::sync::Arc;

use crate::adapters::{
    AppConfig, EncoderSettings, FfmpegExecutor, JsonFileSnapshotStore, SystemClock,
};
use crate::app::{clip_store::ClipStore, stitch_interactor::StitchInteractor};
use crate::domain::rules::EligibilityPolicy;
use crate::error::AppError;
use crate::planner::StitchPlanner;
use crate::ports::{Clock, SnapshotPort, StitchExecutor};

pub trait AppContainer: Send + Sync {
    fn clip_store(&self) -> Arc<ClipStore>;
    fn stitch_interactor(&self) -> Arc<StitchInteractor>;
}

/// Production wiring: JSON file snapshots, the wall clock and ffmpeg
pub struct DefaultAppContainer {
    clip_store: Arc<ClipStore>,
    stitch_interactor: Arc<StitchInteractor>,
}

impl DefaultAppContainer {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        config.validate()?;
        let policy = config.eligibility_policy()?;

        let snapshot_port = Arc::new(JsonFileSnapshotStore::in_dir(&config.paths.data_dir));
        let clock = Arc::new(SystemClock);
        Self::with_ports(config, policy, snapshot_port, clock).await
    }

    /// Wire everything except the snapshot store and clock
    pub async fn with_ports(
        config: &AppConfig,
        policy: EligibilityPolicy,
        snapshot_port: Arc<dyn SnapshotPort>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let clip_store = Arc::new(
            ClipStore::initialize(snapshot_port, clock, policy, config.store.history_capacity)
                .await,
        );

        let render = &config.render;
        let encoder = EncoderSettings {
            video_codec: render.video_codec.clone(),
            crf: render.crf,
            preset: render.preset.clone(),
            audio_bitrate: config.audio.bitrate.clone(),
            ..EncoderSettings::default()
        };
        let execute_port: Arc<dyn StitchExecutor> =
            Arc::new(FfmpegExecutor::new(&config.paths.ffmpeg, encoder));

        let planner = StitchPlanner::new(render.profile())
            .with_speed_factor(render.speed_factor)
            .with_audio_volume(config.audio.volume);

        let stitch_interactor = Arc::new(
            StitchInteractor::new(
                Arc::clone(&clip_store),
                planner,
                execute_port,
                &config.paths.output_dir,
            )
            .with_audio_track(config.audio.track.clone()),
        );

        Ok(Self {
            clip_store,
            stitch_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn clip_store(&self) -> Arc<ClipStore> {
        Arc::clone(&self.clip_store)
    }

    fn stitch_interactor(&self) -> Arc<StitchInteractor> {
        Arc::clone(&self.stitch_interactor)
    }
}
