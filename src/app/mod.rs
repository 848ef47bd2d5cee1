// Application layer - Use case interactors

pub mod clip_store;
pub mod container;
pub mod stitch_interactor;

// Re-export interactors
pub use clip_store::{AddedClip, ClipStore, RotationOutcome};
pub use container::{AppContainer, DefaultAppContainer};
pub use stitch_interactor::StitchInteractor;
