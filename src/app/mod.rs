// Application layer - Use case interactors

pub mod container;
pub mod convert_interactor;
pub mod worker_pool;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use convert_interactor::{ConversionOutcome, ConversionPreview, ConvertInteractor};
pub use worker_pool::{JobHandle, WorkerPool};
