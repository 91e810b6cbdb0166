//! ConvertX media conversion library
//!
//! Converts local media files between common containers, choosing between a
//! lossless stream copy and a re-encode with the right scaling filter based on
//! the input's probed resolution and the requested target resolution.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    AudioBitrate, ContainerFormat, ConversionDirective, ConversionRequest, Dimensions, MediaDescriptor,
    OperationMode, ResolutionTarget, ScalingFilter,
};
pub use engine::CommandBuilder;
pub use error::{ConvertXError, ConvertXResult};
pub use planner::{plan, ConversionPlanner};
