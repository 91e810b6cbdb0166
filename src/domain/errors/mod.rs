// Domain errors - Typed failures for probing, planning, materialization and execution

use thiserror::Error;

use crate::domain::model::{ContainerFormat, OperationMode};

/// Failures reported while probing an input file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Path does not resolve to a readable regular file
    #[error("Input file not found: {path}")]
    NotFound { path: String },

    /// The probing utility could not make sense of the file
    #[error("Unable to read media file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Failures reported by the conversion planner
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Probe result carried zero-area or negative dimensions
    #[error("Invalid source dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// No conversion exists between the two formats
    #[error("Cannot convert {from} to {to}")]
    UnsupportedFormatPair {
        from: ContainerFormat,
        to: ContainerFormat,
    },
}

/// Failures reported while turning a directive into transcoder arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterializationError {
    #[error("Unsupported directive: {mode} from {from} to {to} ({reason})")]
    UnsupportedCombination {
        mode: OperationMode,
        from: ContainerFormat,
        to: ContainerFormat,
        reason: String,
    },
}

/// Failures reported by the transcoding collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Process ran and reported failure (or could not be driven to completion)
    #[error("Transcoding failed (exit code {code:?}): {message}")]
    Failed { code: Option<i32>, message: String },

    /// Conversion was cancelled and the process terminated
    #[error("Transcoding was cancelled")]
    Cancelled,

    /// The transcoding executable could not be located
    #[error("Transcoder executable not found: {tool}")]
    ToolNotFound { tool: String },
}

/// Any failure produced by the conversion engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Materialization(#[from] MaterializationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Invalid arguments provided by the caller
    #[error("Bad arguments: {0}")]
    BadArgs(String),
}

impl DomainError {
    /// Whether the failure came from a user-requested cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Execution(ExecutionError::Cancelled))
    }
}
