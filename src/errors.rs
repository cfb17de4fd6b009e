//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`GyreError`] covers all failure modes including:
//! - Invalid numeric input at API boundaries
//! - Easing-name resolution failures
//! - Image loading errors
//! - Responsive configuration errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, GyreError>`.
//!
//! ```rust,ignore
//! use gyre::errors::{GyreError, Result};
//!
//! fn set_multiplier(value: f32) -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Gyre engine.
///
/// Recoverable conditions (a missing keyframe name, a missing breakpoint
/// settings entry, an absent delta group on a step) are *not* errors; they
/// are logged and fall back to safe defaults. This enum covers the failures
/// that must be surfaced to the caller.
#[derive(Error, Debug)]
pub enum GyreError {
    // ========================================================================
    // Boundary Validation Errors
    // ========================================================================
    /// A numeric input was non-finite or outside its valid domain.
    ///
    /// Raised at construction/enqueue time so NaN never propagates through
    /// the interpolation or projection math.
    #[error("Invalid parameter for {context}: {value}")]
    InvalidParameter {
        /// Description of the rejected input
        context: String,
        /// The offending value
        value: f64,
    },

    /// An easing name was not present in the fixed easing table.
    ///
    /// Surfaced immediately rather than silently defaulting, since a silent
    /// fallback would corrupt animation pacing invisibly.
    #[error("Unknown easing name: {0:?}")]
    UnknownEasing(String),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// A single image failed to load.
    ///
    /// In batch projections this rejects only the affected slot; sibling
    /// projections proceed.
    #[error("Failed to load image {url:?}: {reason}")]
    ImageLoad {
        /// The requested image identifier
        url: String,
        /// Source-specific failure description
        reason: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The responsive configuration is structurally invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON (de)serialization of the configuration failed.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GyreError {
    /// Helper for boundary validation of a single numeric value.
    pub(crate) fn invalid(context: impl Into<String>, value: f64) -> Self {
        GyreError::InvalidParameter {
            context: context.into(),
            value,
        }
    }
}

/// Alias for `Result<T, GyreError>`.
pub type Result<T> = std::result::Result<T, GyreError>;
