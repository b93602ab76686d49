//! Error Types
//!
//! This module defines the error types used throughout the render core.
//!
//! # Overview
//!
//! The per-frame pipeline (state merging, queue submission, state execution)
//! never fails: unresolved handles and null merge inputs degrade to omitted
//! visuals. [`RenderError`] therefore only covers the initialization paths
//! that talk to the graphics device: framebuffer and buffer allocation
//! during frame-graph construction.
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, RenderError>`.

use thiserror::Error;

/// The main error type for the render core.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // Device Resource Errors
    // ========================================================================
    /// The device failed to allocate a framebuffer.
    #[error("Failed to create framebuffer '{label}': {reason}")]
    FramebufferCreation {
        /// Debug label of the requested framebuffer.
        label: &'static str,
        /// Backend-reported failure reason.
        reason: String,
    },

    /// The device failed to allocate a uniform buffer.
    #[error("Failed to create uniform buffer '{label}': {reason}")]
    BufferCreation {
        /// Debug label of the requested buffer.
        label: &'static str,
        /// Backend-reported failure reason.
        reason: String,
    },
}

/// Result alias used by all fallible APIs in this crate.
pub type Result<T> = std::result::Result<T, RenderError>;
