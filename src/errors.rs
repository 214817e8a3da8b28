//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`UmbraError`] covers the failure modes of the
//! visibility core:
//! - Scene configuration errors (prefab entities without a prefab)
//! - Shadow atlas layout validation
//! - Settings parsing and validation
//!
//! Capacity limits (too many lights for one draw call, too many shadow
//! casters for the atlas) are *not* errors. They are reported through the
//! per-frame statistics instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use umbra::errors::{UmbraError, Result};
//!
//! fn cull_frame() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::scene::EntityKey;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum UmbraError {
    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// An entity tagged as a prefab carries no prefab reference.
    #[error("Entity {name:?} ({entity:?}) is a prefab entity without a prefab")]
    MissingPrefab {
        /// Key of the offending entity
        entity: EntityKey,
        /// Entity name, for diagnostics
        name: String,
    },

    /// A prefab handle does not resolve in the asset store.
    #[error("Prefab referenced by entity {0:?} not found in asset store")]
    PrefabNotFound(EntityKey),

    // ========================================================================
    // Shadow Atlas Errors
    // ========================================================================
    /// The atlas tile table is empty, out of the unit square or overlapping.
    #[error("Invalid shadow atlas layout: {0}")]
    InvalidAtlasLayout(String),

    // ========================================================================
    // Probe Errors
    // ========================================================================
    /// A probe index past the end of its grid.
    #[error("Probe index {index} out of range for a grid of {count} probes")]
    ProbeOutOfRange {
        /// Requested probe
        index: usize,
        /// Probes in the grid
        count: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings failed validation.
    #[error("Invalid renderer settings: {0}")]
    InvalidSettings(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, UmbraError>`.
pub type Result<T> = std::result::Result<T, UmbraError>;
