// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for the mapper dispatch pipeline.
//!
//! A single error family covers the whole surface so callers can
//! distinguish configuration mistakes from runtime data mismatches with one
//! `match`. Every error is raised synchronously at the point of violation;
//! nothing is retried or swallowed, and a failed resolution never leaves a
//! partial descriptor behind.

use thiserror::Error;

/// Errors produced by registration, resolution, and invocation.
#[derive(Debug, Error)]
pub enum MapperError {
    /// Invalid registration: unknown lifetime, or two mappers claiming the
    /// same ordered type pair.
    #[error("mapper configuration error: {0}")]
    Configuration(String),

    /// Absent source or destination handed to the facade.
    #[error("invalid mapping argument: {0}")]
    Argument(&'static str),

    /// No mapper is registered for the exact runtime type pair.
    ///
    /// The fields avoid the name `source`, which thiserror reserves for
    /// the underlying error cause.
    #[error("no mapper registered for '{source_type}' -> '{destination_type}'")]
    MappingNotSupported {
        /// Name of the source value's runtime type.
        source_type: String,
        /// Name of the destination value's runtime type.
        destination_type: String,
    },

    /// The implementation type is known but the given scope cannot produce
    /// an instance of it.
    #[error("mapper '{mapper}' could not be resolved from the scope")]
    Resolution {
        /// Name of the mapper implementation type.
        mapper: &'static str,
    },

    /// A caller-supplied destination factory produced no value where an
    /// instance was required.
    #[error("destination factory returned no value for item {index}")]
    Factory {
        /// Ordinal index of the item whose factory came up empty.
        index: usize,
    },

    /// A compiled descriptor was handed values of the wrong runtime type.
    /// Unreachable through the public API; surfaced instead of panicking.
    #[error("internal dispatch error: {0}")]
    Internal(String),
}

/// Convenient alias for API results using the public [`MapperError`] type.
pub type Result<T> = core::result::Result<T, MapperError>;
