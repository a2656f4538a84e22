//! Gameplay and configuration error types.
//!
//! Nothing in the field core is fatal.  Every [`FieldError`] is resolved by a
//! state check at the call site (refuse the scan, stay silent, skip the sound)
//! rather than by unwinding.
//!
//! ## Usage
//!
//! ```rust
//! use coalfield::error::FieldError;
//!
//! fn handle(result: Result<(), FieldError>) {
//!     match result {
//!         Err(FieldError::InsufficientResource { .. }) => { /* show transient message */ }
//!         Err(FieldError::AlreadyTerminal) | Err(FieldError::NoHitDetected) => {}
//!         Err(FieldError::AssetUnavailable { .. }) | Ok(()) => {}
//!     }
//! }
//! ```

use crate::audio::SoundCue;
use std::fmt;

/// Outcomes of a player action that did not do what was asked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldError {
    /// A scan was refused because the magic meter holds less than the scan cost.
    /// No state changed.
    InsufficientResource {
        /// Magic available at the time of the attempt.
        available: f32,
        /// Magic the scan would have cost.
        cost: f32,
    },

    /// The scan ray hit nothing.  The scan cost has already been charged.
    NoHitDetected,

    /// A scan was attempted after the target was found.
    AlreadyTerminal,

    /// A sound could not be played because its asset never loaded.
    AssetUnavailable {
        /// Which cue was requested.
        cue: SoundCue,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InsufficientResource { available, cost } => write!(
                f,
                "not enough magic to scan: have {:.1}, need {:.1}",
                available, cost
            ),
            FieldError::NoHitDetected => write!(f, "scan ray hit nothing"),
            FieldError::AlreadyTerminal => write!(f, "target already found"),
            FieldError::AssetUnavailable { cue } => {
                write!(f, "sound '{}' is not loaded", cue.file_name())
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Convenience alias: a `Result` using `FieldError` as the error type.
pub type FieldResult<T> = Result<T, FieldError>;

/// Failures while reading or validating `assets/field.toml`.
#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The file (or the merged preset) is not valid configuration TOML.
    Parse {
        path: String,
        message: String,
    },

    /// A value parsed fine but is outside its usable range.
    Invalid {
        /// Name of the field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => write!(f, "failed to read {}: {}", path, source),
            ConfigError::Parse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
            ConfigError::Invalid {
                name,
                value,
                expected,
            } => write!(f, "'{}' = {} is outside {}", name, value, expected),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}
