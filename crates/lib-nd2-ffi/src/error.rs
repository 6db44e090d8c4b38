//! Error types for ND2 SDK operations.

use lib_types::{status_name, SessionState};
use std::fmt;
use thiserror::Error;

/// Vendor query entry points that fill a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Query {
    Attributes,
    Metadata,
    TextInfo,
    Experiment,
    BinaryDescriptors,
}

impl Query {
    /// Vendor function name.
    pub fn function(self) -> &'static str {
        match self {
            Self::Attributes => "Lim_FileGetAttributes",
            Self::Metadata => "Lim_FileGetMetadata",
            Self::TextInfo => "Lim_FileGetTextinfo",
            Self::Experiment => "Lim_FileGetExperiment",
            Self::BinaryDescriptors => "Lim_FileGetBinaryDescriptors",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function())
    }
}

fn name_of(code: &i32) -> &'static str {
    status_name(*code)
}

/// Errors that can occur while talking to the vendor library.
#[derive(Debug, Error)]
pub enum Nd2Error {
    /// Failed to load the shared library.
    #[error("Failed to load library '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: libloading::Error,
    },

    /// Required symbol not found in library.
    #[error("Symbol '{symbol}' not found in library")]
    SymbolNotFound { symbol: String },

    /// `Lim_FileOpenForRead` returned a null handle.
    #[error("Lim_FileOpenForRead failed for '{path}' (returned {code})")]
    OpenFailed { path: String, code: i32 },

    /// `Lim_FileClose` returned non-zero.
    #[error("Lim_FileClose failed with code {code} ({})", name_of(.code))]
    CloseFailed { code: i32 },

    /// A record query returned non-zero; nothing was marshaled.
    #[error("{query} failed with code {code} ({})", name_of(.code))]
    QueryFailed { query: Query, code: i32 },

    /// `Lim_FileGetImageData` returned non-zero.
    #[error("Lim_FileGetImageData failed for sequence index {seq_index} with code {code} ({})", name_of(.code))]
    ImageDataFailed { seq_index: u32, code: i32 },

    /// Invalid argument supplied by the caller.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Coordinate arrays must carry one value per loop kind.
    #[error("Coordinate conversion needs exactly 4 values, got {len}")]
    CoordinateCount { len: usize },

    /// Coordinate conversion attempted before `experiment()`.
    #[error("Experiment descriptor not loaded; query the experiment first")]
    ExperimentNotLoaded,

    /// Image data requested without a live picture buffer.
    #[error("Picture buffer not initialized")]
    PictureNotInitialized,

    /// Caller's destination cannot hold a full frame.
    #[error("Destination buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    /// Sequence index past the end of the acquisition.
    #[error("Sequence index {index} out of range (sequence count {count})")]
    SequenceOutOfRange { index: u32, count: u32 },

    /// Invalid session state for operation.
    #[error("Invalid session state: expected {expected:?}, got {actual:?}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },
}

impl Nd2Error {
    /// Create a load error.
    pub fn load_error(path: impl Into<String>, source: libloading::Error) -> Self {
        Self::LoadError {
            path: path.into(),
            source,
        }
    }

    /// Create a symbol not found error.
    pub fn symbol_not_found(symbol: impl Into<String>) -> Self {
        Self::SymbolNotFound {
            symbol: symbol.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(expected: SessionState, actual: SessionState) -> Self {
        Self::InvalidState { expected, actual }
    }

    /// The vendor's raw code, for errors that carry one.
    pub fn vendor_code(&self) -> Option<i32> {
        match self {
            Self::OpenFailed { code, .. }
            | Self::CloseFailed { code }
            | Self::QueryFailed { code, .. }
            | Self::ImageDataFailed { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if the caller passed a bad argument.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::CoordinateCount { .. }
                | Self::BufferTooSmall { .. }
                | Self::SequenceOutOfRange { .. }
        )
    }
}

/// Result type for ND2 operations.
pub type Nd2Result<T> = Result<T, Nd2Error>;
