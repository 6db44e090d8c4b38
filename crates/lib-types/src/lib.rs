//! # lib-types
//!
//! Record types for the ND2 vendor SDK bindings.
//!
//! Everything the vendor library reports is copied into the owned,
//! serializable records defined here:
//! - Image attributes and acquisition metadata
//! - Text info and the key/value pairs embedded in it
//! - Experiment loops and coordinate helpers
//! - Binary layer descriptors
//! - Picture geometry, frames and per-frame stage positions
//! - Vendor status code names
//!
//! This crate has no FFI; see `lib-nd2-ffi` for the bindings themselves.

pub mod attributes;
pub mod binaries;
pub mod experiment;
pub mod metadata;
pub mod picture;
pub mod state;
pub mod status;
pub mod summary;
pub mod text_info;

pub use attributes::*;
pub use binaries::*;
pub use experiment::*;
pub use metadata::*;
pub use picture::*;
pub use state::*;
pub use status::*;
pub use summary::*;
pub use text_info::*;

/// Capacity of the vendor binary descriptor array (`LIMMAXBINARIES`).
pub const MAX_BINARIES: usize = 128;

/// Capacity of the vendor plane array (`LIMMAXPICTUREPLANES`).
pub const MAX_PICTURE_PLANES: usize = 256;

/// Capacity of the vendor experiment level array (`LIMMAXEXPERIMENTLEVEL`).
pub const MAX_EXPERIMENT_LEVELS: usize = 8;
