//! # lib-nd2-ffi
//!
//! Safe FFI wrappers for the nd2ReadSDK vendor library.
//!
//! The SDK reads Nikon ND2 microscopy files. All decoding happens inside
//! the closed-source library; this crate only moves data across the C
//! boundary. It handles:
//!
//! - Dynamic library loading with `libloading`
//! - `#[repr(C)]` mirrors of the vendor structures
//! - Wide-character path and text conversion with bounded buffers
//! - File sessions that own their picture buffer and experiment descriptor
//! - Coordinate <-> sequence index translation
//!
//! # Safety
//!
//! The vendor library is trusted native code. Calls are forwarded once,
//! without retries or timeouts, and vendor status codes are surfaced
//! verbatim. The session adds guards only where Rust would otherwise hand
//! the vendor an invalid pointer: missing picture buffer, missing experiment
//! descriptor, undersized destination, or a closed file.
//!
//! Sessions are single-threaded (`!Sync`); open one session per thread.

pub mod error;
pub mod lifecycle;
pub mod loader;
pub mod marshal;
pub mod raw;
pub mod reader;
pub mod sdk;
pub mod wide;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{Nd2Error, Nd2Result, Query};
pub use lifecycle::Nd2File;
pub use loader::Nd2Library;
pub use reader::Nd2Document;
pub use sdk::ReadSdk;
pub use wide::{WChar, WideCString};
