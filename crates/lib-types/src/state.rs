//! Session state shared by the FFI layer and its callers.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an open-file session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// `Lim_FileOpenForRead` returned a valid handle.
    Open,
    /// `Lim_FileClose` has been called.
    Closed,
}
