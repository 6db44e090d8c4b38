//! Vendor status codes (`LIMRESULT`).
//!
//! The SDK reports every outcome as a signed integer. Zero is success and the
//! documented failures are small negative numbers. The bindings never translate
//! these codes; this module only gives them printable names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known `LIMRESULT` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimStatus {
    Ok,
    Unexpected,
    NotImplemented,
    OutOfMemory,
    InvalidArg,
    NoInterface,
    Pointer,
    Handle,
    Abort,
    Fail,
    AccessDenied,
    OsFail,
    NotInitialized,
    NotFound,
    ImplFailed,
    DialogCanceled,
    DbProcFailed,
    OutOfRange,
    Privileges,
    Version,
}

impl LimStatus {
    const ALL: [LimStatus; 20] = [
        Self::Ok,
        Self::Unexpected,
        Self::NotImplemented,
        Self::OutOfMemory,
        Self::InvalidArg,
        Self::NoInterface,
        Self::Pointer,
        Self::Handle,
        Self::Abort,
        Self::Fail,
        Self::AccessDenied,
        Self::OsFail,
        Self::NotInitialized,
        Self::NotFound,
        Self::ImplFailed,
        Self::DialogCanceled,
        Self::DbProcFailed,
        Self::OutOfRange,
        Self::Privileges,
        Self::Version,
    ];

    /// Look up a raw vendor code.
    pub fn from_code(code: i32) -> Option<Self> {
        // Codes run 0, -1, -2, ... in declaration order.
        let idx = usize::try_from(code.checked_neg()?).ok()?;
        Self::ALL.get(idx).copied()
    }

    /// The raw vendor code.
    pub fn code(self) -> i32 {
        -(self as i32)
    }

    /// The name used by the vendor header.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ok => "Lim_OK",
            Self::Unexpected => "Lim_ERR_UNEXPECTED",
            Self::NotImplemented => "Lim_ERR_NOTIMPL",
            Self::OutOfMemory => "Lim_ERR_OUTOFMEMORY",
            Self::InvalidArg => "Lim_ERR_INVALIDARG",
            Self::NoInterface => "Lim_ERR_NOINTERFACE",
            Self::Pointer => "Lim_ERR_POINTER",
            Self::Handle => "Lim_ERR_HANDLE",
            Self::Abort => "Lim_ERR_ABORT",
            Self::Fail => "Lim_ERR_FAIL",
            Self::AccessDenied => "Lim_ERR_ACCESSDENIED",
            Self::OsFail => "Lim_ERR_OS_FAIL",
            Self::NotInitialized => "Lim_ERR_NOTINITIALIZED",
            Self::NotFound => "Lim_ERR_NOTFOUND",
            Self::ImplFailed => "Lim_ERR_IMPL_FAILED",
            Self::DialogCanceled => "Lim_ERR_DLG_CANCELED",
            Self::DbProcFailed => "Lim_ERR_DB_PROC_FAILED",
            Self::OutOfRange => "Lim_ERR_OUTOFRANGE",
            Self::Privileges => "Lim_ERR_PRIVILEGES",
            Self::Version => "Lim_ERR_VERSION",
        }
    }
}

impl fmt::Display for LimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Printable name for any raw code, including undocumented ones.
pub fn status_name(code: i32) -> &'static str {
    LimStatus::from_code(code).map_or("UNKNOWN_ERROR", LimStatus::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for status in LimStatus::ALL {
            assert_eq!(LimStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(LimStatus::Handle.code(), -7);
        assert_eq!(LimStatus::Version.code(), -19);
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(LimStatus::from_code(1), None);
        assert_eq!(LimStatus::from_code(-20), None);
        assert_eq!(LimStatus::from_code(i32::MIN), None);
        assert_eq!(status_name(-42), "UNKNOWN_ERROR");
        assert_eq!(status_name(0), "Lim_OK");
        assert_eq!(status_name(-4), "Lim_ERR_INVALIDARG");
    }
}
