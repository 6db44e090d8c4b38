//! Wide-character string conversion for the vendor boundary.
//!
//! The SDK takes and returns `wchar_t` strings: UTF-16 code units on Windows
//! and UTF-32 code points elsewhere. Inbound strings become an owned,
//! NUL-terminated [`WideCString`]; outbound fixed-size fields are narrowed to
//! UTF-8 with an explicit byte limit.

use crate::error::{Nd2Error, Nd2Result};
use std::path::Path;

/// The platform `wchar_t`.
#[cfg(windows)]
pub type WChar = u16;

/// The platform `wchar_t`.
#[cfg(not(windows))]
pub type WChar = u32;

/// An owned, NUL-terminated wide string with no interior NUL.
///
/// The buffer holds exactly `len() + 1` units and is freed when dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WideCString {
    units: Vec<WChar>,
}

impl WideCString {
    /// Convert a UTF-8 string.
    pub fn new(s: &str) -> Nd2Result<Self> {
        Self::from_units(encode(s))
    }

    /// Convert a file-system path.
    pub fn from_path(path: &Path) -> Nd2Result<Self> {
        #[cfg(windows)]
        {
            use std::os::windows::ffi::OsStrExt;
            Self::from_units(path.as_os_str().encode_wide().collect())
        }

        #[cfg(not(windows))]
        {
            let s = path.to_str().ok_or_else(|| Nd2Error::InvalidArgument {
                name: "path".to_string(),
                reason: format!("{} is not valid Unicode", path.display()),
            })?;
            Self::new(s)
        }
    }

    fn from_units(mut units: Vec<WChar>) -> Nd2Result<Self> {
        if let Some(pos) = units.iter().position(|&u| u == 0) {
            return Err(Nd2Error::InvalidArgument {
                name: "path".to_string(),
                reason: format!("contains a NUL character at position {pos}"),
            });
        }
        units.reserve_exact(1);
        units.push(0);
        Ok(Self { units })
    }

    /// Pointer to the first unit, valid while `self` is alive.
    pub fn as_ptr(&self) -> *const WChar {
        self.units.as_ptr()
    }

    /// Length in units, excluding the terminator.
    pub fn len(&self) -> usize {
        self.units.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Units including the terminator.
    pub fn as_slice_with_nul(&self) -> &[WChar] {
        &self.units
    }

    /// Decode back to UTF-8, replacing invalid units.
    pub fn to_string_lossy(&self) -> String {
        narrow(&self.units, usize::MAX)
    }
}

#[cfg(windows)]
fn encode(s: &str) -> Vec<WChar> {
    let mut units = Vec::with_capacity(s.len() + 1);
    units.extend(s.encode_utf16());
    units
}

#[cfg(not(windows))]
fn encode(s: &str) -> Vec<WChar> {
    let mut units = Vec::with_capacity(s.chars().count() + 1);
    units.extend(s.chars().map(u32::from));
    units
}

/// Encode `s` into a fixed field, NUL-terminating when there is room.
///
/// Returns the number of units written, terminator excluded. Units past the
/// field capacity are dropped.
pub fn encode_into<const N: usize>(s: &str, field: &mut [WChar; N]) -> usize {
    let units = encode(s);
    let n = units.len().min(N);
    field[..n].copy_from_slice(&units[..n]);
    if n < N {
        field[n] = 0;
    }
    n
}

/// Narrow a fixed-capacity field to UTF-8.
///
/// The result holds at most `N - 1` bytes, the room the vendor leaves for
/// text before the terminator. A field with no terminator is read up to its
/// capacity and never beyond.
pub fn narrow_field<const N: usize>(field: &[WChar; N]) -> String {
    narrow(field, N.saturating_sub(1))
}

/// Narrow wide units up to the first NUL, keeping at most `max_bytes` bytes
/// of whole UTF-8 characters.
pub fn narrow(units: &[WChar], max_bytes: usize) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    let mut out = String::new();
    for c in decode(&units[..end]) {
        if out.len() + c.len_utf8() > max_bytes {
            tracing::trace!(max_bytes, "Truncated wide string");
            break;
        }
        out.push(c);
    }
    out
}

#[cfg(windows)]
fn decode(units: &[WChar]) -> impl Iterator<Item = char> + '_ {
    char::decode_utf16(units.iter().copied()).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
}

#[cfg(not(windows))]
fn decode(units: &[WChar]) -> impl Iterator<Item = char> + '_ {
    units
        .iter()
        .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_c_string_has_single_terminator() {
        let w = WideCString::new("sample.nd2").unwrap();
        assert_eq!(w.len(), 10);
        assert_eq!(w.as_slice_with_nul().len(), 11);
        assert_eq!(*w.as_slice_with_nul().last().unwrap(), 0);
        assert_eq!(w.to_string_lossy(), "sample.nd2");
    }

    #[test]
    fn test_interior_nul_rejected() {
        let err = WideCString::new("a\0b").unwrap_err();
        assert!(matches!(err, Nd2Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_path_conversion() {
        let w = WideCString::from_path(Path::new("/data/Zeitraffer é.nd2")).unwrap();
        assert_eq!(w.to_string_lossy(), "/data/Zeitraffer é.nd2");
    }

    #[test]
    fn test_narrow_short_field_truncates_at_255_bytes() {
        let mut field = [0 as WChar; 256];
        let written = encode_into(&"x".repeat(300), &mut field);
        assert_eq!(written, 256);

        let s = narrow_field(&field);
        assert_eq!(s.len(), 255);
        assert!(s.bytes().all(|b| b == b'x'));
    }

    #[test]
    fn test_narrow_long_field_truncates_at_4095_bytes() {
        let mut field = [0 as WChar; 4096];
        encode_into(&"y".repeat(5000), &mut field);
        assert_eq!(narrow_field(&field).len(), 4095);
    }

    #[test]
    fn test_narrow_keeps_whole_characters() {
        // 'é' is two bytes in UTF-8; 200 of them need 400 bytes.
        let mut field = [0 as WChar; 256];
        encode_into(&"é".repeat(200), &mut field);
        let s = narrow_field(&field);
        assert_eq!(s.len(), 254);
        assert_eq!(s.chars().count(), 127);
    }

    #[test]
    fn test_narrow_stops_at_terminator() {
        let mut field = [0 as WChar; 256];
        encode_into("Plan Apo", &mut field);
        assert_eq!(narrow_field(&field), "Plan Apo");
        assert_eq!(narrow(&field, 4), "Plan");
    }

    #[test]
    fn test_invalid_units_are_replaced() {
        let units: [WChar; 3] = [0xD800, 'a' as WChar, 0];
        assert_eq!(narrow(&units, 16), "\u{FFFD}a");
    }
}
