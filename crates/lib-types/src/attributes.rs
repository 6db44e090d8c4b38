//! Image geometry reported by `Lim_FileGetAttributes`.

use serde::{Deserialize, Serialize};

/// Fixed image attributes of an ND2 file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Width of the image in pixels.
    pub width: u32,

    /// Width of one row in bytes, including vendor row padding.
    pub width_bytes: u32,

    /// Height of the image in pixels.
    pub height: u32,

    /// Number of components per pixel.
    pub components: u32,

    /// Bits per component as stored in memory (8, 16 or 32).
    pub bpc_in_memory: u32,

    /// Significant bits per component.
    pub bpc_significant: u32,

    /// Number of frames in the acquisition sequence.
    pub sequence_count: u32,

    /// Tile width in pixels, 0 when not tiled.
    pub tile_width: u32,

    /// Tile height in pixels, 0 when not tiled.
    pub tile_height: u32,

    /// Raw compression code, see [`Attributes::compression_kind`].
    pub compression: u32,

    /// Compression quality (0-100) for lossy files.
    pub quality: u32,
}

/// Pixel compression used in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compression {
    Lossless,
    Lossy,
    None,
    Unknown(u32),
}

impl From<u32> for Compression {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Lossless,
            1 => Self::Lossy,
            2 => Self::None,
            other => Self::Unknown(other),
        }
    }
}

impl Attributes {
    /// Bytes occupied by one component in memory.
    pub fn bytes_per_component(&self) -> u32 {
        self.bpc_in_memory.div_ceil(8)
    }

    /// Byte size of one decoded frame (`width_bytes * height`).
    pub fn frame_size(&self) -> usize {
        self.width_bytes as usize * self.height as usize
    }

    /// Decoded compression kind.
    pub fn compression_kind(&self) -> Compression {
        Compression::from(self.compression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_uses_padded_rows() {
        let attrs = Attributes {
            width: 3,
            width_bytes: 8,
            height: 5,
            components: 1,
            bpc_in_memory: 16,
            ..Default::default()
        };
        assert_eq!(attrs.frame_size(), 40);
        assert_eq!(attrs.bytes_per_component(), 2);
    }

    #[test]
    fn test_compression_codes() {
        assert_eq!(Compression::from(0), Compression::Lossless);
        assert_eq!(Compression::from(1), Compression::Lossy);
        assert_eq!(Compression::from(2), Compression::None);
        assert_eq!(Compression::from(9), Compression::Unknown(9));
    }
}
