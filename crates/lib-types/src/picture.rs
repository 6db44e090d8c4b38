//! Decoded frame buffers and per-frame metadata.

use serde::{Deserialize, Serialize};

/// Geometry of an allocated picture buffer, as recorded by `Lim_InitPicture`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureGeometry {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u32,
    pub components: u32,

    /// Row stride in bytes, including padding.
    pub width_bytes: u32,

    /// Total buffer size in bytes.
    pub size: usize,
}

impl PictureGeometry {
    /// Unpadded byte size: `width * height * components * ceil(bpc / 8)`.
    pub fn packed_size(width: u32, height: u32, bits_per_component: u32, components: u32) -> usize {
        let bytes_per_component = bits_per_component.div_ceil(8) as usize;
        width as usize * height as usize * components as usize * bytes_per_component
    }

    /// Whether the recorded size covers every padded row.
    pub fn is_consistent(&self) -> bool {
        let min_stride = self.width as usize
            * self.components as usize
            * self.bits_per_component.div_ceil(8) as usize;
        (self.width_bytes as usize) >= min_stride
            && self.size >= self.width_bytes as usize * self.height as usize
    }
}

/// Stage position and timestamp of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalMetadata {
    /// Time relative to the first frame, in milliseconds.
    pub time_msec: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LocalMetadata {
    pub fn time_seconds(&self) -> f64 {
        self.time_msec * 1e-3
    }
}

/// One decoded frame copied out of the picture buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub seq_index: u32,
    pub data: Vec<u8>,
    pub local: LocalMetadata,
}

impl Frame {
    /// Read a little-endian 16-bit component at `(x, y, component)`.
    ///
    /// Returns `None` when the position is outside the geometry or the
    /// geometry is not 16 bits per component.
    pub fn sample_u16(&self, geometry: &PictureGeometry, x: u32, y: u32, component: u32) -> Option<u16> {
        if geometry.bits_per_component.div_ceil(8) != 2
            || x >= geometry.width
            || y >= geometry.height
            || component >= geometry.components
        {
            return None;
        }
        let offset = y as usize * geometry.width_bytes as usize
            + (x as usize * geometry.components as usize + component as usize) * 2;
        let bytes = self.data.get(offset..offset + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}
