//! Acquisition metadata reported by `Lim_FileGetMetadata`.

use serde::{Deserialize, Serialize};

/// Per-file acquisition descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Acquisition start time (Julian day number).
    pub time_start: f64,

    /// Camera rotation angle in radians.
    pub angle: f64,

    /// Pixel calibration in microns per pixel.
    pub calibration: f64,

    /// Pixel aspect ratio.
    pub aspect: f64,

    /// Objective name.
    pub objective_name: String,

    pub objective_magnification: f64,
    pub objective_na: f64,
    pub refractive_index_1: f64,
    pub refractive_index_2: f64,
    pub pinhole_radius: f64,
    pub zoom: f64,
    pub projective_magnification: f64,

    /// Image type code (0 normal, 1 spectral).
    pub image_type: u32,

    /// Total number of components over all planes.
    pub component_count: u32,

    /// Plane descriptors, one per vendor-reported plane.
    pub planes: Vec<PlaneDesc>,
}

/// Description of one picture plane (usually one channel).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneDesc {
    /// Number of components in this plane.
    pub component_count: u32,

    /// Display color packed as `0x00BBGGRR`.
    pub color_rgb: u32,

    /// Channel name.
    pub name: String,

    /// Optical configuration name.
    pub oc_name: String,

    /// Emission wavelength in nanometers.
    pub emission_wavelength: f64,
}

impl PlaneDesc {
    /// Split the packed color into `(r, g, b)`.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let [r, g, b, _] = self.color_rgb.to_le_bytes();
        (r, g, b)
    }
}

impl Metadata {
    /// Number of planes reported by the vendor.
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_color_unpacking() {
        let plane = PlaneDesc {
            color_rgb: 0x00FF8001,
            ..Default::default()
        };
        assert_eq!(plane.rgb(), (0x01, 0x80, 0xFF));
    }
}
