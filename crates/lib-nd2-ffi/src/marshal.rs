//! Copy raw vendor structures into owned records.
//!
//! Counts reported by the vendor are trusted up to the capacity of the
//! fixed array they index. A larger count is clamped so reads stay in bounds.

use crate::raw::{
    LimAttributes, LimBinaries, LimExperiment, LimLocalMetadata, LimMetadataDesc, LimPicture,
    LimTextInfo, LimUint,
};
use crate::wide::{narrow, narrow_field, WChar};
use lib_types::{
    Attributes, BinaryDescriptor, Binaries, Experiment, ExperimentLevel, LocalMetadata, Metadata,
    PictureGeometry, PlaneDesc, TextInfo, LONG_TEXT_MAX_BYTES, SHORT_TEXT_MAX_BYTES,
};

/// Number of valid entries in a fixed vendor array.
pub fn bounded_count(reported: LimUint, capacity: usize, what: &'static str) -> usize {
    let reported = reported as usize;
    if reported > capacity {
        tracing::warn!(what, reported, capacity, "Vendor count exceeds array capacity, clamping");
        capacity
    } else {
        reported
    }
}

pub fn attributes(raw: &LimAttributes) -> Attributes {
    Attributes {
        width: raw.ui_width,
        width_bytes: raw.ui_width_bytes,
        height: raw.ui_height,
        components: raw.ui_comp,
        bpc_in_memory: raw.ui_bpc_in_memory,
        bpc_significant: raw.ui_bpc_significant,
        sequence_count: raw.ui_sequence_count,
        tile_width: raw.ui_tile_width,
        tile_height: raw.ui_tile_height,
        compression: raw.ui_compression,
        quality: raw.ui_quality,
    }
}

pub fn metadata(raw: &LimMetadataDesc) -> Metadata {
    let count = bounded_count(raw.ui_plane_count, raw.p_planes.len(), "planes");
    let planes = raw.p_planes[..count]
        .iter()
        .map(|p| PlaneDesc {
            component_count: p.ui_comp_count,
            color_rgb: p.ui_color_rgb,
            name: narrow_field(&p.wsz_name),
            oc_name: narrow_field(&p.wsz_oc_name),
            emission_wavelength: p.d_emission_wl,
        })
        .collect();

    Metadata {
        time_start: raw.d_time_start,
        angle: raw.d_angle,
        calibration: raw.d_calibration,
        aspect: raw.d_aspect,
        objective_name: narrow_field(&raw.wsz_objective_name),
        objective_magnification: raw.d_objective_mag,
        objective_na: raw.d_objective_na,
        refractive_index_1: raw.d_refract_index1,
        refractive_index_2: raw.d_refract_index2,
        pinhole_radius: raw.d_pinhole_radius,
        zoom: raw.d_zoom,
        projective_magnification: raw.d_projective_mag,
        image_type: raw.ui_image_type,
        component_count: raw.ui_component_count,
        planes,
    }
}

fn short(field: &[WChar]) -> String {
    narrow(field, SHORT_TEXT_MAX_BYTES)
}

pub fn text_info(raw: &LimTextInfo) -> TextInfo {
    TextInfo {
        image_id: short(&raw.wsz_image_id),
        kind: short(&raw.wsz_type),
        group: short(&raw.wsz_group),
        sample_id: short(&raw.wsz_sample_id),
        author: short(&raw.wsz_author),
        description: narrow(&raw.wsz_description, LONG_TEXT_MAX_BYTES),
        capturing: narrow(&raw.wsz_capturing, LONG_TEXT_MAX_BYTES),
        sampling: short(&raw.wsz_sampling),
        location: short(&raw.wsz_location),
        date: short(&raw.wsz_date),
        conclusion: short(&raw.wsz_conclusion),
        info1: short(&raw.wsz_info1),
        info2: short(&raw.wsz_info2),
        optics: short(&raw.wsz_optics),
    }
}

pub fn experiment(raw: &LimExperiment) -> Experiment {
    let count = bounded_count(raw.ui_level_count, raw.p_allocated_levels.len(), "levels");
    Experiment {
        levels: raw.p_allocated_levels[..count]
            .iter()
            .map(|l| ExperimentLevel {
                kind: l.ui_exp_type.into(),
                loop_size: l.ui_loop_size,
                interval: l.d_interval,
            })
            .collect(),
    }
}

pub fn binaries(raw: &LimBinaries) -> Binaries {
    let count = bounded_count(raw.ui_count, raw.p_descriptors.len(), "binaries");
    Binaries {
        descriptors: raw.p_descriptors[..count]
            .iter()
            .map(|d| BinaryDescriptor {
                name: narrow_field(&d.wsz_name),
                comp_name: narrow_field(&d.wsz_comp_name),
                color_rgb: d.ui_color_rgb,
            })
            .collect(),
    }
}

pub fn local_metadata(raw: &LimLocalMetadata) -> LocalMetadata {
    LocalMetadata {
        time_msec: raw.d_time_msec,
        x: raw.d_x_pos,
        y: raw.d_y_pos,
        z: raw.d_z_pos,
    }
}

pub fn picture_geometry(raw: &LimPicture) -> PictureGeometry {
    PictureGeometry {
        width: raw.ui_width,
        height: raw.ui_height,
        bits_per_component: raw.ui_bits_per_comp,
        components: raw.ui_components,
        width_bytes: raw.ui_width_bytes,
        size: raw.ui_size,
    }
}
