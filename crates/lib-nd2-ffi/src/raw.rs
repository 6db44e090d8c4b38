//! `#[repr(C)]` mirrors of the `nd2ReadSDK.h` structures and entry points.
//!
//! Field order and array capacities must match the vendor header exactly.
//! All structures are plain old data; an all-zero value is valid for each.

#![allow(missing_docs)]

use crate::wide::WChar;
use bytemuck::Zeroable;
use std::ffi::{c_int, c_uint, c_void};

pub use lib_types::{MAX_BINARIES, MAX_EXPERIMENT_LEVELS, MAX_PICTURE_PLANES};
use lib_types::{LONG_TEXT_MAX_BYTES, SHORT_TEXT_MAX_BYTES};

/// `LIMFILEHANDLE`; zero means the open failed.
pub type LimFileHandle = c_int;

/// `LIMRESULT`; zero means success.
pub type LimResult = c_int;

/// `LIMUINT`.
pub type LimUint = c_uint;

/// `LIMSIZE`.
pub type LimSize = usize;

/// Capacity of a short `LIMWSTR` field, terminator included.
pub const LIM_STR_CAPACITY: usize = SHORT_TEXT_MAX_BYTES + 1;

/// Capacity of a long text field, terminator included.
pub const LIM_LONG_STR_CAPACITY: usize = LONG_TEXT_MAX_BYTES + 1;

const _: () = assert!(LIM_STR_CAPACITY == 256 && LIM_LONG_STR_CAPACITY == 4096);

pub type LimStr = [WChar; LIM_STR_CAPACITY];
pub type LimLongStr = [WChar; LIM_LONG_STR_CAPACITY];

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Zeroable)]
pub struct LimAttributes {
    pub ui_width: LimUint,
    pub ui_width_bytes: LimUint,
    pub ui_height: LimUint,
    pub ui_comp: LimUint,
    pub ui_bpc_in_memory: LimUint,
    pub ui_bpc_significant: LimUint,
    pub ui_sequence_count: LimUint,
    pub ui_tile_width: LimUint,
    pub ui_tile_height: LimUint,
    pub ui_compression: LimUint,
    pub ui_quality: LimUint,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct LimPicturePlaneDesc {
    pub ui_comp_count: LimUint,
    pub ui_color_rgb: LimUint,
    pub wsz_name: LimStr,
    pub wsz_oc_name: LimStr,
    pub d_emission_wl: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct LimMetadataDesc {
    pub d_time_start: f64,
    pub d_angle: f64,
    pub d_calibration: f64,
    pub d_aspect: f64,
    pub wsz_objective_name: LimStr,
    pub d_objective_mag: f64,
    pub d_objective_na: f64,
    pub d_refract_index1: f64,
    pub d_refract_index2: f64,
    pub d_pinhole_radius: f64,
    pub d_zoom: f64,
    pub d_projective_mag: f64,
    pub ui_image_type: LimUint,
    pub ui_plane_count: LimUint,
    pub ui_component_count: LimUint,
    pub p_planes: [LimPicturePlaneDesc; MAX_PICTURE_PLANES],
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct LimTextInfo {
    pub wsz_image_id: LimStr,
    pub wsz_type: LimStr,
    pub wsz_group: LimStr,
    pub wsz_sample_id: LimStr,
    pub wsz_author: LimStr,
    pub wsz_description: LimLongStr,
    pub wsz_capturing: LimLongStr,
    pub wsz_sampling: LimStr,
    pub wsz_location: LimStr,
    pub wsz_date: LimStr,
    pub wsz_conclusion: LimStr,
    pub wsz_info1: LimStr,
    pub wsz_info2: LimStr,
    pub wsz_optics: LimStr,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Zeroable)]
pub struct LimExperimentLevel {
    pub ui_exp_type: LimUint,
    pub ui_loop_size: LimUint,
    pub d_interval: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Zeroable)]
pub struct LimExperiment {
    pub ui_level_count: LimUint,
    pub p_allocated_levels: [LimExperimentLevel; MAX_EXPERIMENT_LEVELS],
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct LimBinaryDescriptor {
    pub wsz_name: LimStr,
    pub wsz_comp_name: LimStr,
    pub ui_color_rgb: LimUint,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct LimBinaries {
    pub ui_count: LimUint,
    pub p_descriptors: [LimBinaryDescriptor; MAX_BINARIES],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Zeroable)]
pub struct LimLocalMetadata {
    pub d_time_msec: f64,
    pub d_x_pos: f64,
    pub d_y_pos: f64,
    pub d_z_pos: f64,
}

/// `LIMPICTURE`. `p_image_data` is allocated and freed by the vendor.
#[repr(C)]
#[derive(Debug, Zeroable)]
pub struct LimPicture {
    pub ui_width: LimUint,
    pub ui_height: LimUint,
    pub ui_bits_per_comp: LimUint,
    pub ui_components: LimUint,
    pub ui_width_bytes: LimUint,
    pub ui_size: LimSize,
    pub p_image_data: *mut c_void,
}

/// `LIMFILEHANDLE Lim_FileOpenForRead(LIMCWSTR wszFileName)`
pub type FileOpenForReadFn = unsafe extern "C" fn(file_name: *const WChar) -> LimFileHandle;

/// `LIMRESULT Lim_FileClose(LIMFILEHANDLE hFile)`
pub type FileCloseFn = unsafe extern "C" fn(file: LimFileHandle) -> LimResult;

/// `LIMRESULT Lim_FileGetAttributes(LIMFILEHANDLE, LIMATTRIBUTES*)`
pub type FileGetAttributesFn =
    unsafe extern "C" fn(file: LimFileHandle, attributes: *mut LimAttributes) -> LimResult;

/// `LIMRESULT Lim_FileGetMetadata(LIMFILEHANDLE, LIMMETADATA_DESC*)`
pub type FileGetMetadataFn =
    unsafe extern "C" fn(file: LimFileHandle, metadata: *mut LimMetadataDesc) -> LimResult;

/// `LIMRESULT Lim_FileGetTextinfo(LIMFILEHANDLE, LIMTEXTINFO*)`
pub type FileGetTextinfoFn =
    unsafe extern "C" fn(file: LimFileHandle, text_info: *mut LimTextInfo) -> LimResult;

/// `LIMRESULT Lim_FileGetExperiment(LIMFILEHANDLE, LIMEXPERIMENT*)`
pub type FileGetExperimentFn =
    unsafe extern "C" fn(file: LimFileHandle, experiment: *mut LimExperiment) -> LimResult;

/// `LIMRESULT Lim_FileGetBinaryDescriptors(LIMFILEHANDLE, LIMBINARIES*)`
pub type FileGetBinaryDescriptorsFn =
    unsafe extern "C" fn(file: LimFileHandle, binaries: *mut LimBinaries) -> LimResult;

/// `LIMRESULT Lim_FileGetImageData(LIMFILEHANDLE, LIMUINT, LIMPICTURE*, LIMLOCALMETADATA*)`
pub type FileGetImageDataFn = unsafe extern "C" fn(
    file: LimFileHandle,
    seq_index: LimUint,
    picture: *mut LimPicture,
    local: *mut LimLocalMetadata,
) -> LimResult;

/// `LIMSIZE Lim_InitPicture(LIMPICTURE*, LIMUINT, LIMUINT, LIMUINT, LIMUINT)`
pub type InitPictureFn = unsafe extern "C" fn(
    picture: *mut LimPicture,
    width: LimUint,
    height: LimUint,
    bits_per_comp: LimUint,
    components: LimUint,
) -> LimSize;

/// `void Lim_DestroyPicture(LIMPICTURE*)`
pub type DestroyPictureFn = unsafe extern "C" fn(picture: *mut LimPicture);

/// `LIMUINT Lim_GetSeqIndexFromCoords(LIMEXPERIMENT*, LIMUINT*)`
pub type GetSeqIndexFromCoordsFn =
    unsafe extern "C" fn(experiment: *mut LimExperiment, coords: *mut LimUint) -> LimUint;

/// `void Lim_GetCoordsFromSeqIndex(LIMEXPERIMENT*, LIMUINT, LIMUINT*)`
pub type GetCoordsFromSeqIndexFn =
    unsafe extern "C" fn(experiment: *mut LimExperiment, seq_index: LimUint, coords: *mut LimUint);

/// Allocate an all-zero structure on the heap.
///
/// The metadata and binaries structures are hundreds of kilobytes, so they
/// never live on the stack.
pub fn zeroed_box<T: Zeroable>() -> Box<T> {
    bytemuck::allocation::zeroed_box()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_layout_sizes() {
        let w = size_of::<WChar>();
        assert_eq!(size_of::<LimAttributes>(), 11 * 4);
        assert_eq!(size_of::<LimLocalMetadata>(), 32);
        assert_eq!(size_of::<LimExperimentLevel>(), 16);
        assert_eq!(size_of::<LimExperiment>(), 8 + 8 * 16);
        assert_eq!(size_of::<LimTextInfo>(), (12 * 256 + 2 * 4096) * w);
        assert_eq!(size_of::<LimBinaryDescriptor>() % 4, 0);
        assert!(size_of::<LimBinaryDescriptor>() >= 2 * 256 * w + 4);
    }

    #[test]
    fn test_zeroed_box() {
        let meta = zeroed_box::<LimMetadataDesc>();
        assert_eq!(meta.ui_plane_count, 0);
        assert!(meta.p_planes.iter().all(|p| p.wsz_name[0] == 0));

        let picture = zeroed_box::<LimPicture>();
        assert!(picture.p_image_data.is_null());
    }
}
