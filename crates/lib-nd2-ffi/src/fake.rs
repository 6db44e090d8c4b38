//! In-memory [`ReadSdk`] used by the unit tests.
//!
//! Files are registered by path. Pictures are real heap allocations so a
//! leaked or double-freed buffer shows up in `live_pictures`.

use crate::raw::{
    LimAttributes, LimBinaries, LimExperiment, LimFileHandle, LimLocalMetadata, LimMetadataDesc,
    LimPicture, LimResult, LimSize, LimTextInfo, LimUint,
};
use crate::sdk::ReadSdk;
use crate::wide::{encode_into, WideCString};
use lib_types::{Coords, LoopKind};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::c_void;

pub const LIM_ERR_HANDLE: LimResult = -7;

/// Contents of one fake ND2 file.
#[derive(Clone, Debug)]
pub struct FakeFile {
    pub width: u32,
    pub height: u32,
    pub components: u32,
    pub bpc: u32,
    /// `(loop kind code, loop size)`, outermost first.
    pub levels: Vec<(u32, u32)>,
    pub objective: String,
    pub author: String,
    pub description: String,
    pub capturing: String,
    pub planes: Vec<String>,
    pub binaries: Vec<String>,
    /// Reported instead of the real plane count when set.
    pub plane_count_override: Option<u32>,
}

impl Default for FakeFile {
    fn default() -> Self {
        Self {
            width: 6,
            height: 4,
            components: 1,
            bpc: 12,
            levels: vec![(0, 3), (2, 2)],
            objective: "Plan Apo VC 60x Oil DIC N2".to_string(),
            author: "nikon".to_string(),
            description: "Metadata:\n\tDimensions: T(3) x Z(2)".to_string(),
            capturing: "Camera Name: Andor Zyla\nExposure: 100\nBinning: 1x1".to_string(),
            planes: vec!["DAPI".to_string()],
            binaries: vec!["Mask".to_string()],
            plane_count_override: None,
        }
    }
}

impl FakeFile {
    pub fn frame_count(&self) -> u32 {
        self.levels.iter().map(|&(_, n)| n).product()
    }

    /// Row stride padded to 4 bytes.
    pub fn width_bytes(width: u32, bpc: u32, components: u32) -> u32 {
        (width * components * bpc.div_ceil(8)).div_ceil(4) * 4
    }
}

#[derive(Default)]
pub struct FakeSdk {
    files: RefCell<HashMap<String, FakeFile>>,
    open: RefCell<HashMap<LimFileHandle, String>>,
    next_handle: Cell<LimFileHandle>,
    failures: RefCell<HashMap<&'static str, LimResult>>,
    live_pictures: Cell<usize>,
    close_calls: Cell<usize>,
    image_calls: Cell<usize>,
    resize_on_decode: Cell<Option<usize>>,
}

impl FakeSdk {
    pub fn new() -> Self {
        Self {
            next_handle: Cell::new(1),
            ..Default::default()
        }
    }

    pub fn with_file(path: &str, file: FakeFile) -> Self {
        let sdk = Self::new();
        sdk.add_file(path, file);
        sdk
    }

    pub fn add_file(&self, path: &str, file: FakeFile) {
        self.files.borrow_mut().insert(path.to_string(), file);
    }

    /// Make the named entry point return `code` from now on.
    pub fn fail(&self, function: &'static str, code: LimResult) {
        self.failures.borrow_mut().insert(function, code);
    }

    pub fn live_pictures(&self) -> usize {
        self.live_pictures.get()
    }

    pub fn open_files(&self) -> usize {
        self.open.borrow().len()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.get()
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.get()
    }

    /// Reallocate the picture buffer to `size` bytes on the next decode.
    pub fn resize_on_decode(&self, size: usize) {
        self.resize_on_decode.set(Some(size));
    }

    fn failure(&self, function: &'static str) -> Option<LimResult> {
        self.failures.borrow().get(function).copied()
    }

    fn file(&self, handle: LimFileHandle) -> Option<FakeFile> {
        let path = self.open.borrow().get(&handle).cloned()?;
        self.files.borrow().get(&path).cloned()
    }

    fn lookup(&self, function: &'static str, handle: LimFileHandle) -> Result<FakeFile, LimResult> {
        if let Some(code) = self.failure(function) {
            return Err(code);
        }
        self.file(handle).ok_or(LIM_ERR_HANDLE)
    }
}

fn alloc_buffer(size: usize) -> *mut c_void {
    Box::into_raw(vec![0u8; size].into_boxed_slice()) as *mut u8 as *mut c_void
}

fn strides(experiment: &LimExperiment) -> Vec<(usize, u32, u32)> {
    let count = (experiment.ui_level_count as usize).min(experiment.p_allocated_levels.len());
    let levels = &experiment.p_allocated_levels[..count];
    let mut out = Vec::with_capacity(count);
    let mut stride = 1u32;
    for level in levels.iter().rev() {
        if let Some(idx) = LoopKind::from(level.ui_exp_type).coord_index() {
            out.push((idx, level.ui_loop_size, stride));
        }
        stride = stride.saturating_mul(level.ui_loop_size);
    }
    out
}

impl ReadSdk for FakeSdk {
    fn file_open_for_read(&self, path: &WideCString) -> LimFileHandle {
        if self.failure("Lim_FileOpenForRead").is_some() {
            return 0;
        }
        let path = path.to_string_lossy();
        if !self.files.borrow().contains_key(&path) {
            return 0;
        }
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.open.borrow_mut().insert(handle, path);
        handle
    }

    fn file_close(&self, file: LimFileHandle) -> LimResult {
        self.close_calls.set(self.close_calls.get() + 1);
        if self.open.borrow_mut().remove(&file).is_none() {
            return LIM_ERR_HANDLE;
        }
        self.failure("Lim_FileClose").unwrap_or(0)
    }

    fn file_get_attributes(&self, file: LimFileHandle, out: &mut LimAttributes) -> LimResult {
        let f = match self.lookup("Lim_FileGetAttributes", file) {
            Ok(f) => f,
            Err(code) => {
                out.ui_width = 0xDEAD;
                return code;
            }
        };
        out.ui_width = f.width;
        out.ui_height = f.height;
        out.ui_comp = f.components;
        out.ui_bpc_in_memory = f.bpc.div_ceil(8) * 8;
        out.ui_bpc_significant = f.bpc;
        out.ui_width_bytes = FakeFile::width_bytes(f.width, f.bpc, f.components);
        out.ui_sequence_count = f.frame_count();
        out.ui_compression = 2;
        0
    }

    fn file_get_metadata(&self, file: LimFileHandle, out: &mut LimMetadataDesc) -> LimResult {
        let f = match self.lookup("Lim_FileGetMetadata", file) {
            Ok(f) => f,
            Err(code) => {
                out.ui_plane_count = u32::MAX;
                return code;
            }
        };
        out.d_calibration = 0.108;
        out.d_objective_mag = 60.0;
        out.d_objective_na = 1.4;
        encode_into(&f.objective, &mut out.wsz_objective_name);
        out.ui_component_count = f.components;
        for (plane, name) in out.p_planes.iter_mut().zip(&f.planes) {
            plane.ui_comp_count = 1;
            plane.ui_color_rgb = 0x00FF_0000;
            encode_into(name, &mut plane.wsz_name);
            plane.d_emission_wl = 460.0;
        }
        out.ui_plane_count = f
            .plane_count_override
            .unwrap_or(f.planes.len() as u32);
        0
    }

    fn file_get_text_info(&self, file: LimFileHandle, out: &mut LimTextInfo) -> LimResult {
        let f = match self.lookup("Lim_FileGetTextinfo", file) {
            Ok(f) => f,
            Err(code) => {
                encode_into("garbage", &mut out.wsz_author);
                return code;
            }
        };
        encode_into(&f.author, &mut out.wsz_author);
        encode_into(&f.description, &mut out.wsz_description);
        encode_into(&f.capturing, &mut out.wsz_capturing);
        0
    }

    fn file_get_experiment(&self, file: LimFileHandle, out: &mut LimExperiment) -> LimResult {
        let f = match self.lookup("Lim_FileGetExperiment", file) {
            Ok(f) => f,
            Err(code) => {
                out.ui_level_count = 99;
                return code;
            }
        };
        for (level, &(kind, size)) in out.p_allocated_levels.iter_mut().zip(&f.levels) {
            level.ui_exp_type = kind;
            level.ui_loop_size = size;
            level.d_interval = 100.0;
        }
        out.ui_level_count = f.levels.len() as u32;
        0
    }

    fn file_get_binary_descriptors(
        &self,
        file: LimFileHandle,
        out: &mut LimBinaries,
    ) -> LimResult {
        let f = match self.lookup("Lim_FileGetBinaryDescriptors", file) {
            Ok(f) => f,
            Err(code) => return code,
        };
        for (desc, name) in out.p_descriptors.iter_mut().zip(&f.binaries) {
            encode_into(name, &mut desc.wsz_name);
            encode_into("DAPI", &mut desc.wsz_comp_name);
            desc.ui_color_rgb = 0x0000_FF00;
        }
        out.ui_count = f.binaries.len() as u32;
        0
    }

    fn file_get_image_data(
        &self,
        file: LimFileHandle,
        seq_index: LimUint,
        picture: &mut LimPicture,
        local: &mut LimLocalMetadata,
    ) -> LimResult {
        self.image_calls.set(self.image_calls.get() + 1);
        let f = match self.lookup("Lim_FileGetImageData", file) {
            Ok(f) => f,
            Err(code) => return code,
        };
        if seq_index >= f.frame_count() || picture.p_image_data.is_null() {
            return -4;
        }
        if let Some(size) = self.resize_on_decode.take() {
            self.destroy_picture(picture);
            picture.ui_size = size;
            picture.p_image_data = alloc_buffer(size);
            self.live_pictures.set(self.live_pictures.get() + 1);
        }
        // SAFETY: the buffer was allocated by `init_picture` with `ui_size` bytes.
        let data = unsafe {
            std::slice::from_raw_parts_mut(picture.p_image_data as *mut u8, picture.ui_size)
        };
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = (seq_index as usize + i) as u8;
        }
        let seq = f64::from(seq_index);
        local.d_time_msec = seq * 100.0;
        local.d_x_pos = seq;
        local.d_y_pos = 2.0 * seq;
        local.d_z_pos = 3.0 * seq;
        0
    }

    fn init_picture(
        &self,
        picture: &mut LimPicture,
        width: LimUint,
        height: LimUint,
        bits_per_comp: LimUint,
        components: LimUint,
    ) -> LimSize {
        let width_bytes = FakeFile::width_bytes(width, bits_per_comp, components);
        let size = width_bytes as usize * height as usize;
        picture.ui_width = width;
        picture.ui_height = height;
        picture.ui_bits_per_comp = bits_per_comp;
        picture.ui_components = components;
        picture.ui_width_bytes = width_bytes;
        picture.ui_size = size;
        picture.p_image_data = alloc_buffer(size);
        self.live_pictures.set(self.live_pictures.get() + 1);
        size
    }

    fn destroy_picture(&self, picture: &mut LimPicture) {
        if picture.p_image_data.is_null() {
            return;
        }
        let raw = std::ptr::slice_from_raw_parts_mut(picture.p_image_data as *mut u8, picture.ui_size);
        // SAFETY: produced by `Box::into_raw` in `init_picture` with this length.
        drop(unsafe { Box::from_raw(raw) });
        picture.p_image_data = std::ptr::null_mut();
        picture.ui_size = 0;
        self.live_pictures.set(self.live_pictures.get() - 1);
    }

    fn seq_index_from_coords(
        &self,
        experiment: &mut LimExperiment,
        coords: &mut Coords,
    ) -> LimUint {
        strides(experiment)
            .into_iter()
            .map(|(idx, _, stride)| coords[idx] * stride)
            .sum()
    }

    fn coords_from_seq_index(
        &self,
        experiment: &mut LimExperiment,
        seq_index: LimUint,
        coords: &mut Coords,
    ) {
        *coords = [0; 4];
        for (idx, size, stride) in strides(experiment) {
            coords[idx] = (seq_index / stride) % size.max(1);
        }
    }
}
