//! Dynamic loading of the nd2ReadSDK shared library.
//!
//! This module locates the vendor library, loads it and extracts every
//! `Lim_*` entry point the bindings use.

use crate::error::{Nd2Error, Nd2Result};
use crate::raw::{
    DestroyPictureFn, FileCloseFn, FileGetAttributesFn, FileGetBinaryDescriptorsFn,
    FileGetExperimentFn, FileGetImageDataFn, FileGetMetadataFn, FileGetTextinfoFn,
    FileOpenForReadFn, GetCoordsFromSeqIndexFn, GetSeqIndexFromCoordsFn, InitPictureFn,
    LimAttributes, LimBinaries, LimExperiment, LimFileHandle, LimLocalMetadata, LimMetadataDesc,
    LimPicture, LimResult, LimSize, LimTextInfo, LimUint,
};
use crate::sdk::ReadSdk;
use crate::wide::WideCString;
use lib_types::Coords;
use libloading::Library;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming the vendor library to load.
pub const LIBRARY_ENV: &str = "ND2SDK_LIBRARY";

/// Loaded nd2ReadSDK library with extracted function pointers.
pub struct Nd2Library {
    /// Keeps the function pointers below valid.
    #[allow(dead_code)]
    library: Library,

    /// Path to the library file.
    pub path: String,

    open_for_read: FileOpenForReadFn,
    close: FileCloseFn,
    get_attributes: FileGetAttributesFn,
    get_metadata: FileGetMetadataFn,
    get_text_info: FileGetTextinfoFn,
    get_experiment: FileGetExperimentFn,
    get_binary_descriptors: FileGetBinaryDescriptorsFn,
    get_image_data: FileGetImageDataFn,
    init_picture: InitPictureFn,
    destroy_picture: DestroyPictureFn,
    seq_index_from_coords: GetSeqIndexFromCoordsFn,
    coords_from_seq_index: GetCoordsFromSeqIndexFn,
}

/// Copy one function pointer out of the library.
///
/// # Safety
///
/// `T` must be the exact function-pointer type of the exported symbol.
unsafe fn symbol<T: Copy>(library: &Library, name: &str) -> Nd2Result<T> {
    // SAFETY: upheld by the caller
    unsafe {
        library
            .get::<T>(name.as_bytes())
            .map(|s| *s)
            .map_err(|_| Nd2Error::symbol_not_found(name))
    }
}

impl Nd2Library {
    /// Load the SDK from a shared library file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the `.dll`, `.so` or `.dylib` file
    ///
    /// Every entry point is required; a missing one fails the load.
    pub fn load<P: AsRef<Path>>(path: P) -> Nd2Result<Arc<Self>> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let format = LibraryFormat::from_path(path);
        if format != LibraryFormat::Unknown && format != LibraryFormat::native() {
            tracing::warn!(path = %path_str, ?format, "Library format does not match this platform");
        }

        // Loading runs the library's initializers; the vendor SDK is trusted here.
        let library =
            unsafe { Library::new(path) }.map_err(|e| Nd2Error::load_error(&path_str, e))?;

        // SAFETY: each type alias mirrors the declaration in nd2ReadSDK.h
        let lib = unsafe {
            Self {
                open_for_read: symbol(&library, "Lim_FileOpenForRead")?,
                close: symbol(&library, "Lim_FileClose")?,
                get_attributes: symbol(&library, "Lim_FileGetAttributes")?,
                get_metadata: symbol(&library, "Lim_FileGetMetadata")?,
                get_text_info: symbol(&library, "Lim_FileGetTextinfo")?,
                get_experiment: symbol(&library, "Lim_FileGetExperiment")?,
                get_binary_descriptors: symbol(&library, "Lim_FileGetBinaryDescriptors")?,
                get_image_data: symbol(&library, "Lim_FileGetImageData")?,
                init_picture: symbol(&library, "Lim_InitPicture")?,
                destroy_picture: symbol(&library, "Lim_DestroyPicture")?,
                seq_index_from_coords: symbol(&library, "Lim_GetSeqIndexFromCoords")?,
                coords_from_seq_index: symbol(&library, "Lim_GetCoordsFromSeqIndex")?,
                library,
                path: path_str,
            }
        };

        tracing::info!(path = %lib.path, "Loaded nd2ReadSDK library");

        Ok(Arc::new(lib))
    }

    /// Load from an explicit path, `ND2SDK_LIBRARY`, or the platform default name.
    pub fn locate_and_load(explicit: Option<&Path>) -> Nd2Result<Arc<Self>> {
        Self::load(locate(explicit))
    }
}

// SAFETY (all methods): the function pointers come from the loaded SDK and
// every pointer argument is derived from a live Rust reference of the
// matching `#[repr(C)]` type. What the SDK does with an invalid handle is
// the vendor's contract.
impl ReadSdk for Nd2Library {
    fn file_open_for_read(&self, path: &WideCString) -> LimFileHandle {
        unsafe { (self.open_for_read)(path.as_ptr()) }
    }

    fn file_close(&self, file: LimFileHandle) -> LimResult {
        unsafe { (self.close)(file) }
    }

    fn file_get_attributes(&self, file: LimFileHandle, out: &mut LimAttributes) -> LimResult {
        unsafe { (self.get_attributes)(file, out) }
    }

    fn file_get_metadata(&self, file: LimFileHandle, out: &mut LimMetadataDesc) -> LimResult {
        unsafe { (self.get_metadata)(file, out) }
    }

    fn file_get_text_info(&self, file: LimFileHandle, out: &mut LimTextInfo) -> LimResult {
        unsafe { (self.get_text_info)(file, out) }
    }

    fn file_get_experiment(&self, file: LimFileHandle, out: &mut LimExperiment) -> LimResult {
        unsafe { (self.get_experiment)(file, out) }
    }

    fn file_get_binary_descriptors(
        &self,
        file: LimFileHandle,
        out: &mut LimBinaries,
    ) -> LimResult {
        unsafe { (self.get_binary_descriptors)(file, out) }
    }

    fn file_get_image_data(
        &self,
        file: LimFileHandle,
        seq_index: LimUint,
        picture: &mut LimPicture,
        local: &mut LimLocalMetadata,
    ) -> LimResult {
        unsafe { (self.get_image_data)(file, seq_index, picture, local) }
    }

    fn init_picture(
        &self,
        picture: &mut LimPicture,
        width: LimUint,
        height: LimUint,
        bits_per_comp: LimUint,
        components: LimUint,
    ) -> LimSize {
        unsafe { (self.init_picture)(picture, width, height, bits_per_comp, components) }
    }

    fn destroy_picture(&self, picture: &mut LimPicture) {
        unsafe { (self.destroy_picture)(picture) }
    }

    fn seq_index_from_coords(
        &self,
        experiment: &mut LimExperiment,
        coords: &mut Coords,
    ) -> LimUint {
        unsafe { (self.seq_index_from_coords)(experiment, coords.as_mut_ptr()) }
    }

    fn coords_from_seq_index(
        &self,
        experiment: &mut LimExperiment,
        seq_index: LimUint,
        coords: &mut Coords,
    ) {
        unsafe { (self.coords_from_seq_index)(experiment, seq_index, coords.as_mut_ptr()) }
    }
}

/// Resolve which library file to load.
///
/// Precedence: `explicit`, then the `ND2SDK_LIBRARY` environment variable,
/// then [`default_library_name`] (resolved by the platform loader's search path).
pub fn locate(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var_os(LIBRARY_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(default_library_name()),
    }
}

/// Platform file name of the vendor library.
pub fn default_library_name() -> &'static str {
    match LibraryFormat::native() {
        LibraryFormat::Dll => "nd2ReadSDK.dll",
        LibraryFormat::Dylib => "libnd2ReadSDK.dylib",
        LibraryFormat::So | LibraryFormat::Unknown => "libnd2ReadSDK.so",
    }
}

/// Platform-specific library format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryFormat {
    /// Windows DLL.
    Dll,
    /// Linux/Unix shared object.
    So,
    /// macOS dynamic library.
    Dylib,
    /// Unknown format.
    Unknown,
}

impl LibraryFormat {
    /// Detect format from file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("dll") | Some("DLL") => Self::Dll,
            Some("so") => Self::So,
            Some("dylib") => Self::Dylib,
            _ => Self::Unknown,
        }
    }

    /// Get the default format for the current platform.
    #[cfg(target_os = "windows")]
    pub fn native() -> Self {
        Self::Dll
    }

    #[cfg(target_os = "macos")]
    pub fn native() -> Self {
        Self::Dylib
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    pub fn native() -> Self {
        Self::So
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_format_detection() {
        assert_eq!(LibraryFormat::from_path("nd2ReadSDK.dll"), LibraryFormat::Dll);
        assert_eq!(LibraryFormat::from_path("libnd2ReadSDK.so"), LibraryFormat::So);
        assert_eq!(
            LibraryFormat::from_path("libnd2ReadSDK.dylib"),
            LibraryFormat::Dylib
        );
        assert_eq!(LibraryFormat::from_path("sdk.txt"), LibraryFormat::Unknown);
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = locate(Some(Path::new("/opt/nd2/libnd2ReadSDK.so")));
        assert_eq!(path, PathBuf::from("/opt/nd2/libnd2ReadSDK.so"));
    }

    #[test]
    fn test_default_name_matches_platform() {
        let name = default_library_name();
        assert_eq!(LibraryFormat::from_path(name), LibraryFormat::native());
    }

    #[test]
    fn test_missing_library_is_load_error() {
        let err = Nd2Library::load("/nonexistent/libnd2ReadSDK.so")
            .err()
            .expect("load must fail");
        assert!(matches!(err, Nd2Error::LoadError { .. }));
    }
}
