//! The vendor entry points as a trait.
//!
//! [`Nd2File`](crate::Nd2File) talks to the SDK only through [`ReadSdk`].
//! [`Nd2Library`](crate::Nd2Library) forwards each method to the loaded
//! shared library; tests substitute an in-memory implementation.
//!
//! Methods take the raw `#[repr(C)]` structures and return raw vendor codes.
//! Nothing here interprets a status: that is the session's job.

use crate::raw::{
    LimAttributes, LimBinaries, LimExperiment, LimFileHandle, LimLocalMetadata, LimMetadataDesc,
    LimPicture, LimResult, LimSize, LimTextInfo, LimUint,
};
use crate::wide::WideCString;
use lib_types::Coords;

/// One method per `nd2ReadSDK` entry point.
pub trait ReadSdk {
    /// `Lim_FileOpenForRead`. Returns 0 on failure.
    fn file_open_for_read(&self, path: &WideCString) -> LimFileHandle;

    /// `Lim_FileClose`.
    fn file_close(&self, file: LimFileHandle) -> LimResult;

    /// `Lim_FileGetAttributes`.
    fn file_get_attributes(&self, file: LimFileHandle, out: &mut LimAttributes) -> LimResult;

    /// `Lim_FileGetMetadata`.
    fn file_get_metadata(&self, file: LimFileHandle, out: &mut LimMetadataDesc) -> LimResult;

    /// `Lim_FileGetTextinfo`.
    fn file_get_text_info(&self, file: LimFileHandle, out: &mut LimTextInfo) -> LimResult;

    /// `Lim_FileGetExperiment`.
    fn file_get_experiment(&self, file: LimFileHandle, out: &mut LimExperiment) -> LimResult;

    /// `Lim_FileGetBinaryDescriptors`.
    fn file_get_binary_descriptors(&self, file: LimFileHandle, out: &mut LimBinaries)
        -> LimResult;

    /// `Lim_FileGetImageData`. Decodes one frame into `picture`.
    fn file_get_image_data(
        &self,
        file: LimFileHandle,
        seq_index: LimUint,
        picture: &mut LimPicture,
        local: &mut LimLocalMetadata,
    ) -> LimResult;

    /// `Lim_InitPicture`. Allocates the pixel buffer; returns its byte size.
    fn init_picture(
        &self,
        picture: &mut LimPicture,
        width: LimUint,
        height: LimUint,
        bits_per_comp: LimUint,
        components: LimUint,
    ) -> LimSize;

    /// `Lim_DestroyPicture`. Frees the pixel buffer.
    fn destroy_picture(&self, picture: &mut LimPicture);

    /// `Lim_GetSeqIndexFromCoords`.
    fn seq_index_from_coords(&self, experiment: &mut LimExperiment, coords: &mut Coords)
        -> LimUint;

    /// `Lim_GetCoordsFromSeqIndex`. Writes four coordinates.
    fn coords_from_seq_index(
        &self,
        experiment: &mut LimExperiment,
        seq_index: LimUint,
        coords: &mut Coords,
    );
}
