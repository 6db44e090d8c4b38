//! ND2 file session lifecycle.
//!
//! An [`Nd2File`] owns everything the vendor hands out for one open file:
//! the file handle, the picture buffer allocated by `Lim_InitPicture` and the
//! experiment descriptor used for coordinate translation. Nothing is shared
//! between sessions, so two files can be open at once without clobbering each
//! other's buffers.

use crate::error::{Nd2Error, Nd2Result, Query};
use crate::loader::Nd2Library;
use crate::marshal;
use crate::raw::{
    zeroed_box, LimAttributes, LimBinaries, LimExperiment, LimFileHandle, LimLocalMetadata,
    LimMetadataDesc, LimPicture, LimResult, LimTextInfo,
};
use crate::sdk::ReadSdk;
use crate::wide::WideCString;
use lib_types::{
    Attributes, Binaries, Coords, Experiment, Frame, LocalMetadata, Metadata, PictureGeometry,
    SessionState, TextInfo, COORD_COUNT,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An open ND2 file.
///
/// # Thread Safety
///
/// Sessions are **not** thread-safe (`!Sync`). The vendor gives no guarantee
/// that one handle may be used from several threads, and the picture buffer
/// is mutated by every read. Every operation that touches vendor state takes
/// `&mut self`.
///
/// Sessions are not `Send` either: the picture holds the vendor's raw
/// buffer pointer. Open a separate session on each thread instead.
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<lib_nd2_ffi::Nd2File>();
/// ```
///
/// Dropping an open session destroys its picture and closes the file.
pub struct Nd2File<S: ReadSdk = Nd2Library> {
    sdk: Arc<S>,

    /// Handle from `Lim_FileOpenForRead`; never zero.
    handle: LimFileHandle,

    path: PathBuf,

    state: SessionState,

    /// Raw descriptor from the last successful `experiment()` call.
    experiment: Option<Box<LimExperiment>>,

    /// Live picture buffer from `init_picture()`.
    picture: Option<Box<LimPicture>>,

    /// Number of frames read successfully.
    frames_read: u64,

    _not_sync: std::marker::PhantomData<std::cell::Cell<()>>,
}

impl<S: ReadSdk> Nd2File<S> {
    /// Open a file for reading.
    ///
    /// The path is converted to a NUL-terminated wide string that lives only
    /// for the duration of the vendor call.
    ///
    /// # Errors
    ///
    /// * [`Nd2Error::InvalidArgument`] if the path contains NUL or cannot be
    ///   represented as a wide string
    /// * [`Nd2Error::OpenFailed`] if the vendor returns a zero handle
    pub fn open<P: AsRef<Path>>(sdk: Arc<S>, path: P) -> Nd2Result<Self> {
        let path = path.as_ref();
        let wide = WideCString::from_path(path)?;

        let handle = sdk.file_open_for_read(&wide);
        drop(wide);

        if handle == 0 {
            return Err(Nd2Error::OpenFailed {
                path: path.display().to_string(),
                code: handle,
            });
        }

        tracing::info!(path = %path.display(), handle, "Opened ND2 file");

        Ok(Self {
            sdk,
            handle,
            path: path.to_path_buf(),
            state: SessionState::Open,
            experiment: None,
            picture: None,
            frames_read: 0,
            _not_sync: std::marker::PhantomData,
        })
    }

    /// Vendor file handle.
    pub fn handle(&self) -> LimFileHandle {
        self.handle
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Close the file.
    ///
    /// Any live picture buffer is destroyed first. Closing a session that is
    /// already closed does nothing and returns `Ok`.
    pub fn close(&mut self) -> Nd2Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        self.destroy_picture();
        self.experiment = None;

        let code = self.sdk.file_close(self.handle);
        self.state = SessionState::Closed;

        if code != 0 {
            return Err(Nd2Error::CloseFailed { code });
        }

        tracing::debug!(
            path = %self.path.display(),
            frames_read = self.frames_read,
            "Lim_FileClose completed"
        );
        Ok(())
    }

    fn ensure_open(&self) -> Nd2Result<()> {
        if self.state != SessionState::Open {
            return Err(Nd2Error::invalid_state(SessionState::Open, self.state));
        }
        Ok(())
    }

    fn check(query: Query, code: LimResult) -> Nd2Result<()> {
        if code != 0 {
            return Err(Nd2Error::QueryFailed { query, code });
        }
        tracing::debug!(%query, "Query completed");
        Ok(())
    }

    /// Image dimensions, pixel format and frame count.
    pub fn attributes(&mut self) -> Nd2Result<Attributes> {
        self.ensure_open()?;
        let mut raw = zeroed_box::<LimAttributes>();
        let code = self.sdk.file_get_attributes(self.handle, &mut raw);
        Self::check(Query::Attributes, code)?;
        Ok(marshal::attributes(&raw))
    }

    /// Optical metadata and per-plane descriptors.
    pub fn metadata(&mut self) -> Nd2Result<Metadata> {
        self.ensure_open()?;
        let mut raw = zeroed_box::<LimMetadataDesc>();
        let code = self.sdk.file_get_metadata(self.handle, &mut raw);
        Self::check(Query::Metadata, code)?;
        Ok(marshal::metadata(&raw))
    }

    /// Free-text acquisition information.
    pub fn text_info(&mut self) -> Nd2Result<TextInfo> {
        self.ensure_open()?;
        let mut raw = zeroed_box::<LimTextInfo>();
        let code = self.sdk.file_get_text_info(self.handle, &mut raw);
        Self::check(Query::TextInfo, code)?;
        Ok(marshal::text_info(&raw))
    }

    /// Binary layer descriptors.
    pub fn binary_descriptors(&mut self) -> Nd2Result<Binaries> {
        self.ensure_open()?;
        let mut raw = zeroed_box::<LimBinaries>();
        let code = self.sdk.file_get_binary_descriptors(self.handle, &mut raw);
        Self::check(Query::BinaryDescriptors, code)?;
        Ok(marshal::binaries(&raw))
    }

    /// Experiment loop structure.
    ///
    /// On success the raw descriptor is kept in the session, replacing any
    /// earlier one, and used by the coordinate conversions. A failed query
    /// leaves the previous descriptor in place.
    pub fn experiment(&mut self) -> Nd2Result<Experiment> {
        self.ensure_open()?;
        let mut raw = zeroed_box::<LimExperiment>();
        let code = self.sdk.file_get_experiment(self.handle, &mut raw);
        Self::check(Query::Experiment, code)?;
        let experiment = marshal::experiment(&raw);
        self.experiment = Some(raw);
        Ok(experiment)
    }

    /// Whether `experiment()` has stored a descriptor.
    pub fn experiment_loaded(&self) -> bool {
        self.experiment.is_some()
    }

    /// Allocate the picture buffer through `Lim_InitPicture`.
    ///
    /// An existing buffer is destroyed first. Returns the byte size reported
    /// by the vendor.
    pub fn init_picture(
        &mut self,
        width: u32,
        height: u32,
        bits_per_component: u32,
        components: u32,
    ) -> Nd2Result<usize> {
        self.ensure_open()?;
        self.destroy_picture();

        let mut picture = zeroed_box::<LimPicture>();
        let size = self
            .sdk
            .init_picture(&mut picture, width, height, bits_per_component, components);

        tracing::debug!(
            width,
            height,
            bits_per_component,
            components,
            width_bytes = picture.ui_width_bytes,
            size,
            "Lim_InitPicture completed"
        );

        self.picture = Some(picture);
        Ok(size)
    }

    /// Geometry of the live picture buffer, if any.
    pub fn picture_geometry(&self) -> Option<PictureGeometry> {
        self.picture.as_deref().map(marshal::picture_geometry)
    }

    /// Release the picture buffer. Does nothing when there is none.
    pub fn destroy_picture(&mut self) {
        if let Some(mut picture) = self.picture.take() {
            self.sdk.destroy_picture(&mut picture);
            tracing::debug!("Lim_DestroyPicture completed");
        }
    }

    /// Sequence index of a 4-value coordinate.
    ///
    /// # Errors
    ///
    /// * [`Nd2Error::CoordinateCount`] unless `coords` has exactly 4 values
    /// * [`Nd2Error::ExperimentNotLoaded`] before a successful `experiment()`
    pub fn seq_index_from_coords(&mut self, coords: &[u32]) -> Nd2Result<u32> {
        let mut buf: Coords = coords
            .try_into()
            .map_err(|_| Nd2Error::CoordinateCount { len: coords.len() })?;
        let experiment = self
            .experiment
            .as_deref_mut()
            .ok_or(Nd2Error::ExperimentNotLoaded)?;
        Ok(self.sdk.seq_index_from_coords(experiment, &mut buf))
    }

    /// Coordinate of a sequence index.
    ///
    /// The index is passed to the vendor unchecked.
    pub fn coords_from_seq_index(&mut self, seq_index: u32) -> Nd2Result<Coords> {
        let experiment = self
            .experiment
            .as_deref_mut()
            .ok_or(Nd2Error::ExperimentNotLoaded)?;
        let mut coords: Coords = [0; COORD_COUNT];
        self.sdk
            .coords_from_seq_index(experiment, seq_index, &mut coords);
        Ok(coords)
    }

    /// Decode one frame into `dest`.
    ///
    /// `dest` must hold at least the picture size. The vendor may resize the
    /// picture while decoding; the size recorded after the call is what gets
    /// copied, and [`picture_geometry`](Self::picture_geometry) reports it.
    ///
    /// # Errors
    ///
    /// * [`Nd2Error::PictureNotInitialized`] without a live picture buffer
    /// * [`Nd2Error::BufferTooSmall`] if `dest` is shorter than the picture,
    ///   before or after decoding
    /// * [`Nd2Error::ImageDataFailed`] if the vendor reports a failure
    pub fn image_data(&mut self, seq_index: u32, dest: &mut [u8]) -> Nd2Result<LocalMetadata> {
        self.ensure_open()?;
        let required = self
            .picture
            .as_ref()
            .map(|p| p.ui_size)
            .ok_or(Nd2Error::PictureNotInitialized)?;
        if dest.len() < required {
            return Err(Nd2Error::BufferTooSmall {
                required,
                actual: dest.len(),
            });
        }

        self.decode(seq_index, |src| {
            if dest.len() < src.len() {
                return Err(Nd2Error::BufferTooSmall {
                    required: src.len(),
                    actual: dest.len(),
                });
            }
            dest[..src.len()].copy_from_slice(src);
            Ok(())
        })
    }

    /// Decode one frame into a new buffer of the picture size.
    pub fn frame(&mut self, seq_index: u32) -> Nd2Result<Frame> {
        let mut data = Vec::new();
        let local = self.decode(seq_index, |src| {
            data.extend_from_slice(src);
            Ok(())
        })?;
        Ok(Frame {
            seq_index,
            data,
            local,
        })
    }

    /// Run `Lim_FileGetImageData` and hand the decoded bytes to `sink`.
    fn decode<F>(&mut self, seq_index: u32, sink: F) -> Nd2Result<LocalMetadata>
    where
        F: FnOnce(&[u8]) -> Nd2Result<()>,
    {
        self.ensure_open()?;
        let picture = self
            .picture
            .as_deref_mut()
            .ok_or(Nd2Error::PictureNotInitialized)?;

        let mut local = LimLocalMetadata::default();
        let code = self
            .sdk
            .file_get_image_data(self.handle, seq_index, picture, &mut local);
        if code != 0 {
            return Err(Nd2Error::ImageDataFailed { seq_index, code });
        }

        // Re-read after the call: the vendor owns the buffer and its size.
        let size = picture.ui_size;
        if size > 0 && !picture.p_image_data.is_null() {
            // SAFETY: `p_image_data` and `ui_size` describe the buffer the
            // vendor holds for this picture right now, and it stays alive
            // until destroyed through this session.
            let src = unsafe {
                std::slice::from_raw_parts(picture.p_image_data as *const u8, size)
            };
            sink(src)?;
        } else {
            sink(&[])?;
        }

        self.frames_read += 1;
        tracing::trace!(seq_index, size, "Lim_FileGetImageData completed");

        Ok(marshal::local_metadata(&local))
    }
}

impl<S: ReadSdk> Drop for Nd2File<S> {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            // Best-effort close, log but don't propagate errors
            if let Err(e) = self.close() {
                tracing::warn!(error = %e, path = %self.path.display(), "Error during session cleanup");
            }
        }
    }
}
