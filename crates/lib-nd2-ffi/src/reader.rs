//! One-call document reader.
//!
//! [`Nd2Document`] opens a file and runs every query up front, so callers
//! get the complete metadata and a ready picture buffer from one call.

use crate::error::{Nd2Error, Nd2Result};
use crate::lifecycle::Nd2File;
use crate::loader::Nd2Library;
use crate::sdk::ReadSdk;
use lib_types::{
    summarize, Attributes, Binaries, Coords, Dimensions, Experiment, Frame, Metadata,
    MetadataSummary, PictureGeometry, TextInfo,
};
use std::path::Path;
use std::sync::Arc;

/// A fully initialized ND2 file.
pub struct Nd2Document<S: ReadSdk = Nd2Library> {
    file: Nd2File<S>,
    attributes: Attributes,
    text_info: TextInfo,
    metadata: Metadata,
    experiment: Experiment,
    binaries: Binaries,
    dimensions: Dimensions,
}

impl<S: ReadSdk> Nd2Document<S> {
    /// Open `path` and load all of its metadata.
    ///
    /// Queries run in the order attributes, text info, metadata, experiment,
    /// binaries. The picture buffer is then sized from the attributes. Any
    /// failure closes the file and is returned as is.
    pub fn open<P: AsRef<Path>>(sdk: Arc<S>, path: P) -> Nd2Result<Self> {
        let mut file = Nd2File::open(sdk, path)?;

        let attributes = file.attributes()?;
        let text_info = file.text_info()?;
        let metadata = file.metadata()?;
        let experiment = file.experiment()?;
        let binaries = file.binary_descriptors()?;
        let dimensions = Dimensions::derive(attributes.components, &experiment);

        file.init_picture(
            attributes.width,
            attributes.height,
            attributes.bpc_in_memory,
            attributes.components,
        )?;

        tracing::info!(
            path = %file.path().display(),
            width = attributes.width,
            height = attributes.height,
            sequence_count = attributes.sequence_count,
            channels = dimensions.channels,
            slices = dimensions.slices,
            frames = dimensions.frames,
            "Loaded ND2 document"
        );

        Ok(Self {
            file,
            attributes,
            text_info,
            metadata,
            experiment,
            binaries,
            dimensions,
        })
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn text_info(&self) -> &TextInfo {
        &self.text_info
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    pub fn binaries(&self) -> &Binaries {
        &self.binaries
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn picture_geometry(&self) -> Option<PictureGeometry> {
        self.file.picture_geometry()
    }

    /// The underlying session, for calls not covered here.
    pub fn file_mut(&mut self) -> &mut Nd2File<S> {
        &mut self.file
    }

    /// Decode the frame at `seq_index`.
    ///
    /// Indices at or past the sequence count are rejected without calling
    /// the vendor.
    pub fn seq_bytes(&mut self, seq_index: u32) -> Nd2Result<Frame> {
        let count = self.attributes.sequence_count;
        if seq_index >= count {
            return Err(Nd2Error::SequenceOutOfRange {
                index: seq_index,
                count,
            });
        }
        self.file.frame(seq_index)
    }

    pub fn seq_index_from_coords(&mut self, coords: &[u32]) -> Nd2Result<u32> {
        self.file.seq_index_from_coords(coords)
    }

    pub fn coords_from_seq_index(&mut self, seq_index: u32) -> Nd2Result<Coords> {
        self.file.coords_from_seq_index(seq_index)
    }

    /// Flattened key/value view of every loaded record.
    pub fn summary(&self) -> MetadataSummary {
        summarize(
            &self.attributes,
            &self.metadata,
            &self.text_info,
            &self.experiment,
            &self.binaries,
        )
    }

    /// Release the picture buffer and close the file.
    pub fn close(mut self) -> Nd2Result<()> {
        self.file.close()
    }
}
