//! Frame export.
//!
//! Walks a range of sequence indices, decodes each frame and optionally
//! writes the raw picture bytes to `frame_<seq>.raw`.

use crate::output::FrameRow;
use anyhow::{Context, Result};
use lib_nd2_ffi::{Nd2Document, ReadSdk};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Sequence indices covered by `start` and `count`, clipped to the file.
pub fn frame_range(start: u32, count: Option<u32>, sequence_count: u32) -> Range<u32> {
    let start = start.min(sequence_count);
    let end = match count {
        Some(n) => start.saturating_add(n).min(sequence_count),
        None => sequence_count,
    };
    start..end
}

/// File name for a raw frame dump.
pub fn frame_file_name(seq_index: u32) -> String {
    format!("frame_{seq_index}.raw")
}

/// Write one frame's bytes into `dir`.
pub fn write_frame_file(dir: &Path, seq_index: u32, data: &[u8]) -> Result<PathBuf> {
    let path = dir.join(frame_file_name(seq_index));
    std::fs::write(&path, data).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

/// Decode frames and collect their metadata.
pub struct FrameExporter<'a, S: ReadSdk> {
    document: &'a mut Nd2Document<S>,
    output_dir: Option<PathBuf>,
}

impl<'a, S: ReadSdk> FrameExporter<'a, S> {
    pub fn new(document: &'a mut Nd2Document<S>, output_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &output_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        }
        Ok(Self {
            document,
            output_dir,
        })
    }

    /// Export every frame in `range`.
    pub fn run(&mut self, range: Range<u32>) -> Result<Vec<FrameRow>> {
        let mut rows = Vec::with_capacity(range.len());

        for seq_index in range {
            let frame = self
                .document
                .seq_bytes(seq_index)
                .with_context(|| format!("Failed to read frame {seq_index}"))?;
            let coords = self.document.coords_from_seq_index(seq_index)?;

            let file = match &self.output_dir {
                Some(dir) => Some(write_frame_file(dir, seq_index, &frame.data)?),
                None => None,
            };

            tracing::debug!(seq_index, bytes = frame.data.len(), "Exported frame");

            rows.push(FrameRow {
                seq_index,
                coords,
                local: frame.local,
                file,
            });
        }

        if let Some(dir) = &self.output_dir {
            tracing::info!("Wrote {} frame(s) to {:?}", rows.len(), dir);
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_range() {
        assert_eq!(frame_range(0, None, 6), 0..6);
        assert_eq!(frame_range(2, Some(3), 6), 2..5);
        assert_eq!(frame_range(4, Some(10), 6), 4..6);
        assert_eq!(frame_range(9, Some(1), 6), 6..6);
        assert_eq!(frame_range(1, Some(u32::MAX), 6), 1..6);
    }

    #[test]
    fn test_frame_file_written() {
        let dir = std::env::temp_dir().join(format!("nd2-cli-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = write_frame_file(&dir, 12, &[1, 2, 3]).unwrap();
        assert_eq!(path.file_name().unwrap(), "frame_12.raw");
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
