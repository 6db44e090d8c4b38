//! Report formatting and writing.

use crate::OutputFormat;
use anyhow::Result;
use lib_types::{Coords, Dimensions, LocalMetadata, MetadataSummary, PictureGeometry};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Everything `nd2 info` prints.
#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub path: String,
    pub dimensions: Dimensions,
    pub picture: Option<PictureGeometry>,
    pub summary: MetadataSummary,
}

/// One coordinate conversion.
#[derive(Debug, Serialize)]
pub struct CoordsReport {
    pub seq_index: u32,
    pub coords: Coords,
}

/// One decoded frame.
#[derive(Debug, Serialize)]
pub struct FrameRow {
    pub seq_index: u32,
    pub coords: Coords,
    pub local: LocalMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Quote a CSV field when it needs it.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn join_coords(coords: &Coords, sep: &str) -> String {
    coords
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Write the file summary.
pub fn write_info<W: Write>(w: &mut W, report: &InfoReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(w, "ND2 File: {}", report.path)?;
            writeln!(w, "==========")?;
            let d = &report.dimensions;
            writeln!(
                w,
                "Dimensions: {} channel(s) x {} slice(s) x {} frame(s)",
                d.channels, d.slices, d.frames
            )?;
            if let Some(p) = &report.picture {
                writeln!(
                    w,
                    "Picture:    {}x{} px, {} component(s), {} bpc, {} bytes/row, {} bytes",
                    p.width, p.height, p.components, p.bits_per_component, p.width_bytes, p.size
                )?;
            }
            writeln!(w)?;
            writeln!(w, "Metadata:")?;
            let width = report.summary.keys().map(String::len).max().unwrap_or(0);
            for (key, value) in &report.summary {
                writeln!(w, "  {:<width$}  {}", key, value)?;
            }
        }
        OutputFormat::Json => {
            writeln!(w, "{}", serde_json::to_string_pretty(report)?)?;
        }
        OutputFormat::Csv => {
            writeln!(w, "key,value")?;
            for (key, value) in &report.summary {
                writeln!(w, "{},{}", csv_field(key), csv_field(&value.to_string()))?;
            }
        }
    }
    Ok(())
}

/// Write a coordinate conversion.
pub fn write_coords<W: Write>(w: &mut W, report: &CoordsReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(w, "Sequence index: {}", report.seq_index)?;
            writeln!(w, "Coordinates:    [{}] (T, M, Z, O)", join_coords(&report.coords, ", "))?;
        }
        OutputFormat::Json => {
            writeln!(w, "{}", serde_json::to_string_pretty(report)?)?;
        }
        OutputFormat::Csv => {
            writeln!(w, "seq_index,t,m,z,o")?;
            writeln!(w, "{},{}", report.seq_index, join_coords(&report.coords, ","))?;
        }
    }
    Ok(())
}

/// Write per-frame timestamps and stage positions.
pub fn write_frames<W: Write>(w: &mut W, rows: &[FrameRow], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(
                w,
                "{:>8}  {:<16}  {:>12}  {:>12}  {:>12}  {:>12}",
                "seq", "coords", "time (s)", "x", "y", "z"
            )?;
            for row in rows {
                writeln!(
                    w,
                    "{:>8}  {:<16}  {:>12.3}  {:>12.3}  {:>12.3}  {:>12.3}",
                    row.seq_index,
                    join_coords(&row.coords, ","),
                    row.local.time_seconds(),
                    row.local.x,
                    row.local.y,
                    row.local.z
                )?;
            }
        }
        OutputFormat::Json => {
            writeln!(w, "{}", serde_json::to_string_pretty(rows)?)?;
        }
        OutputFormat::Csv => {
            writeln!(w, "seq_index,t,m,z,o,time_s,x,y,z,file")?;
            for row in rows {
                let file = row
                    .file
                    .as_ref()
                    .map(|p| csv_field(&p.display().to_string()))
                    .unwrap_or_default();
                writeln!(
                    w,
                    "{},{},{},{},{},{},{}",
                    row.seq_index,
                    join_coords(&row.coords, ","),
                    row.local.time_seconds(),
                    row.local.x,
                    row.local.y,
                    row.local.z,
                    file
                )?;
            }
        }
    }
    Ok(())
}
