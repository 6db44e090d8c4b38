//! Flattened, ordered view of every metadata record of a file.

use crate::attributes::Attributes;
use crate::binaries::Binaries;
use crate::experiment::Experiment;
use crate::metadata::Metadata;
use crate::text_info::TextInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single summary value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Render a double the way the ND2 tooling prints it: `460.0`, `1.0E7`,
/// `NaN`, `-Infinity`.
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let abs = v.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        let s = v.to_string();
        if s.contains('.') {
            s
        } else {
            format!("{s}.0")
        }
    } else {
        let s = format!("{v:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) if mantissa.contains('.') => format!("{mantissa}E{exp}"),
            Some((mantissa, exp)) => format!("{mantissa}.0E{exp}"),
            None => s,
        }
    }
}

/// Parse a double, accepting `NaN` and `Infinity` but not `inf` or `nan`.
fn parse_double(s: &str) -> Option<f64> {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    match unsigned {
        "NaN" | "Infinity" => s.parse().ok(),
        _ if unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') => s.parse().ok(),
        _ => None,
    }
}

impl MetadataValue {
    /// Integer if `s` parses as a 32-bit integer, else float, else text.
    pub fn parse(s: &str) -> Self {
        if let Ok(i) = s.parse::<i32>() {
            Self::Int(i64::from(i))
        } else if let Some(f) = parse_double(s) {
            Self::Float(f)
        } else {
            Self::Text(s.to_string())
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_double(*v)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u32> for MetadataValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<usize> for MetadataValue {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Sorted map of every metadata field, keyed by the vendor field names.
pub type MetadataSummary = BTreeMap<String, MetadataValue>;

/// Build the summary from the five query records.
pub fn summarize(
    attributes: &Attributes,
    metadata: &Metadata,
    text_info: &TextInfo,
    experiment: &Experiment,
    binaries: &Binaries,
) -> MetadataSummary {
    let mut map = MetadataSummary::new();
    let mut put = |key: &str, value: MetadataValue| {
        map.insert(key.to_string(), value);
    };

    put("uiWidth", attributes.width.into());
    put("uiWidthBytes", attributes.width_bytes.into());
    put("uiHeight", attributes.height.into());
    put("uiComp", attributes.components.into());
    put("uiBpcInMemory", attributes.bpc_in_memory.into());
    put("uiBpcSignificant", attributes.bpc_significant.into());
    put("uiSequenceCount", attributes.sequence_count.into());
    put("uiTileWidth", attributes.tile_width.into());
    put("uiTileHeight", attributes.tile_height.into());
    put("uiCompression", attributes.compression.into());
    put("uiQuality", attributes.quality.into());

    put("dTimeStart", metadata.time_start.into());
    put("dAngle", metadata.angle.into());
    put("dCalibration", metadata.calibration.into());
    put("dAspect", metadata.aspect.into());
    put("wszObjectiveName", metadata.objective_name.as_str().into());
    put("dObjectiveMag", metadata.objective_magnification.into());
    put("dObjectiveNA", metadata.objective_na.into());
    put("dRefractIndex1", metadata.refractive_index_1.into());
    put("dRefractIndex2", metadata.refractive_index_2.into());
    put("dPinholeRadius", metadata.pinhole_radius.into());
    put("dZoom", metadata.zoom.into());
    put("dProjectiveMag", metadata.projective_magnification.into());
    put("uiImageType", metadata.image_type.into());
    put("uiComponentCount", metadata.component_count.into());
    put("uiPlaneCount", metadata.planes.len().into());
    for (i, plane) in metadata.planes.iter().enumerate() {
        let line = format!(
            "{{uiCompCount}}: {} {{uiColorRGB}}: {} {{dEmissionWL}}: {} {{wszName}}: {} {{wszOCName}}: {}",
            plane.component_count,
            plane.color_rgb as i32,
            format_double(plane.emission_wavelength),
            plane.name,
            plane.oc_name
        );
        put(&format!("uiPlaneCountIndex_{i}"), line.into());
    }

    put("experimentDimension", experiment.levels.len().into());
    for (i, level) in experiment.levels.iter().enumerate() {
        let line = format!(
            "{{uiExpType}}: {} {{uiLoopSize}}: {} {{dInterval}}: {}",
            level.kind.code(),
            level.loop_size,
            format_double(level.interval)
        );
        put(&format!("experimentDimension_{i}"), line.into());
    }

    put("binaryLayers", binaries.len().into());
    for (i, desc) in binaries.descriptors.iter().enumerate() {
        let line = format!(
            "{{wszName}}: {} {{wszCompName}}: {} {{uiColorRGB}}: {}",
            desc.name,
            desc.comp_name,
            desc.color_rgb as i32
        );
        put(&format!("binaryLayer_{i}"), line.into());
    }

    for (key, value) in text_info.short_fields() {
        put(key, value.into());
    }
    for (key, value) in text_info.key_values() {
        put(&key, value);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binaries::BinaryDescriptor;
    use crate::experiment::{ExperimentLevel, LoopKind};
    use crate::metadata::PlaneDesc;

    #[test]
    fn test_value_parsing() {
        assert_eq!(MetadataValue::parse("42"), MetadataValue::Int(42));
        assert_eq!(MetadataValue::parse("-3"), MetadataValue::Int(-3));
        // Outside i32, falls through to float.
        assert_eq!(MetadataValue::parse("3000000000"), MetadataValue::Float(3e9));
        assert_eq!(MetadataValue::parse("0.25"), MetadataValue::Float(0.25));
        assert_eq!(
            MetadataValue::parse("Nikon"),
            MetadataValue::Text("Nikon".to_string())
        );
    }

    #[test]
    fn test_non_finite_spellings() {
        for s in ["inf", "-inf", "nan", "infinity", "Inf"] {
            assert_eq!(MetadataValue::parse(s), MetadataValue::Text(s.to_string()));
        }
        assert!(MetadataValue::parse("NaN").as_f64().is_some_and(f64::is_nan));
        assert_eq!(
            MetadataValue::parse("-Infinity").as_f64(),
            Some(f64::NEG_INFINITY)
        );
        // Overflow saturates instead of falling back to text.
        assert_eq!(MetadataValue::parse("1e400").as_f64(), Some(f64::INFINITY));
    }

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(460.0), "460.0");
        assert_eq!(format_double(0.0), "0.0");
        assert_eq!(format_double(-0.0), "-0.0");
        assert_eq!(format_double(0.108), "0.108");
        assert_eq!(format_double(1e7), "1.0E7");
        assert_eq!(format_double(12345678.9), "1.23456789E7");
        assert_eq!(format_double(0.0005), "5.0E-4");
        assert_eq!(format_double(f64::NAN), "NaN");
        assert_eq!(format_double(f64::INFINITY), "Infinity");
        assert_eq!(format_double(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(MetadataValue::Float(100.0).to_string(), "100.0");
        assert_eq!(MetadataValue::Int(100).to_string(), "100");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(MetadataValue::Int(7).as_i64(), Some(7));
        assert_eq!(MetadataValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(MetadataValue::Float(2.5).as_i64(), None);
        assert_eq!(MetadataValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(MetadataValue::from("x").as_f64(), None);
        assert_eq!(MetadataValue::from("x").as_i64(), None);
    }

    #[test]
    fn test_summary_contents() {
        let attributes = Attributes {
            width: 512,
            height: 256,
            sequence_count: 6,
            ..Default::default()
        };
        let metadata = Metadata {
            objective_name: "Plan Apo 60x".to_string(),
            planes: vec![PlaneDesc {
                component_count: 1,
                color_rgb: 0xFFFF_FFFF,
                name: "DAPI".to_string(),
                oc_name: "Blue".to_string(),
                emission_wavelength: 460.0,
            }],
            ..Default::default()
        };
        let experiment = Experiment {
            levels: vec![ExperimentLevel {
                kind: LoopKind::Time,
                loop_size: 6,
                interval: 250.0,
            }],
        };
        let text_info = TextInfo {
            author: "lab".to_string(),
            capturing: "Exposure: 20".to_string(),
            ..Default::default()
        };

        let binaries = Binaries {
            descriptors: vec![BinaryDescriptor {
                name: "Mask".to_string(),
                comp_name: "DAPI".to_string(),
                color_rgb: 0x8000_0000,
            }],
        };

        let map = summarize(&attributes, &metadata, &text_info, &experiment, &binaries);

        assert_eq!(map["uiWidth"], MetadataValue::Int(512));
        assert_eq!(map["uiPlaneCount"], MetadataValue::Int(1));
        assert_eq!(map["experimentDimension"], MetadataValue::Int(1));
        assert_eq!(map["binaryLayers"].as_i64(), Some(1));
        assert_eq!(map["wszAuthor"].as_str(), Some("lab"));
        assert_eq!(map["Exposure"], MetadataValue::Int(20));
        assert_eq!(map["Exposure"].as_f64(), Some(20.0));
        assert_eq!(
            map["uiPlaneCountIndex_0"].as_str(),
            Some("{uiCompCount}: 1 {uiColorRGB}: -1 {dEmissionWL}: 460.0 {wszName}: DAPI {wszOCName}: Blue")
        );
        assert_eq!(
            map["experimentDimension_0"].as_str(),
            Some("{uiExpType}: 0 {uiLoopSize}: 6 {dInterval}: 250.0")
        );
        assert_eq!(
            map["binaryLayer_0"].as_str(),
            Some("{wszName}: Mask {wszCompName}: DAPI {uiColorRGB}: -2147483648")
        );
    }

    #[test]
    fn test_untagged_json() {
        let json = serde_json::to_string(&MetadataValue::Int(5)).unwrap();
        assert_eq!(json, "5");
    }
}
