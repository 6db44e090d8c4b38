//! Descriptive text reported by `Lim_FileGetTextinfo`.

use crate::summary::MetadataValue;
use serde::{Deserialize, Serialize};

/// Maximum narrow length, in bytes, of a short text field.
pub const SHORT_TEXT_MAX_BYTES: usize = 255;

/// Maximum narrow length, in bytes, of a long text field.
pub const LONG_TEXT_MAX_BYTES: usize = 4095;

/// Free-form text fields of an ND2 file.
///
/// `description` and `capturing` are long fields; every other field is short.
/// Values longer than their field limit have already been truncated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInfo {
    pub image_id: String,
    /// Image type (`wszType`).
    pub kind: String,
    pub group: String,
    pub sample_id: String,
    pub author: String,
    pub description: String,
    pub capturing: String,
    pub sampling: String,
    pub location: String,
    pub date: String,
    pub conclusion: String,
    pub info1: String,
    pub info2: String,
    pub optics: String,
}

impl TextInfo {
    /// Short fields as `(vendor name, value)` pairs.
    pub fn short_fields(&self) -> [(&'static str, &str); 12] {
        [
            ("wszImageID", &self.image_id),
            ("wszType", &self.kind),
            ("wszGroup", &self.group),
            ("wszSampleID", &self.sample_id),
            ("wszAuthor", &self.author),
            ("wszSampling", &self.sampling),
            ("wszLocation", &self.location),
            ("wszDate", &self.date),
            ("wszConclusion", &self.conclusion),
            ("wszInfo1", &self.info1),
            ("wszInfo2", &self.info2),
            ("wszOptics", &self.optics),
        ]
    }

    /// Key/value pairs embedded in the capturing and description text.
    ///
    /// The camera and microscope settings are written as `key: value` lines.
    /// A key part containing a tab starts a pair whose value continues on the
    /// next line. Later keys override earlier ones when collected into a map.
    pub fn key_values(&self) -> Vec<(String, MetadataValue)> {
        let text = format!("{}\n{}", self.capturing, self.description);
        let lines = split_trimming_empty_tail(&text, '\n');
        let mut pairs = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let parts = split_trimming_empty_tail(line, ':');
            if parts.len() < 2 {
                continue;
            }

            if parts[0].contains('\t') {
                let head = split_trimming_empty_tail(parts[0].trim(), '\t');
                let Some(next) = lines.get(i + 1) else {
                    continue;
                };
                if head.len() < 2 {
                    continue;
                }
                let value = if parts.len() == 3 {
                    format!(
                        "{}: {}: {} {}",
                        head[1].trim(),
                        parts[1].trim(),
                        parts[2].trim(),
                        next.trim()
                    )
                } else {
                    format!("{}: {} {}", head[1].trim(), parts[1].trim(), next.trim())
                };
                pairs.push((head[0].trim().to_string(), MetadataValue::Text(value)));
            } else {
                let key = strip_braces(parts[0].trim());
                let value = parts[1].trim();
                if value.is_empty() {
                    continue;
                }
                pairs.push((key.to_string(), MetadataValue::parse(value)));
            }
        }

        pairs
    }
}

/// Split on `sep`, dropping empty pieces at the end.
fn split_trimming_empty_tail(s: &str, sep: char) -> Vec<&str> {
    let mut parts: Vec<&str> = s.split(sep).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// `{Key}` -> `Key`.
fn strip_braces(key: &str) -> &str {
    match key.strip_prefix('{') {
        Some(inner) => {
            let mut chars = inner.chars();
            chars.next_back();
            chars.as_str()
        }
        None => key,
    }
}
