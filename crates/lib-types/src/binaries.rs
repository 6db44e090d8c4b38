//! Binary layer descriptors reported by `Lim_FileGetBinaryDescriptors`.

use serde::{Deserialize, Serialize};

/// A named binary layer (for example an ROI mask).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryDescriptor {
    pub name: String,

    /// Name of the component the layer was created from.
    pub comp_name: String,

    /// Display color packed as `0x00BBGGRR`.
    pub color_rgb: u32,
}

/// All binary layers of a file, in vendor order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binaries {
    pub descriptors: Vec<BinaryDescriptor>,
}

impl Binaries {
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
