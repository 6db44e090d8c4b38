//! Experiment loop structure reported by `Lim_FileGetExperiment`.

use serde::{Deserialize, Serialize};

/// A 4-dimensional frame coordinate indexed by [`LoopKind`]:
/// `[time, multipoint, z, other]`.
pub type Coords = [u32; 4];

/// Number of loop dimensions a coordinate carries.
pub const COORD_COUNT: usize = 4;

/// Kind of an experiment loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopKind {
    /// Time lapse (`LIMLOOP_TIME`).
    Time,
    /// Stage positions (`LIMLOOP_MULTIPOINT`).
    MultiPoint,
    /// Z stack (`LIMLOOP_Z`).
    Z,
    /// Any other loop (`LIMLOOP_OTHER`).
    Other,
    /// Code not documented by the vendor header.
    Unknown(u32),
}

impl LoopKind {
    /// Raw vendor code.
    pub fn code(self) -> u32 {
        match self {
            Self::Time => 0,
            Self::MultiPoint => 1,
            Self::Z => 2,
            Self::Other => 3,
            Self::Unknown(code) => code,
        }
    }

    /// Position of this loop inside a [`Coords`] array.
    pub fn coord_index(self) -> Option<usize> {
        match self {
            Self::Unknown(_) => None,
            known => Some(known.code() as usize),
        }
    }
}

impl From<u32> for LoopKind {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Time,
            1 => Self::MultiPoint,
            2 => Self::Z,
            3 => Self::Other,
            other => Self::Unknown(other),
        }
    }
}

/// One loop dimension of the experiment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentLevel {
    pub kind: LoopKind,

    /// Number of iterations of this loop.
    pub loop_size: u32,

    /// Interval between iterations (ms for time loops, um for Z).
    pub interval: f64,
}

/// Ordered loop dimensions, outermost first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub levels: Vec<ExperimentLevel>,
}

impl Experiment {
    /// Total frames implied by the loops. An experiment with no loops has one frame.
    pub fn frame_count(&self) -> u64 {
        self.levels.iter().map(|l| u64::from(l.loop_size)).product()
    }

    /// Loop size of the first level of `kind`, if any.
    pub fn loop_size(&self, kind: LoopKind) -> Option<u32> {
        self.levels
            .iter()
            .find(|l| l.kind == kind)
            .map(|l| l.loop_size)
    }

    /// Whether `coords` lies inside every loop.
    pub fn contains(&self, coords: &Coords) -> bool {
        let mut seen = [false; COORD_COUNT];
        for level in &self.levels {
            if let Some(idx) = level.kind.coord_index() {
                seen[idx] = true;
                if coords[idx] >= level.loop_size {
                    return false;
                }
            }
        }
        // Dimensions without a loop only admit 0.
        coords.iter().zip(seen).all(|(&c, present)| present || c == 0)
    }
}

/// Hyperstack dimensions derived from attributes and experiment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub channels: u32,
    pub slices: u32,
    pub frames: u32,
}

impl Dimensions {
    /// Channels come from the component count; slices and frames from the Z
    /// and time loops, defaulting to 1 when the loop is absent.
    pub fn derive(components: u32, experiment: &Experiment) -> Self {
        let mut dims = Self {
            channels: components,
            slices: 1,
            frames: 1,
        };
        for level in &experiment.levels {
            match level.kind {
                LoopKind::Time => dims.frames = level.loop_size,
                LoopKind::Z => dims.slices = level.loop_size,
                _ => {}
            }
        }
        dims
    }
}
