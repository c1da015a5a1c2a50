pub mod config;
pub mod coordgen;
pub mod error;
pub mod sketcher;

pub use config::LayoutConfig;
pub use error::{Error, Result};

const EPSILON: f32 = 0.001;

pub mod prelude {
    pub use super::config::LayoutConfig;
    pub use super::error::{Error, Result};
    pub use super::sketcher::{
        AtomId, BondId, BondOrder, Builder, Layout, Molecule, PointF, Sketcher, Stereo,
    };
}
