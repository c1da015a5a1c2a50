pub mod atom;
pub mod bond;
pub mod builder;
pub mod math;
pub mod molecule;
pub mod point;
pub mod ring;
pub mod sketcher;

pub use atom::{Atom, AtomFlags, AtomId};
pub use bond::{Bond, BondId, BondOrder, Stereo};
pub use builder::Builder;
pub use molecule::Molecule;
pub use point::PointF;
pub use ring::{Ring, RingId};
pub use sketcher::{Layout, Sketcher};
