pub mod builder;
pub mod fragmenter;
pub mod minimizer;
pub mod placer;
pub mod rings;

use super::sketcher::*;
use crate::EPSILON;

pub use fragmenter::RingSystem;
pub use minimizer::{ClashReport, Minimizer};
pub use rings::find_sssr;
