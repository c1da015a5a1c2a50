//! Error type for coordinate generation.

use thiserror::Error;

/// Errors surfaced by [`Sketcher::generate`](crate::sketcher::Sketcher::generate).
///
/// Only precondition violations are errors. A layout that runs out of
/// iterations is still returned, with its unplaced atoms listed in the
/// [`Layout`](crate::sketcher::Layout) report.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The molecular graph has more than one connected component.
    #[error("molecule not connected: found {fragments} fragments")]
    NotConnected {
        /// Number of connected components found.
        fragments: usize,
    },

    /// The layout configuration cannot produce finite coordinates.
    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
