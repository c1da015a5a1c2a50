use super::*;

/// Stable handle of an atom inside its [`Molecule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtomId(pub usize);

/// Per-atom layout state. The flags are independent of each other.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AtomFlags {
    pub placed: bool,
    pub visited: bool,
    pub in_ring: bool,
    pub aliphatic: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atom {
    pub atomic_number: u8,
    pub charge: i8,
    /// `None` until the layout gives the atom a position.
    pub coordinates: Option<PointF>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub flags: AtomFlags,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) bonds: Vec<BondId>,
}
impl Default for Atom {
    fn default() -> Self {
        Self {
            atomic_number: 6,
            charge: 0,
            coordinates: None,
            flags: AtomFlags::default(),
            bonds: Vec::new(),
        }
    }
}
impl Atom {
    pub fn new(atomic_number: u8) -> Self {
        Self {
            atomic_number,
            ..Self::default()
        }
    }
    pub fn bonds(&self) -> &[BondId] {
        &self.bonds
    }
    pub fn degree(&self) -> usize {
        self.bonds.len()
    }
    pub fn is_placed(&self) -> bool {
        self.flags.placed
    }
    pub fn is_in_ring(&self) -> bool {
        self.flags.in_ring
    }
    /// Position the atom and flag it as placed.
    pub(crate) fn set_coords(&mut self, coords: PointF) {
        self.coordinates = Some(coords);
        self.flags.placed = true;
    }
    /// Record a position without claiming the atom is placed; ring systems
    /// read this as the junction target when they are laid out later.
    pub(crate) fn set_target(&mut self, coords: PointF) {
        self.coordinates = Some(coords);
    }
    pub(crate) fn reset_layout(&mut self) {
        self.flags = AtomFlags::default();
        self.coordinates = None;
    }
}
