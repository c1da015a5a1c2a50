use super::*;

/// Stable handle of a bond inside its [`Molecule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BondId(pub usize);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Quadruple,
}
impl BondOrder {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
        }
    }
}
impl From<u8> for BondOrder {
    fn from(order: u8) -> Self {
        match order {
            0 | 1 => Self::Single,
            2 => Self::Double,
            3 => Self::Triple,
            _ => Self::Quadruple,
        }
    }
}

/// Stereo marker carried through layout untouched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stereo {
    #[default]
    Unspecified,
    Up,
    Down,
    Either,
    Cis,
    Trans,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bond {
    pub start: AtomId,
    pub end: AtomId,
    pub order: BondOrder,
    pub stereo: Stereo,
    pub aromatic: bool,
}
impl Bond {
    pub const fn new(start: AtomId, end: AtomId) -> Self {
        Self {
            start,
            end,
            order: BondOrder::Single,
            stereo: Stereo::Unspecified,
            aromatic: false,
        }
    }
    /// The endpoint that is not `atom`, or `None` if `atom` is not an endpoint.
    pub fn other_atom(&self, atom: AtomId) -> Option<AtomId> {
        if self.start == atom {
            Some(self.end)
        } else if self.end == atom {
            Some(self.start)
        } else {
            None
        }
    }
    pub fn contains(&self, atom: AtomId) -> bool {
        self.start == atom || self.end == atom
    }
    pub fn shares_atom_with(&self, other: &Bond) -> bool {
        self.contains(other.start) || self.contains(other.end)
    }
}
