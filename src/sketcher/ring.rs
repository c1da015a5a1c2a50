use super::*;
use std::cell::Cell;
use std::f32::consts::PI;

/// Index of a ring in the list returned by ring perception.
pub type RingId = usize;

/// A cycle of the molecular graph. `atoms[i]` and `atoms[i + 1]` are joined
/// by `bonds[i]`; the last bond closes the cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub atoms: Vec<AtomId>,
    pub bonds: Vec<BondId>,
    pub placed: bool,
    center: Cell<Option<PointF>>,
}
impl Ring {
    pub(crate) fn new(atoms: Vec<AtomId>, bonds: Vec<BondId>) -> Self {
        debug_assert_eq!(atoms.len(), bonds.len());
        Self {
            atoms,
            bonds,
            placed: false,
            center: Cell::new(None),
        }
    }
    pub fn size(&self) -> usize {
        self.atoms.len()
    }
    pub fn contains(&self, atom: AtomId) -> bool {
        self.atoms.contains(&atom)
    }
    pub fn shares_atoms_with(&self, other: &Ring) -> bool {
        self.atoms.iter().any(|&a| other.contains(a))
    }
    /// Circumradius of the regular polygon of this size with the given edge.
    pub fn native_radius(&self, bond_length: f32) -> f32 {
        bond_length / (2.0 * (PI / self.size() as f32).sin())
    }
    /// Mean of the member coordinates, cached until [`Ring::invalidate_center`].
    pub fn find_center(&self, mol: &Molecule) -> PointF {
        if let Some(c) = self.center.get() {
            return c;
        }
        let c = math::center_2d(self.atoms.iter().filter_map(|&a| mol.coordinates(a)))
            .unwrap_or_default();
        self.center.set(Some(c));
        c
    }
    pub fn invalidate_center(&self) {
        self.center.set(None);
    }
    /// Rotate the cycle so that `atom` comes first, keeping bonds aligned.
    pub(crate) fn starting_at(&self, atom: AtomId) -> (Vec<AtomId>, Vec<BondId>) {
        let n = self.atoms.iter().position(|&a| a == atom).unwrap_or(0);
        let mut atoms = self.atoms.clone();
        let mut bonds = self.bonds.clone();
        atoms.rotate_left(n);
        bonds.rotate_left(n);
        (atoms, bonds)
    }
}
