use super::*;

/// Incremental construction of a [`Molecule`], the surface a structure
/// parser writes through.
#[derive(Debug, Default)]
pub struct Builder {
    mol: Molecule,
}
impl Builder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add_atom(&mut self, atomic_number: u8) -> AtomId {
        self.mol.push_atom(Atom::new(atomic_number))
    }
    pub fn add_charged_atom(&mut self, atomic_number: u8, charge: i8) -> AtomId {
        self.mol.push_atom(Atom {
            charge,
            ..Atom::new(atomic_number)
        })
    }
    /// Panics if either endpoint was not created by this builder.
    pub fn add_bond(&mut self, start: AtomId, end: AtomId, order: u8) -> BondId {
        let mut bond = Bond::new(start, end);
        bond.order = order.into();
        self.mol.push_bond(bond)
    }
    pub fn add_bond_with(&mut self, bond: Bond) -> BondId {
        self.mol.push_bond(bond)
    }
    /// Add `size` atoms of `atomic_number` closed into a ring, returned in ring order.
    pub fn add_ring(&mut self, atomic_number: u8, size: usize) -> Vec<AtomId> {
        let atoms: Vec<_> = (0..size).map(|_| self.add_atom(atomic_number)).collect();
        for i in 0..size {
            self.add_bond(atoms[i], atoms[(i + 1) % size], 1);
        }
        atoms
    }
    pub fn finish(self) -> Molecule {
        self.mol
    }
}
