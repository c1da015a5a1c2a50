use super::*;
use std::collections::VecDeque;

/// Arena of atoms and bonds. Every bond endpoint indexes into `atoms`.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}
impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn count_atoms(&self) -> usize {
        self.atoms.len()
    }
    pub fn count_bonds(&self) -> usize {
        self.bonds.len()
    }
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }
    pub fn atom_ids(&self) -> impl DoubleEndedIterator<Item = AtomId> + ExactSizeIterator {
        (0..self.atoms.len()).map(AtomId)
    }
    pub fn bond_ids(&self) -> impl DoubleEndedIterator<Item = BondId> + ExactSizeIterator {
        (0..self.bonds.len()).map(BondId)
    }
    /// Panics if `id` is out of range.
    pub fn atom(&self, id: AtomId) -> &Atom {
        &self.atoms[id.0]
    }
    /// Panics if `id` is out of range.
    pub fn atom_mut(&mut self, id: AtomId) -> &mut Atom {
        &mut self.atoms[id.0]
    }
    /// Panics if `id` is out of range.
    pub fn bond(&self, id: BondId) -> &Bond {
        &self.bonds[id.0]
    }
    pub fn coordinates(&self, id: AtomId) -> Option<PointF> {
        self.atoms[id.0].coordinates
    }
    pub fn connected_bonds(&self, atom: AtomId) -> &[BondId] {
        &self.atoms[atom.0].bonds
    }
    pub fn neighbors(&self, atom: AtomId) -> impl Iterator<Item = AtomId> + '_ {
        self.atoms[atom.0]
            .bonds
            .iter()
            .filter_map(move |&b| self.bonds[b.0].other_atom(atom))
    }
    pub fn bond_between(&self, a1: AtomId, a2: AtomId) -> Option<BondId> {
        self.atoms[a1.0]
            .bonds
            .iter()
            .copied()
            .find(|&b| self.bonds[b.0].other_atom(a1) == Some(a2))
    }
    pub(crate) fn push_atom(&mut self, atom: Atom) -> AtomId {
        let id = AtomId(self.atoms.len());
        self.atoms.push(atom);
        id
    }
    pub(crate) fn push_bond(&mut self, bond: Bond) -> BondId {
        assert!(
            bond.start.0 < self.atoms.len() && bond.end.0 < self.atoms.len(),
            "bond endpoint out of range"
        );
        let id = BondId(self.bonds.len());
        self.atoms[bond.start.0].bonds.push(id);
        if bond.end != bond.start {
            self.atoms[bond.end.0].bonds.push(id);
        }
        self.bonds.push(bond);
        id
    }
    /// Rebuild the atom to bond incidence lists from the bond arena.
    pub fn force_update_struct(&mut self) {
        for a in &mut self.atoms {
            a.bonds.clear();
        }
        for (n, b) in self.bonds.iter().enumerate() {
            self.atoms[b.start.0].bonds.push(BondId(n));
            if b.end != b.start {
                self.atoms[b.end.0].bonds.push(BondId(n));
            }
        }
    }
    /// Number of connected components.
    pub fn fragment_count(&self) -> usize {
        let mut seen = vec![false; self.atoms.len()];
        let mut queue = VecDeque::new();
        let mut count = 0;
        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            count += 1;
            seen[start] = true;
            queue.push_back(AtomId(start));
            while let Some(a) = queue.pop_front() {
                for n in self.neighbors(a) {
                    if !seen[n.0] {
                        seen[n.0] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
        count
    }
    /// Independent cycle count of a connected graph, `bonds - atoms + 1`.
    pub fn expected_ring_count(&self) -> usize {
        (self.bonds.len() + 1).saturating_sub(self.atoms.len())
    }
    /// Clear every flag and coordinate left over from a previous layout.
    pub fn reset_layout(&mut self) {
        for a in &mut self.atoms {
            a.reset_layout();
        }
    }
    pub(crate) fn set_visited(&mut self, value: bool) {
        for a in &mut self.atoms {
            a.flags.visited = value;
        }
    }
    pub fn is_fully_placed(&self) -> bool {
        self.atoms.iter().all(|a| a.flags.placed)
    }
}
