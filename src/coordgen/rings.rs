use super::*;
use crate::config::LayoutConfig;
use ahash::AHashSet;
use log::{debug, warn};

/// A partial walk through the graph. Interior atoms have already been
/// eliminated; only the endpoints can still be spliced on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathEdge {
    pub(crate) atoms: Vec<AtomId>,
}
impl PathEdge {
    fn from_bond(bond: &Bond) -> Self {
        Self {
            atoms: vec![bond.start, bond.end],
        }
    }
    pub(crate) fn first(&self) -> AtomId {
        self.atoms[0]
    }
    pub(crate) fn last(&self) -> AtomId {
        self.atoms[self.atoms.len() - 1]
    }
    pub(crate) fn has_endpoint(&self, atom: AtomId) -> bool {
        self.first() == atom || self.last() == atom
    }
    pub(crate) fn is_cycle(&self) -> bool {
        self.atoms.len() > 3 && self.first() == self.last()
    }
    /// No atom is visited twice, except the endpoints of a closed cycle.
    pub(crate) fn is_real_path(&self) -> bool {
        let n = self.atoms.len();
        if n < 2 {
            return false;
        }
        let body = if self.first() == self.last() {
            if n <= 3 {
                return false;
            }
            &self.atoms[..n - 1]
        } else {
            &self.atoms[..]
        };
        let mut seen = AHashSet::with_capacity(body.len());
        body.iter().all(|a| seen.insert(*a))
    }
    /// Join two edges through their common endpoint `at`. Returns `None` if
    /// `at` is not an endpoint of both or the result revisits an atom.
    pub(crate) fn splice(&self, other: &PathEdge, at: AtomId) -> Option<PathEdge> {
        let mut atoms = self.atoms.clone();
        if self.last() != at {
            if self.first() != at {
                return None;
            }
            atoms.reverse();
        }
        if other.first() == at {
            atoms.extend_from_slice(&other.atoms[1..]);
        } else if other.last() == at {
            atoms.extend(other.atoms.iter().rev().skip(1));
        } else {
            return None;
        }
        let spliced = PathEdge { atoms };
        spliced.is_real_path().then_some(spliced)
    }
}

fn cyclic_core(mol: &Molecule) -> Vec<bool> {
    let mut degree: Vec<usize> = mol
        .atom_ids()
        .map(|a| mol.neighbors(a).filter(|&n| n != a).count())
        .collect();
    let mut core = vec![true; mol.count_atoms()];
    let mut stack: Vec<AtomId> = mol.atom_ids().filter(|a| degree[a.0] <= 1).collect();
    while let Some(a) = stack.pop() {
        if !core[a.0] {
            continue;
        }
        core[a.0] = false;
        for n in mol.neighbors(a) {
            if n == a || !core[n.0] {
                continue;
            }
            degree[n.0] -= 1;
            if degree[n.0] <= 1 {
                stack.push(n);
            }
        }
    }
    core
}

/// Cycles of at most `max_size` atoms, found by eliminating atoms one at a
/// time and splicing the path edges that meet at the eliminated atom.
///
/// The flag is set when `max_path_edges` cut the search short.
pub(crate) fn find_cycles(
    mol: &Molecule,
    config: &LayoutConfig,
    max_size: usize,
) -> (Vec<PathEdge>, bool) {
    let core = cyclic_core(mol);
    let mut edges: Vec<PathEdge> = mol
        .bonds()
        .iter()
        .filter(|b| b.start != b.end && core[b.start.0] && core[b.end.0])
        .map(PathEdge::from_bond)
        .collect();
    let mut cycles = Vec::new();
    if edges.len() > config.max_path_edges {
        warn!("ring perception skipped: {} bonds in the cyclic core", edges.len());
        return (cycles, true);
    }
    let mut remaining: Vec<AtomId> = mol.atom_ids().filter(|a| core[a.0]).collect();
    let mut incident = Vec::new();
    let mut spliced = Vec::new();
    while !remaining.is_empty() {
        let (pos, _) = remaining
            .iter()
            .enumerate()
            .min_by_key(|(_, a)| (edges.iter().filter(|e| e.has_endpoint(**a)).count(), a.0))
            .expect("remaining is not empty");
        let at = remaining.remove(pos);
        incident.clear();
        let mut i = 0;
        while i < edges.len() {
            if edges[i].has_endpoint(at) {
                incident.push(edges.swap_remove(i));
            } else {
                i += 1;
            }
        }
        spliced.clear();
        for (n, e1) in incident.iter().enumerate() {
            for e2 in &incident[(n + 1)..] {
                // a cycle of `max_size` atoms repeats its first atom
                if e1.atoms.len() + e2.atoms.len() > max_size + 2 {
                    continue;
                }
                let Some(path) = e1.splice(e2, at) else {
                    continue;
                };
                if path.is_cycle() {
                    cycles.push(path);
                } else if path.atoms.len() <= max_size {
                    spliced.push(path);
                    if edges.len() + spliced.len() > config.max_path_edges {
                        warn!(
                            "ring perception stopped at {} path edges, {} cycles found",
                            config.max_path_edges,
                            cycles.len()
                        );
                        return (cycles, true);
                    }
                }
            }
        }
        edges.append(&mut spliced);
    }
    (cycles, false)
}

fn cycle_to_ring(mol: &Molecule, cycle: &PathEdge) -> Option<Ring> {
    let atoms = cycle.atoms[..cycle.atoms.len() - 1].to_vec();
    let n = atoms.len();
    let bonds = (0..n)
        .map(|i| mol.bond_between(atoms[i], atoms[(i + 1) % n]))
        .collect::<Option<Vec<_>>>()?;
    Some(Ring::new(atoms, bonds))
}

fn ring_to_bond_bitvector(ring: &Ring, words: usize) -> Vec<u64> {
    let mut bv = vec![0u64; words];
    for b in &ring.bonds {
        bv[b.0 / 64] |= 1u64 << (b.0 % 64);
    }
    bv
}

fn try_add_to_basis(basis: &mut Vec<Vec<u64>>, candidate: Vec<u64>) -> bool {
    let mut v = candidate;
    for row in basis.iter() {
        if let Some(p) = leading_bit(row) {
            if v[p / 64] & (1u64 << (p % 64)) != 0 {
                for (vw, rw) in v.iter_mut().zip(row) {
                    *vw ^= *rw;
                }
            }
        }
    }
    if v.iter().all(|&w| w == 0) {
        return false;
    }
    basis.push(v);
    true
}

fn leading_bit(bv: &[u64]) -> Option<usize> {
    bv.iter()
        .enumerate()
        .find(|(_, w)| **w != 0)
        .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
}

/// Ring size searched first; doubled until enough rings turn up.
const FIRST_RING_SIZE: usize = 8;

/// Smallest set of smallest rings of a connected molecule.
///
/// Candidates are taken shortest first; a candidate is kept when its bond
/// set is independent (over GF(2)) of the rings already kept, until
/// `bonds - atoms + 1` rings are known. The cycle search is bounded by ring
/// size and widened only while rings are missing.
pub fn find_sssr(mol: &Molecule, config: &LayoutConfig) -> Vec<Ring> {
    let expected = mol.expected_ring_count();
    if expected == 0 {
        return Vec::new();
    }
    let words = mol.count_bonds().div_ceil(64);
    let mut max_size = FIRST_RING_SIZE;
    loop {
        let (mut cycles, truncated) = find_cycles(mol, config, max_size);
        cycles.sort_by_key(|c| c.atoms.len());
        let mut basis = Vec::with_capacity(expected);
        let mut rings = Vec::with_capacity(expected);
        for cycle in &cycles {
            if rings.len() >= expected {
                break;
            }
            let Some(ring) = cycle_to_ring(mol, cycle) else {
                continue;
            };
            if try_add_to_basis(&mut basis, ring_to_bond_bitvector(&ring, words)) {
                rings.push(ring);
            }
        }
        debug!(
            "ring perception up to size {max_size}: {} candidate cycles, {} rings kept",
            cycles.len(),
            rings.len()
        );
        if rings.len() >= expected || truncated || max_size >= mol.count_atoms() {
            if rings.len() < expected {
                warn!(
                    "found {} independent rings, expected {}",
                    rings.len(),
                    expected
                );
            }
            return rings;
        }
        max_size *= 2;
    }
}
