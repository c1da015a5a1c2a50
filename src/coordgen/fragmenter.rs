use super::*;
use std::collections::VecDeque;

/// A maximal set of rings connected through shared atoms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingSystem {
    pub rings: Vec<RingId>,
    /// Union of the member ring atoms, in first-seen order.
    pub atoms: Vec<AtomId>,
}
impl RingSystem {
    pub fn contains_atom(&self, atom: AtomId) -> bool {
        self.atoms.contains(&atom)
    }
}

/// Partition rings into connected components of the "shares an atom" relation.
pub fn split_into_ring_systems(rings: &[Ring]) -> Vec<RingSystem> {
    let mut assigned = vec![false; rings.len()];
    let mut systems = Vec::new();
    let mut queue = VecDeque::new();
    for start in 0..rings.len() {
        if assigned[start] {
            continue;
        }
        assigned[start] = true;
        queue.push_back(start);
        let mut system = RingSystem::default();
        while let Some(r) = queue.pop_front() {
            system.rings.push(r);
            for &a in &rings[r].atoms {
                if !system.atoms.contains(&a) {
                    system.atoms.push(a);
                }
            }
            for other in 0..rings.len() {
                if !assigned[other] && rings[r].shares_atoms_with(&rings[other]) {
                    assigned[other] = true;
                    queue.push_back(other);
                }
            }
        }
        system.rings.sort_unstable();
        systems.push(system);
    }
    systems
}

pub fn atom_ring_systems(systems: &[RingSystem], atom_count: usize) -> Vec<Option<usize>> {
    let mut out = vec![None; atom_count];
    for (n, s) in systems.iter().enumerate() {
        for a in &s.atoms {
            out[a.0] = Some(n);
        }
    }
    out
}

/// The system with the most rings; the first one wins a tie.
pub fn largest_ring_system(systems: &[RingSystem]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (n, s) in systems.iter().enumerate() {
        if best.map_or(true, |b| s.rings.len() > systems[b].rings.len()) {
            best = Some(n);
        }
    }
    best
}

/// The ring of `candidates` sharing atoms with the most other rings of the
/// system; the first one in input order wins a tie.
pub fn most_complex_ring(
    system: &RingSystem,
    rings: &[Ring],
    candidates: impl IntoIterator<Item = RingId>,
) -> Option<RingId> {
    let mut best: Option<(RingId, usize)> = None;
    for r in candidates {
        let neighbors = system
            .rings
            .iter()
            .filter(|&&o| o != r && rings[r].shares_atoms_with(&rings[o]))
            .count();
        if best.map_or(true, |(_, n)| neighbors > n) {
            best = Some((r, neighbors));
        }
    }
    best.map(|(r, _)| r)
}
