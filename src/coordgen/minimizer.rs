use super::*;
use crate::config::LayoutConfig;
use ahash::AHashSet;
use log::{debug, trace};
use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_3, FRAC_PI_6};

const PAIRS_PER_PASS: usize = 8;
const BONDS_PER_PAIR: usize = 3;
const RELAX_STEPS: usize = 400;
/// Unbonded ring atoms closer than this many bond lengths push apart.
const RING_CLEARANCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Move {
    Mirror,
    Rotate(f32),
}
const MOVES: [Move; 5] = [
    Move::Mirror,
    Move::Rotate(FRAC_PI_6),
    Move::Rotate(-FRAC_PI_6),
    Move::Rotate(FRAC_PI_3),
    Move::Rotate(-FRAC_PI_3),
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClashReport {
    pub before: f32,
    pub after: f32,
    pub passes: usize,
    pub moves: usize,
}

#[derive(Debug, Clone)]
struct Branch {
    fixed: AtomId,
    moving_end: AtomId,
    atoms: Vec<AtomId>,
}

#[derive(Debug, Clone)]
pub struct Minimizer {
    threshold: f32,
    crossing_penalty: f32,
    max_passes: usize,
}
impl Minimizer {
    pub fn new(config: &LayoutConfig) -> Self {
        let threshold = config.clash_distance * config.bond_length;
        Self {
            threshold,
            crossing_penalty: threshold * threshold,
            max_passes: config.max_overlap_passes,
        }
    }

    /// Two bonds clash when they cross or touch without sharing an atom.
    pub fn bonds_clash(mol: &Molecule, b1: &Bond, b2: &Bond) -> bool {
        if b1.shares_atom_with(b2) {
            return false;
        }
        let (Some(start1), Some(end1), Some(start2), Some(end2)) = (
            mol.coordinates(b1.start),
            mol.coordinates(b1.end),
            mol.coordinates(b2.start),
            mol.coordinates(b2.end),
        ) else {
            return false;
        };
        if start1.0.max(end1.0) < start2.0.min(end2.0)
            || start1.1.max(end1.1) < start2.1.min(end2.1)
            || start1.0.min(end1.0) > start2.0.max(end2.0)
            || start1.1.min(end1.1) > start2.1.max(end2.1)
        {
            return false;
        }
        if math::points_coincide(start1, start2)
            || math::points_coincide(start1, end2)
            || math::points_coincide(end1, start2)
            || math::points_coincide(end1, end2)
        {
            return true;
        }
        math::intersection_of_segments(start1, end1, start2, end2).is_some()
    }

    fn clashes(&self, mol: &Molecule) -> Vec<(f32, AtomId, AtomId)> {
        let mut out = Vec::new();
        let atoms: Vec<_> = mol
            .atom_ids()
            .filter_map(|a| mol.coordinates(a).map(|p| (a, p)))
            .collect();
        for (n, &(a1, p1)) in atoms.iter().enumerate() {
            for &(a2, p2) in &atoms[(n + 1)..] {
                let d = p2 - p1;
                if d.0.abs() > self.threshold || d.1.abs() > self.threshold {
                    continue;
                }
                let dist = d.length();
                if dist >= self.threshold || mol.bond_between(a1, a2).is_some() {
                    continue;
                }
                let shortfall = self.threshold - dist;
                out.push((shortfall * shortfall, a1, a2));
            }
        }
        let bonds = mol.bonds();
        if bonds.len() > 2 {
            for (n, b1) in bonds[..(bonds.len() - 1)].iter().enumerate() {
                for b2 in &bonds[(n + 1)..] {
                    if Self::bonds_clash(mol, b1, b2) {
                        out.push((self.crossing_penalty, b1.start, b2.start));
                    }
                }
            }
        }
        out.sort_by(|a, b| b.0.total_cmp(&a.0));
        out
    }

    pub fn score_clashes(&self, mol: &Molecule) -> f32 {
        self.clashes(mol).iter().map(|c| c.0).sum()
    }

    fn path_bonds(mol: &Molecule, from: AtomId, to: AtomId) -> Vec<BondId> {
        let mut parent: Vec<Option<(AtomId, BondId)>> = vec![None; mol.count_atoms()];
        let mut seen = vec![false; mol.count_atoms()];
        let mut queue = VecDeque::from([from]);
        seen[from.0] = true;
        while let Some(a) = queue.pop_front() {
            if a == to {
                break;
            }
            for &b in mol.connected_bonds(a) {
                let Some(n) = mol.bond(b).other_atom(a) else {
                    continue;
                };
                if !seen[n.0] {
                    seen[n.0] = true;
                    parent[n.0] = Some((a, b));
                    queue.push_back(n);
                }
            }
        }
        let mut path = Vec::new();
        let mut at = to;
        while let Some((p, b)) = parent[at.0] {
            path.push(b);
            at = p;
        }
        path.reverse();
        path
    }

    /// Atoms reachable from `start` without crossing `bond`, or `None` if
    /// the bond lies on a cycle.
    fn side_of(mol: &Molecule, bond: BondId, start: AtomId, blocked: AtomId) -> Option<Vec<AtomId>> {
        let mut seen = AHashSet::from([start]);
        let mut side = vec![start];
        let mut i = 0;
        while i < side.len() {
            let a = side[i];
            i += 1;
            for &b in mol.connected_bonds(a) {
                if b == bond {
                    continue;
                }
                let Some(n) = mol.bond(b).other_atom(a) else {
                    continue;
                };
                if n == blocked {
                    return None;
                }
                if seen.insert(n) {
                    side.push(n);
                }
            }
        }
        Some(side)
    }

    /// Up to a few acyclic bonds between two clashing atoms, smallest moving
    /// side first.
    fn branches(mol: &Molecule, ring_bonds: &AHashSet<BondId>, a1: AtomId, a2: AtomId) -> Vec<Branch> {
        let mut out: Vec<Branch> = Self::path_bonds(mol, a1, a2)
            .into_iter()
            .filter(|b| !ring_bonds.contains(b))
            .filter_map(|b| {
                let bond = mol.bond(b);
                let s = Self::side_of(mol, b, bond.start, bond.end)?;
                let e = Self::side_of(mol, b, bond.end, bond.start)?;
                Some(if s.len() < e.len() {
                    Branch {
                        fixed: bond.end,
                        moving_end: bond.start,
                        atoms: s,
                    }
                } else {
                    Branch {
                        fixed: bond.start,
                        moving_end: bond.end,
                        atoms: e,
                    }
                })
            })
            .collect();
        out.sort_by_key(|b| b.atoms.len());
        out.truncate(BONDS_PER_PAIR);
        out
    }

    fn apply(mol: &mut Molecule, branch: &Branch, mv: Move) {
        let Some(pivot) = mol.coordinates(branch.fixed) else {
            return;
        };
        match mv {
            Move::Mirror => {
                let Some(axis) = mol.coordinates(branch.moving_end) else {
                    return;
                };
                for &a in &branch.atoms {
                    let atom = mol.atom_mut(a);
                    if let Some(p) = atom.coordinates {
                        atom.coordinates = Some(math::mirror_point(p, pivot, axis));
                    }
                }
            }
            Move::Rotate(angle) => {
                let (sin, cos) = angle.sin_cos();
                for &a in &branch.atoms {
                    let atom = mol.atom_mut(a);
                    if let Some(p) = atom.coordinates {
                        let mut v = p - pivot;
                        v.rotate(sin, cos);
                        atom.coordinates = Some(v + pivot);
                    }
                }
            }
        }
    }

    fn snapshot(mol: &Molecule, atoms: &[AtomId]) -> Vec<Option<PointF>> {
        atoms.iter().map(|&a| mol.coordinates(a)).collect()
    }
    fn restore(mol: &mut Molecule, atoms: &[AtomId], saved: &[Option<PointF>]) {
        for (&a, &p) in atoms.iter().zip(saved) {
            mol.atom_mut(a).coordinates = p;
        }
    }

    /// Keep the best move for one clashing pair if it lowers `score`.
    fn relieve_pair(
        &self,
        mol: &mut Molecule,
        ring_bonds: &AHashSet<BondId>,
        a1: AtomId,
        a2: AtomId,
        score: f32,
    ) -> Option<f32> {
        let mut best: Option<(f32, usize, Move)> = None;
        let branches = Self::branches(mol, ring_bonds, a1, a2);
        for (n, branch) in branches.iter().enumerate() {
            let saved = Self::snapshot(mol, &branch.atoms);
            for mv in MOVES {
                Self::apply(mol, branch, mv);
                let trial = self.score_clashes(mol);
                Self::restore(mol, &branch.atoms, &saved);
                if trial < best.map_or(score, |b| b.0) {
                    best = Some((trial, n, mv));
                }
            }
        }
        let (trial, n, mv) = best?;
        trace!(
            "moving {} atoms around {:?} ({mv:?}): {score} -> {trial}",
            branches[n].atoms.len(),
            branches[n].fixed
        );
        Self::apply(mol, &branches[n], mv);
        Some(trial)
    }

    /// Move substituent branches until the clash score stops improving or
    /// the pass budget runs out.
    pub fn avoid_clashes(&self, mol: &mut Molecule, rings: &[Ring]) -> ClashReport {
        let ring_bonds: AHashSet<BondId> = rings.iter().flat_map(|r| r.bonds.iter().copied()).collect();
        let mut score = self.score_clashes(mol);
        let mut report = ClashReport {
            before: score,
            ..ClashReport::default()
        };
        while report.passes < self.max_passes && score > 0.0 {
            report.passes += 1;
            let mut improved = false;
            let pairs: Vec<_> = self
                .clashes(mol)
                .into_iter()
                .take(PAIRS_PER_PASS)
                .collect();
            for (_, a1, a2) in pairs {
                if let Some(s) = self.relieve_pair(mol, &ring_bonds, a1, a2, score) {
                    score = s;
                    report.moves += 1;
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
        for r in rings {
            r.invalidate_center();
        }
        report.after = score;
        debug!(
            "clash score {} -> {} in {} passes, {} moves",
            report.before, report.after, report.passes, report.moves
        );
        report
    }
}

/// A ring system placed with a stretched bond or two atoms on top of each other.
pub fn ring_system_is_strained(mol: &Molecule, atoms: &[AtomId], bond_length: f32) -> bool {
    let member = membership(mol, atoms);
    let tolerance = 0.05 * bond_length;
    let stretched = mol
        .bonds()
        .iter()
        .filter(|b| b.start != b.end && member[b.start.0] && member[b.end.0])
        .filter_map(|b| Some((mol.coordinates(b.end)? - mol.coordinates(b.start)?).length()))
        .any(|d| (d - bond_length).abs() > tolerance);
    if stretched {
        return true;
    }
    let points: Vec<_> = atoms.iter().filter_map(|&a| mol.coordinates(a)).collect();
    points.iter().enumerate().any(|(n, &p)| {
        points[(n + 1)..]
            .iter()
            .any(|&q| (q - p).length() < 0.5 * bond_length)
    })
}

fn membership(mol: &Molecule, atoms: &[AtomId]) -> Vec<bool> {
    let mut member = vec![false; mol.count_atoms()];
    for &a in atoms {
        member[a.0] = true;
    }
    member
}

/// Pull the bonds of a ring system back towards `bond_length` while pushing
/// unbonded members apart. Returns the number of steps taken.
pub fn relax_ring_system(mol: &mut Molecule, atoms: &[AtomId], bond_length: f32) -> usize {
    let member = membership(mol, atoms);
    let bonds: Vec<_> = mol
        .bonds()
        .iter()
        .filter(|b| b.start != b.end && member[b.start.0] && member[b.end.0])
        .map(|b| (b.start, b.end))
        .collect();
    let mut sorted = atoms.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let mut pairs = Vec::new();
    for (n, &a1) in sorted.iter().enumerate() {
        for &a2 in &sorted[(n + 1)..] {
            if mol.bond_between(a1, a2).is_none() {
                pairs.push((a1, a2));
            }
        }
    }
    let clearance = RING_CLEARANCE * bond_length;
    let max_step = 0.1 * bond_length;
    let mut force = vec![PointF::default(); mol.count_atoms()];
    fn position(mol: &Molecule, a: AtomId) -> PointF {
        mol.coordinates(a).unwrap_or_default()
    }
    for step in 0..RELAX_STEPS {
        force.fill(PointF::default());
        for &(a1, a2) in &bonds {
            let v = position(mol, a2) - position(mol, a1);
            let l = v.length();
            let dir = if l > EPSILON { v / l } else { PointF(1.0, 0.0) };
            let f = dir * ((l - bond_length) * 0.5);
            force[a1.0] += f;
            force[a2.0] -= f;
        }
        for &(a1, a2) in &pairs {
            let v = position(mol, a2) - position(mol, a1);
            let l = v.length();
            if l >= clearance {
                continue;
            }
            // coincident atoms get a fixed direction per pair
            let dir = if l > EPSILON {
                v / l
            } else {
                PointF::from_polar(1.0, (a1.0 * 7 + a2.0) as f32 * 0.5)
            };
            let f = dir * ((clearance - l) * 0.25);
            force[a1.0] -= f;
            force[a2.0] += f;
        }
        let mut largest = 0.0f32;
        for &a in &sorted {
            let mut f = force[a.0];
            let l = f.length();
            if l > max_step {
                f *= max_step / l;
            }
            largest = largest.max(l);
            if let Some(p) = mol.atom_mut(a).coordinates.as_mut() {
                *p += f;
            }
        }
        if largest < 0.001 * bond_length {
            trace!("ring system of {} atoms relaxed in {} steps", sorted.len(), step + 1);
            return step + 1;
        }
    }
    RELAX_STEPS
}
