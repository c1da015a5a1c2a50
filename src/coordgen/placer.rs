use super::*;
use ahash::AHashMap;
use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_6, PI, TAU};

pub use crate::sketcher::math::get_angle;

pub fn center_2d(mol: &Molecule, atoms: &[AtomId]) -> Option<PointF> {
    math::center_2d(atoms.iter().filter_map(|&a| mol.coordinates(a)))
}

pub fn mark_not_placed(mol: &mut Molecule, atoms: &[AtomId]) {
    for &a in atoms {
        mol.atom_mut(a).flags.placed = false;
    }
}

fn is_chain_candidate(atom: &Atom) -> bool {
    !atom.flags.placed && !atom.flags.in_ring && atom.coordinates.is_none()
}

/// Longest path starting at `from` through unplaced, acyclic atoms that
/// have no position yet. `from` itself is always the first element.
pub fn longest_unplaced_chain(mol: &mut Molecule, from: AtomId) -> Vec<AtomId> {
    mol.set_visited(false);
    mol.atom_mut(from).flags.visited = true;
    let mut parent = AHashMap::new();
    let mut stack = vec![(from, 0usize)];
    let mut best = (from, 0usize);
    let mut next = Vec::new();
    while let Some((at, depth)) = stack.pop() {
        if depth > best.1 {
            best = (at, depth);
        }
        next.clear();
        next.extend(mol.neighbors(at).filter(|&n| {
            let a = mol.atom(n);
            !a.flags.visited && is_chain_candidate(a)
        }));
        for &n in next.iter().rev() {
            mol.atom_mut(n).flags.visited = true;
            parent.insert(n, at);
            stack.push((n, depth + 1));
        }
    }
    mol.set_visited(false);
    let mut chain = vec![best.0];
    while let Some(&p) = parent.get(chain.last().expect("chain is not empty")) {
        chain.push(p);
    }
    chain.reverse();
    chain
}

pub fn longest_chain(mol: &mut Molecule) -> Vec<AtomId> {
    let Some(start) = mol.atom_ids().find(|&a| is_chain_candidate(mol.atom(a))) else {
        return Vec::new();
    };
    let far = *longest_unplaced_chain(mol, start)
        .last()
        .expect("chain is not empty");
    longest_unplaced_chain(mol, far)
}

/// Zig-zag `chain[1..]` away from `chain[0]`: each bond deviates from
/// `direction` by +30° and -30° in turn. `chain[0]` is put at the origin if
/// it has no position yet.
pub fn place_linear_chain(
    mol: &mut Molecule,
    chain: &[AtomId],
    direction: PointF,
    bond_length: f32,
) {
    let Some(&first) = chain.first() else {
        return;
    };
    let mut prev = match mol.coordinates(first) {
        Some(p) => p,
        None => {
            mol.atom_mut(first).set_coords(PointF::default());
            PointF::default()
        }
    };
    mol.atom_mut(first).flags.placed = true;
    let axis = direction.normalized();
    for (i, &a) in chain.iter().enumerate().skip(1) {
        let deviation = if i % 2 == 1 { FRAC_PI_6 } else { -FRAC_PI_6 };
        let atom = mol.atom_mut(a);
        if atom.flags.placed {
            prev = atom.coordinates.unwrap_or(prev);
            continue;
        }
        prev += axis.rotated(deviation) * bond_length;
        atom.set_coords(prev);
    }
}

/// Atoms already placed keep their position.
pub fn populate_polygon_corners(
    mol: &mut Molecule,
    atoms: &[AtomId],
    center: PointF,
    start_angle: f32,
    angle_increment: f32,
    radius: f32,
) {
    for (i, &a) in atoms.iter().enumerate() {
        let atom = mol.atom_mut(a);
        if atom.flags.placed {
            continue;
        }
        let theta = start_angle + angle_increment * i as f32;
        atom.set_coords(center + PointF::from_polar(radius, theta));
    }
}

/// Whether the two bonds around a two-connected atom should be drawn straight.
fn is_linear(mol: &Molecule, pivot: AtomId) -> bool {
    let bonds = mol.connected_bonds(pivot);
    bonds.len() == 2
        && bonds
            .iter()
            .map(|&b| mol.bond(b).order.as_u8())
            .sum::<u8>()
            >= 4
}

/// Directions, as angles around `origin`, for `count` new neighbors of `pivot`.
fn partner_angles(
    mol: &Molecule,
    pivot: AtomId,
    origin: PointF,
    placed: &[AtomId],
    center: PointF,
    count: usize,
) -> Vec<f32> {
    let mut dirs: Vec<f32> = placed
        .iter()
        .filter_map(|&a| mol.coordinates(a))
        .filter(|&p| !math::points_coincide(p, origin))
        .map(|p| (p - origin).angle())
        .collect();
    let away = origin - center;
    match dirs.len() {
        0 => {
            let base = if away.length() > EPSILON {
                away.angle()
            } else {
                FRAC_PI_2
            };
            (0..count)
                .map(|i| base + TAU * i as f32 / count as f32)
                .collect()
        }
        1 => {
            let base = dirs[0];
            if count > 1 {
                return (0..count)
                    .map(|i| base + TAU * (i + 1) as f32 / (count + 1) as f32)
                    .collect();
            }
            if is_linear(mol, pivot) {
                return vec![base + PI];
            }
            // trans to whatever hangs off the placed neighbor
            let Some((q, q_pos)) = placed
                .iter()
                .filter_map(|&a| mol.coordinates(a).map(|p| (a, p)))
                .find(|&(_, p)| !math::points_coincide(p, origin))
            else {
                return vec![base + 2.0 * FRAC_PI_3];
            };
            let others: Vec<_> = mol.neighbors(q).filter(|&n| n != pivot).collect();
            let left = base + 2.0 * FRAC_PI_3;
            let right = base - 2.0 * FRAC_PI_3;
            if let Some(g) = center_2d(mol, &others) {
                let cand = origin + PointF::from_polar(1.0, left);
                if math::same_side(cand, g, q_pos, origin) {
                    return vec![right];
                }
            }
            vec![left]
        }
        _ => {
            dirs.sort_by(f32::total_cmp);
            let n = dirs.len();
            let mut best: Option<(f32, f32, f32)> = None;
            for i in 0..n {
                let start = dirs[i];
                let gap = if i + 1 < n {
                    dirs[i + 1] - start
                } else {
                    dirs[0] + TAU - start
                };
                let bisector = PointF::from_polar(1.0, start + gap * 0.5);
                let align = bisector.dot(away.normalized());
                let better = match best {
                    None => true,
                    Some((g, _, a)) => gap > g + EPSILON || (gap > g - EPSILON && align > a),
                };
                if better {
                    best = Some((gap, start, align));
                }
            }
            let (gap, start, _) = best.expect("at least two directions");
            (0..count)
                .map(|i| start + gap * (i + 1) as f32 / (count + 1) as f32)
                .collect()
        }
    }
}

/// Fan the `unplaced` neighbors of `pivot` into the space left by its
/// `placed` ones, away from `center`. Ring atoms only get a junction target.
pub fn distribute_partners(
    mol: &mut Molecule,
    pivot: AtomId,
    placed: &[AtomId],
    center: PointF,
    unplaced: &[AtomId],
    bond_length: f32,
) {
    if unplaced.is_empty() {
        return;
    }
    let origin = mol.coordinates(pivot).unwrap_or_default();
    let angles = partner_angles(mol, pivot, origin, placed, center, unplaced.len());
    for (&a, theta) in unplaced.iter().zip(angles) {
        let pos = origin + PointF::from_polar(bond_length, theta);
        let atom = mol.atom_mut(a);
        if atom.flags.in_ring {
            atom.set_target(pos);
        } else {
            atom.set_coords(pos);
        }
    }
}

pub(crate) fn split_neighbors(mol: &Molecule, atom: AtomId) -> (Vec<AtomId>, Vec<AtomId>) {
    let mut with = Vec::new();
    let mut without = Vec::new();
    for n in mol.neighbors(atom) {
        if n == atom || with.contains(&n) || without.contains(&n) {
            continue;
        }
        if mol.coordinates(n).is_some() {
            with.push(n);
        } else {
            without.push(n);
        }
    }
    (with, without)
}

/// Direction for the zig-zag that continues the bond `pivot -> atom`, trans
/// to the rest of `pivot`'s neighbors.
fn continuation_axis(mol: &Molecule, pivot: AtomId, atom: AtomId) -> PointF {
    let p = mol.coordinates(pivot).unwrap_or_default();
    let a = mol.coordinates(atom).unwrap_or_default();
    let bond = a - p;
    let left = bond.rotated(FRAC_PI_3);
    let right = bond.rotated(-FRAC_PI_3);
    let others: Vec<_> = mol
        .neighbors(pivot)
        .filter(|&n| n != atom && n != pivot)
        .collect();
    let next = match center_2d(mol, &others) {
        Some(g) if math::same_side(a + left, g, p, a) => right,
        _ => left,
    };
    next.rotated(-FRAC_PI_6)
}

/// Grow every acyclic run hanging off placed atoms, stopping at ring atoms.
/// Returns the number of atoms placed.
pub fn place_aliphatics(mol: &mut Molecule, bond_length: f32) -> usize {
    let mut queue: VecDeque<AtomId> = mol
        .atom_ids()
        .filter(|&a| mol.atom(a).flags.placed)
        .collect();
    let mut count = 0;
    while let Some(pivot) = queue.pop_front() {
        let (occupied, free) = split_neighbors(mol, pivot);
        if free.is_empty() {
            continue;
        }
        let origin = mol.coordinates(pivot).unwrap_or_default();
        let center = center_2d(mol, &occupied).unwrap_or(origin);
        distribute_partners(mol, pivot, &occupied, center, &free, bond_length);
        for n in free {
            if !mol.atom(n).flags.placed {
                continue;
            }
            count += 1;
            let chain = longest_unplaced_chain(mol, n);
            if chain.len() > 1 {
                let axis = continuation_axis(mol, pivot, n);
                place_linear_chain(mol, &chain, axis, bond_length);
                count += chain.len() - 1;
            }
            queue.extend(chain);
        }
    }
    count
}
