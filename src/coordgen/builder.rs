use super::fragmenter::{most_complex_ring, RingSystem};
use super::minimizer::{relax_ring_system, ring_system_is_strained};
use super::placer::{distribute_partners, populate_polygon_corners, split_neighbors};
use super::*;
use crate::config::LayoutConfig;
use log::{debug, trace};
use std::cmp::Reverse;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// How a ring attaches to the part of its system already laid out, by the
/// number of its atoms that are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Spiro,
    Fused,
    Bridged,
}
impl Attachment {
    pub fn classify(placed_atoms: usize) -> Option<Self> {
        match placed_atoms {
            0 => None,
            1 => Some(Self::Spiro),
            2 => Some(Self::Fused),
            _ => Some(Self::Bridged),
        }
    }
}

/// Lay out `ring` as a regular polygon whose first bond starts at the
/// origin on `start` and points along `direction`.
pub fn seed_ring(
    mol: &mut Molecule,
    ring: &Ring,
    start: AtomId,
    direction: PointF,
    bond_length: f32,
) {
    let (atoms, _) = ring.starting_at(start);
    let n = atoms.len();
    let dir = direction.normalized();
    let a0 = PointF::default();
    let a1 = dir * bond_length;
    mol.atom_mut(atoms[0]).set_coords(a0);
    if n < 2 {
        return;
    }
    mol.atom_mut(atoms[1]).set_coords(a1);
    let radius = ring.native_radius(bond_length);
    let half = bond_length * 0.5;
    let apothem = (radius * radius - half * half).max(0.0).sqrt();
    let center = (a0 + a1) * 0.5 + dir.perpendicular() * apothem;
    let step = TAU / n as f32;
    let theta0 = (a0 - center).angle();
    populate_polygon_corners(mol, &atoms[2..], center, theta0 + 2.0 * step, step, radius);
    ring.invalidate_center();
}

/// Maximal runs of unplaced atoms of `ring`, each with the placed atoms
/// bounding it, walking the ring forward: `(before, run, after)`.
fn free_arcs(mol: &Molecule, ring: &Ring) -> Vec<(AtomId, Vec<AtomId>, AtomId)> {
    let n = ring.size();
    let placed = |a: AtomId| mol.atom(a).flags.placed;
    let Some(first) = ring.atoms.iter().position(|&a| placed(a)) else {
        return Vec::new();
    };
    let mut arcs = Vec::new();
    let mut anchor = ring.atoms[first];
    let mut run = Vec::new();
    for i in 1..=n {
        let a = ring.atoms[(first + i) % n];
        if placed(a) {
            if !run.is_empty() {
                arcs.push((anchor, std::mem::take(&mut run), a));
            }
            anchor = a;
        } else {
            run.push(a);
        }
    }
    arcs
}

fn normal_away_from(p1: PointF, p2: PointF, reference: PointF) -> PointF {
    if (p2 - p1).length() <= EPSILON {
        let out = p1 - reference;
        return if out.length() <= EPSILON {
            PointF(0.0, 1.0)
        } else {
            out.normalized()
        };
    }
    let normal = (p2 - p1).perpendicular().normalized();
    if math::side_of_line(reference, p1, p2) > 0.0 {
        -normal
    } else {
        normal
    }
}

/// Positions for `count` atoms strung from `from` to `to` so that all
/// `count + 1` bonds are `bond_length` long, bulging along `normal`. A gap
/// too wide for the chain is split evenly along the straight line.
fn arc_points(from: PointF, to: PointF, count: usize, normal: PointF, bond_length: f32) -> Vec<PointF> {
    let steps = (count + 1) as f32;
    let chord = (to - from).length();
    if chord >= steps * bond_length - EPSILON {
        return (1..=count)
            .map(|i| from + (to - from) * (i as f32 / steps))
            .collect();
    }
    // the chord spanned by `steps` equal bonds shrinks as the half step angle grows
    let (mut lo, mut hi) = (0.0f32, PI / steps);
    for _ in 0..50 {
        let mid = 0.5 * (lo + hi);
        if bond_length * (steps * mid).sin() / mid.sin() > chord {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let half_step = 0.5 * (lo + hi);
    let radius = bond_length / (2.0 * half_step.sin());
    let center = (from + to) * 0.5 - normal * (radius * (steps * half_step).cos());
    let start = (from - center).angle();
    let sign = if math::normalize_angle(normal.angle() - start) >= 0.0 {
        1.0
    } else {
        -1.0
    };
    (1..=count)
        .map(|i| center + PointF::from_polar(radius, start + sign * 2.0 * half_step * i as f32))
        .collect()
}

fn clearance(mol: &Molecule, nearby: &[AtomId], points: &[PointF], from: PointF, to: PointF) -> f32 {
    let placed: Vec<_> = nearby
        .iter()
        .map(|&a| mol.atom(a))
        .filter(|a| a.flags.placed)
        .filter_map(|a| a.coordinates)
        .filter(|&q| (q - from).length() > EPSILON && (q - to).length() > EPSILON)
        .collect();
    points
        .iter()
        .flat_map(|&p| placed.iter().map(move |&q| (q - p).length()))
        .fold(f32::INFINITY, f32::min)
}

/// String `run` between the placed atoms `from` and `to`, on the side away
/// from `reference` unless the other side is clearer.
fn fill_arc(
    mol: &mut Molecule,
    nearby: &[AtomId],
    run: &[AtomId],
    from: AtomId,
    to: AtomId,
    reference: PointF,
    bond_length: f32,
) {
    let pf = mol.coordinates(from).unwrap_or_default();
    let pt = mol.coordinates(to).unwrap_or_default();
    let normal = normal_away_from(pf, pt, reference);
    let mut points = arc_points(pf, pt, run.len(), normal, bond_length);
    if (pt - pf).length() > EPSILON {
        let flipped = arc_points(pf, pt, run.len(), -normal, bond_length);
        if clearance(mol, nearby, &flipped, pf, pt) > clearance(mol, nearby, &points, pf, pt) + EPSILON {
            points = flipped;
        }
    }
    for (&a, p) in run.iter().zip(points) {
        let atom = mol.atom_mut(a);
        if !atom.flags.placed {
            atom.set_coords(p);
        }
    }
}

/// Mean center of the placed rings holding both `a1` and `a2`, or failing
/// that either of them.
fn arc_reference(mol: &Molecule, rings: &[Ring], a1: AtomId, a2: AtomId) -> Option<PointF> {
    let placed = || rings.iter().filter(|r| r.placed);
    math::center_2d(
        placed()
            .filter(|r| r.contains(a1) && r.contains(a2))
            .map(|r| r.find_center(mol)),
    )
    .or_else(|| {
        math::center_2d(
            placed()
                .filter(|r| r.contains(a1) || r.contains(a2))
                .map(|r| r.find_center(mol)),
        )
    })
}

/// Ring with a single placed atom: its center sits on the line from
/// `reference` through that atom, one native radius out.
pub fn place_spiro(mol: &mut Molecule, ring: &Ring, shared: AtomId, reference: PointF, bond_length: f32) {
    let s = mol.coordinates(shared).unwrap_or_default();
    let mut out = s - reference;
    if out.length() <= EPSILON {
        out = PointF(0.0, 1.0);
    }
    let radius = ring.native_radius(bond_length);
    let center = s + out.normalized() * radius;
    let (atoms, _) = ring.starting_at(shared);
    let step = TAU / atoms.len() as f32;
    let theta = (s - center).angle();
    populate_polygon_corners(mol, &atoms[1..], center, theta + step, step, radius);
}

/// Ring with two or more placed atoms: every run of unplaced atoms hangs
/// off the placed atoms bounding it, away from the placed rings holding them.
pub fn place_free_arcs(
    mol: &mut Molecule,
    rings: &[Ring],
    nearby: &[AtomId],
    ring: &Ring,
    bond_length: f32,
) {
    let fallback = math::center_2d(
        ring.atoms
            .iter()
            .filter(|&&a| mol.atom(a).flags.placed)
            .filter_map(|&a| mol.coordinates(a)),
    )
    .unwrap_or_default();
    for (from, run, to) in free_arcs(mol, ring) {
        let reference = arc_reference(mol, rings, from, to).unwrap_or(fallback);
        fill_arc(mol, nearby, &run, from, to, reference, bond_length);
    }
}

fn attach_ring(
    mol: &mut Molecule,
    rings: &[Ring],
    system: &RingSystem,
    target: RingId,
    bond_length: f32,
) {
    let ring = &rings[target];
    let placed: Vec<_> = ring
        .atoms
        .iter()
        .copied()
        .filter(|&a| mol.atom(a).flags.placed)
        .collect();
    let Some(kind) = Attachment::classify(placed.len()) else {
        return;
    };
    trace!(
        "attaching ring {target} ({} atoms, {} placed): {kind:?}",
        ring.size(),
        placed.len()
    );
    match kind {
        Attachment::Spiro => {
            let shared = placed[0];
            let reference = arc_reference(mol, rings, shared, shared).unwrap_or_default();
            place_spiro(mol, ring, shared, reference, bond_length);
        }
        Attachment::Fused | Attachment::Bridged => {
            place_free_arcs(mol, rings, &system.atoms, ring, bond_length)
        }
    }
    ring.invalidate_center();
}

/// Lay out a whole ring system, seeding `seed` with `start` at the origin
/// and its first bond along `direction`. The ring with the most atoms
/// already placed goes next, so fused rings come before spiro ones.
pub fn place_ring_system(
    mol: &mut Molecule,
    rings: &mut [Ring],
    system: &RingSystem,
    seed: RingId,
    start: AtomId,
    direction: PointF,
    bond_length: f32,
) {
    seed_ring(mol, &rings[seed], start, direction, bond_length);
    rings[seed].placed = true;
    loop {
        let next = system
            .rings
            .iter()
            .copied()
            .filter(|&r| !rings[r].placed)
            .map(|r| {
                let placed = rings[r]
                    .atoms
                    .iter()
                    .filter(|&&a| mol.atom(a).flags.placed)
                    .count();
                (r, placed)
            })
            .filter(|&(_, placed)| placed > 0)
            .min_by_key(|&(r, placed)| (Reverse(placed), r));
        let Some((next, _)) = next else {
            break;
        };
        attach_ring(mol, rings, system, next, bond_length);
        rings[next].placed = true;
    }
    if ring_system_is_strained(mol, &system.atoms, bond_length) {
        let steps = relax_ring_system(mol, &system.atoms, bond_length);
        debug!("relaxed a strained ring system of {} rings in {steps} steps", system.rings.len());
        for &r in &system.rings {
            rings[r].invalidate_center();
        }
    }
}

fn local_center(mol: &Molecule, rings: &[Ring], system: &RingSystem, atom: AtomId) -> PointF {
    let centers: Vec<_> = system
        .rings
        .iter()
        .filter(|&&r| rings[r].contains(atom))
        .map(|&r| rings[r].find_center(mol))
        .collect();
    math::center_2d(centers).unwrap_or_default()
}

pub fn place_ring_substituents(
    mol: &mut Molecule,
    rings: &[Ring],
    system: &RingSystem,
    bond_length: f32,
) {
    for &a in &system.atoms {
        let (placed, free) = split_neighbors(mol, a);
        if free.is_empty() {
            continue;
        }
        let center = local_center(mol, rings, system, a);
        distribute_partners(mol, a, &placed, center, &free, bond_length);
    }
}

/// Translate and rotate `atoms` rigidly so that `pivot` moves to `target`,
/// turning by `angle` about it.
pub fn transform_atoms(mol: &mut Molecule, atoms: &[AtomId], pivot: PointF, target: PointF, angle: f32) {
    let (sin, cos) = angle.sin_cos();
    for &a in atoms {
        let atom = mol.atom_mut(a);
        if let Some(p) = atom.coordinates {
            let mut v = p - pivot;
            v.rotate(sin, cos);
            atom.coordinates = Some(v + target);
        }
    }
}

/// Find a bond from a placed atom into an unplaced ring system, lay that
/// system out, and swing it onto the junction. Returns the system index.
pub fn place_next_ring_system(
    mol: &mut Molecule,
    rings: &mut [Ring],
    systems: &[RingSystem],
    atom_system: &[Option<usize>],
    config: &LayoutConfig,
) -> Option<usize> {
    let unplaced_system = |n: usize| !systems[n].rings.iter().any(|&r| rings[r].placed);
    let (pivot, anchor, index) = mol.bonds().iter().find_map(|b| {
        let (s, e) = (mol.atom(b.start), mol.atom(b.end));
        let (pivot, anchor) = match (s.flags.placed, e.flags.placed) {
            (true, false) => (b.start, b.end),
            (false, true) => (b.end, b.start),
            _ => return None,
        };
        atom_system[anchor.0]
            .filter(|&n| unplaced_system(n))
            .map(|n| (pivot, anchor, n))
    })?;
    let bond_length = config.bond_length;
    if mol.coordinates(anchor).is_none() {
        let (placed, free) = split_neighbors(mol, pivot);
        let origin = mol.coordinates(pivot).unwrap_or_default();
        let center = placer::center_2d(mol, &placed).unwrap_or(origin);
        distribute_partners(mol, pivot, &placed, center, &free, bond_length);
    }
    let pivot_pos = mol.coordinates(pivot).unwrap_or_default();
    let target = mol.coordinates(anchor).unwrap_or_default();
    let system = &systems[index];
    let candidates = system.rings.iter().copied().filter(|&r| rings[r].contains(anchor));
    let seed = most_complex_ring(system, rings, candidates)?;
    debug!(
        "placing ring system {index} ({} rings) from junction {:?}-{:?}",
        system.rings.len(),
        pivot,
        anchor
    );
    place_ring_system(
        mol,
        rings,
        system,
        seed,
        anchor,
        config.seed_direction(),
        bond_length,
    );
    let local = mol.coordinates(anchor).unwrap_or_default();
    let inner: Vec<_> = mol
        .neighbors(anchor)
        .filter(|n| system.contains_atom(*n))
        .collect();
    let mut outward = local - placer::center_2d(mol, &inner).unwrap_or(local);
    if outward.length() <= EPSILON {
        outward = local - placer::center_2d(mol, &system.atoms).unwrap_or(local);
    }
    let outward_angle = if outward.length() <= EPSILON {
        FRAC_PI_2
    } else {
        outward.angle()
    };
    let rotation = (pivot_pos - target).angle() - outward_angle;
    transform_atoms(mol, &system.atoms, local, target, rotation);
    for &r in &system.rings {
        rings[r].invalidate_center();
    }
    place_ring_substituents(mol, rings, system, bond_length);
    Some(index)
}
