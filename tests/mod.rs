use molsketch::coordgen::{find_sssr, fragmenter};
use molsketch::prelude::*;
use molsketch::sketcher::{math, Bond, Ring};

const BOND: f32 = 50.0;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

fn pos(mol: &Molecule, a: AtomId) -> PointF {
    mol.coordinates(a).expect("atom has coordinates")
}

fn chain(len: usize) -> Molecule {
    let mut b = Builder::new();
    let ids: Vec<_> = (0..len).map(|_| b.add_atom(6)).collect();
    for w in ids.windows(2) {
        b.add_bond(w[0], w[1], 1);
    }
    b.finish()
}

fn benzene() -> Molecule {
    let mut b = Builder::new();
    b.add_ring(6, 6);
    b.finish()
}

/// Two six-membered rings sharing the bond 0-5.
fn naphthalene() -> Molecule {
    let mut b = Builder::new();
    let a = b.add_ring(6, 6);
    let rest: Vec<_> = (0..4).map(|_| b.add_atom(6)).collect();
    b.add_bond(a[5], rest[0], 1);
    for w in rest.windows(2) {
        b.add_bond(w[0], w[1], 1);
    }
    b.add_bond(rest[3], a[0], 1);
    b.finish()
}

/// Ring memberships with atom order and ring order normalized away.
fn members(rings: &[Ring]) -> Vec<Vec<AtomId>> {
    let mut sets: Vec<Vec<AtomId>> = rings
        .iter()
        .map(|r| {
            let mut a = r.atoms.clone();
            a.sort();
            a
        })
        .collect();
    sets.sort();
    sets
}

fn generate(mol: &mut Molecule) -> Layout {
    init();
    Sketcher::default().generate(mol).expect("connected molecule")
}

fn assert_all_placed(mol: &Molecule, layout: &Layout) {
    assert!(layout.is_complete(), "unplaced: {:?}", layout.unplaced);
    for a in mol.atoms() {
        assert!(a.is_placed());
        assert!(a.coordinates.is_some_and(|p| p.is_finite()));
    }
}

fn assert_bond_lengths(mol: &Molecule, tol: f32) {
    for b in mol.bonds() {
        let d = (pos(mol, b.end) - pos(mol, b.start)).length();
        assert!(approx_eq(d, BOND, tol), "bond {:?}-{:?} has length {d}", b.start, b.end);
    }
}

#[test]
fn empty_molecule_is_trivial() {
    let mut mol = Molecule::new();
    let layout = generate(&mut mol);
    assert_eq!(layout, Layout::default());
}

#[test]
fn single_atom_at_origin() {
    let mut b = Builder::new();
    let a = b.add_atom(8);
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert!(layout.is_complete());
    assert_eq!(mol.coordinates(a), Some(PointF(0.0, 0.0)));
    assert!(mol.atom(a).is_placed());
}

#[test]
fn disconnected_input_is_rejected_before_placement() {
    let mut b = Builder::new();
    let x = b.add_atom(6);
    let y = b.add_atom(6);
    b.add_atom(6);
    b.add_bond(x, y, 1);
    let mut mol = b.finish();
    let err = Sketcher::default().generate(&mut mol).unwrap_err();
    assert_eq!(err, Error::NotConnected { fragments: 2 });
    assert!(mol.atoms().iter().all(|a| a.coordinates.is_none()));
    assert!(err.to_string().contains("not connected"));
}

#[test]
fn invalid_config_is_rejected() {
    let mut mol = chain(3);
    let sketcher = Sketcher::new(LayoutConfig::default().with_bond_length(-1.0));
    assert!(matches!(sketcher.generate(&mut mol), Err(Error::InvalidConfig(_))));
}

#[test]
fn chain_zig_zags_along_the_vertical_axis() {
    let mut mol = chain(5);
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert!(layout.rings.is_empty());
    assert_bond_lengths(&mol, 1e-2);
    let ends = [AtomId(0), AtomId(4)];
    let start = ends
        .into_iter()
        .find(|&a| math::points_coincide(pos(&mol, a), PointF(0.0, 0.0)))
        .expect("one chain end at the origin");
    let order: Vec<_> = if start == AtomId(0) {
        mol.atom_ids().collect()
    } else {
        mol.atom_ids().rev().collect()
    };
    let axis = PointF(0.0, 1.0);
    let mut last_side = 0.0f32;
    for w in order.windows(2) {
        let v = pos(&mol, w[1]) - pos(&mol, w[0]);
        let deviation = math::unsigned_angle(v, PointF(0.0, 0.0), axis);
        assert!(approx_eq(deviation, 30.0, 0.1), "deviation {deviation}");
        let side = axis.cross(v).signum();
        assert_ne!(side, last_side);
        last_side = side;
    }
}

#[test]
fn benzene_is_a_regular_hexagon() {
    let mut mol = benzene();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.rings.len(), 1);
    assert_eq!(layout.ring_systems.len(), 1);
    let ring = &layout.rings[0];
    assert_eq!(ring.atoms.len(), ring.bonds.len());
    assert!(ring.placed);
    let at_origin = mol
        .atom_ids()
        .filter(|&a| math::points_coincide(pos(&mol, a), PointF(0.0, 0.0)))
        .count();
    assert_eq!(at_origin, 1);
    let center = ring.find_center(&mol);
    let radius = BOND / (2.0 * (std::f32::consts::PI / 6.0).sin());
    for &a in &ring.atoms {
        assert!(approx_eq((pos(&mol, a) - center).length(), radius, 1e-2));
    }
    assert_bond_lengths(&mol, 1e-2);
    let n = ring.size();
    for i in 0..n {
        let angle = math::unsigned_angle(
            pos(&mol, ring.atoms[(i + n - 1) % n]),
            pos(&mol, ring.atoms[i]),
            pos(&mol, ring.atoms[(i + 1) % n]),
        );
        assert!(approx_eq(angle, 120.0, 0.1));
    }
}

#[test]
fn small_rings_are_regular() {
    for size in [3, 4, 5, 7, 8] {
        let mut b = Builder::new();
        b.add_ring(6, size);
        let mut mol = b.finish();
        let layout = generate(&mut mol);
        assert_all_placed(&mol, &layout);
        assert_bond_lengths(&mol, 1e-2);
        let expected = (size - 2) as f32 * 180.0 / size as f32;
        let ring = &layout.rings[0];
        for i in 0..size {
            let angle = math::unsigned_angle(
                pos(&mol, ring.atoms[(i + size - 1) % size]),
                pos(&mol, ring.atoms[i]),
                pos(&mol, ring.atoms[(i + 1) % size]),
            );
            assert!(approx_eq(angle, expected, 0.2), "ring {size}: {angle}");
        }
    }
}

#[test]
fn fused_ring_sweeps_away_from_the_first() {
    let mut mol = naphthalene();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.rings.len(), 2);
    assert_eq!(layout.ring_systems.len(), 1);
    assert_bond_lengths(&mol, 1e-2);

    let first: Vec<_> = (0..6).map(AtomId).collect();
    let second: Vec<_> = (6..10).map(AtomId).collect();
    let (u, v) = (pos(&mol, AtomId(0)), pos(&mol, AtomId(5)));
    let mid = (u + v) * 0.5;
    let c1 = math::center_2d(first.iter().map(|&a| pos(&mol, a))).unwrap();
    let ring2 = layout
        .rings
        .iter()
        .find(|r| r.contains(AtomId(7)))
        .expect("second ring");
    let c2 = ring2.find_center(&mol);
    let radius = BOND;
    let offset = (radius * radius - BOND * BOND / 4.0).sqrt();
    assert!(approx_eq((c2 - mid).length(), offset, 1e-2));
    for a in second {
        assert!(!math::same_side(pos(&mol, a), c1, u, v));
    }
}

#[test]
fn spiro_rings_do_not_overlap() {
    let mut b = Builder::new();
    let a = b.add_ring(6, 6);
    let rest: Vec<_> = (0..4).map(|_| b.add_atom(6)).collect();
    b.add_bond(a[0], rest[0], 1);
    for w in rest.windows(2) {
        b.add_bond(w[0], w[1], 1);
    }
    b.add_bond(rest[3], a[0], 1);
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.rings.len(), 2);
    assert_bond_lengths(&mol, 1e-2);
    for x in mol.atom_ids() {
        for y in mol.atom_ids().filter(|&y| y > x) {
            let d = (pos(&mol, x) - pos(&mol, y)).length();
            assert!(d > 0.5 * BOND, "{x:?} and {y:?} are {d} apart");
        }
    }
}

fn min_unbonded_distance(mol: &Molecule) -> f32 {
    let mut min = f32::INFINITY;
    for x in mol.atom_ids() {
        for y in mol.atom_ids().filter(|&y| y > x) {
            if mol.bond_between(x, y).is_none() {
                min = min.min((pos(mol, x) - pos(mol, y)).length());
            }
        }
    }
    min
}

fn min_distance(mol: &Molecule) -> f32 {
    let mut min = f32::INFINITY;
    for x in mol.atom_ids() {
        for y in mol.atom_ids().filter(|&y| y > x) {
            min = min.min((pos(mol, x) - pos(mol, y)).length());
        }
    }
    min
}

/// Square lattice of `width` by `height` atoms.
fn grid(width: usize, height: usize) -> Molecule {
    let mut b = Builder::new();
    let atoms: Vec<_> = (0..width * height).map(|_| b.add_atom(6)).collect();
    for y in 0..height {
        for x in 0..width {
            let a = atoms[y * width + x];
            if x + 1 < width {
                b.add_bond(a, atoms[y * width + x + 1], 1);
            }
            if y + 1 < height {
                b.add_bond(a, atoms[(y + 1) * width + x], 1);
            }
        }
    }
    b.finish()
}

#[test]
fn bridged_bicycle_keeps_bond_lengths() {
    // norbornane: six-ring 0..5 bridged by 6 between 0 and 3
    let mut b = Builder::new();
    let a = b.add_ring(6, 6);
    let bridge = b.add_atom(6);
    b.add_bond(a[0], bridge, 1);
    b.add_bond(bridge, a[3], 1);
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.rings.len(), 2);
    assert!(layout.rings.iter().all(|r| r.size() == 5));
    assert_eq!(layout.ring_systems.len(), 1);
    assert_bond_lengths(&mol, 0.05);
    let closest = min_unbonded_distance(&mol);
    assert!(closest > 0.5 * BOND, "closest unbonded pair {closest}");
}

#[test]
fn adamantane_cage_is_drawn_without_overlaps() {
    // bridgeheads 0, 2, 4 on the six-ring, 6 at the back joined through 7, 8, 9
    let mut b = Builder::new();
    let a = b.add_ring(6, 6);
    let back: Vec<_> = (0..4).map(|_| b.add_atom(6)).collect();
    b.add_bond(a[0], back[1], 1);
    b.add_bond(back[1], back[0], 1);
    b.add_bond(back[0], back[2], 1);
    b.add_bond(back[2], a[2], 1);
    b.add_bond(back[0], back[3], 1);
    b.add_bond(back[3], a[4], 1);
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.rings.len(), 3);
    assert!(layout.rings.iter().all(|r| r.size() == 6));
    assert_bond_lengths(&mol, 0.1 * BOND);
    let closest = min_unbonded_distance(&mol);
    assert!(closest > 0.4 * BOND, "closest unbonded pair {closest}");
}

#[test]
fn cubane_atoms_are_kept_apart() {
    let mut b = Builder::new();
    let top = b.add_ring(6, 4);
    let bottom = b.add_ring(6, 4);
    for (&t, &u) in top.iter().zip(&bottom) {
        b.add_bond(t, u, 1);
    }
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.rings.len(), 5);
    assert!(layout.rings.iter().all(|r| r.size() == 4));
    assert_bond_lengths(&mol, 0.4 * BOND);
    let closest = min_distance(&mol);
    assert!(closest > 0.3 * BOND, "closest pair {closest}");
}

#[test]
fn squares_around_one_atom_tile_the_plane() {
    // four squares sharing the center atom 4, then nine around four inner atoms
    for width in [3, 4] {
        let mut mol = grid(width, width);
        let layout = generate(&mut mol);
        assert_all_placed(&mol, &layout);
        assert_eq!(layout.rings.len(), (width - 1) * (width - 1));
        assert_bond_lengths(&mol, 0.05);
        let closest = min_unbonded_distance(&mol);
        assert!(approx_eq(closest, BOND * 2f32.sqrt(), 0.1), "closest unbonded pair {closest}");
    }
}

#[test]
fn large_lattice_is_laid_out() {
    let mut mol = grid(6, 6);
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.rings.len(), 25);
    assert_bond_lengths(&mol, 0.05);
}

#[test]
fn path_edge_cap_falls_back_to_chains() {
    init();
    let config = LayoutConfig {
        max_path_edges: 2,
        ..LayoutConfig::default()
    };
    let mut mol = benzene();
    let layout = Sketcher::new(config).generate(&mut mol).expect("connected molecule");
    assert!(layout.rings.is_empty());
    assert_all_placed(&mol, &layout);
    assert!(min_distance(&mol) > 0.5 * BOND);
}

#[test]
fn ring_systems_joined_by_a_bond() {
    // biphenyl
    let mut b = Builder::new();
    let r1 = b.add_ring(6, 6);
    let r2 = b.add_ring(6, 6);
    b.add_bond(r1[0], r2[0], 1);
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.ring_systems.len(), 2);
    assert!(layout.iterations >= 1);
    assert_bond_lengths(&mol, 0.1);
    let c1 = math::center_2d(r1.iter().map(|&a| pos(&mol, a))).unwrap();
    let c2 = math::center_2d(r2.iter().map(|&a| pos(&mol, a))).unwrap();
    // the link bond points straight out of both rings
    assert!(approx_eq((c2 - c1).length(), 3.0 * BOND, 0.1));
}

#[test]
fn ring_with_side_chain() {
    let mut b = Builder::new();
    let ring = b.add_ring(6, 6);
    let tail: Vec<_> = (0..4).map(|_| b.add_atom(6)).collect();
    b.add_bond(ring[2], tail[0], 1);
    for w in tail.windows(2) {
        b.add_bond(w[0], w[1], 1);
    }
    let o = b.add_atom(8);
    b.add_bond(tail[1], o, 2);
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_bond_lengths(&mol, 0.1);
    assert!(layout.clash_score_after <= layout.clash_score_before);
    assert!(tail.iter().all(|&a| mol.atom(a).flags.aliphatic));
    assert!(ring.iter().all(|&a| mol.atom(a).is_in_ring() && !mol.atom(a).flags.aliphatic));
}

#[test]
fn chain_between_two_rings() {
    let mut b = Builder::new();
    let r1 = b.add_ring(6, 6);
    let link: Vec<_> = (0..3).map(|_| b.add_atom(6)).collect();
    let r2 = b.add_ring(6, 5);
    b.add_bond(r1[0], link[0], 1);
    b.add_bond(link[0], link[1], 1);
    b.add_bond(link[1], link[2], 1);
    b.add_bond(link[2], r2[0], 1);
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_eq!(layout.ring_systems.len(), 2);
    assert_bond_lengths(&mol, 0.1);
}

#[test]
fn branched_acyclic_molecule() {
    // isobutanoic acid-like branch point with a linear triple bond
    let mut b = Builder::new();
    let c: Vec<_> = (0..4).map(|_| b.add_atom(6)).collect();
    let n = b.add_atom(7);
    b.add_bond(c[0], c[1], 1);
    b.add_bond(c[1], c[2], 1);
    b.add_bond(c[1], c[3], 1);
    b.add_bond(c[3], n, 3);
    let mut mol = b.finish();
    let layout = generate(&mut mol);
    assert_all_placed(&mol, &layout);
    assert_bond_lengths(&mol, 0.1);
    let bonds = mol.bonds();
    let order: Vec<_> = bonds.iter().map(|b| b.order).collect();
    assert_eq!(order[3], BondOrder::Triple);
}

#[test]
fn ring_perception_is_repeatable() {
    let mol = naphthalene();
    let config = LayoutConfig::default();
    let first = find_sssr(&mol, &config);
    let second = find_sssr(&mol, &config);
    assert_eq!(members(&first), members(&second));
    for r in &first {
        assert_eq!(r.atoms.len(), r.bonds.len());
    }
    let systems = fragmenter::split_into_ring_systems(&first);
    assert_eq!(systems.len(), 1);
    assert_eq!(systems[0].atoms.len(), 10);
}

#[test]
fn repeated_generation_is_identical() {
    let mut mol = naphthalene();
    generate(&mut mol);
    let first: Vec<_> = mol.atoms().iter().map(|a| a.coordinates).collect();
    generate(&mut mol);
    let second: Vec<_> = mol.atoms().iter().map(|a| a.coordinates).collect();
    assert_eq!(first, second);
}

#[test]
fn bond_metadata_is_preserved() {
    let mut b = Builder::new();
    let x = b.add_atom(6);
    let y = b.add_charged_atom(8, -1);
    let mut bond = Bond::new(x, y);
    bond.stereo = Stereo::Up;
    bond.aromatic = true;
    b.add_bond_with(bond.clone());
    let mut mol = b.finish();
    generate(&mut mol);
    assert_eq!(mol.bond(BondId(0)), &bond);
    assert_eq!(mol.atom(y).charge, -1);
}

#[test]
fn custom_direction_and_length() {
    let mut mol = chain(2);
    let config = LayoutConfig::default()
        .with_bond_length(1.5)
        .with_initial_direction(PointF(1.0, 0.0));
    Sketcher::new(config).generate(&mut mol).unwrap();
    let d = pos(&mol, AtomId(1)) - pos(&mol, AtomId(0));
    assert!(approx_eq(d.length(), 1.5, 1e-4));
}
