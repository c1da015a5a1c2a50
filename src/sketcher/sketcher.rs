use super::*;
use crate::config::LayoutConfig;
use crate::coordgen::fragmenter::{self, RingSystem};
use crate::coordgen::{self, builder, placer};
use crate::error::{Error, Result};
use log::{debug, warn};

/// What a call to [`Sketcher::generate`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// The smallest set of smallest rings, in perception order.
    pub rings: Vec<Ring>,
    pub ring_systems: Vec<RingSystem>,
    /// Rounds of the chain/ring alternation that ran after seeding.
    pub iterations: usize,
    /// Atoms the layout could not reach before the safety bound.
    pub unplaced: Vec<AtomId>,
    pub clash_score_before: f32,
    pub clash_score_after: f32,
}
impl Layout {
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Drives a full layout: seed the largest ring system or the longest
/// chain, alternate chain and ring system placement, then clean up clashes.
#[derive(Debug, Clone)]
pub struct Sketcher {
    config: LayoutConfig,
    minimizer: coordgen::Minimizer,
}
impl Default for Sketcher {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
impl Sketcher {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            minimizer: coordgen::Minimizer::new(&config),
            config,
        }
    }
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Write 2-D coordinates into every atom of `mol`.
    ///
    /// The molecule must be a single connected component; otherwise
    /// [`Error::NotConnected`] is returned and `mol` is left untouched.
    /// Running out of iterations is not an error: the atoms that could not
    /// be reached are listed in [`Layout::unplaced`].
    pub fn generate(&self, mol: &mut Molecule) -> Result<Layout> {
        self.config.validate()?;
        let fragments = mol.fragment_count();
        if fragments > 1 {
            return Err(Error::NotConnected { fragments });
        }
        mol.reset_layout();
        debug!(
            "generating coordinates for {} atoms, {} bonds",
            mol.count_atoms(),
            mol.count_bonds()
        );
        match mol.count_atoms() {
            0 => return Ok(Layout::default()),
            1 => {
                mol.atom_mut(AtomId(0)).set_coords(PointF::default());
                return Ok(Layout::default());
            }
            _ => {}
        }
        let mut layout = Layout::default();
        let atom_system = self.seed(mol, &mut layout);
        self.place_remaining(mol, &mut layout, &atom_system);
        self.finish(mol, &mut layout);
        Ok(layout)
    }

    /// Resolve clashes and record what is still unplaced.
    fn finish(&self, mol: &mut Molecule, layout: &mut Layout) {
        let report = self.minimizer.avoid_clashes(mol, &layout.rings);
        layout.clash_score_before = report.before;
        layout.clash_score_after = report.after;
        layout.unplaced = mol
            .atom_ids()
            .filter(|&a| !mol.atom(a).flags.placed)
            .collect();
        if !layout.is_complete() {
            warn!(
                "layout incomplete after {} iterations: {} atoms unplaced",
                layout.iterations,
                layout.unplaced.len()
            );
        }
    }

    /// Lay out the first piece of the molecule at the origin and return the
    /// ring system index of every atom.
    fn seed(&self, mol: &mut Molecule, layout: &mut Layout) -> Vec<Option<usize>> {
        let bond_length = self.config.bond_length;
        let direction = self.config.seed_direction();
        if mol.expected_ring_count() > 0 {
            layout.rings = coordgen::find_sssr(mol, &self.config);
            for r in &layout.rings {
                for &a in &r.atoms {
                    mol.atom_mut(a).flags.in_ring = true;
                }
            }
            layout.ring_systems = fragmenter::split_into_ring_systems(&layout.rings);
        }
        for a in mol.atom_ids() {
            let atom = mol.atom_mut(a);
            atom.flags.aliphatic = !atom.flags.in_ring;
        }
        let atom_system = fragmenter::atom_ring_systems(&layout.ring_systems, mol.count_atoms());
        if let Some(index) = fragmenter::largest_ring_system(&layout.ring_systems) {
            let system = &layout.ring_systems[index];
            let seed = fragmenter::most_complex_ring(system, &layout.rings, system.rings.iter().copied())
                .unwrap_or(system.rings[0]);
            let start = layout.rings[seed].atoms[0];
            debug!(
                "seeding ring system {index} ({} rings) with ring {seed} of size {}",
                system.rings.len(),
                layout.rings[seed].size()
            );
            builder::place_ring_system(
                mol,
                &mut layout.rings,
                system,
                seed,
                start,
                direction,
                bond_length,
            );
            builder::place_ring_substituents(mol, &layout.rings, system, bond_length);
            return atom_system;
        }
        let chain = placer::longest_chain(mol);
        debug!("seeding chain of {} atoms", chain.len());
        if chain.is_empty() {
            mol.atom_mut(AtomId(0)).set_coords(PointF::default());
        } else {
            placer::place_linear_chain(mol, &chain, direction, bond_length);
        }
        atom_system
    }

    /// Alternate chain growth and ring system placement until everything is
    /// placed. The round count is bounded by the atom count.
    fn place_remaining(&self, mol: &mut Molecule, layout: &mut Layout, atom_system: &[Option<usize>]) {
        let bond_length = self.config.bond_length;
        while !mol.is_fully_placed() && layout.iterations <= mol.count_atoms() {
            layout.iterations += 1;
            let grown = placer::place_aliphatics(mol, bond_length);
            let system = builder::place_next_ring_system(
                mol,
                &mut layout.rings,
                &layout.ring_systems,
                atom_system,
                &self.config,
            );
            debug!(
                "round {}: {grown} chain atoms, ring system {system:?}",
                layout.iterations
            );
            if grown == 0 && system.is_none() {
                break;
            }
        }
    }
}
