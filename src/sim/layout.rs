//! Board layout generation
//!
//! Atoms are scattered uniformly over the board and then pushed apart by a
//! fixed number of repulsion passes. The passes are a heuristic: a crowded
//! board can still end up with overlapping atoms, there is no guarantee of a
//! collision-free fixed point.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{direction, distance, scale};
use super::state::{Atom, AtomId};
use crate::consts::MAX_START_PROTONS;
use crate::settings::BoardSettings;

/// Board dimensions as reported by the render sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Range of top-left positions that keep an atom of `size` on the board
    ///
    /// Never narrower than one unit, so a board smaller than an atom still
    /// yields a (crowded) layout instead of an empty sampling range.
    pub fn span(&self, size: f32) -> Vec2 {
        Vec2::new((self.width - size).max(1.0), (self.height - size).max(1.0))
    }

    /// True if the board cannot hold even a single atom
    pub fn is_degenerate(&self, size: f32) -> bool {
        self.width <= size || self.height <= size
    }

    /// Clamp a corner into `[0, span]`
    ///
    /// The upper bound is inclusive, so a relaxed atom may sit exactly on
    /// `width - size` while fresh ones are sampled below it. The atom still
    /// fits on the board either way.
    fn clamp(&self, pos: Vec2, size: f32) -> Vec2 {
        pos.clamp(Vec2::ZERO, self.span(size))
    }
}

/// Place `count` atoms at uniform random positions with ids `1..=count`
pub fn scatter(count: usize, bounds: &Bounds, size: f32, rng: &mut impl Rng) -> Vec<Atom> {
    let span = bounds.span(size);
    (1..=count as AtomId)
        .map(|id| {
            let pos = Vec2::new(rng.random_range(0.0..span.x), rng.random_range(0.0..span.y));
            let protons = rng.random_range(1..=MAX_START_PROTONS);
            Atom::new(id, pos, protons)
        })
        .collect()
}

/// Push `atom` out of `other` if they overlap
fn nudge_away(atom: Atom, other: &Atom, size: f32) -> Atom {
    if atom.id == other.id {
        return atom;
    }
    let dist = distance(atom.pos, other.pos);
    if dist >= size {
        return atom;
    }
    if dist < 1.0 {
        // Coincident pair: unlike the per-pair push, only the higher id
        // steps aside. Moving both by the same offset keeps them coincident.
        return if atom.id > other.id {
            atom.displaced(Vec2::new(size, 0.0))
        } else {
            atom
        };
    }
    atom.displaced(scale(
        direction(atom.pos, other.pos),
        (size - dist) / (dist + 1.0),
    ))
}

/// One repulsion pass
///
/// Each atom accumulates its own displacement against the positions every
/// other atom had before the pass started.
pub fn relax(atoms: &[Atom], size: f32) -> Vec<Atom> {
    atoms
        .iter()
        .map(|atom| {
            atoms
                .iter()
                .fold(atom.clone(), |moved, other| nudge_away(moved, other, size))
        })
        .collect()
}

/// Generate the atoms of a fresh board
pub fn generate_layout(settings: &BoardSettings, bounds: &Bounds, rng: &mut impl Rng) -> Vec<Atom> {
    let size = settings.atom_size;
    if bounds.is_degenerate(size) {
        log::warn!(
            "Board {}x{} is too small for atoms of size {}; atoms will overlap",
            bounds.width,
            bounds.height,
            size
        );
    }

    let mut atoms = scatter(settings.atom_count, bounds, size, rng);
    let scattered_overlaps = overlapping_pairs(&atoms, size);

    for _ in 0..settings.relax_passes {
        atoms = relax(&atoms, size)
            .into_iter()
            .map(|atom| Atom {
                pos: bounds.clamp(atom.pos, size),
                ..atom
            })
            .collect();
    }

    log::debug!(
        "Layout: {} atoms, overlapping pairs {} -> {} after {} passes",
        atoms.len(),
        scattered_overlaps,
        overlapping_pairs(&atoms, size),
        settings.relax_passes
    );

    atoms
}

/// Number of unordered atom pairs closer than `size`
pub fn overlapping_pairs(atoms: &[Atom], size: f32) -> usize {
    atoms
        .iter()
        .enumerate()
        .map(|(i, a)| {
            atoms[i + 1..]
                .iter()
                .filter(|b| distance(a.pos, b.pos) < size)
                .count()
        })
        .sum()
}
