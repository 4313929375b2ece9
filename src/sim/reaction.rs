//! Chain reactions: fission of overloaded atoms and merging of arrivals
//!
//! A cascade alternates between the two steps. `detect_fissions` turns every
//! overloaded atom into a burst of particles aimed at its nearest neighbours;
//! once those have landed, `merge_particles` folds them into their targets,
//! which may overload in turn.

use glam::Vec2;

use super::geometry::{centroid, direction, displace, distance, scale};
use super::state::{Atom, AtomId, GameState, Particle};
use crate::consts::{FISSION_FANOUT, FISSION_THRESHOLD, MERGE_PULL};

/// The `count` atoms closest to `source`, nearest first
///
/// The sort is stable, so equidistant atoms keep their board order.
fn nearest_neighbours<'a>(atoms: &'a [Atom], source: &Atom, count: usize) -> Vec<&'a Atom> {
    let mut others: Vec<&Atom> = atoms.iter().filter(|a| a.id != source.id).collect();
    others.sort_by(|a, b| distance(source.pos, a.pos).total_cmp(&distance(source.pos, b.pos)));
    others.truncate(count);
    others
}

/// Fission every overloaded atom once
///
/// Each fissioning atom emits one particle per target and loses one proton per
/// particle, so a board of at least `FISSION_FANOUT + 1` atoms always sheds
/// exactly `FISSION_FANOUT`. Returns the input unchanged when nothing is
/// overloaded.
pub fn detect_fissions(game: &GameState) -> GameState {
    if !game.atoms.iter().any(|a| a.protons > FISSION_THRESHOLD) {
        return game.clone();
    }

    let mut particles = game.particles.clone();
    let atoms = game
        .atoms
        .iter()
        .map(|atom| {
            if atom.protons <= FISSION_THRESHOLD {
                return atom.clone();
            }
            let targets = nearest_neighbours(&game.atoms, atom, FISSION_FANOUT);
            if targets.is_empty() {
                return atom.clone();
            }
            log::debug!(
                "Atom {} (owner {}) fissions into {:?}",
                atom.id,
                atom.owner,
                targets.iter().map(|t| t.id).collect::<Vec<_>>()
            );
            particles.extend(
                targets
                    .iter()
                    .map(|target| Particle::new(atom.id, target.id, atom.owner)),
            );
            atom.with_protons(atom.protons - targets.len() as u32)
        })
        .collect();

    GameState {
        atoms,
        particles,
        ..game.clone()
    }
}

/// Fold a group of arrivals into their destination atom
///
/// The atom drifts toward the centroid of the distinct source atoms and is
/// taken over by whoever owned the first arrival.
fn absorb(atom: &Atom, incoming: &[&Particle], game: &GameState) -> Atom {
    let mut sources: Vec<AtomId> = Vec::new();
    for particle in incoming {
        if !sources.contains(&particle.src) {
            sources.push(particle.src);
        }
    }

    let pull = centroid(sources.iter().filter_map(|id| game.atom(*id)).map(|a| a.pos))
        .map(|center| {
            let dir = direction(center, atom.pos);
            scale(dir, MERGE_PULL / (dir.length() + 1.0))
        })
        .unwrap_or(Vec2::ZERO);

    Atom {
        owner: incoming[0].owner,
        protons: atom.protons + incoming.len() as u32,
        pos: displace(atom.pos, pull),
        ..atom.clone()
    }
}

/// Land every particle in flight
pub fn merge_particles(game: &GameState) -> GameState {
    if game.particles.is_empty() {
        return game.clone();
    }

    // Grouped by destination, in order of first arrival
    let mut groups: Vec<(AtomId, Vec<&Particle>)> = Vec::new();
    for particle in &game.particles {
        match groups.iter_mut().find(|(dst, _)| *dst == particle.dst) {
            Some((_, group)) => group.push(particle),
            None => groups.push((particle.dst, vec![particle])),
        }
    }

    let atoms = game
        .atoms
        .iter()
        .map(|atom| match groups.iter().find(|(dst, _)| *dst == atom.id) {
            Some((_, incoming)) => absorb(atom, incoming, game),
            None => atom.clone(),
        })
        .collect();

    log::debug!(
        "Merged {} particles into {} atoms",
        game.particles.len(),
        groups.len()
    );

    GameState {
        atoms,
        particles: Vec::new(),
        ..game.clone()
    }
}

/// One cascade step: land the particles, then fission whatever overloaded
pub fn settle(game: &GameState) -> GameState {
    detect_fissions(&merge_particles(game))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of_atoms(count: u32) -> Vec<Atom> {
        (1..=count)
            .map(|id| Atom::new(id, Vec2::new((id - 1) as f32 * 10.0, 0.0), 1))
            .collect()
    }

    fn board(atoms: Vec<Atom>) -> GameState {
        GameState::new(atoms, Vec::new())
    }

    #[test]
    fn test_fission_targets_four_nearest() {
        let mut atoms = line_of_atoms(6);
        atoms[0] = atoms[0].with_protons(5).with_owner(1);
        let game = detect_fissions(&board(atoms));

        assert_eq!(game.atoms[0].protons, 1);
        assert_eq!(game.particles.len(), 4);
        let targets: Vec<AtomId> = game.particles.iter().map(|p| p.dst).collect();
        assert_eq!(targets, vec![2, 3, 4, 5]);
        for particle in &game.particles {
            assert_eq!(particle.src, 1);
            assert_eq!(particle.owner, 1);
            assert_eq!(particle.phase, 0.0);
        }
        // Targets are not charged until the particles land
        assert!(game.atoms[1..].iter().all(|a| a.protons == 1));
    }

    #[test]
    fn test_fission_ties_keep_board_order() {
        let mut atoms = vec![
            Atom::new(1, Vec2::ZERO, 5),
            Atom::new(2, Vec2::new(10.0, 0.0), 1),
            Atom::new(3, Vec2::new(-10.0, 0.0), 1),
            Atom::new(4, Vec2::new(0.0, 10.0), 1),
            Atom::new(5, Vec2::new(0.0, -10.0), 1),
            Atom::new(6, Vec2::new(10.0, 0.0), 1),
        ];
        atoms[0].owner = 2;
        let game = detect_fissions(&board(atoms));
        let targets: Vec<AtomId> = game.particles.iter().map(|p| p.dst).collect();
        assert_eq!(targets, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_no_overload_is_unchanged() {
        let game = board(line_of_atoms(6).into_iter().map(|a| a.with_protons(4)).collect());
        assert_eq!(detect_fissions(&game), game);
    }

    #[test]
    fn test_detect_fissions_is_idempotent() {
        let mut atoms = line_of_atoms(8);
        atoms[0] = atoms[0].with_protons(8).with_owner(1);
        atoms[5] = atoms[5].with_protons(5).with_owner(2);
        let once = detect_fissions(&board(atoms));
        let twice = detect_fissions(&once);
        assert_eq!(once, twice);
        assert_eq!(once.particles.len(), 8);
        assert_eq!(once.atoms[0].protons, 4);
        assert_eq!(once.atoms[5].protons, 1);
    }

    #[test]
    fn test_merge_first_arrival_owns() {
        let atoms = vec![
            Atom::new(1, Vec2::new(0.0, 0.0), 1).with_owner(3),
            Atom::new(2, Vec2::new(20.0, 0.0), 1),
            Atom::new(3, Vec2::new(-20.0, 0.0), 1),
        ];
        let game = GameState {
            particles: vec![Particle::new(2, 1, 2), Particle::new(3, 1, 1)],
            ..board(atoms)
        };
        let merged = merge_particles(&game);

        assert!(merged.particles.is_empty());
        assert_eq!(merged.atoms[0].protons, 3);
        assert_eq!(merged.atoms[0].owner, 2);
        // Sources on opposite sides cancel out
        assert_eq!(merged.atoms[0].pos, Vec2::ZERO);
        assert_eq!(merged.atoms[1], game.atoms[1]);
        assert_eq!(merged.atoms[2], game.atoms[2]);
    }

    #[test]
    fn test_merge_pulls_toward_distinct_sources() {
        let atoms = vec![
            Atom::new(1, Vec2::ZERO, 1),
            Atom::new(2, Vec2::new(30.0, 0.0), 1),
            Atom::new(3, Vec2::new(0.0, 30.0), 1),
        ];
        // Two particles from atom 2, one from atom 3: the pull must not favour 2
        let game = GameState {
            particles: vec![
                Particle::new(2, 1, 1),
                Particle::new(2, 1, 1),
                Particle::new(3, 1, 1),
            ],
            ..board(atoms)
        };
        let merged = merge_particles(&game);
        let pos = merged.atoms[0].pos;
        assert!((pos.x - pos.y).abs() < 1e-5);

        let dir = Vec2::new(15.0, 15.0);
        let expected = dir * (MERGE_PULL / (dir.length() + 1.0));
        assert!((pos - expected).length() < 1e-4);
        assert_eq!(merged.atoms[0].protons, 4);
    }

    #[test]
    fn test_settle_conserves_protons() {
        let mut atoms = line_of_atoms(7);
        atoms[3] = atoms[3].with_protons(5).with_owner(1);
        let game = detect_fissions(&board(atoms));
        let total = game.total_protons();

        let mut state = game;
        let mut steps = 0;
        while !state.is_quiescent() {
            state = settle(&state);
            assert_eq!(state.total_protons(), total);
            steps += 1;
            assert!(steps < 100);
        }
    }

    #[test]
    fn test_lone_atom_cannot_fission() {
        let game = board(vec![Atom::new(1, Vec2::ZERO, 6)]);
        let after = detect_fissions(&game);
        assert!(after.particles.is_empty());
        assert_eq!(after.atoms[0].protons, 6);
    }
}
