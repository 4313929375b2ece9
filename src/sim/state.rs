//! Game state and core simulation types
//!
//! A `GameState` is a snapshot: transitions build a new one from the old,
//! field by field, and never touch a state that has already been handed out.

use std::rc::Rc;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type AtomId = u32;
pub type PlayerNumber = u32;

/// Owner value of an atom nobody has claimed yet
pub const UNCLAIMED: PlayerNumber = 0;

/// An atom on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub id: AtomId,
    /// Owning player number, or `UNCLAIMED`
    pub owner: PlayerNumber,
    /// Top-left corner of the atom's visual
    pub pos: Vec2,
    pub protons: u32,
}

impl Atom {
    pub fn new(id: AtomId, pos: Vec2, protons: u32) -> Self {
        Self {
            id,
            owner: UNCLAIMED,
            pos,
            protons,
        }
    }

    pub fn is_unclaimed(&self) -> bool {
        self.owner == UNCLAIMED
    }

    pub fn with_owner(&self, owner: PlayerNumber) -> Self {
        Self {
            owner,
            ..self.clone()
        }
    }

    pub fn with_protons(&self, protons: u32) -> Self {
        Self {
            protons,
            ..self.clone()
        }
    }

    pub fn displaced(&self, delta: Vec2) -> Self {
        Self {
            pos: super::geometry::displace(self.pos, delta),
            ..self.clone()
        }
    }
}

/// Syllables player names are built from
const SYLLABLES: [&str; 19] = [
    "hai", "kan", "tee", "pu", "hil", "vat", "ros", "nul", "li", "ge", "toh", "ma", "wuk", "ur",
    "roo", "niu", "koi", "me", "ta",
];

/// Syllables per generated name
const NAME_SYLLABLES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub number: PlayerNumber,
}

impl Player {
    /// Seat a player under a freshly generated name
    pub fn random(number: PlayerNumber, rng: &mut impl Rng) -> Self {
        let name = (0..NAME_SYLLABLES)
            .map(|_| SYLLABLES[rng.random_range(0..SYLLABLES.len())])
            .collect();
        Self { name, number }
    }
}

/// A unit of charge travelling from a fissioning atom to a neighbour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Animation progress, 0 at the source and 1 at the destination
    pub phase: f32,
    pub src: AtomId,
    pub dst: AtomId,
    /// Player whose atom fissioned
    pub owner: PlayerNumber,
}

impl Particle {
    pub fn new(src: AtomId, dst: AtomId, owner: PlayerNumber) -> Self {
        Self {
            phase: 0.0,
            src,
            dst,
            owner,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Atoms in id order
    pub atoms: Vec<Atom>,
    /// Turn order; the head is the player to move
    pub players: Vec<Player>,
    /// Particles in flight, in emission order (empty when quiescent)
    pub particles: Vec<Particle>,
    /// State before the last player action
    #[serde(skip)]
    pub previous: Option<Rc<GameState>>,
}

impl GameState {
    pub fn new(atoms: Vec<Atom>, players: Vec<Player>) -> Self {
        Self {
            atoms,
            players,
            particles: Vec::new(),
            previous: None,
        }
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.first()
    }

    /// True when nothing is in flight and clicks are accepted
    pub fn is_quiescent(&self) -> bool {
        self.particles.is_empty()
    }

    /// Protons on the board plus those carried by particles in flight
    pub fn total_protons(&self) -> u32 {
        self.atoms.iter().map(|a| a.protons).sum::<u32>() + self.particles.len() as u32
    }

    /// Earlier states, most recent first
    pub fn history(&self) -> impl Iterator<Item = &GameState> {
        std::iter::successors(self.previous.as_deref(), |s| s.previous.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_player_names_are_four_syllables() {
        let mut rng = Pcg32::seed_from_u64(7);
        for number in 1..=5 {
            let player = Player::random(number, &mut rng);
            assert_eq!(player.number, number);
            assert!(player.name.len() >= 2 * NAME_SYLLABLES);
            assert!(player.name.len() <= 3 * NAME_SYLLABLES);
        }
    }

    #[test]
    fn test_player_names_are_seeded() {
        let a = Player::random(1, &mut Pcg32::seed_from_u64(42));
        let b = Player::random(1, &mut Pcg32::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_total_protons_counts_particles() {
        let mut state = GameState::new(
            vec![
                Atom::new(1, Vec2::ZERO, 3),
                Atom::new(2, Vec2::new(100.0, 0.0), 2),
            ],
            Vec::new(),
        );
        assert_eq!(state.total_protons(), 5);
        state.particles.push(Particle::new(1, 2, 1));
        assert_eq!(state.total_protons(), 6);
        assert!(!state.is_quiescent());
    }

    #[test]
    fn test_history_walks_previous_chain() {
        let first = GameState::default();
        let second = GameState {
            previous: Some(Rc::new(first.clone())),
            ..first.clone()
        };
        let third = GameState {
            previous: Some(Rc::new(second.clone())),
            ..second.clone()
        };
        assert_eq!(third.history().count(), 2);
        assert_eq!(first.history().count(), 0);
    }

    #[test]
    fn test_atom_functional_updates_keep_source() {
        let atom = Atom::new(3, Vec2::new(1.0, 2.0), 1);
        let claimed = atom.with_owner(2).with_protons(4);
        assert!(atom.is_unclaimed());
        assert_eq!(atom.protons, 1);
        assert_eq!(claimed.owner, 2);
        assert_eq!(claimed.protons, 4);
        assert_eq!(atom.displaced(Vec2::new(1.0, 1.0)).pos, Vec2::new(2.0, 3.0));
    }
}
