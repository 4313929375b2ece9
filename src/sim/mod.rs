//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (atoms in id order, particles in emission order)
//! - Every transition returns a new `GameState`
//! - No rendering or platform dependencies

pub mod anim;
pub mod geometry;
pub mod layout;
pub mod reaction;
pub mod state;
pub mod turn;

pub use anim::{Animation, Flight, Progress};
pub use geometry::{centroid, direction, displace, distance, lerp, scale};
pub use layout::{Bounds, generate_layout, overlapping_pairs, relax};
pub use reaction::{detect_fissions, merge_particles, settle};
pub use state::{AtomId, Atom, GameState, Particle, Player, PlayerNumber, UNCLAIMED};
pub use turn::{ClickOutcome, add_player, apply_click, new_game};
