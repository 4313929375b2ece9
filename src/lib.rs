//! Atom Chain - a chain-reaction territory capture game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (layout, turns, fission/merge, animation)
//! - `session`: Update loop that owns the current state and drives the sink
//! - `platform`: Render sink abstraction (headless recorder, browser DOM)
//! - `settings`: Board configuration

pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{Action, Session, Wake};
pub use settings::{BoardSettings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Visual size of an atom (board units, also the repulsion radius)
    pub const ATOM_SIZE: f32 = 80.0;
    /// Atoms placed on a fresh board
    pub const DEFAULT_ATOM_COUNT: usize = 70;
    /// Largest board the pairwise relaxation is allowed to run on
    pub const MAX_ATOM_COUNT: usize = 1000;
    /// Highest proton count an atom can start with
    pub const MAX_START_PROTONS: u32 = 3;
    /// Repulsion passes run over a fresh layout
    pub const RELAX_PASSES: u32 = 2;
    pub const MAX_RELAX_PASSES: u32 = 16;

    /// An atom holding more protons than this fissions
    pub const FISSION_THRESHOLD: u32 = 4;
    /// Particles emitted per fission (one per nearest neighbour)
    pub const FISSION_FANOUT: usize = 4;
    /// How far a merging atom is pulled toward its sources
    pub const MERGE_PULL: f32 = 8.0;

    /// Players seated at the start of a game
    pub const INITIAL_PLAYERS: u32 = 2;
    /// Seats available at the table
    pub const MAX_PLAYERS: usize = 5;

    /// Particle phase advance per visual frame
    pub const PHASE_STEP: f32 = 0.03;
    /// Pause between particles landing and the merge (milliseconds)
    pub const SETTLE_DELAY_MS: u32 = 500;
    pub const MAX_SETTLE_DELAY_MS: u32 = 10_000;
}
