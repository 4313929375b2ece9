//! Platform abstraction layer
//!
//! The simulation never touches the page. Everything visible goes through a
//! `RenderSink`:
//! - `headless`: records what would have been drawn (tests, native demo)
//! - `dom`: browser DOM via web-sys (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod headless;

pub use headless::{HeadlessSink, SinkEvent};

use glam::Vec2;

use crate::sim::{Atom, AtomId, Bounds, Player, PlayerNumber};

/// Something the sink draws on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visual {
    Atom(AtomId),
    /// Particle by index within the batch currently in flight
    Particle(usize),
}

/// View-layer capabilities the game needs
pub trait RenderSink {
    /// Current board dimensions
    fn viewport(&self) -> Bounds;

    /// Create a visual at `pos`, styled for `owner`
    fn create_visual(&mut self, visual: Visual, owner: PlayerNumber, pos: Vec2);

    fn destroy_visual(&mut self, visual: Visual);

    /// Refresh an atom's position, owner style and proton image
    fn update_atom(&mut self, atom: &Atom);

    fn move_visual(&mut self, visual: Visual, pos: Vec2);

    /// Replace everything on the board with the given visuals
    fn replace_stage(&mut self, visuals: &[Visual]);

    /// Draw the player panel in turn order, with an "add player" control
    /// when `can_add` is set
    fn render_players(&mut self, players: &[Player], can_add: bool);

    /// Make exactly these atoms respond to clicks
    fn bind_clicks(&mut self, clickable: &[AtomId]);
}
