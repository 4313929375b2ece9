//! Turn handling
//!
//! Player actions are pure transitions: they return the next `GameState`
//! (with `previous` pointing at the state they were applied to) and leave the
//! input untouched.

use std::rc::Rc;

use rand::Rng;

use super::layout::{Bounds, generate_layout};
use super::reaction::detect_fissions;
use super::state::{AtomId, GameState, Player, PlayerNumber};
use crate::settings::BoardSettings;

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Unclaimed atom taken by the current player
    Claimed,
    /// Proton added to one of the current player's atoms
    Charged,
    /// Atom belongs to another player
    Rejected,
    /// Board is animating, or the click did not hit a known atom
    Ignored,
}

/// Build the opening state of a game
pub fn new_game(settings: &BoardSettings, bounds: &Bounds, rng: &mut impl Rng) -> GameState {
    let atoms = generate_layout(settings, bounds, rng);
    let players = (1..=settings.initial_players)
        .map(|number| Player::random(number, rng))
        .collect();
    GameState::new(atoms, players)
}

/// Move the current player to the back of the order
fn rotate(players: &[Player]) -> Vec<Player> {
    let mut order = players.to_vec();
    if !order.is_empty() {
        order.rotate_left(1);
    }
    order
}

/// Apply a click on `atom_id` for the current player
pub fn apply_click(game: &GameState, atom_id: AtomId) -> (GameState, ClickOutcome) {
    if !game.is_quiescent() {
        return (game.clone(), ClickOutcome::Ignored);
    }
    let (Some(current), Some(atom)) = (game.current_player(), game.atom(atom_id)) else {
        log::warn!("Click on atom {} ignored: no such atom or no players", atom_id);
        return (game.clone(), ClickOutcome::Ignored);
    };

    let (updated, outcome) = if atom.is_unclaimed() {
        (atom.with_owner(current.number), ClickOutcome::Claimed)
    } else if atom.owner == current.number {
        (atom.with_protons(atom.protons + 1), ClickOutcome::Charged)
    } else {
        return (game.clone(), ClickOutcome::Rejected);
    };

    let next = GameState {
        atoms: game
            .atoms
            .iter()
            .map(|a| if a.id == atom_id { updated.clone() } else { a.clone() })
            .collect(),
        players: rotate(&game.players),
        particles: Vec::new(),
        previous: Some(Rc::new(game.clone())),
    };

    match outcome {
        ClickOutcome::Charged => (detect_fissions(&next), outcome),
        _ => (next, outcome),
    }
}

/// Seat another player at the back of the order
///
/// Returns `None` when the table is already full or particles are in flight.
pub fn add_player(game: &GameState, max_players: usize, rng: &mut impl Rng) -> Option<GameState> {
    if !game.is_quiescent() || game.players.len() >= max_players {
        return None;
    }
    let number: PlayerNumber = game.players.iter().map(|p| p.number).max().unwrap_or(0) + 1;
    let player = Player::random(number, rng);
    log::info!("Player {} ({}) joins", player.number, player.name);

    let mut players = game.players.clone();
    players.push(player);
    Some(GameState {
        players,
        previous: Some(Rc::new(game.clone())),
        ..game.clone()
    })
}
