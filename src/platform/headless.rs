//! Render sink without a screen
//!
//! Keeps the board as plain data and logs every call, so tests and the native
//! demo can check what the browser would have shown.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{RenderSink, Visual};
use crate::sim::{Atom, AtomId, Bounds, Player, PlayerNumber};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Created(Visual, Vec2),
    Destroyed(Visual),
    AtomUpdated(AtomId),
    Moved(Visual, Vec2),
    StageReplaced(usize),
    PlayersRendered { count: usize, can_add: bool },
    ClicksBound(usize),
}

#[derive(Debug, Clone)]
pub struct HeadlessSink {
    bounds: Bounds,
    visuals: BTreeMap<Visual, Vec2>,
    clickable: Vec<AtomId>,
    roster: Vec<PlayerNumber>,
    can_add: bool,
    pub events: Vec<SinkEvent>,
}

impl HeadlessSink {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: Bounds::new(width, height),
            visuals: BTreeMap::new(),
            clickable: Vec::new(),
            roster: Vec::new(),
            can_add: false,
            events: Vec::new(),
        }
    }

    /// Where a visual is currently drawn
    pub fn position(&self, visual: Visual) -> Option<Vec2> {
        self.visuals.get(&visual).copied()
    }

    pub fn particle_count(&self) -> usize {
        self.visuals
            .keys()
            .filter(|v| matches!(v, Visual::Particle(_)))
            .count()
    }

    pub fn clickable(&self) -> &[AtomId] {
        &self.clickable
    }

    /// Player numbers as last rendered, current player first
    pub fn roster(&self) -> &[PlayerNumber] {
        &self.roster
    }

    pub fn can_add_player(&self) -> bool {
        self.can_add
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl RenderSink for HeadlessSink {
    fn viewport(&self) -> Bounds {
        self.bounds
    }

    fn create_visual(&mut self, visual: Visual, _owner: PlayerNumber, pos: Vec2) {
        self.visuals.insert(visual, pos);
        self.events.push(SinkEvent::Created(visual, pos));
    }

    fn destroy_visual(&mut self, visual: Visual) {
        self.visuals.remove(&visual);
        self.events.push(SinkEvent::Destroyed(visual));
    }

    fn update_atom(&mut self, atom: &Atom) {
        self.visuals.insert(Visual::Atom(atom.id), atom.pos);
        self.events.push(SinkEvent::AtomUpdated(atom.id));
    }

    fn move_visual(&mut self, visual: Visual, pos: Vec2) {
        if let Some(current) = self.visuals.get_mut(&visual) {
            *current = pos;
        }
        self.events.push(SinkEvent::Moved(visual, pos));
    }

    fn replace_stage(&mut self, visuals: &[Visual]) {
        self.visuals.retain(|v, _| visuals.contains(v));
        self.events.push(SinkEvent::StageReplaced(visuals.len()));
    }

    fn render_players(&mut self, players: &[Player], can_add: bool) {
        self.roster = players.iter().map(|p| p.number).collect();
        self.can_add = can_add;
        self.events.push(SinkEvent::PlayersRendered {
            count: players.len(),
            can_add,
        });
    }

    fn bind_clicks(&mut self, clickable: &[AtomId]) {
        self.clickable = clickable.to_vec();
        self.events.push(SinkEvent::ClicksBound(clickable.len()));
    }
}
