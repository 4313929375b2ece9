//! Game session: the update loop around the simulation
//!
//! Owns the current `GameState` and replaces it on every transition. Inputs
//! arrive as `Action`s, and every entry point returns a `Wake` telling the
//! platform which callback to schedule next. The session never sets a timer
//! itself.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::platform::{RenderSink, Visual};
use crate::settings::BoardSettings;
use crate::sim::{
    Animation, AtomId, ClickOutcome, GameState, Progress, add_player, apply_click, new_game,
    settle,
};

/// Player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Click(AtomId),
    AddPlayer,
}

/// What the platform should schedule next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Call `on_frame` on the next animation frame
    Frame,
    /// Call `on_delay` after this many milliseconds
    Delay(u32),
    /// Nothing new to schedule
    Idle,
}

pub struct Session<S: RenderSink> {
    settings: BoardSettings,
    state: GameState,
    animation: Animation,
    /// Particle visuals currently on the board
    in_flight: usize,
    rng: Pcg32,
    sink: S,
}

impl<S: RenderSink> Session<S> {
    /// Lay out a new board sized to the sink's viewport and draw it
    pub fn new(settings: BoardSettings, seed: u64, mut sink: S) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = new_game(&settings, &sink.viewport(), &mut rng);
        log::info!(
            "New game: {} atoms, {} players, seed {}",
            state.atoms.len(),
            state.players.len(),
            seed
        );

        let visuals: Vec<Visual> = state.atoms.iter().map(|a| Visual::Atom(a.id)).collect();
        for atom in &state.atoms {
            sink.create_visual(Visual::Atom(atom.id), atom.owner, atom.pos);
        }
        sink.replace_stage(&visuals);

        let mut session = Self {
            settings,
            state,
            animation: Animation::Idle,
            in_flight: 0,
            rng,
            sink,
        };
        // A fresh board has nothing in flight, so this only binds clicks
        session.present();
        session
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn handle(&mut self, action: Action) -> Wake {
        match action {
            Action::Click(atom_id) => {
                let (next, outcome) = apply_click(&self.state, atom_id);
                log::debug!("Click on atom {}: {:?}", atom_id, outcome);
                match outcome {
                    ClickOutcome::Claimed | ClickOutcome::Charged => {
                        self.state = next;
                        self.present()
                    }
                    ClickOutcome::Rejected | ClickOutcome::Ignored => Wake::Idle,
                }
            }
            Action::AddPlayer if !self.state.is_quiescent() => {
                log::debug!("Add player ignored while particles are in flight");
                Wake::Idle
            }
            Action::AddPlayer => {
                match add_player(&self.state, self.settings.max_players, &mut self.rng) {
                    Some(next) => {
                        self.state = next;
                        self.render_players();
                    }
                    None => log::warn!("Table full ({} players)", self.state.players.len()),
                }
                Wake::Idle
            }
        }
    }

    /// Advance the particles in flight by one frame
    pub fn on_frame(&mut self) -> Wake {
        match self.animation.advance(self.settings.phase_step) {
            Progress::Moving => {
                for (i, flight) in self.animation.flights().iter().enumerate() {
                    self.sink.move_visual(Visual::Particle(i), flight.position());
                }
                Wake::Frame
            }
            Progress::Landed => {
                for i in 0..self.in_flight {
                    self.sink.destroy_visual(Visual::Particle(i));
                }
                self.in_flight = 0;
                Wake::Delay(self.settings.settle_delay_ms)
            }
            Progress::Stalled => Wake::Idle,
        }
    }

    /// Merge the landed particles and carry on with the cascade
    pub fn on_delay(&mut self) -> Wake {
        if !self.animation.is_settling() {
            return Wake::Idle;
        }
        self.state = settle(&self.state);
        self.animation = Animation::Idle;
        self.present()
    }

    /// Run frames and delays back to back until the board is quiescent
    ///
    /// Returns the number of merge steps taken.
    pub fn drain(&mut self, mut wake: Wake) -> usize {
        let mut merges = 0;
        loop {
            wake = match wake {
                Wake::Frame => self.on_frame(),
                Wake::Delay(_) => {
                    merges += 1;
                    self.on_delay()
                }
                Wake::Idle => return merges,
            };
        }
    }

    /// Push the current state to the sink and decide what happens next
    fn present(&mut self) -> Wake {
        for atom in &self.state.atoms {
            self.sink.update_atom(atom);
        }
        self.render_players();

        if self.state.is_quiescent() {
            let clickable: Vec<AtomId> = self.state.atoms.iter().map(|a| a.id).collect();
            self.sink.bind_clicks(&clickable);
            return Wake::Idle;
        }

        self.sink.bind_clicks(&[]);
        self.animation = Animation::launch(&self.state);
        for (i, flight) in self.animation.flights().iter().enumerate() {
            self.sink
                .create_visual(Visual::Particle(i), flight.particle.owner, flight.from);
        }
        self.in_flight = self.animation.flights().len();
        log::debug!("Animating {} particles", self.in_flight);
        Wake::Frame
    }

    /// The add button is only offered while the board accepts input
    fn render_players(&mut self) {
        let can_add =
            self.state.is_quiescent() && self.state.players.len() < self.settings.max_players;
        self.sink.render_players(&self.state.players, can_add);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessSink;

    fn session(seed: u64) -> Session<HeadlessSink> {
        Session::new(
            BoardSettings::default(),
            seed,
            HeadlessSink::new(1280.0, 800.0),
        )
    }

    fn first_unclaimed(state: &GameState, except: AtomId) -> AtomId {
        state
            .atoms
            .iter()
            .find(|a| a.is_unclaimed() && a.id != except)
            .map(|a| a.id)
            .expect("an unclaimed atom")
    }

    #[test]
    fn test_new_session_binds_every_atom() {
        let s = session(1);
        assert_eq!(s.sink().clickable().len(), s.state().atoms.len());
        assert_eq!(s.sink().roster(), &[1, 2]);
        assert!(s.sink().can_add_player());
        assert!(s.animation().is_idle());
    }

    #[test]
    fn test_claim_rotates_roster() {
        let mut s = session(2);
        assert_eq!(s.handle(Action::Click(1)), Wake::Idle);
        assert_eq!(s.state().atom(1).map(|a| a.owner), Some(1));
        assert_eq!(s.sink().roster(), &[2, 1]);

        // Player 2 cannot touch player 1's atom
        let before = s.state().clone();
        assert_eq!(s.handle(Action::Click(1)), Wake::Idle);
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_add_player_until_full() {
        let mut s = session(3);
        for _ in 0..3 {
            s.handle(Action::AddPlayer);
        }
        assert_eq!(s.sink().roster(), &[1, 2, 3, 4, 5]);
        assert!(!s.sink().can_add_player());

        let before = s.state().clone();
        assert_eq!(s.handle(Action::AddPlayer), Wake::Idle);
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_cascade_settles_and_conserves_protons() {
        let mut s = session(2024);
        let a: AtomId = 1;

        s.handle(Action::Click(a));
        let b = first_unclaimed(s.state(), a);
        s.handle(Action::Click(b));

        let mut cascaded = false;
        for _ in 0..10 {
            assert_eq!(s.state().current_player().map(|p| p.number), Some(1));
            assert_eq!(s.state().atom(a).map(|x| x.owner), Some(1));
            let before = s.state().total_protons();

            let wake = s.handle(Action::Click(a));
            if wake == Wake::Frame {
                cascaded = true;
                assert!(s.sink().clickable().is_empty());
                assert!(s.sink().particle_count() > 0);

                // Input is ignored while particles are in flight
                let snapshot = s.state().clone();
                assert_eq!(s.handle(Action::Click(b)), Wake::Idle);
                assert_eq!(s.state(), &snapshot);

                assert!(s.drain(wake) >= 1);
            }

            assert!(s.state().is_quiescent());
            assert!(s.animation().is_idle());
            assert_eq!(s.sink().particle_count(), 0);
            assert_eq!(s.sink().clickable().len(), s.state().atoms.len());
            assert_eq!(s.state().total_protons(), before + 1);
            if cascaded {
                break;
            }

            let c = first_unclaimed(s.state(), a);
            s.handle(Action::Click(c));
        }
        assert!(cascaded, "charging one atom must eventually fission");
    }

    #[test]
    fn test_add_player_refused_while_animating() {
        let mut s = session(2024);
        let a: AtomId = 1;
        s.handle(Action::Click(a));
        let b = first_unclaimed(s.state(), a);
        s.handle(Action::Click(b));

        let mut wake = Wake::Idle;
        while wake == Wake::Idle {
            wake = s.handle(Action::Click(a));
            if wake == Wake::Idle {
                let c = first_unclaimed(s.state(), a);
                s.handle(Action::Click(c));
            }
        }
        assert!(!s.state().is_quiescent());
        assert!(!s.sink().can_add_player());

        let snapshot = s.state().clone();
        assert_eq!(s.handle(Action::AddPlayer), Wake::Idle);
        assert_eq!(s.state(), &snapshot);
        assert_eq!(s.sink().roster().len(), 2);

        s.drain(wake);
        assert!(s.sink().can_add_player());
        s.handle(Action::AddPlayer);
        assert_eq!(s.state().players.len(), 3);
    }

    #[test]
    fn test_frames_before_settle_delay() {
        let mut s = session(7);
        let a: AtomId = 1;
        s.handle(Action::Click(a));
        let b = first_unclaimed(s.state(), a);
        s.handle(Action::Click(b));

        let mut wake = Wake::Idle;
        while wake == Wake::Idle {
            wake = s.handle(Action::Click(a));
            if wake == Wake::Idle {
                let c = first_unclaimed(s.state(), a);
                s.handle(Action::Click(c));
            }
        }

        let mut frames = 0;
        while wake == Wake::Frame {
            wake = s.on_frame();
            frames += 1;
        }
        let expected = (1.0 / s.settings().phase_step).ceil() as usize;
        assert_eq!(frames, expected);
        assert_eq!(wake, Wake::Delay(s.settings().settle_delay_ms));
        assert_eq!(s.sink().particle_count(), 0);
        // Particles are still pending until the delay fires
        assert!(!s.state().is_quiescent());

        s.drain(wake);
        assert!(s.state().is_quiescent());
    }
}
