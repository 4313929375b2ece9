//! Particle flight animation
//!
//! A small state machine: `Idle` until a batch of particles is launched,
//! `Animating` while the shared phase climbs from 0 to 1, then `Settling`
//! until the caller has waited out the settle delay and merged the batch.
//! Timers live with the caller; this only computes where things are.

use glam::Vec2;

use super::geometry::lerp;
use super::state::{GameState, Particle};

/// A particle together with the screen positions it travels between
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub particle: Particle,
    pub from: Vec2,
    pub to: Vec2,
}

impl Flight {
    /// Where the particle is drawn at its current phase
    pub fn position(&self) -> Vec2 {
        lerp(self.from, self.to, self.particle.phase)
    }
}

/// Result of advancing the animation by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Particles still travelling
    Moving,
    /// All particles reached their destination this frame
    Landed,
    /// Nothing in flight
    Stalled,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Animation {
    #[default]
    Idle,
    Animating { phase: f32, flights: Vec<Flight> },
    /// Particles have landed and are waiting to be merged
    Settling,
}

impl Animation {
    /// Start animating the particles of `game`
    ///
    /// Endpoints are snapshotted from the atoms now; nothing moves mid-flight.
    pub fn launch(game: &GameState) -> Self {
        if game.particles.is_empty() {
            return Animation::Idle;
        }
        let flights = game
            .particles
            .iter()
            .filter_map(|particle| {
                Some(Flight {
                    particle: particle.clone(),
                    from: game.atom(particle.src)?.pos,
                    to: game.atom(particle.dst)?.pos,
                })
            })
            .collect();
        Animation::Animating {
            phase: 0.0,
            flights,
        }
    }

    pub fn advance(&mut self, step: f32) -> Progress {
        let Animation::Animating { phase, flights } = self else {
            return Progress::Stalled;
        };
        *phase = (*phase + step).min(1.0);
        for flight in flights.iter_mut() {
            flight.particle.phase = *phase;
        }
        let landed = *phase >= 1.0;

        if landed {
            *self = Animation::Settling;
            Progress::Landed
        } else {
            Progress::Moving
        }
    }

    /// Flights currently in the air (empty unless animating)
    pub fn flights(&self) -> &[Flight] {
        match self {
            Animation::Animating { flights, .. } => flights,
            _ => &[],
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Animation::Idle)
    }

    pub fn is_settling(&self) -> bool {
        matches!(self, Animation::Settling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PHASE_STEP;
    use crate::sim::state::Atom;

    fn game_in_flight() -> GameState {
        GameState {
            particles: vec![Particle::new(1, 2, 1), Particle::new(1, 3, 1)],
            ..GameState::new(
                vec![
                    Atom::new(1, Vec2::new(0.0, 0.0), 1),
                    Atom::new(2, Vec2::new(100.0, 0.0), 1),
                    Atom::new(3, Vec2::new(0.0, 200.0), 1),
                ],
                Vec::new(),
            )
        }
    }

    #[test]
    fn test_launch_snapshots_endpoints() {
        let anim = Animation::launch(&game_in_flight());
        let flights = anim.flights();
        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0].from, Vec2::ZERO);
        assert_eq!(flights[0].to, Vec2::new(100.0, 0.0));
        assert_eq!(flights[1].to, Vec2::new(0.0, 200.0));
        assert_eq!(flights[0].position(), Vec2::ZERO);
    }

    #[test]
    fn test_quiescent_board_stays_idle() {
        let mut anim = Animation::launch(&GameState::default());
        assert!(anim.is_idle());
        assert_eq!(anim.advance(PHASE_STEP), Progress::Stalled);
    }

    #[test]
    fn test_positions_interpolate() {
        let mut anim = Animation::launch(&game_in_flight());
        assert_eq!(anim.advance(0.25), Progress::Moving);
        let flights = anim.flights();
        assert_eq!(flights[0].particle.phase, 0.25);
        assert_eq!(flights[0].position(), Vec2::new(25.0, 0.0));
        assert_eq!(flights[1].position(), Vec2::new(0.0, 50.0));
    }

    #[test]
    fn test_lands_after_fixed_number_of_frames() {
        let mut anim = Animation::launch(&game_in_flight());
        let frames = (1.0 / PHASE_STEP).ceil() as usize;
        for _ in 1..frames {
            assert_eq!(anim.advance(PHASE_STEP), Progress::Moving);
        }
        assert_eq!(anim.advance(PHASE_STEP), Progress::Landed);
        assert!(anim.is_settling());
        assert!(anim.flights().is_empty());
        assert_eq!(anim.advance(PHASE_STEP), Progress::Stalled);
    }
}
