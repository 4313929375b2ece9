//! Board settings
//!
//! Persisted in LocalStorage on the web; native builds always use defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a set of board settings cannot be played
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("atom_count must be at least 1")]
    NoAtoms,
    #[error("atom_count must be at most 1000 (got {0})")]
    TooManyAtoms(usize),
    #[error("atom_size must be finite and > 0 (got {0})")]
    AtomSize(f32),
    #[error("initial_players must be between 1 and max_players ({max}), got {initial}")]
    InitialPlayers { initial: u32, max: usize },
    #[error("phase_step must be in (0, 1] (got {0})")]
    PhaseStep(f32),
    #[error("relax_passes must be at most 16 (got {0})")]
    RelaxPasses(u32),
    #[error("settle_delay_ms must be at most 10000 (got {0})")]
    SettleDelay(u32),
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    /// Atoms placed on a new board
    pub atom_count: usize,
    /// Atom visual size and repulsion radius
    pub atom_size: f32,
    /// Repulsion passes over a fresh layout
    pub relax_passes: u32,
    pub initial_players: u32,
    pub max_players: usize,
    /// Particle phase advance per frame
    pub phase_step: f32,
    /// Pause after particles land, before they merge (milliseconds)
    pub settle_delay_ms: u32,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            atom_count: DEFAULT_ATOM_COUNT,
            atom_size: ATOM_SIZE,
            relax_passes: RELAX_PASSES,
            initial_players: INITIAL_PLAYERS,
            max_players: MAX_PLAYERS,
            phase_step: PHASE_STEP,
            settle_delay_ms: SETTLE_DELAY_MS,
        }
    }
}

impl BoardSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.atom_count == 0 {
            return Err(SettingsError::NoAtoms);
        }
        if self.atom_count > MAX_ATOM_COUNT {
            return Err(SettingsError::TooManyAtoms(self.atom_count));
        }
        if self.relax_passes > MAX_RELAX_PASSES {
            return Err(SettingsError::RelaxPasses(self.relax_passes));
        }
        if !self.atom_size.is_finite() || self.atom_size <= 0.0 {
            return Err(SettingsError::AtomSize(self.atom_size));
        }
        if self.initial_players == 0 || self.initial_players as usize > self.max_players {
            return Err(SettingsError::InitialPlayers {
                initial: self.initial_players,
                max: self.max_players,
            });
        }
        if !(self.phase_step > 0.0 && self.phase_step <= 1.0) {
            return Err(SettingsError::PhaseStep(self.phase_step));
        }
        if self.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(SettingsError::SettleDelay(self.settle_delay_ms));
        }
        Ok(())
    }

    /// Parse stored settings, falling back to defaults if they are unusable
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(e) => {
                    log::warn!("Stored settings rejected ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Stored settings unreadable ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "atom_chain_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
