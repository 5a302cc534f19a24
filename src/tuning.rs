//! Data-driven game balance
//!
//! Difficulty only changes constants; the simulation itself is identical
//! across modes.

use serde::{Deserialize, Serialize};

/// Difficulty modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Backend collection holding this mode's leaderboard
    pub fn collection(&self) -> &'static str {
        match self {
            Difficulty::Easy => "jungle-easy",
            Difficulty::Hard => "jungle-hard",
        }
    }

    pub fn tuning(&self) -> Tuning {
        Tuning::for_difficulty(*self)
    }
}

/// Per-mode physics and layout constants (units are pixels and ticks)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub difficulty: Difficulty,
    /// Added to vertical velocity every tick
    pub gravity: f32,
    /// Vertical velocity after a bounce (negative is up)
    pub jump_velocity: f32,
    /// Cap on horizontal tracking speed
    pub max_speed_x: f32,
    pub platform_width: f32,
    /// Vertical gap between spawned platforms at score 0
    pub spawn_interval: f32,
    /// Extra spacing per point of score
    pub spawn_growth_per_point: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

impl Tuning {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                difficulty,
                gravity: 1.0,
                jump_velocity: -30.0,
                max_speed_x: 18.0,
                platform_width: 80.0,
                spawn_interval: 120.0,
                spawn_growth_per_point: 0.1,
            },
            Difficulty::Hard => Self {
                difficulty,
                gravity: 2.75,
                jump_velocity: -40.0,
                // Effectively instant tracking
                max_speed_x: 10_000.0,
                platform_width: 40.0,
                spawn_interval: 240.0,
                spawn_growth_per_point: 0.0,
            },
        }
    }

    /// Spacing between platforms at the given score
    pub fn spawn_interval_at(&self, score: u64) -> f32 {
        self.spawn_interval + self.spawn_growth_per_point * score as f32
    }
}
