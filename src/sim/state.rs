//! Game state and core simulation types
//!
//! Everything a session mutates lives in [`SessionState`]; a restart
//! throws the whole record away and builds a new one.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Player fell off the screen. Terminal; restart builds a new state.
    Over,
}

/// Something that happened during a step, for the scoring/UI layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player bounced off a fresh platform and scored
    PlatformBounced { platform_id: u32, score: u64 },
    /// The starting safety floor is gone for good
    BedrockRemoved,
    /// Session ended
    GameOver { score: u64, ticks: u64 },
}

/// The player ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Center position in world space (y grows downward)
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Player {
    pub fn bottom(&self) -> f32 {
        self.pos.y + PLAYER_RADIUS
    }

    pub fn top(&self) -> f32 {
        self.pos.y - PLAYER_RADIUS
    }

    pub fn left(&self) -> f32 {
        self.pos.x - PLAYER_RADIUS
    }

    pub fn right(&self) -> f32 {
        self.pos.x + PLAYER_RADIUS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Regular,
    /// Full-width floor present only at the start of a session
    Bedrock,
}

/// A platform; `pos` is the center of its rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Already scored; removed at the end of the step
    pub used: bool,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn is_bedrock(&self) -> bool {
        self.kind == PlatformKind::Bedrock
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height / 2.0
    }

    pub fn left(&self) -> f32 {
        self.pos.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Bedrock never scores; regular platforms score once
    pub fn is_eligible(&self) -> bool {
        self.is_bedrock() || !self.used
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Platforms in creation order
    pub platforms: Vec<Platform>,
    /// Vertical scroll; only ever decreases
    pub camera_offset: f32,
    /// World y of the most recently spawned platform
    pub highest_platform_y: f32,
    /// World y the player started at
    pub start_y: f32,
    pub last_bounced: Option<u32>,
    /// Set once the bedrock has been removed
    pub bedrock_retired: bool,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl SessionState {
    /// Create a fresh session with the given seed
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let start = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - PLAYER_START_OFFSET);
        let mut state = Self {
            tuning,
            seed,
            phase: GamePhase::Running,
            score: 0,
            time_ticks: 0,
            player: Player {
                pos: start,
                vel: Vec2::ZERO,
            },
            platforms: Vec::with_capacity(INITIAL_PLATFORMS + 8),
            camera_offset: 0.0,
            highest_platform_y: FIELD_HEIGHT - FIRST_PLATFORM_OFFSET,
            start_y: start.y,
            last_bounced: None,
            bedrock_retired: false,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        };

        let interval = tuning.spawn_interval_at(0);
        for i in 0..INITIAL_PLATFORMS {
            let y = FIELD_HEIGHT - FIRST_PLATFORM_OFFSET - i as f32 * interval;
            state.spawn_platform(y);
            state.highest_platform_y = y;
        }

        // Bedrock goes last so regular platforms win collision ties
        let id = state.next_entity_id();
        state.platforms.push(Platform {
            id,
            pos: Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - BEDROCK_SCREEN_OFFSET),
            width: FIELD_WIDTH,
            height: BEDROCK_HEIGHT,
            used: false,
            kind: PlatformKind::Bedrock,
        });

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a regular platform at a random horizontal position.
    /// The center is drawn from `[margin, W - width - margin)`, so the right
    /// margin is wider than the left; platforms too wide for that range
    /// are centered.
    pub fn spawn_platform(&mut self, y: f32) -> u32 {
        let max_x = FIELD_WIDTH - self.tuning.platform_width - SPAWN_MARGIN;
        let x = if max_x > SPAWN_MARGIN {
            self.rng.random_range(SPAWN_MARGIN..max_x)
        } else {
            FIELD_WIDTH / 2.0
        };
        self.push_platform(Vec2::new(x, y))
    }

    /// Add a regular platform at an exact position
    pub fn push_platform(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.platforms.push(Platform {
            id,
            pos,
            width: self.tuning.platform_width,
            height: PLATFORM_HEIGHT,
            used: false,
            kind: PlatformKind::Regular,
        });
        id
    }

    pub fn bedrock(&self) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.is_bedrock())
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    /// World y converted to screen y
    pub fn screen_y(&self, world_y: f32) -> f32 {
        world_y - self.camera_offset
    }

    /// How far the player has risen above the start position
    pub fn ascent(&self) -> f32 {
        self.start_y - self.player.pos.y
    }

    /// Drain events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Difficulty;

    #[test]
    fn test_new_session_layout() {
        let state = SessionState::new(Tuning::for_difficulty(Difficulty::Easy), 7);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.platforms.len(), INITIAL_PLATFORMS + 1);

        // Bedrock is created after the regular platforms
        let last = state.platforms.last().expect("bedrock");
        assert!(last.is_bedrock());
        assert_eq!(last.width, FIELD_WIDTH);

        let expected_top = FIELD_HEIGHT - FIRST_PLATFORM_OFFSET - 7.0 * 120.0;
        assert_eq!(state.highest_platform_y, expected_top);

        for p in state.platforms.iter().filter(|p| !p.is_bedrock()) {
            assert!(p.pos.x >= SPAWN_MARGIN);
            assert!(p.pos.x < FIELD_WIDTH - state.tuning.platform_width - SPAWN_MARGIN);
        }
    }

    #[test]
    fn test_oversized_platforms_are_centered() {
        for width in [560.0, 600.0, 1000.0, f32::NAN] {
            let tuning = Tuning {
                platform_width: width,
                ..Tuning::default()
            };
            let state = SessionState::new(tuning, 3);
            assert!(
                state
                    .platforms
                    .iter()
                    .filter(|p| !p.is_bedrock())
                    .all(|p| p.pos.x == FIELD_WIDTH / 2.0)
            );
        }
    }

    #[test]
    fn test_entity_ids_unique() {
        let state = SessionState::new(Tuning::default(), 1);
        let mut ids: Vec<u32> = state.platforms.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), state.platforms.len());
    }
}
