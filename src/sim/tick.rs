//! Fixed timestep simulation tick
//!
//! Advances a session by exactly one tick. The order of the phases below
//! is part of the game's feel and must not be rearranged.

use super::collision::{lands_on, resting_y};
use super::state::{GameEvent, GamePhase, SessionState};
use crate::consts::*;

/// Input sampled for a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Horizontal position the player tracks (pointer x in field space)
    pub target_x: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            target_x: FIELD_WIDTH / 2.0,
        }
    }
}

/// Advance the session by one fixed tick
pub fn step(state: &mut SessionState, input: &TickInput) {
    if state.phase == GamePhase::Over {
        return;
    }
    state.time_ticks += 1;

    apply_forces(state, input);
    integrate(state);
    resolve_collision(state);
    retire_bedrock(state);
    follow_camera(state);
    cull_platforms(state);
    spawn_platforms(state);

    if state.screen_y(state.player.pos.y) > FIELD_HEIGHT {
        state.phase = GamePhase::Over;
        log::info!(
            "Game over: score {} after {} ticks",
            state.score,
            state.time_ticks
        );
        state.events.push(GameEvent::GameOver {
            score: state.score,
            ticks: state.time_ticks,
        });
    }
}

/// Gravity plus instant horizontal tracking capped at the max speed
fn apply_forces(state: &mut SessionState, input: &TickInput) {
    let tuning = state.tuning;
    let player = &mut state.player;

    player.vel.y += tuning.gravity;

    let dx = input.target_x - player.pos.x;
    player.vel.x = if dx.abs() > tuning.max_speed_x {
        dx.signum() * tuning.max_speed_x
    } else {
        dx
    };
}

fn integrate(state: &mut SessionState) {
    let player = &mut state.player;
    player.pos += player.vel;

    // Walls stop the player dead
    if player.left() < 0.0 {
        player.pos.x = PLAYER_RADIUS;
        player.vel.x = 0.0;
    }
    if player.right() > FIELD_WIDTH {
        player.pos.x = FIELD_WIDTH - PLAYER_RADIUS;
        player.vel.x = 0.0;
    }
}

/// At most one collision per tick, first hit in creation order
fn resolve_collision(state: &mut SessionState) {
    let Some(index) = state
        .platforms
        .iter()
        .position(|platform| lands_on(&state.player, platform))
    else {
        return;
    };

    let platform = &mut state.platforms[index];
    if !platform.is_bedrock() && state.last_bounced != Some(platform.id) {
        platform.used = true;
        state.score += SCORE_PER_BOUNCE;
        state.last_bounced = Some(platform.id);
        state.events.push(GameEvent::PlatformBounced {
            platform_id: platform.id,
            score: state.score,
        });
    }

    state.player.vel.y = state.tuning.jump_velocity;
    state.player.pos.y = resting_y(platform);
}

fn retire_bedrock(state: &mut SessionState) {
    if state.bedrock_retired || state.ascent() <= BEDROCK_THRESHOLD {
        return;
    }
    state.platforms.retain(|p| !p.is_bedrock());
    state.bedrock_retired = true;
    log::debug!("Bedrock removed at tick {}", state.time_ticks);
    state.events.push(GameEvent::BedrockRemoved);
}

fn follow_camera(state: &mut SessionState) {
    let target = state.player.pos.y - FIELD_HEIGHT * CAMERA_FRACTION;
    if target < state.camera_offset {
        state.camera_offset = target;
    }
}

/// Drop used or far-below platforms; pin the bedrock to the screen bottom
fn cull_platforms(state: &mut SessionState) {
    let camera = state.camera_offset;
    state.platforms.retain_mut(|platform| {
        if platform.is_bedrock() {
            platform.pos.y = FIELD_HEIGHT - BEDROCK_SCREEN_OFFSET + camera;
            return true;
        }
        let screen_y = platform.pos.y - camera;
        screen_y <= FIELD_HEIGHT + CULL_MARGIN && !platform.used
    });
}

/// Keep platforms spawned up to one interval above the visible top
fn spawn_platforms(state: &mut SessionState) {
    loop {
        let interval = state.tuning.spawn_interval_at(state.score);
        if state.highest_platform_y - state.camera_offset <= -interval {
            break;
        }
        state.highest_platform_y -= interval;
        state.spawn_platform(state.highest_platform_y);
    }
}
