//! Demo autopilot
//!
//! Picks a horizontal target for headless runs: the nearest fresh platform
//! the player can still reach from its current velocity.

use super::state::SessionState;
use crate::consts::{FIELD_WIDTH, PLAYER_RADIUS};

/// Horizontal target for the next tick
pub fn target_x(state: &SessionState) -> f32 {
    let player = &state.player;
    let gravity = state.tuning.gravity.max(f32::EPSILON);

    // Highest point of the current arc (world y grows downward)
    let rise = if player.vel.y < 0.0 {
        player.vel.y * player.vel.y / (2.0 * gravity)
    } else {
        0.0
    };
    let apex = player.pos.y - rise;

    state
        .platforms
        .iter()
        .filter(|p| !p.is_bedrock() && !p.used)
        .filter(|p| p.top() >= apex + PLAYER_RADIUS && p.pos.y > player.pos.y - 2.0 * rise)
        .min_by(|a, b| {
            let da = (a.pos.y - apex).abs() + (a.pos.x - player.pos.x).abs() * 0.5;
            let db = (b.pos.y - apex).abs() + (b.pos.x - player.pos.x).abs() * 0.5;
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| p.pos.x)
        .unwrap_or(FIELD_WIDTH / 2.0)
}
