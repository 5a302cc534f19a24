//! Player/platform collision tests
//!
//! Platforms are one-way: they only catch a falling player. The player is
//! treated as its bounding square for overlap purposes.

use super::state::{Platform, Player};
use crate::consts::PLAYER_RADIUS;

/// Check whether a falling player lands on a platform this tick
pub fn lands_on(player: &Player, platform: &Platform) -> bool {
    if !platform.is_eligible() {
        return false;
    }
    // Only while falling
    if player.vel.y <= 0.0 {
        return false;
    }

    if platform.is_bedrock() {
        // Full width: only the vertical band matters
        return player.bottom() >= platform.top() && player.top() <= platform.bottom();
    }

    // Lenient landing: bottom reached the surface and the top is not yet
    // a full platform height past it
    let reached_surface = player.bottom() >= platform.top();
    let not_through = player.top() <= platform.top() + platform.height;
    let aligned = player.right() >= platform.left() && player.left() <= platform.right();

    reached_surface && not_through && aligned
}

/// Player center y when resting on top of the platform
pub fn resting_y(platform: &Platform) -> f32 {
    platform.top() - PLAYER_RADIUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PlatformKind;
    use glam::Vec2;

    fn platform(x: f32, y: f32, kind: PlatformKind) -> Platform {
        Platform {
            id: 1,
            pos: Vec2::new(x, y),
            width: if kind == PlatformKind::Bedrock { 600.0 } else { 80.0 },
            height: if kind == PlatformKind::Bedrock { 30.0 } else { 15.0 },
            used: false,
            kind,
        }
    }

    fn player(x: f32, y: f32, vy: f32) -> Player {
        Player {
            pos: Vec2::new(x, y),
            vel: Vec2::new(0.0, vy),
        }
    }

    #[test]
    fn test_lands_when_falling() {
        let p = platform(300.0, 500.0, PlatformKind::Regular);
        // Bottom at 495, platform top at 492.5
        assert!(lands_on(&player(300.0, 465.0, 5.0), &p));
    }

    #[test]
    fn test_ignored_when_rising() {
        let p = platform(300.0, 500.0, PlatformKind::Regular);
        assert!(!lands_on(&player(300.0, 465.0, -5.0), &p));
        assert!(!lands_on(&player(300.0, 465.0, 0.0), &p));
    }

    #[test]
    fn test_miss_horizontal() {
        let p = platform(300.0, 500.0, PlatformKind::Regular);
        // Platform spans 260..340, player spans 371..431
        assert!(!lands_on(&player(401.0, 465.0, 5.0), &p));
        // Edge touch counts
        assert!(lands_on(&player(370.0, 465.0, 5.0), &p));
    }

    #[test]
    fn test_passed_through() {
        let p = platform(300.0, 500.0, PlatformKind::Regular);
        // Player top is already below the platform slab
        assert!(!lands_on(&player(300.0, 540.0, 5.0), &p));
    }

    #[test]
    fn test_used_platform_ignored() {
        let mut p = platform(300.0, 500.0, PlatformKind::Regular);
        p.used = true;
        assert!(!lands_on(&player(300.0, 465.0, 5.0), &p));

        let mut floor = platform(300.0, 790.0, PlatformKind::Bedrock);
        floor.used = true;
        assert!(lands_on(&player(20.0, 750.0, 5.0), &floor));
    }

    #[test]
    fn test_bedrock_full_width() {
        let floor = platform(300.0, 790.0, PlatformKind::Bedrock);
        assert!(lands_on(&player(35.0, 750.0, 3.0), &floor));
        assert!(lands_on(&player(565.0, 800.0, 3.0), &floor));
        assert!(!lands_on(&player(300.0, 700.0, 3.0), &floor));
    }

    #[test]
    fn test_resting_y() {
        let p = platform(300.0, 500.0, PlatformKind::Regular);
        assert_eq!(resting_y(&p), 500.0 - 7.5 - PLAYER_RADIUS);
    }
}
