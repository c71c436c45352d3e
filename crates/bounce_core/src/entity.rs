//! On-screen entities and the viewport bounce rule.
//!
//! Coordinates are logical screen pixels, origin top-left, y down. Velocities
//! are pixels per fixed step.

use crate::assets::AssetRegistry;

/// Velocity change per step while a steering key is held.
pub const PLAYER_ACCEL: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Keyboard-steered; clamped to the viewport edge on contact.
    Player,
    /// Constant speed; flips direction on reaching an edge.
    Bouncer,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Bouncer => "bouncer",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SteerInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Edges touched during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BounceEdges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl BounceEdges {
    pub fn count(self) -> usize {
        [self.left, self.right, self.top, self.bottom]
            .into_iter()
            .filter(|hit| *hit)
            .count()
    }

    pub fn any(self) -> bool {
        self.count() > 0
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub sprite: String,
}

impl Entity {
    /// Fails when `sprite` is not in the registry.
    pub fn new(
        kind: EntityKind,
        position: (f32, f32),
        speed: (f32, f32),
        sprite: &str,
        assets: &AssetRegistry,
    ) -> Result<Self, String> {
        if assets.sprite(sprite).is_none() {
            return Err(format!("{kind} entity references unknown sprite '{sprite}'"));
        }
        Ok(Self {
            kind,
            x: position.0,
            y: position.1,
            speed_x: speed.0,
            speed_y: speed.1,
            sprite: sprite.to_string(),
        })
    }

    /// Advances one fixed step and reports which edges were hit.
    pub fn behave(&mut self, steer: SteerInput, bounds: Bounds) -> BounceEdges {
        let edges = match self.kind {
            EntityKind::Player => {
                self.steer(steer);
                self.clamp_to(bounds)
            }
            EntityKind::Bouncer => self.reflect_at(bounds),
        };
        self.x += self.speed_x;
        self.y += self.speed_y;
        edges
    }

    fn steer(&mut self, steer: SteerInput) {
        if steer.right {
            self.speed_x += PLAYER_ACCEL;
        }
        if steer.left {
            self.speed_x -= PLAYER_ACCEL;
        }
        if steer.down {
            self.speed_y += PLAYER_ACCEL;
        }
        if steer.up {
            self.speed_y -= PLAYER_ACCEL;
        }
    }

    fn clamp_to(&mut self, bounds: Bounds) -> BounceEdges {
        let mut edges = BounceEdges::default();
        if self.x < 0.0 {
            self.speed_x = self.speed_x.abs();
            self.x = 0.0;
            edges.left = true;
        }
        if self.x > bounds.width {
            self.speed_x = -self.speed_x.abs();
            self.x = bounds.width;
            edges.right = true;
        }
        if self.y < 0.0 {
            self.speed_y = self.speed_y.abs();
            self.y = 0.0;
            edges.top = true;
        }
        if self.y > bounds.height {
            self.speed_y = -self.speed_y.abs();
            self.y = bounds.height;
            edges.bottom = true;
        }
        edges
    }

    // Position is left alone; the entity may sit one step past an edge.
    fn reflect_at(&mut self, bounds: Bounds) -> BounceEdges {
        let mut edges = BounceEdges::default();
        if self.x < 0.0 {
            self.speed_x = self.speed_x.abs();
            edges.left = true;
        }
        if self.x >= bounds.width {
            self.speed_x = -self.speed_x.abs();
            edges.right = true;
        }
        if self.y < 0.0 {
            self.speed_y = self.speed_y.abs();
            edges.top = true;
        }
        if self.y >= bounds.height {
            self.speed_y = -self.speed_y.abs();
            edges.bottom = true;
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Bounds = Bounds {
        width: 600.0,
        height: 400.0,
    };

    fn entity(kind: EntityKind, x: f32, y: f32, speed_x: f32, speed_y: f32) -> Entity {
        Entity {
            kind,
            x,
            y,
            speed_x,
            speed_y,
            sprite: "ship.png".to_string(),
        }
    }

    #[test]
    fn unknown_sprite_is_rejected() {
        let assets = AssetRegistry::default();
        let err = Entity::new(EntityKind::Player, (0.0, 0.0), (0.0, 0.0), "ship.png", &assets)
            .unwrap_err();
        assert!(err.contains("ship.png"));
    }

    #[test]
    fn player_moves_freely_inside_bounds() {
        let mut player = entity(EntityKind::Player, 10.0, 20.0, 1.5, -0.5);
        let edges = player.behave(SteerInput::default(), BOUNDS);
        assert!(!edges.any());
        assert_eq!((player.x, player.y), (11.5, 19.5));
    }

    #[test]
    fn player_steering_accumulates_velocity() {
        let mut player = entity(EntityKind::Player, 100.0, 100.0, 0.0, 0.0);
        let steer = SteerInput {
            right: true,
            up: true,
            ..SteerInput::default()
        };
        for _ in 0..10 {
            player.behave(steer, BOUNDS);
        }
        assert!((player.speed_x - 1.0).abs() < 1e-5);
        assert!((player.speed_y + 1.0).abs() < 1e-5);

        let both = SteerInput {
            left: true,
            right: true,
            ..SteerInput::default()
        };
        let before = player.speed_x;
        player.behave(both, BOUNDS);
        assert!((player.speed_x - before).abs() < 1e-5);
    }

    #[test]
    fn player_past_right_edge_is_clamped_and_reversed() {
        let mut player = entity(EntityKind::Player, 601.0, 50.0, 2.0, 0.0);
        let edges = player.behave(SteerInput::default(), BOUNDS);
        assert_eq!(
            edges,
            BounceEdges {
                right: true,
                ..BounceEdges::default()
            }
        );
        assert_eq!(player.speed_x, -2.0);
        assert_eq!(player.x, 598.0);
    }

    #[test]
    fn player_in_corner_bounces_on_both_axes() {
        let mut player = entity(EntityKind::Player, -3.0, -1.0, -1.0, -4.0);
        let edges = player.behave(SteerInput::default(), BOUNDS);
        assert_eq!(edges.count(), 2);
        assert!(edges.left && edges.top);
        assert_eq!((player.x, player.y), (1.0, 4.0));
    }

    #[test]
    fn player_exactly_on_edge_does_not_bounce() {
        let mut player = entity(EntityKind::Player, 600.0, 400.0, 0.0, 0.0);
        assert!(!player.behave(SteerInput::default(), BOUNDS).any());
    }

    #[test]
    fn bouncer_flips_at_far_edge_inclusive() {
        let mut bouncer = entity(EntityKind::Bouncer, 600.0, 10.0, 2.0, 1.0);
        let edges = bouncer.behave(SteerInput::default(), BOUNDS);
        assert!(edges.right);
        assert_eq!(edges.count(), 1);
        assert_eq!(bouncer.speed_x, -2.0);
        assert_eq!(bouncer.x, 598.0);
    }

    #[test]
    fn bouncer_ignores_steering() {
        let mut bouncer = entity(EntityKind::Bouncer, 100.0, 100.0, 2.0, 1.0);
        let steer = SteerInput {
            left: true,
            down: true,
            ..SteerInput::default()
        };
        bouncer.behave(steer, BOUNDS);
        assert_eq!((bouncer.speed_x, bouncer.speed_y), (2.0, 1.0));
    }

    #[test]
    fn bouncer_round_trip_bounces_twice_per_axis_cycle() {
        let mut bouncer = entity(EntityKind::Bouncer, 0.0, 0.0, 2.0, 1.0);
        let bounds = Bounds {
            width: 20.0,
            height: 1000.0,
        };
        let mut horizontal = 0;
        for _ in 0..22 {
            let edges = bouncer.behave(SteerInput::default(), bounds);
            horizontal += usize::from(edges.left) + usize::from(edges.right);
        }
        // Flips on reaching 20 (step 11) and again one step past 0 (step 22).
        assert_eq!(horizontal, 2);
        assert_eq!(bouncer.speed_x, 2.0);
    }

    #[test]
    fn kind_display_matches_label() {
        assert_eq!(EntityKind::Player.to_string(), "player");
        assert_eq!(format!("{}", EntityKind::Bouncer), EntityKind::Bouncer.label());
    }
}
