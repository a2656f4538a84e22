//! Proximity collision between the player and field entities.
//!
//! Two independent passes run every frame:
//!
//! 1. **Pickups** — every active pickup within `collection_threshold` is
//!    collected and replenishes the meter.  No cooldown; several pickups can be
//!    collected in one frame.
//! 2. **Decoys** — only while the player is moving and the cooldown has
//!    elapsed.  The first decoy in spawn order within `collision_threshold`
//!    costs magic and knocks the player back; at most one per frame.
//!
//! The caller owns the glow spike; [`CollisionReport::decoy_hit`] tells it when.

use crate::config::GameConfig;
use crate::economy::MagicMeter;
use crate::player::PlayerState;
use crate::registry::EntityRegistry;
use crate::spatial_partition::DecoyGrid;
use bevy::prelude::*;

/// What one detection pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub pickups_collected: Vec<usize>,
    pub decoy_hit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CollisionDetector {
    pub collection_threshold: f32,
    pub collision_threshold: f32,
    pub cooldown: f32,
    pub penalty: f32,
    pub replenish: f32,
    pub knockback: f32,
    /// Seconds since the last decoy collision.
    since_last: f32,
    grid: DecoyGrid,
}

impl CollisionDetector {
    pub fn new(config: &GameConfig, registry: &EntityRegistry) -> Self {
        Self {
            collection_threshold: config.collection_threshold,
            collision_threshold: config.collision_threshold,
            cooldown: config.collision_cooldown,
            penalty: config.collision_penalty,
            replenish: config.pickup_replenish,
            knockback: config.knockback_distance,
            since_last: 0.0,
            grid: DecoyGrid::build(
                config.decoy_grid_cell_size,
                registry.decoys().iter().map(|d| d.position),
            ),
        }
    }

    pub fn since_last_collision(&self) -> f32 {
        self.since_last
    }

    /// Pretend the last collision was `seconds` ago.
    pub fn set_since_last_collision(&mut self, seconds: f32) {
        self.since_last = seconds;
    }

    /// Advance the cooldown clock.  Call once per frame before [`detect`](Self::detect).
    pub fn advance(&mut self, dt: f32) {
        self.since_last += dt;
    }

    /// Run both passes.
    pub fn detect(
        &mut self,
        player: &mut PlayerState,
        moving: bool,
        registry: &mut EntityRegistry,
        meter: &mut MagicMeter,
    ) -> CollisionReport {
        CollisionReport {
            pickups_collected: self.collect_pickups(player.position, registry, meter),
            decoy_hit: self.check_decoys(player, moving, registry, meter),
        }
    }

    /// Collect every active pickup within reach.
    pub fn collect_pickups(
        &self,
        position: Vec3,
        registry: &mut EntityRegistry,
        meter: &mut MagicMeter,
    ) -> Vec<usize> {
        let in_reach: Vec<usize> = registry
            .pickups()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.active && p.position.distance(position) < self.collection_threshold)
            .map(|(i, _)| i)
            .collect();

        let mut collected = Vec::with_capacity(in_reach.len());
        for index in in_reach {
            if registry.collect_pickup(index) {
                meter.replenish(self.replenish);
                debug!("Collected stardust #{index}; magic now {:.1}", meter.current());
                collected.push(index);
            }
        }
        collected
    }

    /// Cooldown-gated decoy pass.  Applies penalty and knockback for the first
    /// decoy in reach and resets the cooldown.
    pub fn check_decoys(
        &mut self,
        player: &mut PlayerState,
        moving: bool,
        registry: &EntityRegistry,
        meter: &mut MagicMeter,
    ) -> Option<usize> {
        if !moving || self.since_last <= self.cooldown {
            return None;
        }

        let hit = self
            .grid
            .candidates(player.position, self.collision_threshold)
            .into_iter()
            .find(|&index| {
                registry
                    .decoy(index)
                    .is_some_and(|d| d.position.distance(player.position) < self.collision_threshold)
            })?;

        self.since_last = 0.0;
        meter.penalize(self.penalty);
        player.knock_back(self.knockback);
        debug!("Bumped decoy #{hit}; magic now {:.1}", meter.current());
        Some(hit)
    }
}
