//! Steering input fusion.
//!
//! Raw input (pointer position, turn keys, thrust keys) is collected into
//! [`SteeringInput`] by the Bevy input systems.  [`InputFusion`] turns it into
//! the yaw/pitch rates the game loop applies to the player each frame.
//!
//! ## Modes
//!
//! | Mode       | Yaw source                                   | Pitch source      | Smoothing |
//! |------------|----------------------------------------------|-------------------|-----------|
//! | `Smoothed` | pointer X, overridden by a held turn key     | pointer Y         | per-frame lerp |
//! | `Discrete` | turn keys only, constant rate                | none              | none      |
//!
//! The smoothed mode lerps once per frame with a fixed factor, so turn
//! response depends on framerate.  This matches the shipped feel of the game
//! and is pinned by `smoothing_is_per_frame_not_per_second`.

use crate::config::GameConfig;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// How raw input becomes angular rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteeringMode {
    /// Pointer steering with keyboard override, smoothed by a per-frame lerp.
    #[default]
    Smoothed,
    /// Turn keys only, applied at a constant rate with no smoothing.
    Discrete,
}

/// Which way a turn key turns the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKey {
    Left,
    Right,
}

/// Raw input for the current frame, written by the input systems.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringInput {
    /// Pointer position normalised to `[-1, 1]` on both axes (+Y up).
    pub pointer: Vec2,
    pub forward: bool,
    pub back: bool,
    pub ascend: bool,
    pub descend: bool,
    /// Turn-key transitions since the last frame, in arrival order.
    /// `true` = pressed, `false` = released.
    pub turn_events: [Option<(TurnKey, bool)>; 4],
}

impl SteeringInput {
    /// `true` when any translational key is held.
    pub fn is_translating(&self) -> bool {
        self.forward || self.back || self.ascend || self.descend
    }

    /// Queue a turn-key transition.  Extra transitions beyond the buffer in a
    /// single frame are dropped; four covers press/release of both keys.
    pub fn push_turn_event(&mut self, key: TurnKey, pressed: bool) {
        if let Some(slot) = self.turn_events.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some((key, pressed));
        }
    }

    /// Remove and return all queued turn-key transitions.
    pub fn take_turn_events(&mut self) -> impl Iterator<Item = (TurnKey, bool)> {
        std::mem::take(&mut self.turn_events).into_iter().flatten()
    }
}

/// Angular rates (rad/s) to apply this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngularRates {
    pub yaw: f32,
    pub pitch: f32,
}

/// Fuses pointer and keyboard steering into smoothed yaw/pitch rates.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFusion {
    pub mode: SteeringMode,
    pub yaw_speed: f32,
    pub pitch_speed: f32,
    pub lerp_factor: f32,
    pub discrete_rate: f32,
    pub epsilon: f32,
    /// Signed yaw demanded by the turn keys; `0.0` when no key holds it.
    keyboard_yaw: f32,
    target_yaw: f32,
    target_pitch: f32,
    current_yaw: f32,
    current_pitch: f32,
}

impl InputFusion {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            mode: config.steering,
            yaw_speed: config.yaw_speed,
            pitch_speed: config.pitch_speed,
            lerp_factor: config.steering_lerp,
            discrete_rate: config.discrete_turn_rate,
            epsilon: config.turn_epsilon,
            keyboard_yaw: 0.0,
            target_yaw: 0.0,
            target_pitch: 0.0,
            current_yaw: 0.0,
            current_pitch: 0.0,
        }
    }

    fn key_rate(&self) -> f32 {
        match self.mode {
            SteeringMode::Smoothed => self.yaw_speed,
            SteeringMode::Discrete => self.discrete_rate,
        }
    }

    /// A turn key went down.  The most recent press wins.
    pub fn press_turn(&mut self, key: TurnKey) {
        self.keyboard_yaw = match key {
            TurnKey::Left => self.key_rate(),
            TurnKey::Right => -self.key_rate(),
        };
    }

    /// A turn key came up.  Only clears the demand if that key still owns it,
    /// so releasing A while D is the active turn leaves D turning.
    pub fn release_turn(&mut self, key: TurnKey) {
        let owns = match key {
            TurnKey::Left => self.keyboard_yaw > 0.0,
            TurnKey::Right => self.keyboard_yaw < 0.0,
        };
        if owns {
            self.keyboard_yaw = 0.0;
        }
    }

    /// Recompute targets from the pointer and advance the smoothed rates one frame.
    pub fn update(&mut self, pointer: Vec2) -> AngularRates {
        match self.mode {
            SteeringMode::Smoothed => {
                self.target_yaw = -pointer.x * self.yaw_speed;
                self.target_pitch = pointer.y * self.pitch_speed;
                // Keyboard wins over the pointer while a turn key is held.
                if self.keyboard_yaw != 0.0 {
                    self.target_yaw = self.keyboard_yaw;
                }
                self.current_yaw = lerp(self.current_yaw, self.target_yaw, self.lerp_factor);
                self.current_pitch = lerp(self.current_pitch, self.target_pitch, self.lerp_factor);
            }
            SteeringMode::Discrete => {
                self.target_yaw = self.keyboard_yaw;
                self.target_pitch = 0.0;
                self.current_yaw = self.target_yaw;
                self.current_pitch = 0.0;
            }
        }
        self.rates()
    }

    pub fn rates(&self) -> AngularRates {
        AngularRates {
            yaw: self.current_yaw,
            pitch: self.current_pitch,
        }
    }

    /// `true` if any rotational signal is above the epsilon: the smoothed
    /// rates, the pointer targets, or a held turn key.
    pub fn is_rotating(&self) -> bool {
        [
            self.current_yaw,
            self.current_pitch,
            self.keyboard_yaw,
            self.target_yaw,
            self.target_pitch,
        ]
        .iter()
        .any(|v| v.abs() > self.epsilon)
    }

    pub fn keyboard_yaw(&self) -> f32 {
        self.keyboard_yaw
    }

    pub fn targets(&self) -> AngularRates {
        AngularRates {
            yaw: self.target_yaw,
            pitch: self.target_pitch,
        }
    }
}

#[inline]
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoothed() -> InputFusion {
        InputFusion::new(&GameConfig::default())
    }

    fn discrete() -> InputFusion {
        InputFusion::new(&GameConfig::asteroid_field())
    }

    #[test]
    fn pointer_sets_targets_with_yaw_inverted() {
        let mut fusion = smoothed();
        fusion.update(Vec2::new(0.5, -0.5));
        let targets = fusion.targets();
        assert!((targets.yaw - (-0.75)).abs() < 1e-6, "got {targets:?}");
        assert!((targets.pitch - (-0.5)).abs() < 1e-6, "got {targets:?}");
    }

    #[test]
    fn first_frame_moves_five_percent_toward_target() {
        let mut fusion = smoothed();
        let rates = fusion.update(Vec2::new(-1.0, 1.0));
        assert!((rates.yaw - 1.5 * 0.05).abs() < 1e-6, "got {rates:?}");
        assert!((rates.pitch - 1.0 * 0.05).abs() < 1e-6, "got {rates:?}");
    }

    #[test]
    fn held_turn_key_overrides_pointer() {
        let mut fusion = smoothed();
        fusion.press_turn(TurnKey::Right);
        fusion.update(Vec2::new(-1.0, 0.0));
        assert_eq!(fusion.targets().yaw, -1.5);
    }

    #[test]
    fn releasing_the_other_key_keeps_active_turn() {
        let mut fusion = smoothed();
        fusion.press_turn(TurnKey::Left);
        fusion.press_turn(TurnKey::Right);
        fusion.release_turn(TurnKey::Left);
        assert_eq!(fusion.keyboard_yaw(), -1.5);
        fusion.release_turn(TurnKey::Right);
        assert_eq!(fusion.keyboard_yaw(), 0.0);
    }

    #[test]
    fn smoothing_is_per_frame_not_per_second() {
        // Two frames at any delta converge the same amount: 1 - 0.95².
        let mut fusion = smoothed();
        fusion.press_turn(TurnKey::Left);
        fusion.update(Vec2::ZERO);
        let rates = fusion.update(Vec2::ZERO);
        let expected = 1.5 * (1.0 - 0.95 * 0.95);
        assert!((rates.yaw - expected).abs() < 1e-5, "got {rates:?}");
    }

    #[test]
    fn centred_pointer_is_not_rotating() {
        let mut fusion = smoothed();
        fusion.update(Vec2::ZERO);
        assert!(!fusion.is_rotating());
    }

    #[test]
    fn held_key_counts_as_rotating_before_first_update() {
        let mut fusion = smoothed();
        fusion.press_turn(TurnKey::Left);
        assert!(fusion.is_rotating());
    }

    #[test]
    fn discrete_mode_applies_constant_rate_and_ignores_pointer() {
        let mut fusion = discrete();
        let rates = fusion.update(Vec2::new(1.0, 1.0));
        assert_eq!(rates, AngularRates::default());

        fusion.press_turn(TurnKey::Left);
        let rates = fusion.update(Vec2::new(1.0, 1.0));
        assert_eq!(rates.yaw, fusion.discrete_rate);
        assert_eq!(rates.pitch, 0.0);
    }

    #[test]
    fn turn_events_drain_in_order() {
        let mut input = SteeringInput::default();
        input.push_turn_event(TurnKey::Left, true);
        input.push_turn_event(TurnKey::Left, false);
        let events: Vec<_> = input.take_turn_events().collect();
        assert_eq!(events, vec![(TurnKey::Left, true), (TurnKey::Left, false)]);
        assert_eq!(input.take_turn_events().count(), 0);
    }
}
