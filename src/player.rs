//! Player pose: position plus yaw/pitch orientation (roll is always zero).
//!
//! The player is the camera.  Local axes follow the camera convention: the
//! view looks down local −Z, +Y is up, so "backward" is local +Z.

use crate::input::{AngularRates, SteeringInput};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl PlayerState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit view direction (local −Z in world space).
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation())
    }

    /// Move by `offset` expressed in the player's local frame.
    pub fn translate_local(&mut self, offset: Vec3) {
        self.position += self.rotation() * offset;
    }

    /// Integrate the angular rates over `dt`.
    pub fn apply_rotation(&mut self, rates: AngularRates, dt: f32) {
        self.yaw += rates.yaw * dt;
        self.pitch += rates.pitch * dt;
    }

    /// Fly along local axes at `speed` for `dt`: W/S forward/back, Space/Alt up/down.
    pub fn apply_thrust(&mut self, input: &SteeringInput, speed: f32, dt: f32) {
        let mut local = Vec3::ZERO;
        if input.forward {
            local.z -= 1.0;
        }
        if input.back {
            local.z += 1.0;
        }
        if input.ascend {
            local.y += 1.0;
        }
        if input.descend {
            local.y -= 1.0;
        }
        if local != Vec3::ZERO {
            self.translate_local(local * speed * dt);
        }
    }

    /// Push the player `distance` backward along its facing axis.
    pub fn knock_back(&mut self, distance: f32) {
        self.translate_local(Vec3::Z * distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn default_faces_negative_z() {
        let player = PlayerState::default();
        assert!((player.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn positive_yaw_turns_left() {
        let mut player = PlayerState::default();
        player.apply_rotation(AngularRates { yaw: FRAC_PI_2, pitch: 0.0 }, 1.0);
        // Looking down −Z, a quarter turn left faces −X.
        assert!((player.forward() - Vec3::NEG_X).length() < 1e-5, "got {:?}", player.forward());
    }

    #[test]
    fn positive_pitch_looks_up() {
        let mut player = PlayerState::default();
        player.apply_rotation(AngularRates { yaw: 0.0, pitch: 0.3 }, 1.0);
        assert!(player.forward().y > 0.0);
    }

    #[test]
    fn knockback_moves_opposite_to_facing() {
        let mut player = PlayerState::at(Vec3::new(1.0, 2.0, 3.0));
        player.knock_back(5.0);
        assert!((player.position - Vec3::new(1.0, 2.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn thrust_follows_local_axes() {
        let mut player = PlayerState::default();
        player.apply_rotation(AngularRates { yaw: FRAC_PI_2, pitch: 0.0 }, 1.0);
        let input = SteeringInput {
            forward: true,
            ascend: true,
            ..Default::default()
        };
        player.apply_thrust(&input, 15.0, 0.1);
        assert!((player.position - Vec3::new(-1.5, 1.5, 0.0)).length() < 1e-4, "got {:?}", player.position);
    }
}
