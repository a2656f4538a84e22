//! Scan ray casting against the target and decoys.
//!
//! The scan always fires from the centre of the view, so the ray is just the
//! player's position and facing.  [`RayCaster`] is the seam where a mesh-accurate
//! picker could be plugged in; [`BoundingSphereCaster`] is the default and
//! tests each candidate's enclosing sphere.

use crate::player::PlayerState;
use crate::registry::{EntityRegistry, FieldEntity};
use bevy::prelude::*;

/// Ray from the view centre.  `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl ViewRay {
    pub fn from_player(player: &PlayerState) -> Self {
        Self {
            origin: player.position,
            direction: player.forward(),
        }
    }
}

/// Nearest intersection along a [`ViewRay`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: FieldEntity,
    pub distance: f32,
}

/// Casts the scan ray against {target, all decoys}.  Pickups are never hit.
pub trait RayCaster {
    fn cast(&self, ray: ViewRay, registry: &EntityRegistry) -> Option<RayHit>;
}

/// Ray/sphere intersection against each candidate's bounding sphere.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingSphereCaster;

/// Distance along `ray` to the first intersection with the sphere, if any.
/// A ray starting inside the sphere hits at distance 0.
pub fn ray_sphere_distance(ray: ViewRay, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - ray.origin;
    let along = to_center.dot(ray.direction);
    let closest_sq = to_center.length_squared() - along * along;
    let radius_sq = radius * radius;
    if closest_sq > radius_sq {
        return None;
    }
    let half_chord = (radius_sq - closest_sq).sqrt();
    let near = along - half_chord;
    let far = along + half_chord;
    if far < 0.0 {
        None
    } else {
        Some(near.max(0.0))
    }
}

impl RayCaster for BoundingSphereCaster {
    fn cast(&self, ray: ViewRay, registry: &EntityRegistry) -> Option<RayHit> {
        let target = registry.target();
        let mut best = ray_sphere_distance(ray, target.position, target.bounding_radius()).map(
            |distance| RayHit {
                entity: FieldEntity::Target,
                distance,
            },
        );

        for (index, decoy) in registry.decoys().iter().enumerate() {
            let Some(distance) = ray_sphere_distance(ray, decoy.position, decoy.bounding_radius())
            else {
                continue;
            };
            if best.map_or(true, |hit| distance < hit.distance) {
                best = Some(RayHit {
                    entity: FieldEntity::Decoy(index),
                    distance,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamedColor;
    use crate::registry::{DecoyEntity, SizeClass, TargetDescriptor, TargetEntity, TargetShape};

    fn registry(target_z: f32, decoys: &[f32]) -> EntityRegistry {
        EntityRegistry::from_parts(
            decoys
                .iter()
                .map(|z| DecoyEntity::new("A00", Vec3::new(0.0, 0.0, *z), Vec3::ONE, Color::WHITE))
                .collect(),
            TargetEntity {
                descriptor: TargetDescriptor {
                    size: SizeClass::Small,
                    color: NamedColor::new("green", 0x00ff00),
                    shape: TargetShape::Ball,
                },
                position: Vec3::new(0.0, 0.0, target_z),
                scale: 1.0,
                found: false,
            },
            Vec::new(),
        )
    }

    fn forward_ray() -> ViewRay {
        ViewRay {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }

    #[test]
    fn sphere_behind_ray_is_missed() {
        assert_eq!(ray_sphere_distance(forward_ray(), Vec3::Z * 10.0, 1.0), None);
    }

    #[test]
    fn sphere_ahead_reports_near_surface() {
        let d = ray_sphere_distance(forward_ray(), Vec3::NEG_Z * 10.0, 1.0).unwrap();
        assert!((d - 9.0).abs() < 1e-5);
    }

    #[test]
    fn nearest_candidate_wins() {
        let reg = registry(-30.0, &[-50.0, -20.0]);
        let hit = BoundingSphereCaster.cast(forward_ray(), &reg).unwrap();
        assert_eq!(hit.entity, FieldEntity::Decoy(1));
    }

    #[test]
    fn target_in_front_of_decoys_is_hit() {
        let reg = registry(-10.0, &[-50.0, -20.0]);
        let hit = BoundingSphereCaster.cast(forward_ray(), &reg).unwrap();
        assert_eq!(hit.entity, FieldEntity::Target);
    }

    #[test]
    fn empty_view_misses() {
        let reg = registry(40.0, &[30.0]);
        assert_eq!(BoundingSphereCaster.cast(forward_ray(), &reg), None);
    }
}
