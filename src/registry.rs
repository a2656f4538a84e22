//! Field entities: decoys, the single target, and stardust pickups.
//!
//! The registry is the single source of truth for per-instance state.  It is a
//! plain indexed store: the rendering adapter reads transforms and colours by
//! index and is told which instances changed via
//! [`EntityRegistry::take_visual_changes`].
//!
//! ## Spawn layout
//!
//! | Kind    | Count          | Radius from origin                         |
//! |---------|----------------|--------------------------------------------|
//! | Decoy   | `decoy_count`  | `[inner, inner + spawn_radius]`            |
//! | Target  | 1              | `[inner, inner + spawn_radius / 2]`        |
//! | Pickup  | `pickup_count` | `[inner, inner + spawn_radius]`            |
//!
//! Directions are uniform on the sphere; radii are uniform in the shell width.
//! Transforms are fixed at spawn; only colour, activity and found flags change
//! afterwards.

use crate::config::{GameConfig, NamedColor};
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};
use std::fmt;

/// Stable identity of a field entity, used for ray hits and render sync.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEntity {
    Decoy(usize),
    Target,
    Pickup(usize),
}

/// A non-winning scannable rock.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoyEntity {
    /// Display identifier: one letter and two digits, e.g. `K07`.
    pub label: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Colour captured at spawn; flashes revert to this.
    pub original_color: Color,
    /// Colour currently shown.
    pub color: Color,
    pub flashed: bool,
    /// Bumped on every flash so a stale revert can recognise itself.
    pub flash_generation: u64,
}

impl DecoyEntity {
    pub fn new(label: impl Into<String>, position: Vec3, scale: Vec3, color: Color) -> Self {
        Self {
            label: label.into(),
            position,
            rotation: Quat::IDENTITY,
            scale,
            original_color: color,
            color,
            flashed: false,
            flash_generation: 0,
        }
    }

    /// Radius of a sphere enclosing the jittered rock mesh.
    pub fn bounding_radius(&self) -> f32 {
        // Unit icosahedron with ±0.2 radial jitter.
        self.scale.max_element() * 1.2
    }
}

/// Size word used in the clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn from_scale(scale: f32, small_below: f32, medium_below: f32) -> Self {
        if scale < small_below {
            SizeClass::Small
        } else if scale < medium_below {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        })
    }
}

/// Mesh shape of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    Box,
    Ball,
    Pyramid,
}

impl TargetShape {
    pub const ALL: [TargetShape; 3] = [TargetShape::Box, TargetShape::Ball, TargetShape::Pyramid];

    /// Bounding radius at unit scale.
    pub fn unit_radius(self) -> f32 {
        match self {
            // 2.5 cube half-diagonal
            TargetShape::Box => 1.25 * 3f32.sqrt(),
            TargetShape::Ball => 1.5,
            // base radius 2, height 3
            TargetShape::Pyramid => 2.0,
        }
    }
}

impl fmt::Display for TargetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetShape::Box => "box",
            TargetShape::Ball => "ball",
            TargetShape::Pyramid => "pyramid",
        })
    }
}

/// What the clue says about the target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDescriptor {
    pub size: SizeClass,
    pub color: NamedColor,
    pub shape: TargetShape,
}

impl TargetDescriptor {
    /// `"Find the {size} {color} {shape}!"`
    pub fn clue(&self) -> String {
        format!("Find the {} {} {}!", self.size, self.color.name, self.shape)
    }

    /// `"{size} {color} {shape}"`, used in the success message.
    pub fn phrase(&self) -> String {
        format!("{} {} {}", self.size, self.color.name, self.shape)
    }
}

/// The one winning object.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEntity {
    pub descriptor: TargetDescriptor,
    pub position: Vec3,
    pub scale: f32,
    /// Terminal: once `true`, never reset.
    pub found: bool,
}

impl TargetEntity {
    pub fn bounding_radius(&self) -> f32 {
        self.descriptor.shape.unit_radius() * self.scale
    }
}

/// A stardust pickup, collected by flying through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupEntity {
    pub position: Vec3,
    /// Terminal: once `false`, never reset.
    pub active: bool,
}

/// Fixed-size store of every field entity.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    decoys: Vec<DecoyEntity>,
    target: TargetEntity,
    pickups: Vec<PickupEntity>,
    visual_changes: Vec<FieldEntity>,
}

/// Uniformly distributed unit vector.
pub fn random_direction(rng: &mut impl Rng) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Random point at a uniform radius in `[inner, inner + width]`.
pub fn random_shell_point(rng: &mut impl Rng, inner: f32, width: f32) -> Vec3 {
    random_direction(rng) * (rng.gen::<f32>() * width + inner)
}

fn random_label(rng: &mut impl Rng) -> String {
    let letter = (b'A' + rng.gen_range(0..26u8)) as char;
    format!("{}{:02}", letter, rng.gen_range(0..100u32))
}

impl EntityRegistry {
    /// Build a registry from explicit parts; used by tests and replays.
    pub fn from_parts(
        decoys: Vec<DecoyEntity>,
        target: TargetEntity,
        pickups: Vec<PickupEntity>,
    ) -> Self {
        Self {
            decoys,
            target,
            pickups,
            visual_changes: Vec::new(),
        }
    }

    /// Scatter a fresh field according to `config`.
    pub fn spawn(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let inner = config.spawn_inner_radius;
        let width = config.spawn_radius;

        let decoys = (0..config.decoy_count)
            .map(|_| {
                let position = random_shell_point(rng, inner, width);
                let rotation = Quat::from_euler(
                    EulerRot::XYZ,
                    rng.gen::<f32>() * PI,
                    rng.gen::<f32>() * PI,
                    rng.gen::<f32>() * PI,
                );
                let span = config.decoy_scale_max - config.decoy_scale_min;
                let scale = Vec3::new(
                    config.decoy_scale_min + rng.gen::<f32>() * span,
                    config.decoy_scale_min + rng.gen::<f32>() * span,
                    config.decoy_scale_min + rng.gen::<f32>() * span,
                );
                let color = Color::hsl(
                    rng.gen::<f32>() * 360.0,
                    config.decoy_saturation,
                    config.decoy_lightness,
                );
                DecoyEntity {
                    rotation,
                    ..DecoyEntity::new(random_label(rng), position, scale, color)
                }
            })
            .collect();

        let target_scale = config.target_scale_min
            + rng.gen::<f32>() * (config.target_scale_max - config.target_scale_min);
        let color_index = rng.gen_range(0..config.target_colors.len().max(1));
        let color = config
            .target_colors
            .get(color_index)
            .cloned()
            .unwrap_or_else(|| NamedColor::new("green", 0x00ff00));
        let shape = TargetShape::ALL[rng.gen_range(0..TargetShape::ALL.len())];
        let target = TargetEntity {
            descriptor: TargetDescriptor {
                size: SizeClass::from_scale(
                    target_scale,
                    config.size_small_below,
                    config.size_medium_below,
                ),
                color,
                shape,
            },
            position: random_shell_point(rng, inner, width * 0.5),
            scale: target_scale,
            found: false,
        };

        let pickups = (0..config.pickup_count)
            .map(|_| PickupEntity {
                position: random_shell_point(rng, inner, width),
                active: true,
            })
            .collect();

        Self::from_parts(decoys, target, pickups)
    }

    pub fn decoys(&self) -> &[DecoyEntity] {
        &self.decoys
    }

    pub fn decoy(&self, index: usize) -> Option<&DecoyEntity> {
        self.decoys.get(index)
    }

    pub fn target(&self) -> &TargetEntity {
        &self.target
    }

    pub fn pickups(&self) -> &[PickupEntity] {
        &self.pickups
    }

    pub fn pickup(&self, index: usize) -> Option<&PickupEntity> {
        self.pickups.get(index)
    }

    /// World position of any entity.
    pub fn position_of(&self, entity: FieldEntity) -> Option<Vec3> {
        match entity {
            FieldEntity::Decoy(i) => self.decoys.get(i).map(|d| d.position),
            FieldEntity::Target => Some(self.target.position),
            FieldEntity::Pickup(i) => self.pickups.get(i).map(|p| p.position),
        }
    }

    /// Paint a decoy with `color`.  Returns the new flash generation, which a
    /// later [`restore_decoy`](Self::restore_decoy) must present.
    pub fn flash_decoy(&mut self, index: usize, color: Color) -> Option<u64> {
        let decoy = self.decoys.get_mut(index)?;
        decoy.color = color;
        decoy.flashed = true;
        decoy.flash_generation += 1;
        let generation = decoy.flash_generation;
        self.visual_changes.push(FieldEntity::Decoy(index));
        Some(generation)
    }

    /// Revert a flash to the original colour.
    ///
    /// Skipped (returns `false`) when the target has been found since, or when
    /// a newer flash superseded `generation`.
    pub fn restore_decoy(&mut self, index: usize, generation: u64) -> bool {
        if self.target.found {
            return false;
        }
        let Some(decoy) = self.decoys.get_mut(index) else {
            return false;
        };
        if !decoy.flashed || decoy.flash_generation != generation {
            return false;
        }
        decoy.color = decoy.original_color;
        decoy.flashed = false;
        self.visual_changes.push(FieldEntity::Decoy(index));
        true
    }

    /// Mark the target found.  Returns `true` only on the first call.
    pub fn mark_target_found(&mut self) -> bool {
        if self.target.found {
            return false;
        }
        self.target.found = true;
        self.visual_changes.push(FieldEntity::Target);
        true
    }

    /// Deactivate a pickup.  Idempotent: collecting an inactive or unknown
    /// pickup returns `false` and changes nothing.
    pub fn collect_pickup(&mut self, index: usize) -> bool {
        match self.pickups.get_mut(index) {
            Some(pickup) if pickup.active => {
                pickup.active = false;
                self.visual_changes.push(FieldEntity::Pickup(index));
                true
            }
            _ => false,
        }
    }

    /// Entities whose colour, visibility or material changed since the last call.
    pub fn take_visual_changes(&mut self) -> Vec<FieldEntity> {
        std::mem::take(&mut self.visual_changes)
    }
}
