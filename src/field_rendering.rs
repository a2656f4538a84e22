//! 3D rendering adapter for the field.
//!
//! The session's [`EntityRegistry`](crate::registry::EntityRegistry) owns every
//! transform and colour.  This module mirrors it into Bevy entities once at
//! startup and then only touches what the registry reports as changed:
//!
//! - decoy flashes and reverts → material base colour
//! - collected pickups → zero scale
//! - target found → success material
//!
//! The camera follows the player every frame and carries a point light whose
//! intensity tracks the session glow.

use crate::config::hex_color;
use crate::plugin::{spawn_field_session, FieldSet};
use crate::registry::{FieldEntity, TargetShape};
use crate::session::FieldSession;
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use rand::Rng;
use std::collections::HashSet;

/// Headlamp lumens per unit of session glow.
const HEADLAMP_LUMENS_PER_GLOW: f32 = 2_000_000.0;
const HEADLAMP_RANGE: f32 = 120.0;
/// Radial jitter of the decoy rock mesh, as a fraction of unit radius.
const ROCK_JITTER: f32 = 0.2;
const PICKUP_RADIUS: f32 = 0.5;

/// The player's view.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FieldCamera;

/// Point light attached to the [`FieldCamera`].
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Headlamp;

/// Material handles indexed like the registry.
#[derive(Resource, Debug, Clone)]
pub struct FieldMaterials {
    pub decoys: Vec<Handle<StandardMaterial>>,
    pub target: Handle<StandardMaterial>,
}

pub struct FieldRenderingPlugin;

impl Plugin for FieldRenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_field_scene.after(spawn_field_session))
            .add_systems(
                Update,
                (sync_camera_system, sync_field_visuals_system).in_set(FieldSet::Present),
            );
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Spawn the camera, lights and one mesh entity per registry entry.
pub fn setup_field_scene(
    mut commands: Commands,
    session: Res<FieldSession>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands
        .spawn((Camera3d::default(), session.player.transform(), FieldCamera))
        .with_children(|camera| {
            camera.spawn((
                PointLight {
                    intensity: session.glow_intensity() * HEADLAMP_LUMENS_PER_GLOW,
                    range: HEADLAMP_RANGE,
                    ..default()
                },
                Transform::default(),
                Headlamp,
            ));
        });
    commands.spawn((
        DirectionalLight {
            illuminance: 2_000.0,
            ..default()
        },
        Transform::from_xyz(40.0, 80.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let registry = &session.registry;
    let mut rng = rand::thread_rng();

    // ── Decoys: one shared rock mesh, one material each ───────────────────────
    let rock = meshes.add(rock_mesh(&mut rng));
    let mut decoy_materials = Vec::with_capacity(registry.decoys().len());
    for (index, decoy) in registry.decoys().iter().enumerate() {
        let material = materials.add(StandardMaterial {
            base_color: decoy.color,
            perceptual_roughness: 0.9,
            ..default()
        });
        decoy_materials.push(material.clone());
        commands.spawn((
            Mesh3d(rock.clone()),
            MeshMaterial3d(material),
            Transform {
                translation: decoy.position,
                rotation: decoy.rotation,
                scale: decoy.scale,
            },
            FieldEntity::Decoy(index),
        ));
    }

    // ── Target ────────────────────────────────────────────────────────────────
    let target = registry.target();
    let target_mesh = match target.descriptor.shape {
        TargetShape::Box => meshes.add(Cuboid::new(2.5, 2.5, 2.5)),
        TargetShape::Ball => meshes.add(Sphere::new(1.5)),
        TargetShape::Pyramid => meshes.add(pyramid_mesh(2.0, 3.0)),
    };
    let target_material = materials.add(StandardMaterial {
        base_color: target.descriptor.color.color(),
        perceptual_roughness: 0.6,
        ..default()
    });
    commands.spawn((
        Mesh3d(target_mesh),
        MeshMaterial3d(target_material.clone()),
        Transform::from_translation(target.position).with_scale(Vec3::splat(target.scale)),
        FieldEntity::Target,
    ));

    // ── Pickups: shared emissive gold ─────────────────────────────────────────
    let stardust = meshes.add(tetrahedron_mesh(PICKUP_RADIUS));
    let gold = materials.add(StandardMaterial {
        base_color: hex_color(0xffd700),
        emissive: LinearRgba::rgb(1.0, 0.75, 0.1),
        ..default()
    });
    for (index, pickup) in registry.pickups().iter().enumerate() {
        let scale = if pickup.active { Vec3::ONE } else { Vec3::ZERO };
        commands.spawn((
            Mesh3d(stardust.clone()),
            MeshMaterial3d(gold.clone()),
            Transform::from_translation(pickup.position).with_scale(scale),
            FieldEntity::Pickup(index),
        ));
    }

    commands.insert_resource(FieldMaterials {
        decoys: decoy_materials,
        target: target_material,
    });
}

// ── Present ───────────────────────────────────────────────────────────────────

/// Place the camera at the player and drive the headlamp from the glow.
pub fn sync_camera_system(
    session: Option<Res<FieldSession>>,
    mut cameras: Query<&mut Transform, With<FieldCamera>>,
    mut lamps: Query<&mut PointLight, With<Headlamp>>,
) {
    let Some(session) = session else {
        return;
    };
    if let Ok(mut transform) = cameras.single_mut() {
        *transform = session.player.transform();
    }
    if let Ok(mut lamp) = lamps.single_mut() {
        lamp.intensity = session.glow_intensity() * HEADLAMP_LUMENS_PER_GLOW;
    }
}

/// Apply the registry's pending visual changes.
pub fn sync_field_visuals_system(
    session: Option<ResMut<FieldSession>>,
    field_materials: Option<Res<FieldMaterials>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pickups: Query<(&FieldEntity, &mut Transform)>,
) {
    let (Some(mut session), Some(field_materials)) = (session, field_materials) else {
        return;
    };
    let changes = session.registry.take_visual_changes();
    if changes.is_empty() {
        return;
    }

    let mut hidden: HashSet<usize> = HashSet::new();
    for change in changes {
        match change {
            FieldEntity::Decoy(index) => {
                let (Some(decoy), Some(handle)) =
                    (session.registry.decoy(index), field_materials.decoys.get(index))
                else {
                    continue;
                };
                if let Some(material) = materials.get_mut(handle) {
                    material.base_color = decoy.color;
                }
            }
            FieldEntity::Target => {
                if let Some(material) = materials.get_mut(&field_materials.target) {
                    material.base_color = Color::WHITE;
                    material.emissive = LinearRgba::rgb(0.2, 3.0, 0.6);
                }
            }
            FieldEntity::Pickup(index) => {
                if session.registry.pickup(index).is_some_and(|p| !p.active) {
                    hidden.insert(index);
                }
            }
        }
    }

    if hidden.is_empty() {
        return;
    }
    for (entity, mut transform) in pickups.iter_mut() {
        if let FieldEntity::Pickup(index) = entity {
            if hidden.contains(index) {
                transform.scale = Vec3::ZERO;
            }
        }
    }
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// Build a flat-shaded mesh from a convex, origin-centred triangle soup.
///
/// Triangles are re-wound so each face normal points away from the origin,
/// which keeps back-face culling correct regardless of the input order.
pub fn convex_mesh(vertices: &[Vec3], triangles: &[[usize; 3]]) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(triangles.len() * 3);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(triangles.len() * 3);

    for &[a, b, c] in triangles {
        let (pa, mut pb, mut pc) = (vertices[a], vertices[b], vertices[c]);
        let mut normal = (pb - pa).cross(pc - pa);
        if normal.dot(pa + pb + pc) < 0.0 {
            std::mem::swap(&mut pb, &mut pc);
            normal = -normal;
        }
        let normal = normal.normalize_or_zero();
        for p in [pa, pb, pc] {
            positions.push(p.to_array());
            normals.push(normal.to_array());
        }
    }

    let uvs: Vec<[f32; 2]> = vec![[0.0, 0.0]; positions.len()];
    let indices: Vec<u32> = (0..positions.len() as u32).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Unit icosahedron vertices.
pub fn icosahedron_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .map(Vec3::normalize)
}

/// Lumpy rock: a unit icosahedron with every vertex pushed in or out by up to
/// [`ROCK_JITTER`].
pub fn rock_mesh(rng: &mut impl Rng) -> Mesh {
    let vertices =
        icosahedron_vertices().map(|v| v * (1.0 + rng.gen_range(-ROCK_JITTER..=ROCK_JITTER)));
    convex_mesh(&vertices, &ICOSAHEDRON_FACES)
}

/// Four-sided pyramid centred on its mid-height.
pub fn pyramid_mesh(base_radius: f32, height: f32) -> Mesh {
    let half = height / 2.0;
    let vertices = [
        Vec3::new(0.0, half, 0.0),
        Vec3::new(base_radius, -half, 0.0),
        Vec3::new(0.0, -half, base_radius),
        Vec3::new(-base_radius, -half, 0.0),
        Vec3::new(0.0, -half, -base_radius),
    ];
    let triangles = [[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1], [1, 3, 2], [1, 4, 3]];
    convex_mesh(&vertices, &triangles)
}

pub fn tetrahedron_mesh(radius: f32) -> Mesh {
    let vertices = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ]
    .map(|v| v.normalize() * radius);
    convex_mesh(&vertices, &[[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_mesh::VertexAttributeValues;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn positions_and_normals(mesh: &Mesh) -> (Vec<Vec3>, Vec<Vec3>) {
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };
        let Some(VertexAttributeValues::Float32x3(normals)) =
            mesh.attribute(Mesh::ATTRIBUTE_NORMAL)
        else {
            panic!("missing normals");
        };
        (
            positions.iter().map(|p| Vec3::from_array(*p)).collect(),
            normals.iter().map(|n| Vec3::from_array(*n)).collect(),
        )
    }

    fn assert_outward(mesh: &Mesh) {
        let (positions, normals) = positions_and_normals(mesh);
        for (p, n) in positions.iter().zip(&normals) {
            assert!(p.dot(*n) > 0.0, "inward normal {n:?} at {p:?}");
        }
    }

    #[test]
    fn rock_stays_within_jitter_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mesh = rock_mesh(&mut rng);
        let (positions, _) = positions_and_normals(&mesh);
        assert_eq!(positions.len(), 60);
        for p in positions {
            let r = p.length();
            assert!(r >= 1.0 - ROCK_JITTER - 1e-4 && r <= 1.0 + ROCK_JITTER + 1e-4);
        }
        assert_outward(&rock_mesh(&mut rng));
    }

    #[test]
    fn pyramid_and_tetrahedron_face_outward() {
        assert_outward(&pyramid_mesh(2.0, 3.0));
        assert_outward(&tetrahedron_mesh(PICKUP_RADIUS));
    }
}
