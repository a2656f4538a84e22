//! Bevy wiring for the field game.
//!
//! ## Plugins
//!
//! | Plugin             | Needs a window | Adds                                              |
//! |--------------------|----------------|---------------------------------------------------|
//! | [`FieldCorePlugin`]  | no           | resources, session spawn, scan + frame systems    |
//! | [`FieldInputPlugin`] | yes          | keyboard, cursor and click → input resources      |
//! | [`FieldPlugin`]      | yes          | everything above plus rendering, audio and HUD    |
//!
//! The core plugin runs under `MinimalPlugins`, so integration tests drive the
//! whole game loop by writing [`SteeringInput`] and [`ScanRequests`] directly.
//!
//! ## Update order
//!
//! [`FieldSet::Input`] → [`FieldSet::Simulate`] → [`FieldSet::Present`]

use crate::audio::AudioQueue;
use crate::audio_playback::AudioPlaybackPlugin;
use crate::config::GameConfig;
use crate::field_rendering::{FieldCamera, FieldRenderingPlugin};
use crate::hud_display::HudDisplayPlugin;
use crate::input::{SteeringInput, TurnKey};
use crate::raycast::BoundingSphereCaster;
use crate::session::{FieldSession, ScreenProjector};
use bevy::input::mouse::MouseButton;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSet {
    /// Raw device input → [`SteeringInput`] / [`ScanRequests`].
    Input,
    /// Scans, then the frame step.
    Simulate,
    /// Copy session state to meshes, UI and audio.
    Present,
}

/// Clicks received since the last simulate step.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanRequests {
    pub clicks: u32,
}

pub struct FieldCorePlugin;

impl Plugin for FieldCorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<GameConfig>() {
            app.insert_resource(GameConfig::default());
        }
        app.init_resource::<SteeringInput>()
            .init_resource::<ScanRequests>()
            .init_resource::<AudioQueue>()
            .configure_sets(
                Update,
                (FieldSet::Input, FieldSet::Simulate, FieldSet::Present).chain(),
            )
            .add_systems(Startup, spawn_field_session)
            .add_systems(
                Update,
                (process_scan_requests_system, field_frame_system)
                    .chain()
                    .in_set(FieldSet::Simulate),
            );
    }
}

pub struct FieldInputPlugin;

impl Plugin for FieldInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                keyboard_steering_system,
                pointer_steering_system,
                scan_click_system,
            )
                .in_set(FieldSet::Input),
        );
    }
}

/// The complete game: core, input, rendering, audio and HUD.
pub struct FieldPlugin;

impl Plugin for FieldPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            FieldCorePlugin,
            FieldInputPlugin,
            FieldRenderingPlugin,
            AudioPlaybackPlugin,
            HudDisplayPlugin,
        ));
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Scatter the field and insert the [`FieldSession`] resource.
///
/// Runs after config loading so the session sees the final values.
pub fn spawn_field_session(mut commands: Commands, config: Res<GameConfig>) {
    let mut rng = rand::thread_rng();
    commands.insert_resource(FieldSession::spawn(&config, &mut rng));
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Translate keys into [`SteeringInput`].
///
/// - **W / S** → forward / back
/// - **Space / Alt** → ascend / descend
/// - **A / D**, **← / →** → turn-key transitions
pub fn keyboard_steering_system(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<SteeringInput>) {
    input.forward = keys.pressed(KeyCode::KeyW);
    input.back = keys.pressed(KeyCode::KeyS);
    input.ascend = keys.pressed(KeyCode::Space);
    input.descend = keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]);

    let bindings = [
        (TurnKey::Left, [KeyCode::KeyA, KeyCode::ArrowLeft]),
        (TurnKey::Right, [KeyCode::KeyD, KeyCode::ArrowRight]),
    ];
    for (turn, codes) in bindings {
        if keys.any_just_pressed(codes) {
            input.push_turn_event(turn, true);
        }
        if keys.any_just_released(codes) {
            input.push_turn_event(turn, false);
        }
    }
}

/// Normalise the cursor to `[-1, 1]` on both axes, +Y up.  A cursor outside
/// the window keeps the last value.
pub fn pointer_steering_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut input: ResMut<SteeringInput>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    let x = cursor.x / size.x * 2.0 - 1.0;
    let y = -(cursor.y / size.y * 2.0 - 1.0);
    input.pointer = Vec2::new(x, y).clamp(Vec2::NEG_ONE, Vec2::ONE);
}

pub fn scan_click_system(buttons: Res<ButtonInput<MouseButton>>, mut requests: ResMut<ScanRequests>) {
    if buttons.just_pressed(MouseButton::Left) {
        requests.clicks += 1;
    }
}

// ── Simulate ──────────────────────────────────────────────────────────────────

/// Feed queued clicks to the session.  Each click may unlock audio and scans.
pub fn process_scan_requests_system(
    mut requests: ResMut<ScanRequests>,
    session: Option<ResMut<FieldSession>>,
    mut audio: ResMut<AudioQueue>,
) {
    let clicks = std::mem::take(&mut requests.clicks);
    let Some(mut session) = session else {
        return;
    };
    for _ in 0..clicks {
        match session.click(&mut *audio, &BoundingSphereCaster) {
            Ok(outcome) => trace!("Click scanned: {outcome:?}"),
            Err(e) => trace!("Click: {e}"),
        }
    }
}

/// Projects through the field camera's viewport from the player's current
/// pose.  The camera entity's transform is only synced in `Present`.
struct CameraProjector<'a> {
    camera: &'a Camera,
}

impl ScreenProjector for CameraProjector<'_> {
    fn project(&self, eye: &Transform, world: Vec3) -> Option<Vec2> {
        self.camera
            .world_to_viewport(&GlobalTransform::from(*eye), world)
            .ok()
    }
}

/// Advance the [`FieldSession`] by one frame.
pub fn field_frame_system(
    time: Res<Time>,
    session: Option<ResMut<FieldSession>>,
    mut input: ResMut<SteeringInput>,
    mut audio: ResMut<AudioQueue>,
    cameras: Query<&Camera, With<FieldCamera>>,
) {
    let Some(mut session) = session else {
        return;
    };
    let projector = cameras
        .single()
        .ok()
        .map(|camera| CameraProjector { camera });

    session.frame(
        time.delta_secs(),
        &mut *input,
        &mut *audio,
        projector.as_ref().map(|p| p as &dyn ScreenProjector),
    );
}
