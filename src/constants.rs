//! Centralised gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Tuning guidance
//!
//! Every constant is mirrored by a field on [`crate::config::GameConfig`], so
//! `assets/field.toml` can override any of them without a rebuild.  The values
//! here are the **coal field** preset; the asteroid-field preset overrides a
//! handful of them in [`crate::config::GameConfig::asteroid_field`].

// ── Field Layout ──────────────────────────────────────────────────────────────

/// Number of decoy rocks scattered through the field.
pub const DECOY_COUNT: usize = 400;

/// Number of stardust pickups scattered through the field.
pub const PICKUP_COUNT: usize = 100;

/// Width of the spawn shell (world units).
///
/// Decoys and pickups spawn at a radius in `[SPAWN_INNER_RADIUS, SPAWN_INNER_RADIUS + SPAWN_RADIUS]`.
/// The target uses half this width so it never hides in the outermost shell.
pub const SPAWN_RADIUS: f32 = 150.0;

/// Radius around the player start position that is kept free of spawns.
pub const SPAWN_INNER_RADIUS: f32 = 20.0;

/// Player start position along +Z (the camera starts slightly back from the origin).
pub const PLAYER_START_Z: f32 = 5.0;

/// Decoy per-axis scale range.  Each axis draws independently.
pub const DECOY_SCALE_MIN: f32 = 0.5;
pub const DECOY_SCALE_MAX: f32 = 2.5;

/// Decoy colour: random hue with fixed saturation and lightness.
pub const DECOY_SATURATION: f32 = 0.8;
pub const DECOY_LIGHTNESS: f32 = 0.5;

/// Target uniform scale range.  Size class thresholds sit inside this range.
pub const TARGET_SCALE_MIN: f32 = 1.5;
pub const TARGET_SCALE_MAX: f32 = 3.0;

/// Scale below which the target is described as "small".
pub const SIZE_SMALL_BELOW: f32 = 2.0;

/// Scale below which the target is described as "medium"; at or above is "large".
pub const SIZE_MEDIUM_BELOW: f32 = 2.5;

// ── Steering ──────────────────────────────────────────────────────────────────

/// Maximum yaw rate (rad/s) from pointer steering; also the magnitude of a held turn key.
pub const YAW_SPEED: f32 = 1.5;

/// Maximum pitch rate (rad/s) from pointer steering.
pub const PITCH_SPEED: f32 = 1.0;

/// Per-frame interpolation factor toward the target rates.
///
/// Applied once per frame, not scaled by delta time, so a faster framerate
/// converges faster.
pub const STEERING_LERP: f32 = 0.05;

/// Turn rate (rad/s) for discrete keyboard-only steering.
pub const DISCRETE_TURN_RATE: f32 = 1.5;

/// Rates below this magnitude count as "not turning" for the moving check.
pub const TURN_EPSILON: f32 = 0.01;

/// Translation speed (u/s) along the view's local axes.
pub const MOVEMENT_SPEED: f32 = 15.0;

// ── Magic Economy ─────────────────────────────────────────────────────────────

/// Full magic meter.
pub const MAX_MAGIC: f32 = 100.0;

/// Magic drained per second while moving or turning.
pub const MAGIC_DEPLETION_RATE: f32 = 2.5;

/// Flat magic cost of one scan attempt, charged whether or not anything is hit.
pub const SCAN_COST: f32 = 10.0;

/// Magic restored per stardust pickup.
pub const PICKUP_REPLENISH: f32 = 15.0;

// ── Collision ─────────────────────────────────────────────────────────────────

/// Distance under which a pickup is collected.
pub const COLLECTION_THRESHOLD: f32 = 2.0;

/// Distance under which the player bumps into a decoy (player radius + average rock).
pub const COLLISION_THRESHOLD: f32 = 3.5;

/// Minimum seconds between two decoy collisions.
pub const COLLISION_COOLDOWN: f32 = 0.5;

/// Magic lost per decoy collision.
pub const COLLISION_PENALTY: f32 = 25.0;

/// Distance the player is pushed backward along its facing axis on collision.
pub const KNOCKBACK_DISTANCE: f32 = 5.0;

/// Cell size of the static decoy grid.  Must be ≥ `COLLISION_THRESHOLD`.
pub const DECOY_GRID_CELL_SIZE: f32 = 10.0;

// ── Feedback ──────────────────────────────────────────────────────────────────

/// How long a scanned decoy keeps the alert colour (seconds).
pub const FLASH_DURATION: f32 = 0.5;

/// Alert colour for a scanned decoy (`0xRRGGBB`).
pub const FLASH_COLOR_HEX: u32 = 0xff0000;

/// How long a transient status message stays up (seconds).
pub const STATUS_MESSAGE_DURATION: f32 = 2.0;

/// Resting glow intensity (headlamp strength multiplier).
pub const GLOW_BASE: f32 = 1.2;

/// Multiplier applied to the glow on a decoy collision.
pub const GLOW_SPIKE_FACTOR: f32 = 5.0;

/// How long the collision glow spike lasts (seconds).
pub const GLOW_SPIKE_DURATION: f32 = 0.1;

/// Seconds after which the controls hint fades out.
pub const CONTROLS_HINT_DURATION: f32 = 10.0;

// ── Target ───────────────────────────────────────────────────────────────────

/// Display name of the lost present.
pub const TARGET_NAME: &str = "F2";

/// Colour of the lost present in the coal field (`0xRRGGBB`).
pub const TARGET_COLOR_HEX: u32 = 0x00ff00;

/// Colour name used in the clue for [`TARGET_COLOR_HEX`].
pub const TARGET_COLOR_NAME: &str = "green";

// ── Files ─────────────────────────────────────────────────────────────────────

/// Optional TOML overlay for [`crate::config::GameConfig`].
pub const CONFIG_PATH: &str = "assets/field.toml";

/// Directory searched for sound files (relative to the working directory).
pub const SOUND_DIR: &str = "assets/sounds";
