//! The game loop aggregate.
//!
//! [`FieldSession`] owns every piece of gameplay state and advances it one
//! frame at a time.  It knows nothing about Bevy rendering, windows or audio
//! engines; the plugin systems feed it input, hand it an [`AudioBridge`] and a
//! [`ScreenProjector`], and copy its outputs to the screen.
//!
//! ## Frame order
//!
//! 1. Advance the session clock and run due timers (flash, status, glow reverts)
//! 2. Apply turn-key transitions and derive "currently moving"
//! 3. Tick the magic meter (movement gate)
//! 4. Update steering, then apply thrust and rotation if permitted
//! 5. Collision detection (pickups, then cooldown-gated decoys)
//! 6. Publish HUD state: meter, label anchor, controls hint
//! 7. Edge-triggered movement sound

use crate::audio::{AudioBridge, SoundCue};
use crate::collision::{CollisionDetector, CollisionReport};
use crate::config::GameConfig;
use crate::economy::MagicMeter;
use crate::error::{FieldError, FieldResult};
use crate::hud::{FieldText, HudState};
use crate::input::{InputFusion, SteeringInput};
use crate::player::PlayerState;
use crate::raycast::{RayCaster, ViewRay};
use crate::registry::EntityRegistry;
use crate::scan::{ScanController, ScanOutcome, ScanPhase};
use crate::timers::{TimedEvent, TimerQueue};
use bevy::prelude::*;
use rand::Rng;

/// World-to-screen projection supplied by the renderer.
pub trait ScreenProjector {
    /// Logical-pixel position of `world` seen from `eye`, or `None` when off
    /// screen.
    fn project(&self, eye: &Transform, world: Vec3) -> Option<Vec2>;
}

/// Camera headlamp intensity, spiked on decoy collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Glow {
    base: f32,
    current: f32,
    generation: u64,
}

/// What one frame did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub moving: bool,
    pub movement_permitted: bool,
    pub collisions: CollisionReport,
}

#[derive(Resource, Debug, Clone)]
pub struct FieldSession {
    pub player: PlayerState,
    pub steering: InputFusion,
    pub meter: MagicMeter,
    pub registry: EntityRegistry,
    pub collisions: CollisionDetector,
    pub scan: ScanController,
    pub timers: TimerQueue,
    pub hud: HudState,
    pub text: FieldText,
    clue: String,
    clock: f32,
    was_moving: bool,
    audio_unlocked: bool,
    glow: Glow,
    movement_speed: f32,
    flash_duration: f32,
    status_duration: f32,
    glow_spike_factor: f32,
    glow_spike_duration: f32,
    controls_hint_duration: f32,
}

impl FieldSession {
    /// Start a session over an existing field.
    pub fn new(config: &GameConfig, registry: EntityRegistry) -> Self {
        let clue = registry.target().descriptor.clue();
        Self {
            player: PlayerState::at(Vec3::new(0.0, 0.0, config.player_start_z)),
            steering: InputFusion::new(config),
            meter: MagicMeter::from_config(config),
            collisions: CollisionDetector::new(config, &registry),
            scan: ScanController::new(config),
            timers: TimerQueue::default(),
            hud: HudState::new(clue.clone()),
            text: FieldText::for_config(config),
            registry,
            clue,
            clock: 0.0,
            was_moving: false,
            audio_unlocked: false,
            glow: Glow {
                base: config.glow_base,
                current: config.glow_base,
                generation: 0,
            },
            movement_speed: config.movement_speed,
            flash_duration: config.flash_duration,
            status_duration: config.status_message_duration,
            glow_spike_factor: config.glow_spike_factor,
            glow_spike_duration: config.glow_spike_duration,
            controls_hint_duration: config.controls_hint_duration,
        }
    }

    /// Scatter a fresh field and start a session over it.
    pub fn spawn(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let session = Self::new(config, EntityRegistry::spawn(config, rng));
        info!(
            "Spawned {:?}: {} decoys, {} pickups. {}",
            config.variant,
            session.registry.decoys().len(),
            session.registry.pickups().len(),
            session.clue
        );
        session
    }

    pub fn clue(&self) -> &str {
        &self.clue
    }

    /// Seconds of session time elapsed.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn phase(&self) -> ScanPhase {
        self.scan.phase()
    }

    pub fn glow_intensity(&self) -> f32 {
        self.glow.current
    }

    pub fn is_audio_unlocked(&self) -> bool {
        self.audio_unlocked
    }

    /// Whether the movement sound is currently supposed to be playing.
    pub fn was_moving(&self) -> bool {
        self.was_moving
    }

    fn resting_status(&self) -> String {
        HudState::resting_status(&self.meter, &self.text, &self.clue).to_string()
    }

    /// Show `text` and schedule its revert.
    fn show_transient(&mut self, text: String) {
        let generation = self.hud.set_transient_status(text);
        self.timers.schedule(
            self.clock + self.status_duration,
            TimedEvent::RestoreStatus { generation },
        );
    }

    fn spike_glow(&mut self) {
        self.glow.generation += 1;
        self.glow.current = self.glow.base * self.glow_spike_factor;
        self.timers.schedule(
            self.clock + self.glow_spike_duration,
            TimedEvent::RestoreGlow {
                generation: self.glow.generation,
            },
        );
    }

    fn run_due_timers(&mut self) {
        for event in self.timers.drain_due(self.clock) {
            match event {
                TimedEvent::RestoreDecoyColor { index, generation } => {
                    if !self.registry.restore_decoy(index, generation) {
                        debug!("Dropped stale colour revert for decoy #{index}");
                    }
                }
                TimedEvent::RestoreStatus { generation } => {
                    if self.hud.status_generation() == generation {
                        let resting = self.resting_status();
                        self.hud.set_status(resting);
                    }
                }
                TimedEvent::RestoreGlow { generation } => {
                    if self.glow.generation == generation {
                        self.glow.current = self.glow.base;
                    }
                }
            }
        }
    }

    /// Advance the game by one frame of `dt` seconds.
    pub fn frame(
        &mut self,
        dt: f32,
        input: &mut SteeringInput,
        audio: &mut dyn AudioBridge,
        projector: Option<&dyn ScreenProjector>,
    ) -> FrameReport {
        self.clock += dt;
        self.run_due_timers();
        self.collisions.advance(dt);

        for (key, pressed) in input.take_turn_events() {
            if pressed {
                self.steering.press_turn(key);
            } else {
                self.steering.release_turn(key);
            }
        }

        let found = self.scan.is_target_found();
        // Nothing moves once the target is found.
        let moving = !found && (input.is_translating() || self.steering.is_rotating());
        let permitted = self.meter.tick(dt, moving);

        let rates = self.steering.update(input.pointer);
        if permitted && moving {
            self.player.apply_thrust(input, self.movement_speed, dt);
            self.player.apply_rotation(rates, dt);
        }

        let collisions =
            self.collisions
                .detect(&mut self.player, moving, &mut self.registry, &mut self.meter);
        if collisions.decoy_hit.is_some() {
            self.spike_glow();
        }

        if found {
            // The success message stays up for good.
            self.hud.meter_percent = self.meter.fraction() * 100.0;
            let eye = self.player.transform();
            let anchor =
                projector.and_then(|p| p.project(&eye, self.registry.target().position));
            self.hud.label_anchor = anchor;
            self.hud.label_visible = anchor.is_some();
        } else {
            self.hud.refresh_meter(&self.meter, &self.text, &self.clue);
        }
        if self.hud.controls_hint_visible && self.clock >= self.controls_hint_duration {
            self.hud.controls_hint_visible = false;
        }

        if moving && !self.was_moving {
            audio.play_looping(SoundCue::Movement);
        } else if !moving && self.was_moving {
            audio.stop(SoundCue::Movement);
        }
        self.was_moving = moving;

        FrameReport {
            moving,
            movement_permitted: permitted,
            collisions,
        }
    }

    /// Fire the scan from the view centre.
    pub fn scan(
        &mut self,
        audio: &mut dyn AudioBridge,
        caster: &dyn RayCaster,
    ) -> FieldResult<ScanOutcome> {
        if self.scan.is_target_found() {
            return Err(FieldError::AlreadyTerminal);
        }
        let ray = ViewRay::from_player(&self.player);
        let result = self
            .scan
            .on_scan(&mut self.meter, &mut self.registry, caster, ray);
        if !matches!(result, Err(FieldError::InsufficientResource { .. })) {
            audio.play_once(SoundCue::Scan);
        }
        match &result {
            Ok(ScanOutcome::Decoy {
                index,
                label,
                generation,
            }) => {
                debug!("Scanned decoy #{index} ({label})");
                self.timers.schedule(
                    self.clock + self.flash_duration,
                    TimedEvent::RestoreDecoyColor {
                        index: *index,
                        generation: *generation,
                    },
                );
                let text = self.text.decoy_scanned(label);
                self.show_transient(text);
            }
            Ok(ScanOutcome::Target) => {
                info!("Target found after {:.1}s", self.clock);
                audio.stop(SoundCue::Movement);
                self.was_moving = false;
                audio.play_once(SoundCue::Success);
                let phrase = self.registry.target().descriptor.phrase();
                self.hud.set_status(self.text.success(&phrase));
                self.hud.notification = Some(self.text.notification());
                self.hud.label_text = self.text.label.clone();
            }
            Err(FieldError::InsufficientResource { .. }) => {
                let text = self.text.insufficient_resource.clone();
                self.show_transient(text);
            }
            Err(e) => debug!("Scan: {e}"),
        }
        result
    }

    /// A pointer click: unlocks audio on the first one, then scans.
    pub fn click(
        &mut self,
        audio: &mut dyn AudioBridge,
        caster: &dyn RayCaster,
    ) -> FieldResult<ScanOutcome> {
        if !self.audio_unlocked {
            self.audio_unlocked = true;
            audio.play_looping(SoundCue::Music);
            info!("Audio unlocked");
        }
        self.scan(audio, caster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioQueue, SoundCommand};
    use crate::config::NamedColor;
    use crate::input::TurnKey;
    use crate::raycast::BoundingSphereCaster;
    use crate::registry::{DecoyEntity, SizeClass, TargetDescriptor, TargetEntity, TargetShape};

    const DT: f32 = 1.0 / 60.0;

    fn session() -> FieldSession {
        let registry = EntityRegistry::from_parts(
            vec![DecoyEntity::new("K07", Vec3::new(0.0, 0.0, -15.0), Vec3::ONE, Color::WHITE)],
            TargetEntity {
                descriptor: TargetDescriptor {
                    size: SizeClass::Small,
                    color: NamedColor::new("green", 0x00ff00),
                    shape: TargetShape::Box,
                },
                position: Vec3::new(0.0, 0.0, 40.0),
                scale: 1.6,
                found: false,
            },
            Vec::new(),
        );
        FieldSession::new(&GameConfig::default(), registry)
    }

    #[test]
    fn starts_behind_origin_with_clue_status() {
        let s = session();
        assert_eq!(s.player.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(s.hud.status(), "Find the small green box!");
        assert_eq!(s.phase(), ScanPhase::Idle);
    }

    #[test]
    fn held_forward_moves_and_drains() {
        let mut s = session();
        let mut audio = AudioQueue::default();
        let mut input = SteeringInput {
            forward: true,
            ..Default::default()
        };
        let report = s.frame(0.1, &mut input, &mut audio, None);
        assert!(report.moving && report.movement_permitted);
        assert!((s.player.position.z - 3.5).abs() < 1e-4);
        assert!((s.meter.current() - 99.75).abs() < 1e-4);
    }

    #[test]
    fn empty_meter_freezes_movement() {
        let mut s = session();
        let mut audio = AudioQueue::default();
        s.meter.set_current(0.0);
        let mut input = SteeringInput {
            forward: true,
            ..Default::default()
        };
        let report = s.frame(0.1, &mut input, &mut audio, None);
        assert!(!report.movement_permitted);
        assert_eq!(s.player.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(s.hud.status(), s.text.out_of_resource);
    }

    #[test]
    fn turn_events_reach_steering() {
        let mut s = session();
        let mut audio = AudioQueue::default();
        let mut input = SteeringInput::default();
        input.push_turn_event(TurnKey::Left, true);
        s.frame(DT, &mut input, &mut audio, None);
        assert!(s.player.yaw > 0.0);
    }

    #[test]
    fn glow_spikes_on_collision_and_reverts() {
        let mut s = session();
        let mut audio = AudioQueue::default();
        s.player.position = Vec3::new(0.0, 0.0, -12.0);
        s.collisions.set_since_last_collision(1.0);
        let mut input = SteeringInput {
            ascend: true,
            ..Default::default()
        };
        let report = s.frame(DT, &mut input, &mut audio, None);
        assert_eq!(report.collisions.decoy_hit, Some(0));
        assert!((s.glow_intensity() - 6.0).abs() < 1e-5);

        let mut idle = SteeringInput::default();
        for _ in 0..10 {
            s.frame(DT, &mut idle, &mut audio, None);
        }
        assert!((s.glow_intensity() - 1.2).abs() < 1e-5);
    }

    #[test]
    fn movement_sound_is_edge_triggered() {
        let mut s = session();
        let mut audio = AudioQueue::with_available(SoundCue::ALL);
        let mut input = SteeringInput {
            forward: true,
            ..Default::default()
        };
        s.frame(DT, &mut input, &mut audio, None);
        s.frame(DT, &mut input, &mut audio, None);
        input.forward = false;
        s.frame(DT, &mut input, &mut audio, None);
        s.frame(DT, &mut input, &mut audio, None);
        assert_eq!(
            audio.drain_commands(),
            vec![
                SoundCommand::PlayLooping(SoundCue::Movement),
                SoundCommand::Stop(SoundCue::Movement),
            ]
        );
    }

    #[test]
    fn first_click_unlocks_audio_and_scans() {
        let mut s = session();
        let mut audio = AudioQueue::with_available(SoundCue::ALL);
        let result = s.click(&mut audio, &BoundingSphereCaster);
        assert!(matches!(result, Ok(ScanOutcome::Decoy { .. })));
        assert!(s.is_audio_unlocked());
        assert_eq!(
            audio.drain_commands(),
            vec![
                SoundCommand::PlayLooping(SoundCue::Music),
                SoundCommand::PlayOnce(SoundCue::Scan),
            ]
        );

        audio.mark_finished(SoundCue::Scan);
        s.click(&mut audio, &BoundingSphereCaster).ok();
        assert_eq!(audio.drain_commands(), vec![SoundCommand::PlayOnce(SoundCue::Scan)]);
    }

    #[test]
    fn refused_first_click_unlocks_audio_without_scan_cue() {
        let mut s = session();
        let mut audio = AudioQueue::with_available(SoundCue::ALL);
        s.meter.set_current(5.0);
        let result = s.click(&mut audio, &BoundingSphereCaster);
        assert!(matches!(result, Err(FieldError::InsufficientResource { .. })));
        assert!(s.is_audio_unlocked());
        assert_eq!(
            audio.drain_commands(),
            vec![SoundCommand::PlayLooping(SoundCue::Music)]
        );
        assert_eq!(s.meter.current(), 5.0);
    }

    #[test]
    fn movement_sound_follows_keys_even_when_meter_is_empty() {
        let mut s = session();
        let mut audio = AudioQueue::with_available(SoundCue::ALL);
        s.meter.set_current(0.0);
        let mut input = SteeringInput {
            forward: true,
            ..Default::default()
        };
        let report = s.frame(DT, &mut input, &mut audio, None);
        assert!(report.moving && !report.movement_permitted);
        assert_eq!(s.player.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(
            audio.drain_commands(),
            vec![SoundCommand::PlayLooping(SoundCue::Movement)]
        );

        input.forward = false;
        s.frame(DT, &mut input, &mut audio, None);
        assert_eq!(audio.drain_commands(), vec![SoundCommand::Stop(SoundCue::Movement)]);
    }
}
