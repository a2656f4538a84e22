//! The scan action state machine.
//!
//! ## States
//!
//! | State         | Description                                   |
//! |---------------|-----------------------------------------------|
//! | `Idle`        | Hunting; scans are accepted                   |
//! | `TargetFound` | Terminal; every further scan is ignored       |
//!
//! A scan in `Idle` charges the scan cost up front, casts the view-centre ray,
//! and classifies the nearest hit.  The cost is kept even when the ray misses.

use crate::config::{hex_color, GameConfig};
use crate::economy::MagicMeter;
use crate::error::{FieldError, FieldResult};
use crate::raycast::{RayCaster, ViewRay};
use crate::registry::{EntityRegistry, FieldEntity};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    #[default]
    Idle,
    TargetFound,
}

/// What a successful scan hit.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// A decoy was flashed.  Its revert must present `generation`.
    Decoy {
        index: usize,
        label: String,
        generation: u64,
    },
    /// The target.  The phase is now `TargetFound`.
    Target,
}

#[derive(Debug, Clone)]
pub struct ScanController {
    phase: ScanPhase,
    pub flash_color: Color,
}

impl ScanController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phase: ScanPhase::Idle,
            flash_color: hex_color(config.flash_color),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn is_target_found(&self) -> bool {
        self.phase == ScanPhase::TargetFound
    }

    /// Attempt one scan.
    ///
    /// - `AlreadyTerminal` — target found earlier; nothing changes.
    /// - `InsufficientResource` — meter below the scan cost; nothing changes.
    /// - `NoHitDetected` — cost charged, ray hit nothing.
    pub fn on_scan(
        &mut self,
        meter: &mut MagicMeter,
        registry: &mut EntityRegistry,
        caster: &dyn RayCaster,
        ray: ViewRay,
    ) -> FieldResult<ScanOutcome> {
        if self.is_target_found() {
            return Err(FieldError::AlreadyTerminal);
        }
        let cost = meter.scan_cost;
        if !meter.try_spend(cost) {
            return Err(FieldError::InsufficientResource {
                available: meter.current(),
                cost,
            });
        }

        let hit = caster.cast(ray, registry).ok_or(FieldError::NoHitDetected)?;
        match hit.entity {
            FieldEntity::Target => {
                self.phase = ScanPhase::TargetFound;
                registry.mark_target_found();
                Ok(ScanOutcome::Target)
            }
            FieldEntity::Decoy(index) => {
                let generation = registry
                    .flash_decoy(index, self.flash_color)
                    .ok_or(FieldError::NoHitDetected)?;
                let label = registry
                    .decoy(index)
                    .map(|d| d.label.clone())
                    .unwrap_or_default();
                Ok(ScanOutcome::Decoy {
                    index,
                    label,
                    generation,
                })
            }
            // Pickups are not scan candidates.
            FieldEntity::Pickup(_) => Err(FieldError::NoHitDetected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamedColor;
    use crate::raycast::{BoundingSphereCaster, RayHit};
    use crate::registry::{DecoyEntity, SizeClass, TargetDescriptor, TargetEntity, TargetShape};

    fn registry() -> EntityRegistry {
        EntityRegistry::from_parts(
            vec![DecoyEntity::new("Q42", Vec3::new(0.0, 0.0, -20.0), Vec3::ONE, Color::WHITE)],
            TargetEntity {
                descriptor: TargetDescriptor {
                    size: SizeClass::Small,
                    color: NamedColor::new("green", 0x00ff00),
                    shape: TargetShape::Ball,
                },
                position: Vec3::new(0.0, 0.0, 30.0),
                scale: 1.8,
                found: false,
            },
            Vec::new(),
        )
    }

    fn ray(direction: Vec3) -> ViewRay {
        ViewRay {
            origin: Vec3::ZERO,
            direction,
        }
    }

    struct Always(Option<RayHit>);

    impl RayCaster for Always {
        fn cast(&self, _: ViewRay, _: &EntityRegistry) -> Option<RayHit> {
            self.0
        }
    }

    #[test]
    fn miss_charges_cost_and_stays_idle() {
        let config = GameConfig::default();
        let mut scan = ScanController::new(&config);
        let mut meter = MagicMeter::from_config(&config);
        let mut reg = registry();

        let result = scan.on_scan(&mut meter, &mut reg, &BoundingSphereCaster, ray(Vec3::X));
        assert_eq!(result, Err(FieldError::NoHitDetected));
        assert_eq!(meter.current(), 90.0);
        assert_eq!(scan.phase(), ScanPhase::Idle);
    }

    #[test]
    fn insufficient_magic_changes_nothing() {
        let config = GameConfig::default();
        let mut scan = ScanController::new(&config);
        let mut meter = MagicMeter::from_config(&config);
        meter.set_current(5.0);
        let mut reg = registry();

        let result = scan.on_scan(&mut meter, &mut reg, &BoundingSphereCaster, ray(Vec3::NEG_Z));
        assert!(matches!(result, Err(FieldError::InsufficientResource { .. })));
        assert_eq!(meter.current(), 5.0);
        assert!(!reg.decoy(0).unwrap().flashed);
    }

    #[test]
    fn decoy_hit_flashes_alert_color() {
        let config = GameConfig::default();
        let mut scan = ScanController::new(&config);
        let mut meter = MagicMeter::from_config(&config);
        let mut reg = registry();

        let result = scan.on_scan(&mut meter, &mut reg, &BoundingSphereCaster, ray(Vec3::NEG_Z));
        assert_eq!(
            result,
            Ok(ScanOutcome::Decoy {
                index: 0,
                label: "Q42".to_string(),
                generation: 1
            })
        );
        assert_eq!(reg.decoy(0).unwrap().color, scan.flash_color);
        assert_eq!(scan.phase(), ScanPhase::Idle);
    }

    #[test]
    fn target_hit_is_terminal() {
        let config = GameConfig::default();
        let mut scan = ScanController::new(&config);
        let mut meter = MagicMeter::from_config(&config);
        let mut reg = registry();

        let result = scan.on_scan(&mut meter, &mut reg, &BoundingSphereCaster, ray(Vec3::Z));
        assert_eq!(result, Ok(ScanOutcome::Target));
        assert!(scan.is_target_found());
        assert!(reg.target().found);

        let before = meter.current();
        let again = scan.on_scan(&mut meter, &mut reg, &BoundingSphereCaster, ray(Vec3::NEG_Z));
        assert_eq!(again, Err(FieldError::AlreadyTerminal));
        assert_eq!(meter.current(), before);
        assert!(!reg.decoy(0).unwrap().flashed);
    }

    #[test]
    fn pickup_hit_from_custom_caster_counts_as_miss() {
        let config = GameConfig::default();
        let mut scan = ScanController::new(&config);
        let mut meter = MagicMeter::from_config(&config);
        let mut reg = registry();
        let caster = Always(Some(RayHit {
            entity: FieldEntity::Pickup(0),
            distance: 1.0,
        }));

        let result = scan.on_scan(&mut meter, &mut reg, &caster, ray(Vec3::NEG_Z));
        assert_eq!(result, Err(FieldError::NoHitDetected));
        assert_eq!(meter.current(), 90.0);
    }
}
