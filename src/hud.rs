//! HUD data model.
//!
//! The core pushes everything the UI shows into [`HudState`]; the Bevy UI
//! adapter in [`crate::hud_display`] only copies it onto text nodes.  There is
//! no UI logic on the display side.

use crate::config::{FieldVariant, GameConfig};
use crate::economy::MagicMeter;
use bevy::prelude::*;

/// Variant-specific wording.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldText {
    pub out_of_resource: String,
    pub insufficient_resource: String,
    /// Noun phrase for a decoy in "Scan complete. Just {decoy_phrase} with ID: …".
    pub decoy_phrase: String,
    pub label: String,
    pub target_name: String,
    pub controls_hint: String,
}

impl FieldText {
    pub fn for_config(config: &GameConfig) -> Self {
        match config.variant {
            FieldVariant::CoalField => Self {
                out_of_resource: "Out of magic! Find stardust to replenish!".to_string(),
                insufficient_resource: "Not enough magic to scan!".to_string(),
                decoy_phrase: "a lump of coal".to_string(),
                label: "Present".to_string(),
                target_name: config.target_name.clone(),
                controls_hint: "Mouse / A, D: steer   W, S: fly   Space / Alt: up, down   Click: scan"
                    .to_string(),
            },
            FieldVariant::AsteroidField => Self {
                out_of_resource: "Out of energy!".to_string(),
                insufficient_resource: "Not enough energy to scan!".to_string(),
                decoy_phrase: "an asteroid".to_string(),
                label: "Target".to_string(),
                target_name: config.target_name.clone(),
                controls_hint: "A, D: turn   W, S: fly   Space / Alt: up, down   Click: scan"
                    .to_string(),
            },
        }
    }

    pub fn decoy_scanned(&self, label: &str) -> String {
        format!("Scan complete. Just {} with ID: {}.", self.decoy_phrase, label)
    }

    pub fn success(&self, phrase: &str) -> String {
        format!("Success! You found {}—the {}!", self.target_name, phrase)
    }

    pub fn notification(&self) -> String {
        format!("Congratulations! You found \"{}\"!", self.target_name)
    }
}

/// Everything the UI displays, pushed one way from the core.
#[derive(Debug, Clone, PartialEq)]
pub struct HudState {
    /// Meter fill, `0.0..=100.0`.
    pub meter_percent: f32,
    status: String,
    /// Bumped on every status change; transient reverts compare against it.
    status_generation: u64,
    /// Generation of the last transient status; it has a revert pending.
    transient_generation: Option<u64>,
    /// Meter state seen by the last refresh.
    meter_empty: bool,
    pub label_text: String,
    /// Screen-space anchor of the found-target label, in logical pixels.
    pub label_anchor: Option<Vec2>,
    pub label_visible: bool,
    /// One-shot end-of-game notification.
    pub notification: Option<String>,
    pub controls_hint_visible: bool,
}

impl HudState {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            meter_percent: 100.0,
            status: status.into(),
            status_generation: 0,
            transient_generation: None,
            meter_empty: false,
            label_text: String::new(),
            label_anchor: None,
            label_visible: false,
            notification: None,
            controls_hint_visible: true,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_generation(&self) -> u64 {
        self.status_generation
    }

    /// Replace the status line.  Returns the new generation.
    pub fn set_status(&mut self, text: impl Into<String>) -> u64 {
        self.status = text.into();
        self.status_generation += 1;
        self.status_generation
    }

    /// Replace the status line with a message whose revert the caller
    /// schedules.  Returns the new generation.
    pub fn set_transient_status(&mut self, text: impl Into<String>) -> u64 {
        let generation = self.set_status(text);
        self.transient_generation = Some(generation);
        generation
    }

    /// Whether the status line is a transient message still waiting to revert.
    pub fn is_transient(&self) -> bool {
        self.transient_generation == Some(self.status_generation)
    }

    /// Sync the meter bar and the out-of-resource status with the meter.
    ///
    /// Acts on edges only.  The frame the meter runs dry shows the
    /// out-of-resource text, unless a transient message is up (its revert
    /// lands on the out-of-resource text instead).  The frame it refills swaps
    /// the out-of-resource text back for `resting`.  Any other status is left
    /// alone.
    pub fn refresh_meter(&mut self, meter: &MagicMeter, text: &FieldText, resting: &str) {
        self.meter_percent = meter.fraction() * 100.0;
        let empty = !meter.has_magic();
        if empty && !self.meter_empty {
            if !self.is_transient() {
                self.set_status(text.out_of_resource.clone());
            }
        } else if !empty && self.meter_empty && self.status == text.out_of_resource {
            self.set_status(resting.to_string());
        }
        self.meter_empty = empty;
    }

    /// The text a transient message reverts to.
    pub fn resting_status<'a>(meter: &MagicMeter, text: &'a FieldText, clue: &'a str) -> &'a str {
        if meter.has_magic() {
            clue
        } else {
            &text.out_of_resource
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coal_text() -> FieldText {
        FieldText::for_config(&GameConfig::default())
    }

    #[test]
    fn empty_meter_shows_out_of_resource_then_restores_clue() {
        let text = coal_text();
        let mut hud = HudState::new("Find the small green box!");
        let mut meter = MagicMeter::new(100.0, 2.5, 10.0);

        meter.set_current(0.0);
        hud.refresh_meter(&meter, &text, "Find the small green box!");
        assert_eq!(hud.status(), text.out_of_resource);
        assert_eq!(hud.meter_percent, 0.0);

        meter.replenish(15.0);
        hud.refresh_meter(&meter, &text, "Find the small green box!");
        assert_eq!(hud.status(), "Find the small green box!");
        assert_eq!(hud.meter_percent, 15.0);
    }

    #[test]
    fn refresh_leaves_other_messages_alone() {
        let text = coal_text();
        let mut hud = HudState::new("clue");
        hud.set_status(text.decoy_scanned("B12"));
        let generation = hud.status_generation();
        hud.refresh_meter(&MagicMeter::new(100.0, 2.5, 10.0), &text, "clue");
        assert_eq!(hud.status(), "Scan complete. Just a lump of coal with ID: B12.");
        assert_eq!(hud.status_generation(), generation);
    }

    #[test]
    fn empty_meter_does_not_replace_pending_transient() {
        let text = coal_text();
        let mut hud = HudState::new("clue");
        let mut meter = MagicMeter::new(100.0, 2.5, 10.0);
        hud.set_transient_status(text.decoy_scanned("K07"));

        meter.set_current(0.0);
        hud.refresh_meter(&meter, &text, "clue");
        hud.refresh_meter(&meter, &text, "clue");
        assert_eq!(hud.status(), "Scan complete. Just a lump of coal with ID: K07.");
        assert!(hud.is_transient());
    }

    #[test]
    fn staying_empty_leaves_later_messages_alone() {
        let text = coal_text();
        let mut hud = HudState::new("clue");
        let mut meter = MagicMeter::new(100.0, 2.5, 10.0);
        meter.set_current(0.0);
        hud.refresh_meter(&meter, &text, "clue");
        assert_eq!(hud.status(), text.out_of_resource);

        hud.set_transient_status(text.insufficient_resource.clone());
        hud.refresh_meter(&meter, &text, "clue");
        assert_eq!(hud.status(), "Not enough magic to scan!");
    }

    #[test]
    fn success_and_notification_name_the_present() {
        let text = coal_text();
        assert_eq!(
            text.success("large green ball"),
            "Success! You found F2—the large green ball!"
        );
        assert_eq!(text.notification(), "Congratulations! You found \"F2\"!");
    }
}
