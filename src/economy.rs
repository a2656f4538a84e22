//! The magic meter: a depleting resource that gates movement, turning and scanning.
//!
//! Invariant: `0 ≤ current ≤ max` after every operation.

use crate::config::GameConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct MagicMeter {
    current: f32,
    pub max: f32,
    /// Units drained per second while moving or turning.
    pub depletion_rate: f32,
    /// Flat cost of one scan attempt.
    pub scan_cost: f32,
}

impl MagicMeter {
    /// A full meter.
    pub fn new(max: f32, depletion_rate: f32, scan_cost: f32) -> Self {
        Self {
            current: max,
            max,
            depletion_rate,
            scan_cost,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.max_magic,
            config.magic_depletion_rate,
            config.scan_cost,
        )
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Force the level, clamped into `[0, max]`.
    pub fn set_current(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.max);
    }

    /// Fill level in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// `true` while there is any magic left.
    pub fn has_magic(&self) -> bool {
        self.current > 0.0
    }

    /// Advance one frame.  Drains `depletion_rate * dt` while moving.
    ///
    /// Returns whether movement is permitted this frame, judged before the
    /// drain so the frame that empties the meter still moves.
    pub fn tick(&mut self, dt: f32, moving: bool) -> bool {
        let permitted = self.has_magic();
        if permitted && moving {
            self.current = (self.current - self.depletion_rate * dt).max(0.0);
        }
        permitted
    }

    /// Deduct `cost` if affordable.  Leaves the meter untouched and returns
    /// `false` otherwise.
    pub fn try_spend(&mut self, cost: f32) -> bool {
        if self.current < cost {
            return false;
        }
        self.current = (self.current - cost).max(0.0);
        true
    }

    /// Add `amount`, clamped to `max`.
    pub fn replenish(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Remove `amount`, clamped to zero.  Unlike [`try_spend`](Self::try_spend)
    /// this always applies.
    pub fn penalize(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}
