//! Modifier stacking for the equipment and effect layers.
//!
//! Every attribute, base or derived, runs through the same four stages:
//!
//! ```text
//! raw               = base + equipment_flat
//! after_equip_pct   = raw × (1 + equipment_pct/100)
//! after_effect_flat = after_equip_pct + effect_flat
//! final             = after_effect_flat × (1 + effect_pct/100)
//! ```
//!
//! Percentages compound on the running total, so the stage order is part of
//! the contract. Summation order inside a stage is not.

use crate::types::{Modifier, ModifierKind};

/// Tolerance used when flooring, so `25.000000000000004` and
/// `24.999999999999996` both land on 25.
pub const FLOOR_EPSILON: f64 = 1e-9;

/// Summed flat and percent modifiers of one layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModifierSums {
    pub flat: f64,
    pub percent: f64,
}

impl ModifierSums {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one modifier row to the sums.
    pub fn add(&mut self, modifier: &Modifier) {
        match modifier.kind {
            ModifierKind::Flat => self.flat += modifier.value,
            ModifierKind::Percent => self.percent += modifier.value,
        }
    }

    /// Sums every row. Rows for other attributes must already be filtered out.
    pub fn from_modifiers<'a>(modifiers: impl IntoIterator<Item = &'a Modifier>) -> Self {
        let mut sums = Self::new();
        for modifier in modifiers {
            sums.add(modifier);
        }
        sums
    }

    /// Add a flat amount (builder pattern)
    pub fn with_flat(mut self, value: f64) -> Self {
        self.flat += value;
        self
    }

    /// Add a percentage (builder pattern)
    pub fn with_percent(mut self, value: f64) -> Self {
        self.percent += value;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.flat == 0.0 && self.percent == 0.0
    }
}

/// Equipment and temporary-effect layers for a single (character, attribute).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModifierStack {
    pub equipment: ModifierSums,
    pub effects: ModifierSums,
}

impl ModifierStack {
    pub fn new(equipment: ModifierSums, effects: ModifierSums) -> Self {
        Self { equipment, effects }
    }

    /// Applies the four stages to a pre-modifier value, without floor or clamp.
    pub fn apply(&self, base: f64) -> f64 {
        let raw = base + self.equipment.flat;
        let after_equip_percent = apply_percent(raw, self.equipment.percent);
        let after_effects_flat = after_equip_percent + self.effects.flat;
        apply_percent(after_effects_flat, self.effects.percent)
    }
}

/// `value × (1 + pct/100)`, multiplied before dividing to keep exact
/// decimal inputs exact.
pub fn apply_percent(value: f64, percent: f64) -> f64 {
    if percent == 0.0 {
        return value;
    }
    value * (100.0 + percent) / 100.0
}

/// Floors with [`FLOOR_EPSILON`] tolerance.
pub fn floor_integral(value: f64) -> f64 {
    (value + FLOOR_EPSILON).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeId;

    #[test]
    fn stages_apply_in_order() {
        let stack = ModifierStack::new(
            ModifierSums::new().with_flat(3.0).with_percent(10.0),
            ModifierSums::new().with_flat(2.0).with_percent(50.0),
        );
        // ((20 + 3) × 1.10 + 2) × 1.5 = (25.3 + 2) × 1.5 = 40.95
        let value = stack.apply(20.0);
        assert!((value - 40.95).abs() < 1e-9);
    }

    #[test]
    fn percent_compounds_on_running_total() {
        // Equipment +100% then effects +100% is ×4, not ×3.
        let stack = ModifierStack::new(
            ModifierSums::new().with_percent(100.0),
            ModifierSums::new().with_percent(100.0),
        );
        assert_eq!(stack.apply(10.0), 40.0);
    }

    #[test]
    fn sums_ignore_row_order() {
        let attr = AttributeId(1);
        let rows = [
            Modifier::flat(attr, 4.0),
            Modifier::percent(attr, 5.0),
            Modifier::flat(attr, -1.0),
            Modifier::percent(attr, 15.0),
        ];
        let forward = ModifierSums::from_modifiers(rows.iter());
        let backward = ModifierSums::from_modifiers(rows.iter().rev());
        assert_eq!(forward, backward);
        assert_eq!(forward.flat, 3.0);
        assert_eq!(forward.percent, 20.0);
    }

    #[test]
    fn floor_tolerates_representation_error() {
        assert_eq!(floor_integral(0.29 * 100.0), 29.0);
        assert_eq!(floor_integral(25.3), 25.0);
        assert_eq!(floor_integral(-0.5), -1.0);
    }

    #[test]
    fn empty_stack_is_identity() {
        assert_eq!(ModifierStack::default().apply(17.5), 17.5);
    }
}
