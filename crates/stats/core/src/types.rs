//! Identifiers and data records shared by the evaluator and the runtime.
//!
//! Records here mirror the persisted layout: attribute catalog rows,
//! characters, item instances, and the modifier rows granted by item
//! definitions or temporary effects.
use std::fmt;

/// Identifier of a character sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterId(pub u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character#{}", self.0)
    }
}

/// Identifier of an attribute in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeId(pub u32);

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attribute#{}", self.0)
    }
}

/// Identifier of a character class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

/// Identifier of an item definition (the catalog entry, not an owned copy).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinitionId(pub u32);

/// Identifier of an owned item instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemInstanceId(pub u64);

impl fmt::Display for ItemInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// How an attribute obtains its pre-modifier value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
pub enum AttributeKind {
    /// Baseline + override, floored.
    BaseInteger,
    /// Baseline + override, kept fractional.
    BaseDecimal,
    /// Registered formula over other attributes' cached values.
    Derived,
    /// Reserved for custom computed logic.
    ComputedCached,
}

impl AttributeKind {
    /// Base attributes read class baselines and personal overrides.
    pub const fn is_base(self) -> bool {
        matches!(self, Self::BaseInteger | Self::BaseDecimal)
    }

    pub const fn is_derived(self) -> bool {
        matches!(self, Self::Derived)
    }

    /// Whether the final value is floored before clamping.
    pub const fn is_integral(self) -> bool {
        !matches!(self, Self::BaseDecimal)
    }

    /// Only base attributes accept a per-character override.
    pub const fn accepts_override(self) -> bool {
        self.is_base()
    }
}

/// A named character statistic from the catalog.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub id: AttributeId,
    pub slug: String,
    pub label: String,
    pub kind: AttributeKind,
    pub default_value: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_value: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_value: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default = "default_visible"))]
    pub visible: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub display_order: i32,
}

#[cfg(feature = "serde")]
fn default_visible() -> bool {
    true
}

impl Attribute {
    /// Creates a visible attribute with no bounds.
    pub fn new(id: AttributeId, slug: impl Into<String>, kind: AttributeKind) -> Self {
        let slug = slug.into();
        Self {
            id,
            label: slug.clone(),
            slug,
            kind,
            default_value: 0.0,
            min_value: None,
            max_value: None,
            visible: true,
            display_order: 0,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_default(mut self, value: f64) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_display_order(mut self, order: i32) -> Self {
        self.display_order = order;
        self
    }

    /// Clamps a value to the configured bounds. Missing bounds are open.
    pub fn clamp(&self, value: f64) -> f64 {
        let value = match self.min_value {
            Some(min) if value < min => min,
            _ => value,
        };
        match self.max_value {
            Some(max) if value > max => max,
            _ => value,
        }
    }
}

/// A character sheet as seen by the evaluator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub id: CharacterId,
    pub class_id: ClassId,
    pub name: String,
}

impl Character {
    pub fn new(id: CharacterId, class_id: ClassId, name: impl Into<String>) -> Self {
        Self {
            id,
            class_id,
            name: name.into(),
        }
    }
}

/// An item owned by a character.
///
/// Only equipped, unbroken instances contribute modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemInstance {
    pub id: ItemInstanceId,
    pub owner: CharacterId,
    pub definition: ItemDefinitionId,
    pub equipped: bool,
    pub broken: bool,
}

impl ItemInstance {
    pub fn is_active(&self) -> bool {
        self.equipped && !self.broken
    }
}

/// Whether a modifier adds a flat amount or a percentage of the running total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum ModifierKind {
    Flat,
    Percent,
}

/// One modifier row targeting an attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub attribute: AttributeId,
    pub kind: ModifierKind,
    pub value: f64,
}

impl Modifier {
    pub fn flat(attribute: AttributeId, value: f64) -> Self {
        Self {
            attribute,
            kind: ModifierKind::Flat,
            value,
        }
    }

    pub fn percent(attribute: AttributeId, value: f64) -> Self {
        Self {
            attribute,
            kind: ModifierKind::Percent,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_open_bounds() {
        let attr = Attribute::new(AttributeId(1), "force", AttributeKind::BaseInteger)
            .with_bounds(None, Some(100.0));
        assert_eq!(attr.clamp(105.0), 100.0);
        assert_eq!(attr.clamp(-40.0), -40.0);

        let attr = attr.with_bounds(Some(0.0), None);
        assert_eq!(attr.clamp(-40.0), 0.0);
        assert_eq!(attr.clamp(1e6), 1e6);
    }

    #[test]
    fn only_base_kinds_accept_overrides() {
        assert!(AttributeKind::BaseInteger.accepts_override());
        assert!(AttributeKind::BaseDecimal.accepts_override());
        assert!(!AttributeKind::Derived.accepts_override());
        assert!(!AttributeKind::ComputedCached.accepts_override());
    }

    #[test]
    fn broken_or_stowed_items_are_inactive() {
        let mut item = ItemInstance {
            id: ItemInstanceId(1),
            owner: CharacterId(1),
            definition: ItemDefinitionId(7),
            equipped: true,
            broken: false,
        };
        assert!(item.is_active());
        item.broken = true;
        assert!(!item.is_active());
        item.broken = false;
        item.equipped = false;
        assert!(!item.is_active());
    }
}
