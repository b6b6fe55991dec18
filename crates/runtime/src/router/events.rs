//! Domain events published by the systems that own the source data.

use serde::{Deserialize, Serialize};
use stats_core::{AttributeId, CharacterId, ClassId, ItemInstanceId};

/// Attribute catalog fields an edit can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeField {
    Slug,
    Label,
    Kind,
    DefaultValue,
    MinValue,
    MaxValue,
    Visible,
    DisplayOrder,
}

impl AttributeField {
    /// Whether a change to this field can alter any final value.
    pub const fn affects_values(self) -> bool {
        matches!(
            self,
            Self::Kind | Self::DefaultValue | Self::MinValue | Self::MaxValue
        )
    }
}

/// A change to source data the cache depends on.
///
/// Producers emit the event after their own write has been committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    AttributeCreated {
        attribute: AttributeId,
    },
    AttributeUpdated {
        attribute: AttributeId,
        changed: Vec<AttributeField>,
    },
    /// The catalog row is already gone; `slug` names it for dependents.
    AttributeDeleted {
        attribute: AttributeId,
        slug: String,
    },
    ClassBaselineChanged {
        class_id: ClassId,
        attribute: AttributeId,
    },
    PersonalOverrideChanged {
        character: CharacterId,
        attribute: AttributeId,
    },
    ItemEquipped {
        character: CharacterId,
        item: ItemInstanceId,
    },
    ItemUnequipped {
        character: CharacterId,
        item: ItemInstanceId,
    },
    ItemBroken {
        character: CharacterId,
        item: ItemInstanceId,
    },
    /// A temporary effect on `attribute` was applied, removed or expired.
    EffectChanged {
        character: CharacterId,
        attribute: AttributeId,
    },
    CharacterDeleted {
        character: CharacterId,
    },
}

impl DomainEvent {
    /// Short name used as the invalidation reason.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AttributeCreated { .. } => "attribute-created",
            Self::AttributeUpdated { .. } => "attribute-updated",
            Self::AttributeDeleted { .. } => "attribute-deleted",
            Self::ClassBaselineChanged { .. } => "class-baseline-changed",
            Self::PersonalOverrideChanged { .. } => "personal-override-changed",
            Self::ItemEquipped { .. } => "item-equipped",
            Self::ItemUnequipped { .. } => "item-unequipped",
            Self::ItemBroken { .. } => "item-broken",
            Self::EffectChanged { .. } => "effect-changed",
            Self::CharacterDeleted { .. } => "character-deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_value_fields_are_impacting() {
        let impacting = [
            AttributeField::Kind,
            AttributeField::DefaultValue,
            AttributeField::MinValue,
            AttributeField::MaxValue,
        ];
        let cosmetic = [
            AttributeField::Slug,
            AttributeField::Label,
            AttributeField::Visible,
            AttributeField::DisplayOrder,
        ];
        assert!(impacting.iter().all(|f| f.affects_values()));
        assert!(!cosmetic.iter().any(|f| f.affects_values()));
    }
}
