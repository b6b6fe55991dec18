//! Pure attribute model and evaluation rules shared by the cache runtime.
//!
//! `stats-core` defines the canonical computation of a character's final
//! attribute values (baselines, overrides, modifier layers, derived
//! formulas) and exposes it through I/O-free APIs. Sources are read through
//! the oracle traits in [`env`]; the runtime crate implements them on top of
//! its repositories and adds caching, invalidation and batch recomputation.
pub mod env;
pub mod error;
pub mod eval;
pub mod formula;
pub mod modifier;
pub mod types;

pub use env::{
    AttributeOracle, CharacterOracle, DependencyResolver, EffectOracle, EquipmentOracle,
    SourceOracle, StatEnv,
};
pub use error::{ErrorSeverity, FormulaError, StatError};
pub use eval::Evaluator;
pub use formula::{Formula, FormulaFn, FormulaInputs, FormulaRegistry};
pub use modifier::{ModifierStack, ModifierSums};
pub use types::{
    Attribute, AttributeId, AttributeKind, Character, CharacterId, ClassId, ItemDefinitionId,
    ItemInstance, ItemInstanceId, Modifier, ModifierKind,
};
