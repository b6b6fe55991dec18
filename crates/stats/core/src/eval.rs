//! Final-value evaluation for one (character, attribute).
//!
//! Evaluation is a pure read of the current sources:
//!
//! ```text
//! base  = baseline + override          (base kinds)
//!       = formula(dependency values)   (derived / computed kinds)
//! value = ModifierStack(equipment, effects).apply(base)
//! value = floor(value)                 (all kinds except BaseDecimal)
//! value = clamp(value, min, max)
//! ```

use std::collections::BTreeMap;

use tracing::warn;

use crate::env::{DependencyResolver, StatEnv};
use crate::error::StatError;
use crate::formula::{Formula, FormulaRegistry};
use crate::modifier::{ModifierStack, ModifierSums, floor_integral};
use crate::types::{Attribute, AttributeId, AttributeKind, Character, CharacterId};

/// Computes final attribute values from an environment and a formula registry.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    env: StatEnv<'a>,
    formulas: &'a FormulaRegistry,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: StatEnv<'a>, formulas: &'a FormulaRegistry) -> Self {
        Self { env, formulas }
    }

    pub fn env(&self) -> &StatEnv<'a> {
        &self.env
    }

    /// Evaluates `attribute` for `character`, reading derived dependencies
    /// through `resolver`.
    ///
    /// # Errors
    ///
    /// - `CharacterNotFound` / `AttributeNotFound` for missing rows
    /// - `InvalidFormula` for a derived attribute without a registered formula
    pub fn evaluate(
        &self,
        character: CharacterId,
        attribute: AttributeId,
        resolver: &dyn DependencyResolver,
    ) -> Result<f64, StatError> {
        let attribute = self
            .env
            .attributes()
            .attribute(attribute)?
            .ok_or(StatError::AttributeNotFound(attribute))?;
        let character = self
            .env
            .characters()
            .character(character)?
            .ok_or(StatError::CharacterNotFound(character))?;

        self.evaluate_attribute(&character, &attribute, resolver)
    }

    /// Evaluates with dependencies computed recursively instead of read from
    /// a cache. Used by tooling and tests.
    pub fn evaluate_uncached(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<f64, StatError> {
        self.evaluate(character, attribute, self)
    }

    fn evaluate_attribute(
        &self,
        character: &Character,
        attribute: &Attribute,
        resolver: &dyn DependencyResolver,
    ) -> Result<f64, StatError> {
        let base = match attribute.kind {
            AttributeKind::BaseInteger | AttributeKind::BaseDecimal => {
                self.base_value(character, attribute)?
            }
            AttributeKind::Derived => {
                let formula = self.formulas.derived(&attribute.slug).ok_or_else(|| {
                    warn!(slug = %attribute.slug, "derived attribute has no registered formula");
                    StatError::InvalidFormula {
                        slug: attribute.slug.clone(),
                    }
                })?;
                self.formula_value(character.id, formula, resolver)?
            }
            AttributeKind::ComputedCached => match self.formulas.computed(&attribute.slug) {
                Some(formula) => self.formula_value(character.id, formula, resolver)?,
                None => 0.0,
            },
        };

        let stack = self.modifier_stack(character.id, attribute.id)?;
        let mut value = stack.apply(base);
        if attribute.kind.is_integral() {
            value = floor_integral(value);
        }
        Ok(attribute.clamp(value))
    }

    /// `baseline + override`; a missing baseline row falls back to the
    /// attribute default, a missing override to 0.
    fn base_value(&self, character: &Character, attribute: &Attribute) -> Result<f64, StatError> {
        let sources = self.env.sources();
        let baseline = sources
            .class_baseline(character.class_id, attribute.id)?
            .unwrap_or(attribute.default_value);
        let personal = sources
            .personal_override(character.id, attribute.id)?
            .unwrap_or(0.0);
        Ok(baseline + personal)
    }

    fn formula_value(
        &self,
        character: CharacterId,
        formula: &Formula,
        resolver: &dyn DependencyResolver,
    ) -> Result<f64, StatError> {
        let mut values = BTreeMap::new();
        for slug in &formula.dependencies {
            let dependency = self
                .env
                .attributes()
                .attribute_by_slug(slug)?
                .ok_or_else(|| StatError::SlugNotFound(slug.clone()))?;
            values.insert(slug.clone(), resolver.resolve(character, &dependency)?);
        }
        formula.evaluate(&values)
    }

    fn modifier_stack(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<ModifierStack, StatError> {
        let equipment = self.env.equipment().equipment_modifiers(character, attribute)?;
        let effects = self.env.effects().effect_modifiers(character, attribute)?;
        Ok(ModifierStack::new(
            ModifierSums::from_modifiers(equipment.iter().filter(|m| m.attribute == attribute)),
            ModifierSums::from_modifiers(effects.iter().filter(|m| m.attribute == attribute)),
        ))
    }
}

impl DependencyResolver for Evaluator<'_> {
    fn resolve(&self, character: CharacterId, attribute: &Attribute) -> Result<f64, StatError> {
        self.evaluate(character, attribute.id, self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::env::{AttributeOracle, CharacterOracle, EffectOracle, EquipmentOracle, SourceOracle};
    use crate::types::{ClassId, Modifier};

    const FORCE: AttributeId = AttributeId(1);
    const VIGUEUR: AttributeId = AttributeId(2);
    const PV_MAX: AttributeId = AttributeId(3);
    const PRECISION: AttributeId = AttributeId(4);
    const ORPHAN: AttributeId = AttributeId(5);
    const RENOMMEE: AttributeId = AttributeId(6);

    const HERO: CharacterId = CharacterId(1);
    const WARRIOR: ClassId = ClassId(1);

    #[derive(Default)]
    struct Fixture {
        attributes: Vec<Attribute>,
        baselines: HashMap<(ClassId, AttributeId), f64>,
        overrides: HashMap<(CharacterId, AttributeId), f64>,
        equipment: Vec<Modifier>,
        effects: Vec<Modifier>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                attributes: vec![
                    Attribute::new(FORCE, "force", AttributeKind::BaseInteger)
                        .with_bounds(Some(0.0), Some(100.0)),
                    Attribute::new(VIGUEUR, "vigueur", AttributeKind::BaseInteger),
                    Attribute::new(PV_MAX, "pv-max", AttributeKind::Derived),
                    Attribute::new(PRECISION, "precision", AttributeKind::BaseDecimal)
                        .with_default(1.5),
                    Attribute::new(ORPHAN, "orphan", AttributeKind::Derived),
                    Attribute::new(RENOMMEE, "renommee", AttributeKind::ComputedCached),
                ],
                ..Self::default()
            }
        }

        fn evaluator<'a>(&'a self, formulas: &'a FormulaRegistry) -> Evaluator<'a> {
            Evaluator::new(StatEnv::new(self, self, self, self, self), formulas)
        }
    }

    impl AttributeOracle for Fixture {
        fn attribute(&self, id: AttributeId) -> Result<Option<Attribute>, StatError> {
            Ok(self.attributes.iter().find(|a| a.id == id).cloned())
        }

        fn attribute_by_slug(&self, slug: &str) -> Result<Option<Attribute>, StatError> {
            Ok(self.attributes.iter().find(|a| a.slug == slug).cloned())
        }
    }

    impl CharacterOracle for Fixture {
        fn character(&self, id: CharacterId) -> Result<Option<Character>, StatError> {
            Ok((id == HERO).then(|| Character::new(HERO, WARRIOR, "Aldric")))
        }
    }

    impl SourceOracle for Fixture {
        fn class_baseline(
            &self,
            class_id: ClassId,
            attribute: AttributeId,
        ) -> Result<Option<f64>, StatError> {
            Ok(self.baselines.get(&(class_id, attribute)).copied())
        }

        fn personal_override(
            &self,
            character: CharacterId,
            attribute: AttributeId,
        ) -> Result<Option<f64>, StatError> {
            Ok(self.overrides.get(&(character, attribute)).copied())
        }
    }

    impl EquipmentOracle for Fixture {
        fn equipment_modifiers(
            &self,
            _character: CharacterId,
            attribute: AttributeId,
        ) -> Result<Vec<Modifier>, StatError> {
            Ok(self
                .equipment
                .iter()
                .filter(|m| m.attribute == attribute)
                .copied()
                .collect())
        }
    }

    impl EffectOracle for Fixture {
        fn effect_modifiers(
            &self,
            _character: CharacterId,
            attribute: AttributeId,
        ) -> Result<Vec<Modifier>, StatError> {
            Ok(self
                .effects
                .iter()
                .filter(|m| m.attribute == attribute)
                .copied()
                .collect())
        }
    }

    #[test]
    fn base_formula_applies_flat_then_percent_then_floor() {
        let mut fixture = Fixture::new();
        fixture.baselines.insert((WARRIOR, FORCE), 15.0);
        fixture.overrides.insert((HERO, FORCE), 5.0);
        fixture.equipment.push(Modifier::flat(FORCE, 3.0));
        fixture.equipment.push(Modifier::percent(FORCE, 10.0));

        let formulas = FormulaRegistry::builtin();
        let value = fixture
            .evaluator(&formulas)
            .evaluate_uncached(HERO, FORCE)
            .unwrap();
        // floor((15 + 5 + 3) × 1.10) = floor(25.3)
        assert_eq!(value, 25.0);
    }

    #[test]
    fn final_value_is_clamped_to_max() {
        let mut fixture = Fixture::new();
        fixture.baselines.insert((WARRIOR, FORCE), 95.0);
        fixture.overrides.insert((HERO, FORCE), 10.0);

        let formulas = FormulaRegistry::builtin();
        let value = fixture
            .evaluator(&formulas)
            .evaluate_uncached(HERO, FORCE)
            .unwrap();
        assert_eq!(value, 100.0);
    }

    #[test]
    fn missing_baseline_uses_default_and_decimal_is_not_floored() {
        let mut fixture = Fixture::new();
        fixture.effects.push(Modifier::percent(PRECISION, 50.0));

        let formulas = FormulaRegistry::builtin();
        let value = fixture
            .evaluator(&formulas)
            .evaluate_uncached(HERO, PRECISION)
            .unwrap();
        assert_eq!(value, 2.25);
    }

    #[test]
    fn derived_reads_dependency_values() {
        let mut fixture = Fixture::new();
        fixture.baselines.insert((WARRIOR, FORCE), 20.0);
        fixture.baselines.insert((WARRIOR, VIGUEUR), 15.0);

        let formulas = FormulaRegistry::builtin();
        let value = fixture
            .evaluator(&formulas)
            .evaluate_uncached(HERO, PV_MAX)
            .unwrap();
        assert_eq!(value, 85.0);
    }

    #[test]
    fn derived_gets_its_own_modifier_layers() {
        let mut fixture = Fixture::new();
        fixture.baselines.insert((WARRIOR, FORCE), 20.0);
        fixture.baselines.insert((WARRIOR, VIGUEUR), 15.0);
        fixture.equipment.push(Modifier::flat(PV_MAX, 15.0));
        fixture.effects.push(Modifier::percent(PV_MAX, 10.0));

        let formulas = FormulaRegistry::builtin();
        let value = fixture
            .evaluator(&formulas)
            .evaluate_uncached(HERO, PV_MAX)
            .unwrap();
        // (85 + 15) × 1.10 = 110
        assert_eq!(value, 110.0);
    }

    #[test]
    fn derived_uses_resolver_values_not_sources() {
        struct Fixed;
        impl DependencyResolver for Fixed {
            fn resolve(&self, _: CharacterId, attribute: &Attribute) -> Result<f64, StatError> {
                Ok(if attribute.slug == "force" { 10.0 } else { 1.0 })
            }
        }

        let fixture = Fixture::new();
        let formulas = FormulaRegistry::builtin();
        let value = fixture
            .evaluator(&formulas)
            .evaluate(HERO, PV_MAX, &Fixed)
            .unwrap();
        assert_eq!(value, 23.0);
    }

    #[test]
    fn unregistered_derived_formula_is_an_error() {
        let fixture = Fixture::new();
        let formulas = FormulaRegistry::builtin();
        let err = fixture
            .evaluator(&formulas)
            .evaluate_uncached(HERO, ORPHAN)
            .unwrap_err();
        assert_eq!(
            err,
            StatError::InvalidFormula {
                slug: "orphan".into()
            }
        );
    }

    #[test]
    fn computed_without_logic_is_zero() {
        let fixture = Fixture::new();
        let formulas = FormulaRegistry::builtin();
        let value = fixture
            .evaluator(&formulas)
            .evaluate_uncached(HERO, RENOMMEE)
            .unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn computed_without_logic_still_takes_modifiers() {
        let mut fixture = Fixture::new();
        fixture.effects.push(Modifier::flat(RENOMMEE, 7.5));
        fixture.effects.push(Modifier::percent(RENOMMEE, 50.0));

        let formulas = FormulaRegistry::builtin();
        let value = fixture
            .evaluator(&formulas)
            .evaluate_uncached(HERO, RENOMMEE)
            .unwrap();
        // floor((0 + 7.5) × 1.5) = floor(11.25)
        assert_eq!(value, 11.0);
    }

    #[test]
    fn missing_rows_are_not_found() {
        let fixture = Fixture::new();
        let formulas = FormulaRegistry::builtin();
        let evaluator = fixture.evaluator(&formulas);

        assert_eq!(
            evaluator.evaluate_uncached(CharacterId(99), FORCE),
            Err(StatError::CharacterNotFound(CharacterId(99)))
        );
        assert_eq!(
            evaluator.evaluate_uncached(HERO, AttributeId(99)),
            Err(StatError::AttributeNotFound(AttributeId(99)))
        );
    }

    #[test]
    fn repeated_evaluation_is_stable() {
        let mut fixture = Fixture::new();
        fixture.baselines.insert((WARRIOR, FORCE), 12.0);
        fixture.equipment.push(Modifier::percent(FORCE, 33.0));

        let formulas = FormulaRegistry::builtin();
        let evaluator = fixture.evaluator(&formulas);
        let first = evaluator.evaluate_uncached(HERO, FORCE).unwrap();
        for _ in 0..5 {
            assert_eq!(evaluator.evaluate_uncached(HERO, FORCE).unwrap(), first);
        }
    }
}
