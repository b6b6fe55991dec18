//! Slug → formula registry with startup validation.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use super::{Formula, builtin};
use crate::error::FormulaError;
use crate::types::{Attribute, AttributeKind};

/// Registry of derived and computed formulas keyed by attribute slug.
///
/// Derived attributes must have a formula; computed attributes fall back to 0
/// until one is registered.
#[derive(Clone, Debug, Default)]
pub struct FormulaRegistry {
    derived: BTreeMap<String, Formula>,
    computed: BTreeMap<String, Formula>,
}

impl FormulaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock formulas (`pv-max`, `pm-max`, `charge-max`).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let stock = [
            Formula::new("pv-max", &["force", "vigueur"], builtin::pv_max),
            Formula::new("pm-max", &["intelligence", "volonte"], builtin::pm_max),
            Formula::new("charge-max", &["force", "vigueur"], builtin::charge_max),
        ];
        for formula in stock {
            registry.derived.insert(formula.slug.clone(), formula);
        }
        registry
    }

    /// Registers a derived formula. A slug may only be registered once.
    pub fn register(&mut self, formula: Formula) -> Result<(), FormulaError> {
        if self.contains(&formula.slug) {
            return Err(FormulaError::Duplicate(formula.slug));
        }
        self.derived.insert(formula.slug.clone(), formula);
        Ok(())
    }

    /// Registers custom logic for a computed-cached attribute.
    pub fn register_computed(&mut self, formula: Formula) -> Result<(), FormulaError> {
        if self.contains(&formula.slug) {
            return Err(FormulaError::Duplicate(formula.slug));
        }
        self.computed.insert(formula.slug.clone(), formula);
        Ok(())
    }

    pub fn derived(&self, slug: &str) -> Option<&Formula> {
        self.derived.get(slug)
    }

    pub fn computed(&self, slug: &str) -> Option<&Formula> {
        self.computed.get(slug)
    }

    /// Formula for an attribute of the given kind, if any.
    pub fn for_kind(&self, slug: &str, kind: AttributeKind) -> Option<&Formula> {
        match kind {
            AttributeKind::Derived => self.derived(slug),
            AttributeKind::ComputedCached => self.computed(slug),
            AttributeKind::BaseInteger | AttributeKind::BaseDecimal => None,
        }
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.derived.contains_key(slug) || self.computed.contains_key(slug)
    }

    fn formulas(&self) -> impl Iterator<Item = &Formula> {
        self.derived.values().chain(self.computed.values())
    }

    fn formula(&self, slug: &str) -> Option<&Formula> {
        self.derived.get(slug).or_else(|| self.computed.get(slug))
    }

    /// Checks the registry against the attribute catalog.
    ///
    /// Rejects derived attributes without a formula, formulas that read
    /// slugs missing from the catalog, and dependency cycles.
    pub fn validate(&self, attributes: &[Attribute]) -> Result<(), FormulaError> {
        let slugs: HashSet<&str> = attributes.iter().map(|a| a.slug.as_str()).collect();

        for attribute in attributes {
            if attribute.kind.is_derived() && self.derived(&attribute.slug).is_none() {
                return Err(FormulaError::MissingFormula(attribute.slug.clone()));
            }
        }

        for attribute in attributes {
            let Some(formula) = self.for_kind(&attribute.slug, attribute.kind) else {
                continue;
            };
            for dependency in &formula.dependencies {
                if !slugs.contains(dependency.as_str()) {
                    return Err(FormulaError::UnknownDependency {
                        formula: formula.slug.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        self.topological_order().map(|_| ())
    }

    /// All formula slugs ordered so every formula follows its dependencies.
    pub fn topological_order(&self) -> Result<Vec<String>, FormulaError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            registry: &'a FormulaRegistry,
            slug: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
            order: &mut Vec<String>,
        ) -> Result<(), FormulaError> {
            match marks.get(slug) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|s| *s == slug).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|s| (*s).to_owned()).collect();
                    cycle.push(slug.to_owned());
                    return Err(FormulaError::Cycle(cycle));
                }
                None => {}
            }

            marks.insert(slug, Mark::Visiting);
            path.push(slug);
            if let Some(formula) = registry.formula(slug) {
                for dependency in &formula.dependencies {
                    if registry.contains(dependency) {
                        visit(registry, dependency, marks, path, order)?;
                    }
                }
            }
            path.pop();
            marks.insert(slug, Mark::Done);
            order.push(slug.to_owned());
            Ok(())
        }

        let mut marks = BTreeMap::new();
        let mut order = Vec::new();
        for formula in self.formulas() {
            let mut path = Vec::new();
            visit(self, &formula.slug, &mut marks, &mut path, &mut order)?;
        }
        Ok(order)
    }

    /// Every formula slug that transitively reads `slug`, in dependency order.
    pub fn dependents_of(&self, slug: &str) -> Vec<String> {
        let mut affected = BTreeSet::new();
        let mut queue = VecDeque::from([slug.to_owned()]);
        while let Some(current) = queue.pop_front() {
            for formula in self.formulas() {
                if formula.dependencies.iter().any(|d| *d == current)
                    && affected.insert(formula.slug.clone())
                {
                    queue.push_back(formula.slug.clone());
                }
            }
        }

        match self.topological_order() {
            Ok(order) => order.into_iter().filter(|s| affected.contains(s)).collect(),
            // Unvalidated registry: fall back to discovery order.
            Err(_) => affected.into_iter().collect(),
        }
    }
}
