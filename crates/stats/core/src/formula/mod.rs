//! Typed formula registry for derived and computed attributes.
//!
//! Formulas are plain Rust functions keyed by attribute slug. Each declares
//! the slugs it reads; the registry validates those declarations against the
//! catalog at startup (missing formulas, unknown dependencies, cycles) and
//! answers reverse-dependency queries for transitive invalidation.

mod builtin;
mod registry;

pub use builtin::{charge_max, pm_max, pv_max};
pub use registry::FormulaRegistry;

use std::collections::BTreeMap;

use crate::error::StatError;

/// Signature of every registered formula.
pub type FormulaFn = fn(&FormulaInputs<'_>) -> Result<f64, StatError>;

/// A named formula and the slugs it reads.
#[derive(Clone, Debug)]
pub struct Formula {
    pub slug: String,
    pub dependencies: Vec<String>,
    pub compute: FormulaFn,
}

impl Formula {
    pub fn new(slug: impl Into<String>, dependencies: &[&str], compute: FormulaFn) -> Self {
        Self {
            slug: slug.into(),
            dependencies: dependencies.iter().map(|d| (*d).to_owned()).collect(),
            compute,
        }
    }

    /// Runs the formula over already-resolved dependency values.
    pub fn evaluate(&self, values: &BTreeMap<String, f64>) -> Result<f64, StatError> {
        let inputs = FormulaInputs {
            formula: &self.slug,
            values,
        };
        (self.compute)(&inputs)
    }
}

/// Dependency values visible to a formula.
///
/// Only declared dependencies are present; reading anything else is an error
/// so the dependency graph stays truthful.
pub struct FormulaInputs<'a> {
    formula: &'a str,
    values: &'a BTreeMap<String, f64>,
}

impl<'a> FormulaInputs<'a> {
    pub fn get(&self, slug: &str) -> Result<f64, StatError> {
        self.values
            .get(slug)
            .copied()
            .ok_or_else(|| StatError::UndeclaredDependency {
                formula: self.formula.to_owned(),
                dependency: slug.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pv_max_reads_force_and_vigueur() {
        let formula = Formula::new("pv-max", &["force", "vigueur"], pv_max);
        let mut values = BTreeMap::new();
        values.insert("force".to_owned(), 20.0);
        values.insert("vigueur".to_owned(), 15.0);
        assert_eq!(formula.evaluate(&values), Ok(85.0));
    }

    #[test]
    fn reading_undeclared_slug_fails() {
        fn sneaky(inputs: &FormulaInputs<'_>) -> Result<f64, StatError> {
            inputs.get("agilite")
        }
        let formula = Formula::new("sneaky", &["force"], sneaky);
        let mut values = BTreeMap::new();
        values.insert("force".to_owned(), 1.0);
        assert!(matches!(
            formula.evaluate(&values),
            Err(StatError::UndeclaredDependency { .. })
        ));
    }
}
