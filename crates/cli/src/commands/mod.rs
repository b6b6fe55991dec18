mod demo;
mod validate;

pub use demo::Demo;
pub use validate::Validate;

use stats_core::{FormulaInputs, FormulaRegistry, StatError};

/// Built-in formulas plus the CLI's renown logic.
pub(crate) fn formulas() -> Result<FormulaRegistry, stats_core::FormulaError> {
    let mut registry = FormulaRegistry::builtin();
    registry.register_computed(stats_core::Formula::new(
        "renommee",
        &["force", "intelligence", "volonte"],
        renown,
    ))?;
    Ok(registry)
}

fn renown(inputs: &FormulaInputs<'_>) -> Result<f64, StatError> {
    let total = inputs.get("force")? + inputs.get("intelligence")? + inputs.get("volonte")?;
    Ok(total / 3.0)
}
