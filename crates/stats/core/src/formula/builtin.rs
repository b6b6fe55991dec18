//! Built-in derived formulas.

use super::FormulaInputs;
use crate::error::StatError;

/// Hit points: `force × 2 + vigueur × 3`.
pub fn pv_max(inputs: &FormulaInputs<'_>) -> Result<f64, StatError> {
    Ok(inputs.get("force")? * 2.0 + inputs.get("vigueur")? * 3.0)
}

/// Mana: `intelligence × 2 + volonte × 3`.
pub fn pm_max(inputs: &FormulaInputs<'_>) -> Result<f64, StatError> {
    Ok(inputs.get("intelligence")? * 2.0 + inputs.get("volonte")? * 3.0)
}

/// Carrying capacity: `force × 5 + vigueur × 2`.
pub fn charge_max(inputs: &FormulaInputs<'_>) -> Result<f64, StatError> {
    Ok(inputs.get("force")? * 5.0 + inputs.get("vigueur")? * 2.0)
}
