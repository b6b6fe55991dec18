//! Content validation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stats_content::ContentFactory;

/// Load content and validate formulas against the catalog
#[derive(Parser, Debug)]
pub struct Validate {
    /// Data directory containing attributes.ron, classes.ron, items.ron
    #[arg(long, default_value = "data")]
    pub data: PathBuf,
}

impl Validate {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(&self.data);
        let content = factory
            .load_content()
            .with_context(|| format!("Invalid content in {}", self.data.display()))?;

        let formulas = super::formulas()?;
        formulas
            .validate(&content.attributes)
            .context("Formula registry does not match the attribute catalog")?;
        let order = formulas.topological_order()?;

        println!("Content OK: {}", factory.data_dir().display());
        println!("  attributes: {}", content.attributes.len());
        println!("  classes:    {}", content.classes.len());
        println!("  items:      {}", content.items.len());
        println!("  formulas:   {}", order.join(" -> "));
        if let Some(size) = content.config.cache.default_batch_size {
            println!("  batch size: {size}");
        }
        Ok(())
    }
}
