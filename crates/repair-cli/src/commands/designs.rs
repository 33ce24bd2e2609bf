//! List the built-in block designs

use anyhow::Result;
use clap::Args;
use repair_sim::{catalog, DesignParameters};
use serde_json::json;
use std::io::Write;

/// Arguments for `repair-sim designs`
#[derive(Args, Debug, Default)]
pub struct DesignsCommand {
    /// Print one JSON object per design instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Write the catalogue to `out`
pub fn handle_designs_command(cmd: &DesignsCommand, out: &mut dyn Write) -> Result<()> {
    let designs = catalog::all();

    if cmd.json {
        for design in &designs {
            let parameters = design.parameters();
            let line = json!({
                "name": design.label(),
                "parameters": parameters,
                "min_contacts_lower_bound": design.min_contacts_lower_bound(),
            });
            writeln!(out, "{line}")?;
        }
        return Ok(());
    }

    writeln!(out, "{:<14} {:<22} {:>12}", "name", "(v, b, r, k, λ)", "max overlap")?;
    for design in &designs {
        let parameters: DesignParameters = design.parameters();
        writeln!(
            out,
            "{:<14} {:<22} {:>12}",
            design.label(),
            parameters.to_string(),
            parameters.max_intersection
        )?;
    }
    Ok(())
}
