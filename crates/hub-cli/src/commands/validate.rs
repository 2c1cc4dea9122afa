use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PluginSourceArgs;
use crate::commands::shared::PluginSource;
use crate::output::output;

#[derive(Serialize)]
struct ValidateResponse {
    name: String,
    valid: bool,
    errors: Vec<String>,
}

pub fn handle(args: &PluginSourceArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let plugin = PluginSource::read(args)?;
    let report = plugin.validate();
    let valid = report.is_valid();
    output(
        &ValidateResponse {
            name: plugin.name,
            valid,
            errors: report.messages(),
        },
        flags.format,
    )?;
    if !valid {
        anyhow::bail!("validation failed");
    }
    Ok(())
}
