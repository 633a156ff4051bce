//! Config command

use anyhow::Result;

use super::output::Output;
use crate::storage::Workspace;

const KEYS: [&str; 3] = ["max_active", "stale_days", "glyphs"];

/// Shows all values, shows one value, or sets one value
pub fn run(
    output: &Output,
    workspace: &mut Workspace,
    key: Option<&str>,
    value: Option<&str>,
) -> Result<()> {
    match (key, value) {
        (None, _) => show_all(output, workspace),
        (Some(key), None) => {
            let current = workspace.config().get(key)?;
            if output.is_json() {
                output.data(&serde_json::json!({ "key": key, "value": current }));
            } else {
                println!("{} = {}", key, current);
            }
            Ok(())
        }
        (Some(key), Some(value)) => {
            workspace.config_mut().set(key, value)?;
            workspace.save_config()?;
            output.verbose_ctx(
                "config",
                &format!("Wrote {}", workspace.config_path().display()),
            );

            let current = workspace.config().get(key)?;
            if output.is_json() {
                output.data(&serde_json::json!({ "key": key, "value": current }));
            } else {
                output.success(&format!("Set {} = {}", key, current));
            }
            Ok(())
        }
    }
}

fn show_all(output: &Output, workspace: &Workspace) -> Result<()> {
    let config = workspace.config();

    if output.is_json() {
        output.data(config);
        return Ok(());
    }

    for key in KEYS {
        println!("{} = {}", key, config.get(key)?);
    }
    Ok(())
}
