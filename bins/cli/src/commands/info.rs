//! `notesync info`: build and configuration details.

use crate::error::{CliError, ExitCode};
use notesync_adapters::adapters_crate_version;
use notesync_app::app_crate_version;
use notesync_config::{config_crate_version, load_sync_config_std_env, to_pretty_json};
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<ExitCode, CliError> {
    let mut out = String::new();
    out.push_str("name: notesync\n");
    out.push_str(&format!("version: {}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!("app: {}\n", app_crate_version()));
    out.push_str(&format!("adapters: {}\n", adapters_crate_version()));
    out.push_str(&format!("config: {}\n", config_crate_version()));

    // The effective config never contains the remote token; the schema's
    // serializer skips it.
    match load_sync_config_std_env(config_path) {
        Ok(config) => {
            out.push_str("effective config:\n");
            out.push_str(&to_pretty_json(config.as_ref())?);
        },
        Err(error) => {
            out.push_str(&format!("effective config: unavailable ({})\n", error.message));
        },
    }

    print!("{out}");
    Ok(ExitCode::Ok)
}
