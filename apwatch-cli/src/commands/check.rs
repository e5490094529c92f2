//! Configuration check command.

use std::path::Path;

use apwatch_core::Extractor;
use apwatch_core::session::SessionPlan;

use crate::error::CliError;
use crate::util::{Verbosity, init_logging, load_settings};

/// Loads, validates and compiles the configuration without polling
pub fn cmd_check(
    config_path: Option<&Path>,
    verbosity: Verbosity,
    resolve: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    init_logging(&settings.logging, verbosity, false)?;

    settings.validate()?;
    Extractor::new(&settings.extract, &settings.access_points.prefix)?;
    for device in &settings.devices {
        SessionPlan::compile(device)?;
    }
    if resolve {
        settings.resolve_devices()?;
    }

    if !verbosity.quiet {
        let range = &settings.access_points;
        println!("Configuration OK");
        println!(
            "  Access points: {} ({} .. {})",
            range.len(),
            range.id(range.first),
            range.id(range.last)
        );
        println!(
            "  Interval:      {}s",
            settings.poller.effective_interval().as_secs()
        );
        println!("  Push server:   {}", settings.server.bind);
        println!("  Devices:");
        for device in &settings.devices {
            println!(
                "    {} {}:{} ({} commands)",
                device.name,
                device.host,
                device.port,
                device.commands.len()
            );
        }
    }
    Ok(())
}
