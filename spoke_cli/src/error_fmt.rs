//! Human-readable error descriptions and structured JSON error formatting.

use spoke_core::error::{BuildError, SpokeError};
use spoke_hardware::HwError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSink => {
                "What happened: No output sink was attached to the pipeline.\nLikely causes: The event writer was not wired into the builder.\nHow to fix: Attach at least one sink via with_sink(...).".to_string()
            }
            BuildError::NoSources => {
                "What happened: No sensors to sample.\nLikely causes: The config has no [[gauges]] or [[contacts]] and [scale] is disabled.\nHow to fix: Add at least one sensor section to the config.".to_string()
            }
            BuildError::DuplicateSource(id) => format!(
                "What happened: Two sensors share source id {id}.\nLikely causes: A copied [[gauges]] or [[contacts]] block.\nHow to fix: Give every sensor a unique source_id."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SpokeError>() {
        return match se {
            SpokeError::Config(msg) => format!(
                "What happened: Configuration could not be loaded: {msg}.\nLikely causes: Wrong --config path, a TOML syntax error, or a value rejected by validation.\nHow to fix: Check the file named above and compare with etc/spoke_config.toml."
            ),
            SpokeError::TaskPanicked(name) => format!(
                "What happened: Thread {name} crashed.\nLikely causes: A bug in a sensor backend.\nHow to fix: Re-run with --log-level=debug and report the log."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::Gpio(msg) => format!(
                "What happened: Failed to initialize GPIO ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the pins in the config; ensure the process may access /dev/gpiomem."
            ),
            HwError::Unsupported(what) => format!(
                "What happened: Not available on this backend: {what}.\nLikely causes: The config asks for something the hardware build cannot provide.\nHow to fix: Adjust the config, or run the simulated build."
            ),
        };
    }

    // String-based heuristics for errors coming from init or the commands
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid packet hex") {
        return format!(
            "What happened: {msg}.\nHow to fix: Pass up to six hex digits, e.g. `spokelink decode 0x900064`."
        );
    }

    if lower.contains("self-check failed") {
        return format!(
            "What happened: {msg}.\nLikely causes: Gauge unplugged, clock/data pins swapped, or the wrong [comparator] mode.\nHow to fix: Check the wiring, then try the other comparator mode or raise timing.packet_timeout_ms."
        );
    }

    if lower.contains("open mirror") {
        return format!(
            "What happened: {msg}.\nLikely causes: The mirror path does not exist or is not writable.\nHow to fix: Check the --mirror path and its permissions."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 config, 3 hardware, 4 self-check, 5 runtime, 1 other.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(SpokeError::Config(_)) = err.downcast_ref::<SpokeError>() {
        return 2;
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    if err.downcast_ref::<HwError>().is_some() {
        return 3;
    }
    if err.to_string().contains("self-check failed") {
        return 4;
    }
    if err.downcast_ref::<SpokeError>().is_some() {
        return 5;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(se) = err.downcast_ref::<SpokeError>() {
        return match se {
            SpokeError::Config(_) => "Config",
            SpokeError::TaskPanicked(_) => "TaskPanicked",
            _ => "Pipeline",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    if err.downcast_ref::<HwError>().is_some() {
        return "Hardware";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_code_two() {
        let err = eyre::Report::new(SpokeError::Config("queue.capacity must be >= 1".into()));
        assert_eq!(exit_code_for_error(&err), 2);
        assert!(humanize(&err).contains("queue.capacity"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).expect("json");
        assert_eq!(v["reason"], "Config");
        assert_eq!(v["exit_code"], 2);
    }

    #[test]
    fn duplicate_source_names_the_id() {
        let err = eyre::Report::new(BuildError::DuplicateSource(6));
        assert!(humanize(&err).contains("source id 6"));
    }

    #[test]
    fn unsupported_hardware_is_code_three() {
        let err = eyre::Report::new(HwError::Unsupported("BLE advertisement scanning"));
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("BLE"));
    }

    #[test]
    fn unknown_errors_fall_back() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("Original: boom"));
    }
}
