use clap::Parser;

mod cli;
mod error_fmt;
mod logging;
mod run;
mod sensors;

use cli::{Cli, Commands, JSON_MODE};
use error_fmt::{exit_code_for_error, format_error_json, humanize};
use spoke_core::SpokeError;

fn load_config(cli: &Cli) -> eyre::Result<Option<spoke_config::Config>> {
    if !cli.cmd.needs_config() {
        return Ok(None);
    }
    spoke_config::load_file(&cli.config)
        .map(Some)
        .map_err(|e| SpokeError::Config(format!("{e:#}")).into())
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let _ = color_eyre::install();
    let cfg = load_config(&cli)?;
    logging::init(
        cli.json,
        &cli.log_level,
        cfg.as_ref().map(|c| &c.logging),
    )?;
    tracing::debug!(config = %cli.config.display(), "starting");

    match (&cli.cmd, cfg.as_ref()) {
        (Commands::Decode { packet }, _) => run::decode(packet, cli.json),
        (Commands::Run { mirror, duration_ms }, Some(cfg)) => {
            run::run(cfg, mirror.as_deref(), *duration_ms)
        }
        (Commands::SelfCheck, Some(cfg)) => run::self_check(cfg),
        (_, None) => Err(SpokeError::Config("no configuration loaded".into()).into()),
    }
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}
