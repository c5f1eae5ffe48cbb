use clap::{Arg, ArgAction, Command};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use ftpmirror::config::{resolve_config_path, Config};
use ftpmirror::logging::{self, *};
use ftpmirror::progress::CliObserver;
use ftpmirror::runtime::run_until_quit;
use ftpmirror::sync::SyncController;
use ftpmirror::transport::FtpClient;

/// One mirror pass without the dashboard
async fn run_headless(config: Config) -> Result<(), Box<dyn Error>> {
	logging::init_tracing();

	let client = FtpClient::from_config(&config);
	let mut controller = SyncController::new(client, &config, Arc::new(CliObserver::new()));

	controller.start()?;
	tokio::select! {
		result = controller.wait() => result?,
		_ = tokio::signal::ctrl_c() => {
			warn!("Interrupted");
			controller.quit();
		}
	}

	Ok(())
}

#[cfg(feature = "tui")]
async fn run_interactive(config: Config) -> Result<(), Box<dyn Error>> {
	ftpmirror::tui::run_tui(config).await
}

#[cfg(not(feature = "tui"))]
async fn run_interactive(config: Config) -> Result<(), Box<dyn Error>> {
	eprintln!("Built without the dashboard, running headless");
	run_headless(config).await
}

fn main() -> ExitCode {
	let matches = Command::new("ftpmirror")
		.version(env!("CARGO_PKG_VERSION"))
		.about("One-way FTP mirroring tool with a terminal dashboard")
		.arg(
			Arg::new("headless")
				.long("headless")
				.action(ArgAction::SetTrue)
				.help("Run one mirror pass without the dashboard"),
		)
		.arg(
			Arg::new("config")
				.required(true)
				.value_name("CONFIG")
				.help("Config file path, or a name inside ./configs/"),
		)
		.get_matches();

	let Some(config_arg) = matches.get_one::<String>("config") else {
		eprintln!("config argument required");
		return ExitCode::FAILURE;
	};

	let config_path = resolve_config_path(config_arg);
	let config = match Config::load(&config_path) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("{}", e);
			return ExitCode::FAILURE;
		}
	};

	// returns as soon as the mode does, even with a transfer still blocked
	let headless = matches.get_flag("headless");
	let result = run_until_quit(async move {
		if headless {
			run_headless(config).await
		} else {
			run_interactive(config).await
		}
	});

	match result {
		Ok(Ok(())) => ExitCode::SUCCESS,
		Ok(Err(e)) => {
			eprintln!("Error: {}", e);
			ExitCode::FAILURE
		}
		Err(e) => {
			eprintln!("Failed to start runtime: {}", e);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
