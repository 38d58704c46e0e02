//! `openplay` command line.
//!
//! ```text
//! openplay set-credentials   # store email, password and signature
//! openplay run               # store event URL and positions, then wait for the trigger
//! ```

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use openplay_signup::config::{
    ConfigStore, Settings, TerminalPrompter, data_dir, reset_credentials, set_event,
};
use openplay_signup::notify::{DesktopNotifier, Notifier};
use openplay_signup::page::{FirefoxLauncher, SessionLauncher};
use openplay_signup::runner::{RegistrationJob, RunSettings};
use openplay_signup::schedule::{Clock, Scheduler, SystemClock, run_until_idle};
use openplay_signup::{Driver, FirefoxOptions, Result, logging};

// ============================================================================
// Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "openplay")]
#[command(version, about = "Weekly Open Play registration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask for email, password and signature and store them
    SetCredentials,

    /// Ask for the event URL and positions, then register at the weekly trigger
    Run,
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Exiting");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = data_dir()?;
    let _guard = logging::init(&data_dir)?;
    let store = ConfigStore::in_dir(&data_dir);

    match cli.command {
        Commands::SetCredentials => {
            reset_credentials(&store, &mut TerminalPrompter)?;
            println!(
                "Credentials saved to {}. You can now run without entering them again.",
                store.path().display()
            );
            Ok(())
        }
        Commands::Run => schedule_registration(&store, &data_dir).await,
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn schedule_registration(store: &ConfigStore, data_dir: &Path) -> Result<()> {
    set_event(store, &mut TerminalPrompter)?;
    let settings = Settings::load(store, data_dir)?;

    let driver = Driver::builder()
        .binary(settings.firefox_binary.clone())
        .extension(settings.extension_path.clone())
        .build()?;
    let options = FirefoxOptions::new().with_headless(settings.headless);

    let launcher: Arc<dyn SessionLauncher> = Arc::new(
        FirefoxLauncher::new(driver, options).with_element_timeout(settings.element_timeout),
    );
    let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier);
    let run_settings = RunSettings::new(data_dir, settings.frame_timeout);

    let make_job = || {
        RegistrationJob::new(
            store.clone(),
            Arc::clone(&launcher),
            Arc::clone(&notifier),
            Box::new(TerminalPrompter),
            run_settings.clone(),
        )
    };

    let clock = SystemClock;
    let mut scheduler = Scheduler::new();
    let due = settings.trigger.next_after(&clock.now());
    scheduler.schedule(make_job(), due);
    info!(trigger = %settings.trigger, %due, rearm = ?settings.rearm, "Registration scheduled");

    run_until_idle(&mut scheduler, &clock, settings.trigger, settings.rearm, make_job).await;
    Ok(())
}
