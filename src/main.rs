use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use edgepick::form::{FormController, FormView, RunStart, SaveOutcome};
use edgepick::results::{clipboard, BulkCopy, SystemClipboard, NOTHING_TO_COPY_NOTICE};
use edgepick::session::{Outcome, RunUpdate};
use edgepick::settings::{ClientSettings, LogFormat, SETTINGS_ENV};
use edgepick::term::TerminalView;

#[derive(Parser)]
#[command(
    name = "edgepick",
    about = "Configure and run the edge IP speed-test engine",
    version,
    long_about = None
)]
struct Cli {
    /// Client settings file (TOML)
    #[arg(long, global = true, env = SETTINGS_ENV)]
    settings: Option<PathBuf>,

    /// Engine base URL, overrides server.base_url
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current configuration form
    Show,

    /// Apply edits locally and validate them
    Check {
        #[command(flatten)]
        edits: EditArgs,
    },

    /// Apply edits and save the configuration on the engine
    Save {
        #[command(flatten)]
        edits: EditArgs,

        /// Skip the overwrite confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Apply edits and run a test, streaming its log
    Run {
        #[command(flatten)]
        edits: EditArgs,

        /// Copy all result addresses to the clipboard
        #[arg(long)]
        copy: bool,
    },
}

#[derive(Args, Default)]
struct EditArgs {
    /// Set a field, e.g. --set max_latency=300 (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,

    /// Toggle a region filter tag (repeatable)
    #[arg(long = "toggle-region", value_name = "KEY")]
    toggle_region: Vec<String>,

    /// Toggle a data center filter tag (repeatable)
    #[arg(long = "toggle-colo", value_name = "KEY")]
    toggle_colo: Vec<String>,
}

impl EditArgs {
    fn apply<V: FormView>(&self, ctl: &mut FormController<V>) -> Result<()> {
        for assignment in &self.set {
            let (field, value) = assignment
                .split_once('=')
                .with_context(|| format!("expected FIELD=VALUE, got {:?}", assignment))?;
            ctl.set_field_by_key(field.trim(), value)?;
        }
        for key in &self.toggle_region {
            ctl.toggle_region(key)?;
        }
        for key in &self.toggle_colo {
            ctl.toggle_colo(key)?;
        }
        Ok(())
    }
}

fn init_tracing(settings: &ClientSettings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match settings.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = ClientSettings::resolve(cli.settings.as_deref())?;
    if let Some(server) = cli.server {
        settings.server.base_url = server;
    }
    init_tracing(&settings);
    tracing::debug!(base_url = %settings.server.base_url, "settings resolved");

    match cli.command {
        Commands::Show => {
            let mut ctl = edgepick::connect(&settings, TerminalView::stdio(false))?;
            ctl.load_initial_data().await?;
        }
        Commands::Check { edits } => {
            let mut ctl = edgepick::connect(&settings, TerminalView::stdio(false).quiet(true))?;
            ctl.load_initial_data().await?;
            edits.apply(&mut ctl)?;
            let verdict = ctl.validate_form()?;
            if !verdict.is_valid() {
                bail!("configuration is invalid: {}", verdict);
            }
            let snapshot = ctl.collect_snapshot()?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Save { edits, yes } => {
            let mut ctl = edgepick::connect(&settings, TerminalView::stdio(yes).quiet(true))?;
            ctl.load_initial_data().await?;
            edits.apply(&mut ctl)?;
            if ctl.save().await? == SaveOutcome::Cancelled {
                println!("Save cancelled.");
            }
        }
        Commands::Run { edits, copy } => {
            let mut ctl = edgepick::connect(&settings, TerminalView::stdio(false).quiet(true))?;
            ctl.load_initial_data().await?;
            edits.apply(&mut ctl)?;
            let outcome = run_to_end(&mut ctl).await?;
            if copy {
                copy_addresses(&mut ctl).await;
            }
            if outcome == Outcome::Error {
                bail!("run ended with an error");
            }
        }
    }

    Ok(())
}

/// Stream one run; the first Ctrl-C closes the connection from the client side.
async fn run_to_end<V: FormView>(ctl: &mut FormController<V>) -> Result<Outcome> {
    if let RunStart::Started(id) = ctl.run()? {
        tracing::info!(session_id = %id, "streaming run");
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stopping = false;

    loop {
        tokio::select! {
            update = ctl.next_run_update() => match update {
                Some(RunUpdate::Finished(outcome)) => return Ok(outcome),
                Some(_) => {}
                None => return Ok(Outcome::Error),
            },
            _ = &mut ctrl_c, if !stopping => {
                eprintln!("Stopping run; the engine may keep testing.");
                ctl.stop_run();
                stopping = true;
            }
        }
    }
}

async fn copy_addresses<V: FormView>(ctl: &mut FormController<V>) {
    let Some(results) = ctl.results_mut() else {
        println!("{}", NOTHING_TO_COPY_NOTICE);
        return;
    };
    match results.copy_all(&mut SystemClipboard, Instant::now()) {
        Ok(BulkCopy::Copied(n)) => {
            println!("Copied {} addresses.", n);
            // Keep the process alive while the clipboard holds the text.
            tokio::time::sleep(clipboard::settle_delay()).await;
        }
        Ok(BulkCopy::NothingToCopy) => println!("{}", NOTHING_TO_COPY_NOTICE),
        Err(e) => {
            tracing::warn!(error = %e, "copy failed");
            eprintln!("Copy failed: {}", e);
        }
    }
}
