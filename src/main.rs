mod auth;
mod cli;
mod config;
mod error;
mod map;
mod model;
mod screen;
mod seed;
mod store;
mod toast;
mod transcript;
mod view;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parkspot", about = "Find and reserve parking from the terminal")]
pub struct Args {
    #[arg(short = 'c', long = "command", value_name = "CMD", action = clap::ArgAction::Append, help = "Run a command non-interactively (repeatable)")]
    pub commands: Vec<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "PARKSPOT_TRANSCRIPTS_DIR", help = "Session transcripts directory")]
    pub transcripts_dir: Option<PathBuf>,

    #[arg(long, help = "Do not write a session transcript")]
    pub no_transcript: bool,

    #[arg(long, help = "Skip the splash delay")]
    pub no_splash: bool,

    #[arg(long, help = "Start in dark mode")]
    pub dark: bool,

    #[arg(long, help = "Validate the configuration and exit")]
    pub check_config: bool,

    #[arg(long, help = "Debug logging to stderr")]
    pub debug: bool,
}

fn init_logger(debug: bool) -> Result<()> {
    let log_level = if debug { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_env("PARKSPOT_LOG").unwrap_or_else(|_| log_level.into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logger(args.debug)?;

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };
    if args.dark {
        cfg.session.dark_mode = Some(true);
    }

    if let Err(errors) = cfg.validate() {
        for e in &errors {
            eprintln!("config: {}", e);
        }
        anyhow::bail!("invalid configuration ({} error(s))", errors.len());
    }
    if args.check_config {
        println!("Configuration OK ({} slots)", cfg.seed_slots().len());
        return Ok(());
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let store = store::Store::new(cfg.seed_slots(), cfg.store_settings());

    let transcript = if args.no_transcript {
        None
    } else {
        let root = std::env::current_dir()?;
        let transcripts_dir = args
            .transcripts_dir
            .clone()
            .unwrap_or_else(|| root.join(".parkspot").join("sessions"));
        std::fs::create_dir_all(&transcripts_dir)?;

        let transcript_path = transcripts_dir.join(format!("{}.jsonl", session_id));
        let mut transcript = transcript::Transcript::new(&transcript_path, &session_id)?;
        transcript.session_start(store.slots().len())?;
        debug!(path = ?transcript_path, "transcript opened");
        Some(RefCell::new(transcript))
    };

    let ui = view::UiState {
        map_width: cfg.map.width(),
        map_height: cfg.map.height(),
        ..view::UiState::default()
    };

    let ctx = cli::Context {
        toasts: RefCell::new(toast::ToastService::new(cfg.toasts.max(), cfg.toasts.ttl())),
        projection: map::Projection::new(cfg.map.bounds()),
        store: RefCell::new(store),
        ui: RefCell::new(ui),
        transcript,
        session_id,
        config: cfg,
        args,
    };

    if ctx.args.commands.is_empty() {
        cli::run_repl(ctx)
    } else {
        let commands = ctx.args.commands.clone();
        cli::run_script(&ctx, &commands)
    }
}
