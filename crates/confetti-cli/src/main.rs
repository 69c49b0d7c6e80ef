//! confetti: birthday notifier command line.

mod console;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use confetti_core::app::{App, AppBuilder, CommandOutcome};
use confetti_core::config::Config;
use confetti_core::domain::{Actor, ChannelId, CoreError, UserId};
use confetti_core::impls::{InMemoryStore, SqliteStore};
use confetti_core::observability::init_tracing;
use tracing::info;

use crate::console::ConsoleTransport;

/// Store birthdays and greet each one exactly once on the day.
#[derive(Debug, Parser)]
#[command(name = "confetti", version)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// User id the command runs as.
    #[arg(long = "as", value_name = "USER_ID", global = true, default_value_t = 0)]
    actor: u64,

    /// Run the command with community administrator rights.
    #[arg(long, global = true)]
    admin: bool,

    /// Keep everything in memory instead of the configured database.
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Print command results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a birthday (your own, or another user's as administrator).
    Set {
        month: u32,
        day: u32,
        /// Target user; defaults to `--as`.
        #[arg(long)]
        user: Option<u64>,
        /// Name used when the user has no mention.
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a stored birthday.
    Clear {
        #[arg(long)]
        user: Option<u64>,
    },
    /// List stored birthdays.
    List,
    /// Bind the community's birthday channel (administrators only).
    Channel { channel_id: u64 },
    /// Drop records of users missing from the member roster.
    Prune,
    /// Delete every stored birthday (developers only).
    Wipe,
    /// Clear every notified marker (developers only).
    ResetFlags,
    /// Send debug greetings for a given date (developers only).
    Simulate { month: u32, day: u32 },
    /// Run today's cycle immediately (developers only).
    RunOnce,
    /// Run the periodic scheduler until Ctrl-C.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    init_tracing(&config.log_filter);

    let app = build_app(&config, cli.ephemeral)?;
    let actor = actor(&cli, &config);

    let result = match cli.command {
        Command::Serve => return serve(app).await,
        Command::Set {
            month,
            day,
            user,
            name,
        } => {
            let target = user.map(UserId::new);
            let name = name
                .unwrap_or_else(|| format!("User ID {}", target.unwrap_or(actor.id).get()));
            app.commands.set_birthday(&actor, target, &name, month, day)
        }
        Command::Clear { user } => app.commands.clear_birthday(&actor, user.map(UserId::new)),
        Command::List => app.commands.list(),
        Command::Channel { channel_id } => {
            app.commands.set_channel(&actor, ChannelId::new(channel_id))
        }
        Command::Prune => app.commands.prune(&actor),
        Command::Wipe => app.commands.wipe(&actor),
        Command::ResetFlags => app.commands.reset_flags(&actor),
        Command::Simulate { month, day } => app.commands.simulate(&actor, month, day).await,
        Command::RunOnce => app.commands.run_now(&actor).await,
    };

    report(result, cli.json)
}

fn actor(cli: &Cli, config: &Config) -> Actor {
    let id = UserId::new(cli.actor);
    Actor {
        id,
        is_admin: cli.admin,
        is_developer: config.is_developer(id),
    }
}

fn build_app(config: &Config, ephemeral: bool) -> anyhow::Result<App> {
    let settings = config.scheduler_settings()?;
    let builder = AppBuilder::with_settings(settings)
        .period(config.cycle_period())
        .transport(Arc::new(ConsoleTransport::from_config(config)));

    let builder = if ephemeral {
        builder.store(Arc::new(InMemoryStore::new()))
    } else {
        let store = SqliteStore::open(&config.database_path).with_context(|| {
            format!("opening database {}", config.database_path.display())
        })?;
        builder.store(Arc::new(store))
    };
    Ok(builder.build()?)
}

fn report(result: Result<CommandOutcome, CoreError>, json: bool) -> anyhow::Result<ExitCode> {
    match result {
        Ok(outcome) if json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        Ok(outcome) => println!("{}", render::outcome(&outcome)),
        Err(err) => {
            eprintln!("{}", render::error(&err));
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn serve(app: App) -> anyhow::Result<ExitCode> {
    let scheduler = app.spawn_scheduler();
    info!(period_secs = app.period().as_secs(), "confetti serving; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutdown requested");
    scheduler.shutdown_and_join().await;
    Ok(ExitCode::SUCCESS)
}
