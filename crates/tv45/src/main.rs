//! `tv45` - CLI for the TV45 Nicaragua page engine
//!
//! Assembles the page, resolves the on-air program, or keeps a booted page
//! live against events read from stdin.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Datelike;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};

use tv45::cli::{AssembleCommand, Cli, Command, ConfigCommand, LiveCommand, OnAirCommand};
use tv45::fetch::fetch_json;
use tv45::page::forward_events;
use tv45::schedule::{Bucket, ShowTime};
use tv45::{
    fetcher_for, init_logging, Clock, Config, Error, Fetcher, PageController, PageEvent, Schedule,
    SystemClock,
};

/// Pending page events between the stdin reader and the page.
const EVENT_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(source) = &cli.source {
        config.site.source.clone_from(source);
    }

    match cli.command {
        Command::Assemble(cmd) => handle_assemble(config, &cmd).await,
        Command::OnAir(cmd) => handle_on_air(&config, &cmd).await,
        Command::Live(cmd) => handle_live(config, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn station(config: &Config) -> anyhow::Result<(Arc<dyn Fetcher>, Arc<dyn Clock>)> {
    let fetcher = fetcher_for(&config.site.source)
        .with_context(|| format!("Invalid site source: {}", config.site.source))?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.station_offset()));
    Ok((fetcher, clock))
}

async fn booted_page(config: Config) -> anyhow::Result<PageController> {
    let (fetcher, clock) = station(&config)?;
    let index = config.site.index.clone();
    let mut page = PageController::from_index(config, fetcher, clock)
        .await
        .with_context(|| format!("Could not load page shell {index}"))?;
    page.boot().await;
    Ok(page)
}

async fn handle_assemble(config: Config, cmd: &AssembleCommand) -> anyhow::Result<()> {
    let page = booted_page(config).await?;
    let html = page.into_document().into_html();

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &html).map_err(|source| Error::OutputWrite {
                path: path.clone(),
                source,
            })?;
            info!("Wrote {} bytes to {}", html.len(), path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

async fn handle_on_air(config: &Config, cmd: &OnAirCommand) -> anyhow::Result<()> {
    let (fetcher, clock) = station(config)?;
    let schedule: Schedule = fetch_json(fetcher.as_ref(), &config.site.schedule)
        .await
        .with_context(|| format!("Could not load schedule {}", config.site.schedule))?;

    let now = clock.now();
    let day = cmd.day.unwrap_or_else(|| now.weekday());
    let at = cmd.at.unwrap_or_else(|| ShowTime::of(&now));
    let on_air = schedule.on_air_at(day, at, &config.schedule);

    if cmd.json {
        let output = serde_json::json!({
            "day": day.to_string(),
            "bucket": Bucket::for_weekday(day).to_string(),
            "at": at.to_string(),
            "current": on_air.current,
            "next": on_air.next,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{day} {at} ({})", Bucket::for_weekday(day));
        println!("  Al aire:    {}", on_air.current);
        println!("  Siguiente:  {}", on_air.next);
    }
    Ok(())
}

async fn handle_live(config: Config, cmd: &LiveCommand) -> anyhow::Result<()> {
    let page = booted_page(config).await?;

    // stdin reads block; the reader thread is left detached.
    let (line_tx, lines) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let (event_tx, events) = mpsc::channel::<PageEvent>(EVENT_BUFFER);
    let deadline = cmd.seconds.map(Duration::from_secs);

    let stop = async move {
        match deadline {
            Some(limit) => tokio::time::sleep(limit).await,
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Could not listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            }
        }
    };
    let feeder = forward_events(lines, event_tx, stop);

    info!("Live: reading page events from stdin");
    let (page, ()) = tokio::join!(page.run(events), feeder);

    if let Some(on_air) = page.on_air() {
        info!(current = %on_air.current, next = %on_air.next, "Stopped");
    }
    if cmd.dump {
        println!("{}", page.into_document().html());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Site]");
                println!("  Source:             {}", config.site.source);
                println!("  Index:              {}", config.site.index);
                println!("  Sections dir:       {}", config.site.sections_dir);
                println!("  Schedule:           {}", config.site.schedule);
                println!("  Countries:          {}", config.site.countries);
                println!("  Gallery:            {}", config.site.gallery);
                println!();
                println!("[Layout]");
                for slot in config.layout.components.iter().chain(&config.layout.sections) {
                    println!(
                        "  #{:<20} <- {} ({:?})",
                        slot.container, slot.name, slot.role
                    );
                }
                println!();
                println!("[Schedule]");
                println!("  UTC offset (min):   {}", config.schedule.utc_offset_minutes);
                println!("  Refresh (s):        {}", config.schedule.refresh_secs);
                println!("  Clock tick (s):     {}", config.schedule.clock_tick_secs);
                println!();
                println!("[Viewport]");
                println!("  Width:              {}", config.viewport.width);
                println!("  Header offset:      {}", config.viewport.header_offset);
                println!(
                    "  Carousel:           {} wide / {} narrow, breakpoint {}",
                    config.viewport.visible_wide,
                    config.viewport.visible_narrow,
                    config.viewport.carousel_breakpoint
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
