use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;

use garden_console::command::CommandSubmitter;
use garden_console::config::ConsoleConfig;
use garden_console::console::{ControlPanel, Reply};
use garden_console::history::HISTORY_CAPACITY;
use garden_console::http_client::HttpDeviceApi;
use garden_console::poller::TelemetryPoller;
use garden_console::views::ConsoleRenderer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ConsoleConfig::load(std::env::args_os().nth(1).map(PathBuf::from))?;
    info!("BOOT OK (garden-console {})", env!("CARGO_PKG_VERSION"));
    info!("Device {}", config.device_url);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;

    LocalSet::new().block_on(&runtime, run(config))
}

async fn run(config: ConsoleConfig) -> Result<()> {
    let renderer = Rc::new(ConsoleRenderer::new(io::stdout(), config.chart_width));

    let api = Rc::new(HttpDeviceApi::new(&config.device_url, config.request_timeout())?);
    let submitter = Rc::new(CommandSubmitter::new(
        api.clone(),
        renderer.clone(),
        config.message_clear_delay(),
    ));
    let poller: Rc<TelemetryPoller<_, _, HISTORY_CAPACITY>> = Rc::new(TelemetryPoller::new(
        api,
        renderer.clone(),
        config.poll_interval(),
    ));

    let panel = ControlPanel::new(renderer.clone(), submitter, poller.clone());
    poller.start()?;
    panel.init();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading console input")? {
        if line.trim().is_empty() {
            continue;
        }
        match panel.handle_line(&line) {
            Ok(Reply::Silent) => {}
            Ok(Reply::Text(text)) => renderer.note(&text),
            Ok(Reply::Quit) => break,
            Err(e) => {
                warn!("{}", e);
                renderer.note(&e.to_string());
            }
        }
    }

    info!("Console closed");
    Ok(())
}
