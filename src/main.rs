//! # Tide Widget Application Entry Point
//!
//! Mounts the widget (which issues its one automatic fetch), renders every state
//! change to the terminal and, optionally, to a PPM image, and turns stdin lines
//! into refresh/quit actions.
//!
//! ```text
//! tide-widget [--once] [--config PATH] [--ppm PATH]
//! ```

#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tide_widget_lib::canvas::Canvas;
use tide_widget_lib::config::Config;
use tide_widget_lib::renderer::{draw_ascii, draw_view};
use tide_widget_lib::tide_data::TideClient;
use tide_widget_lib::widget::TideWidget;
use tide_widget_lib::logging;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Args {
    /// Exit after the first fetch settles
    once: bool,
    config: Option<PathBuf>,
    ppm: Option<PathBuf>,
}

impl Args {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--once" => parsed.once = true,
                "--config" => {
                    parsed.config = Some(args.next().context("--config needs a path")?.into())
                }
                "--ppm" => parsed.ppm = Some(args.next().context("--ppm needs a path")?.into()),
                other => bail!("unknown argument: {other}"),
            }
        }
        Ok(parsed)
    }
}

/// User action read from one stdin line
#[derive(Debug, PartialEq)]
enum Command {
    Refresh,
    Quit,
    Unknown,
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" | "r" | "refresh" => Command::Refresh,
            "q" | "quit" => Command::Quit,
            _ => Command::Unknown,
        }
    }
}

fn render(widget: &TideWidget, args: &Args) -> anyhow::Result<()> {
    let config = widget.config();
    let view = widget.view();
    draw_ascii(&view, config);

    if let Some(path) = &args.ppm {
        let mut canvas = Canvas::new(config.chart.width, config.chart.height);
        // Canvas drawing is infallible
        let _ = draw_view(&view, config.chart.mode, &mut canvas);
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        canvas.write_ppm(BufWriter::new(file))?;
    }
    Ok(())
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let client = TideClient::new(config.clone())?;
    let (mut widget, ticket) = TideWidget::mount(config);
    let mut pending = Some(ticket);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = !args.once;

    loop {
        render(&widget, &args)?;

        let Some(ticket) = pending.take() else {
            if !input_open {
                return Ok(());
            }
            match lines.next_line().await?.as_deref().map(Command::parse) {
                Some(Command::Refresh) => pending = widget.refresh(),
                Some(Command::Unknown) => {}
                Some(Command::Quit) | None => return Ok(()),
            }
            continue;
        };

        // One fetch in flight; input is still read so refresh presses can be refused
        let result = {
            let fetch = ticket.run(&client);
            tokio::pin!(fetch);
            loop {
                tokio::select! {
                    result = &mut fetch => break result,
                    line = lines.next_line(), if input_open => {
                        match line?.as_deref().map(Command::parse) {
                            Some(Command::Refresh) => {
                                if widget.refresh().is_none() {
                                    info!("refresh ignored: fetch already in flight");
                                }
                            }
                            Some(Command::Quit) => return Ok(()),
                            Some(Command::Unknown) => {}
                            None => input_open = false,
                        }
                    }
                }
            }
        };
        widget.complete(ticket, result);
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let args = Args::parse(env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    if !config.relay.enabled {
        warn!("relay disabled, requesting the upstream service directly");
    }

    // Single-threaded cooperative runtime: one widget, one fetch at a time
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(args, config))
}
