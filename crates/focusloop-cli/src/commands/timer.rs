use clap::Subcommand;
use focusloop_core::{Config, Event, FocusLoop, TimerCommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use super::stats;

const HELP: &str = "commands: start pause toggle reset stop skip start-break skip-break next \
                    dismiss tag <id> sounds status stats quit";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a live timer driven by commands on stdin; events are printed as
    /// JSON lines
    Run {
        /// Start the first pomodoro immediately
        #[arg(long)]
        start: bool,
        /// Tag for the first pomodoro
        #[arg(long)]
        tag: Option<String>,
    },
    /// Print the idle timer state for the current configuration as JSON
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    match action {
        TimerAction::Run { start, tag } => runtime.block_on(run_loop(start, tag)),
        TimerAction::Status => runtime.block_on(status()),
    }
}

async fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let app = FocusLoop::from_config(&config)?;
    emit(&app.machine().snapshot())
}

fn emit(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

async fn run_loop(start: bool, tag: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let mut app = FocusLoop::from_config(&config)?;

    if let Some(tag) = tag {
        app.machine_mut().select_tag(&tag);
    }
    emit(&app.machine().snapshot())?;
    if start {
        if let Some(event) = app.dispatch(TimerCommand::Start) {
            emit(&event)?;
        }
    }
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(tick) = app.next_tick() => {
                if let Some(event) = app.handle_tick(tick) {
                    emit(&event)?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                match line {
                    "" => {}
                    "quit" | "exit" => break,
                    "help" => eprintln!("{HELP}"),
                    "stats" => println!("{}", serde_json::to_string(&stats::summary(app.stats()))?),
                    _ => match line.parse::<TimerCommand>() {
                        Ok(command) => {
                            debug!(%command, "dispatch");
                            match app.dispatch(command) {
                                Some(event) => emit(&event)?,
                                None => debug!(line, "command not applicable in current state"),
                            }
                        }
                        Err(e) => warn!(error = %e, "ignoring input"),
                    },
                }
            }
        }
    }

    let tag = app.machine().selected_tag().to_string();
    if config.session.last_selected_tag != tag {
        config.session.last_selected_tag = tag;
        config.save()?;
    }
    Ok(())
}
