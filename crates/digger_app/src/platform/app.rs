use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Context};
use chrono::Utc;
use digger_core::{update, AppState, Msg};
use digger_logging::{digger_debug, digger_info};

use super::config::DiggerConfig;
use super::effects::EffectRunner;
use super::export::export_results;
use super::ui::commands::{parse_line, Command, HELP};
use super::ui::render::{render, Frame};

/// Everything the main loop reacts to.
pub(crate) enum AppInput {
    Msg(Msg),
    Line(String),
    InputClosed,
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Write the results here once a one-shot search succeeds.
    pub export: Option<PathBuf>,
    pub open_browser: bool,
}

struct App {
    state: AppState,
    runner: EffectRunner,
    shown: Frame,
}

impl App {
    fn new(
        config: &DiggerConfig,
        input_tx: mpsc::Sender<AppInput>,
        options: &SessionOptions,
    ) -> anyhow::Result<Self> {
        let runner = EffectRunner::new(config.engine_settings(), input_tx, options.open_browser)
            .context("failed to start search engine")?;
        Ok(Self {
            state: AppState::new(),
            runner,
            shown: Frame::default(),
        })
    }

    fn dispatch(&mut self, msg: Msg) {
        digger_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        self.runner.run(effects);
        if was_dirty {
            self.render();
        }
    }

    /// Prints only the parts of the frame that changed.
    fn render(&mut self) {
        let frame = render(&self.state.view());
        if frame.status != self.shown.status {
            if let Some(status) = &frame.status {
                println!("{status}");
            }
        }
        if frame.body != self.shown.body && !frame.body.is_empty() {
            println!();
            for line in &frame.body {
                println!("{line}");
            }
        }
        self.shown = frame;
    }

    fn export(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let results = self
            .state
            .view()
            .results
            .filter(|results| !results.set.is_empty())
            .ok_or_else(|| anyhow!("no results to export"))?;
        let written = export_results(path, &results, &Utc::now().to_rfc3339())
            .with_context(|| format!("failed to export to {}", path.display()))?;
        Ok(written)
    }
}

/// Runs the initial messages, waits for the search they start and returns
/// whether it succeeded.
pub fn run_once(
    config: &DiggerConfig,
    initial: Vec<Msg>,
    options: SessionOptions,
) -> anyhow::Result<bool> {
    let (input_tx, input_rx) = mpsc::channel();
    let mut app = App::new(config, input_tx, &options)?;

    for msg in initial {
        app.dispatch(msg);
    }
    while app.state.is_searching() {
        match input_rx.recv() {
            Ok(AppInput::Msg(msg)) => app.dispatch(msg),
            Ok(AppInput::Line(_) | AppInput::InputClosed) => {}
            Err(_) => break,
        }
    }

    let view = app.state.view();
    if view.error.is_some() || view.results.is_none() {
        return Ok(false);
    }
    if let Some(path) = &options.export {
        let written = app.export(path)?;
        println!("Exported to {}", written.display());
    }
    Ok(true)
}

pub fn run_interactive(
    config: &DiggerConfig,
    initial: Vec<Msg>,
    options: SessionOptions,
) -> anyhow::Result<()> {
    let (input_tx, input_rx) = mpsc::channel();
    spawn_stdin_reader(input_tx.clone());
    let mut app = App::new(config, input_tx, &options)?;

    for msg in initial {
        app.dispatch(msg);
    }
    println!(
        "digger: searching {} via {} (/help for commands)",
        app.state.view().source,
        config.base_url
    );

    while let Ok(input) = input_rx.recv() {
        match input {
            AppInput::Msg(msg) => app.dispatch(msg),
            AppInput::Line(line) => match parse_line(&line) {
                Command::Dispatch(msgs) => {
                    let source = app.state.view().source;
                    for msg in msgs {
                        app.dispatch(msg);
                    }
                    let now = app.state.view().source;
                    if now != source {
                        println!("Source: {now}");
                    }
                }
                Command::Export(path) => match app.export(&path) {
                    Ok(written) => println!("Exported to {}", written.display()),
                    Err(err) => println!("Export failed: {err:#}"),
                },
                Command::Help => println!("{HELP}"),
                Command::Invalid(message) => println!("{message}"),
                Command::Nothing => {}
                Command::Quit => break,
            },
            AppInput::InputClosed => break,
        }
    }

    if app.state.is_searching() {
        app.dispatch(Msg::CancelClicked);
    }
    digger_info!("interactive session ended");
    Ok(())
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if input_tx.send(AppInput::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(AppInput::InputClosed);
    });
}
