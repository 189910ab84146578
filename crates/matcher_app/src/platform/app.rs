use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context};
use matcher_core::{update, AppSettings, AppState, AppViewModel, Msg};
use matcher_engine::ClientSettings;
use matcher_logging::matcher_info;

use super::effects::EffectRunner;
use super::ui::constants::{HELP_TEXT, PROMPT};
use super::ui::input::{parse_line, Input};
use super::ui::render::{Renderer, Section};

/// Everything the message loop reacts to.
pub enum LoopEvent {
    Msg(Msg),
    Input(Input),
    InputClosed,
}

/// Owns the state machine and feeds its effects to the engine.
pub struct Controller<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    out: W,
}

impl<W: Write> Controller<W> {
    pub fn new(
        settings: AppSettings,
        client: &ClientSettings,
        loop_tx: mpsc::Sender<LoopEvent>,
        sections: &'static [Section],
        out: W,
    ) -> anyhow::Result<Self> {
        let runner = EffectRunner::new(client, loop_tx).context("failed to start engine")?;
        Ok(Self {
            state: AppState::with_settings(settings),
            runner,
            renderer: Renderer::new(sections),
            out,
        })
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Applies one message, runs its effects and renders what changed.
    ///
    /// Returns alerts raised by the update; they have already been printed.
    pub fn dispatch(&mut self, msg: Msg) -> io::Result<Vec<String>> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        let alerts = self.runner.run(effects);
        for alert in &alerts {
            writeln!(self.out, "! {alert}")?;
        }
        if was_dirty {
            self.render()?;
        }
        Ok(alerts)
    }

    pub fn render(&mut self) -> io::Result<()> {
        let view = self.state.view();
        for line in self.renderer.frame(&view) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }
}

/// Reads prompt lines on a background thread until stdin closes.
fn spawn_stdin_reader(tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(LoopEvent::Input(parse_line(&line))).is_err() {
                return;
            }
        }
        let _ = tx.send(LoopEvent::InputClosed);
    });
}

pub fn run_interactive(settings: AppSettings, client: &ClientSettings) -> anyhow::Result<()> {
    let (loop_tx, loop_rx) = mpsc::channel();
    let mut controller = Controller::new(
        settings,
        client,
        loop_tx.clone(),
        super::ui::render::ALL_SECTIONS,
        io::stdout(),
    )?;
    spawn_stdin_reader(loop_tx);

    controller.print("Research matcher. Type /help for commands.")?;
    controller.render()?;
    controller.print(PROMPT)?;

    while let Ok(event) = loop_rx.recv() {
        match event {
            LoopEvent::Msg(msg) => {
                controller.dispatch(msg)?;
            }
            LoopEvent::Input(Input::Messages(msgs)) => {
                for msg in msgs {
                    controller.dispatch(msg)?;
                }
            }
            LoopEvent::Input(Input::Help) => controller.print(HELP_TEXT)?,
            LoopEvent::Input(Input::Invalid(message)) => {
                controller.print(&format!("! {message}"))?;
            }
            LoopEvent::Input(Input::Empty) => {}
            LoopEvent::Input(Input::Quit) | LoopEvent::InputClosed => break,
        }
    }
    matcher_info!("Interactive session ended");
    Ok(())
}

/// Feeds `initial` into a fresh controller and pumps engine events until
/// `done` holds for the view. Any alert aborts the run.
pub fn run_until(
    settings: AppSettings,
    client: &ClientSettings,
    sections: &'static [Section],
    initial: Vec<Msg>,
    done: impl Fn(&AppViewModel) -> bool,
) -> anyhow::Result<AppViewModel> {
    let (loop_tx, loop_rx) = mpsc::channel();
    let mut controller = Controller::new(settings, client, loop_tx, sections, io::stdout())?;

    for msg in initial {
        if let Some(alert) = controller.dispatch(msg)?.into_iter().next() {
            bail!(alert);
        }
    }

    loop {
        let view = controller.view();
        if done(&view) {
            return Ok(view);
        }
        match loop_rx.recv() {
            Ok(LoopEvent::Msg(msg)) => {
                controller.dispatch(msg)?;
            }
            Ok(LoopEvent::Input(_) | LoopEvent::InputClosed) => {}
            Err(_) => bail!("engine stopped before the command finished"),
        }
    }
}
