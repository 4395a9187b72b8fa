mod cli;
mod telemetry;

use std::{
    io::{self, BufRead},
    path::Path,
    process::ExitCode,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use cli::{AppConfig, CliArgs, Command, HELP};
use qrlive::{
    Artifact, Outcome, Pipeline, PipelineError, QRResult, QrGenerator, Request, RequestBuilder,
    Ticket,
};

/// Everything the main thread reacts to. Outcomes are marshalled here from the
/// worker thread so that all printing happens in one place.
enum Event {
    Input(String),
    Eof,
    Generated(Ticket, Outcome),
}

fn main() -> anyhow::Result<ExitCode> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    telemetry::init_tracing()?;
    tracing::debug!(?config, "Starting qrlive");

    let (tx, rx) = mpsc::channel();
    let sink = {
        let tx = tx.clone();
        move |ticket: Ticket, outcome: Outcome| {
            let _ = tx.send(Event::Generated(ticket, outcome));
        }
    };
    let pipeline = Pipeline::spawn(QrGenerator, sink, config.pipeline.clone())?;
    let initial = pipeline.submit(config.request.clone())?;

    if config.once {
        drop(tx);
        return run_once(pipeline, &rx, initial, config.output.as_deref());
    }

    spawn_stdin_reader(tx)?;
    println!("{HELP}\n");
    run_interactive(pipeline, &rx, config.request)
}

fn run_once(
    pipeline: Pipeline,
    rx: &Receiver<Event>,
    initial: Ticket,
    output: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let outcome = loop {
        match rx.recv() {
            Ok(Event::Generated(ticket, outcome)) if ticket == initial => break outcome,
            Ok(_) => continue,
            // Every sender is gone, so the worker died before delivering
            Err(_) => {
                pipeline.shutdown()?;
                anyhow::bail!("Generation worker stopped without a result");
            }
        }
    };
    pipeline.shutdown()?;

    match outcome {
        Outcome::Success(artifact) => {
            show_artifact(&artifact);
            if let Some(path) = output {
                artifact.save(path).with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Saved {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failure { message } => {
            eprintln!("Error: {message}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_interactive(
    pipeline: Pipeline,
    rx: &Receiver<Event>,
    initial: Request,
) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(&initial);
    let mut refused = None;

    loop {
        let event = match rx.recv_timeout(Duration::from_millis(250)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) if pipeline.is_running() => continue,
            Err(_) => break,
        };

        match event {
            Event::Generated(ticket, outcome) => {
                tracing::debug!(%ticket, success = outcome.is_success(), "Outcome received");
                println!("{}", session.record(outcome));
            }
            Event::Input(line) => {
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Save(path) => println!("{}", session.save(&path)),
                    edit => match session.edit(edit) {
                        Ok(request) => {
                            if let Err(err) = pipeline.submit(request) {
                                refused = Some(err);
                                break;
                            }
                        }
                        Err(err) => println!("Error: {err}"),
                    },
                }
            }
            Event::Eof => break,
        }
    }

    finish(pipeline, refused)
}

/// Joins the worker. A worker panic wins over the refused submission that
/// revealed it.
fn finish(pipeline: Pipeline, refused: Option<PipelineError>) -> anyhow::Result<ExitCode> {
    pipeline.shutdown()?;
    match refused {
        Some(err) => Err(err).context("Generation worker stopped"),
        None => Ok(ExitCode::SUCCESS),
    }
}

// Session
//------------------------------------------------------------------------------

/// Interactive state: the request being edited and the last image that can be
/// saved. Save is only enabled while the last delivered outcome was a success.
struct Session {
    builder: RequestBuilder,
    last: Option<Artifact>,
}

impl Session {
    fn new(initial: &Request) -> Self {
        Self { builder: initial.to_builder(), last: None }
    }

    /// Stores `outcome` and returns the text to print for it.
    fn record(&mut self, outcome: Outcome) -> String {
        match outcome {
            Outcome::Success(artifact) => {
                let shown = describe(&artifact);
                self.last = Some(artifact);
                shown
            }
            Outcome::Failure { message } => {
                self.last = None;
                format!("Error: {message}")
            }
        }
    }

    fn save(&self, path: &Path) -> String {
        let Some(artifact) = &self.last else {
            return "Nothing to save, the last generation failed".to_string();
        };
        match artifact.save(path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(err) => format!("Error: {err}"),
        }
    }

    /// Applies an option or text change and builds the request to submit.
    fn edit(&mut self, command: Command) -> QRResult<Request> {
        match command {
            Command::Text(text) => self.builder.text(text),
            Command::EcLevel(Some(ecl)) => self.builder.ec_level(ecl),
            Command::EcLevel(None) => self.builder.unset_ec_level(),
            Command::Version(Some(v)) => self.builder.version(v),
            Command::Version(None) => self.builder.unset_version(),
            Command::Mode(Some(mode)) => self.builder.mode(mode),
            Command::Mode(None) => self.builder.unset_mode(),
            Command::Scale(scale) => self.builder.scale(scale),
            Command::Save(_) | Command::Help | Command::Quit => &mut self.builder,
        };
        self.builder.build()
    }
}

fn describe(artifact: &Artifact) -> String {
    let (w, h) = artifact.dimensions();
    format!("{}{} {w}x{h}px", artifact.to_terminal(), artifact.symbol())
}

fn show_artifact(artifact: &Artifact) {
    println!("{}", describe(artifact));
}

fn spawn_stdin_reader(tx: Sender<Event>) -> io::Result<()> {
    thread::Builder::new().name("stdin".to_string()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(Event::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Event::Eof);
    })?;
    Ok(())
}
