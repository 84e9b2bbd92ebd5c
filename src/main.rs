//! Headless runner: steps the layout engine through a scenario and prints the
//! resulting panel transforms as JSON

mod cli;
mod scenario;

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use wand_layout::commands::Cmd;
use wand_layout::config::LayoutConfig;
use wand_layout::layout_store::{load_records, FileStorage, LayoutStorage};
use wand_layout::{update, FrameOutput, LayoutEngine};

use cli::{CliArgs, OutputMode, Persistence};
use scenario::Scenario;

/// Commands emitted on one frame
#[derive(Debug, Serialize)]
struct FrameCommands {
    frame: u32,
    commands: Vec<Cmd>,
}

#[derive(Debug, Serialize)]
struct Report {
    frames: u32,
    origin: f32,
    advanced: bool,
    customized: bool,
    commands: Vec<FrameCommands>,
    last: FrameOutput,
}

#[derive(Debug, Serialize)]
struct FrameLine<'a> {
    frame: u32,
    output: &'a FrameOutput,
}

fn main() -> Result<()> {
    wand_layout::tracing::init();

    let run = CliArgs::parse()
        .into_config()
        .map_err(anyhow::Error::msg)?;

    let config = match &run.config {
        Some(path) => LayoutConfig::load_from(path),
        None => LayoutConfig::load(),
    };

    let mut storage = match run.persistence {
        Persistence::Disabled => None,
        Persistence::File(Some(path)) => Some(FileStorage::new(path)),
        Persistence::File(None) => FileStorage::default_location(),
    };
    let records = storage
        .as_ref()
        .map(|s| load_records(s))
        .unwrap_or_default();

    let mut engine = LayoutEngine::with_records(config, run.advanced, &records);

    let scenario = match &run.scenario {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing scenario {}", path.display()))?
        }
        None => Scenario::demo(&engine),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut input = scenario.input;
    let mut emitted = Vec::new();
    let mut last = FrameOutput::default();

    for frame in 0..scenario.frames {
        let mut commands = Vec::new();
        for step in scenario.steps.iter().filter(|s| s.frame == frame) {
            if let Some(next) = step.input {
                input = next;
            }
            for msg in &step.messages {
                if let Some(cmd) = update(&mut engine, msg.clone()) {
                    commands.extend(cmd.flatten());
                }
            }
        }

        let output = engine.tick(scenario.dt, &input);
        commands.extend(output.commands.iter().cloned());
        perform(&commands, storage.as_mut())?;

        if run.output == OutputMode::Frames {
            serde_json::to_writer(&mut out, &FrameLine {
                frame,
                output: &output,
            })?;
            writeln!(out)?;
        }
        if !commands.is_empty() {
            emitted.push(FrameCommands { frame, commands });
        }
        last = output;
    }

    if let OutputMode::Report { pretty } = run.output {
        let report = Report {
            frames: scenario.frames,
            origin: engine.rotation.origin(),
            advanced: engine.advanced,
            customized: engine.customized,
            commands: emitted,
            last,
        };
        if pretty {
            serde_json::to_writer_pretty(&mut out, &report)?;
        } else {
            serde_json::to_writer(&mut out, &report)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

/// Carry out the commands the runner can act on
///
/// Haptics and audio have no device here; they only show up in the output.
fn perform(commands: &[Cmd], storage: Option<&mut FileStorage>) -> Result<()> {
    let Some(storage) = storage else {
        return Ok(());
    };
    for cmd in commands {
        match cmd {
            Cmd::SaveLayout(records) => storage
                .save(records)
                .with_context(|| format!("saving layout to {}", storage.path().display()))?,
            Cmd::ClearLayout => storage
                .clear()
                .with_context(|| format!("clearing layout at {}", storage.path().display()))?,
            _ => {}
        }
    }
    Ok(())
}
