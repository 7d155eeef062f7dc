//! Interactive terminal player
//!
//! Commands (one per line on stdin):
//!   t        toggle playback
//!   l        toggle looping
//!   m <id>   select a melody
//!   ls       list melodies
//!   q        quit

use anyhow::Context;
use clap::Parser;
use meowsic::engine::{AudioBackend, CpalBackend, DeviceConfig};
use meowsic::pipeline::{MusicController, PlaybackState, SequencerConfig};
use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "meowsic")]
#[command(about = "Plays festive melodies with a meowing synth voice")]
struct Cli {
    /// Melody to start with (see `ls`)
    #[arg(short, long, default_value = "jingle-bells")]
    melody: String,
    /// Loop the melody instead of playing it once
    #[arg(short, long = "loop")]
    looping: bool,
    /// Start with playback switched off
    #[arg(long)]
    off: bool,
    /// Target output latency in seconds
    #[arg(long, default_value_t = 0.02)]
    latency: f32,
}

enum Command {
    Toggle,
    Loop,
    Melody(String),
    List,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some("t"), None) => Ok(Command::Toggle),
        (Some("l"), None) => Ok(Command::Loop),
        (Some("m"), Some(id)) => Ok(Command::Melody(id.to_string())),
        (Some("ls"), None) => Ok(Command::List),
        (Some("q"), None) => Ok(Command::Quit),
        _ => Err(format!("unknown command: {:?}", line.trim())),
    }
}

fn spawn_reader(tx: mpsc::Sender<Command>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => {
                        if tx.send(command).is_err() {
                            return;
                        }
                    }
                    Err(message) => eprintln!("{} (t, l, m <id>, ls, q)", message),
                }
            }
            let _ = tx.send(Command::Quit);
        })
        .context("failed to spawn stdin reader")?;
    Ok(())
}

fn print_status<B: AudioBackend>(controller: &MusicController<B>) {
    println!(
        "[{}] {}{} ({:?})",
        if controller.enabled() { "on" } else { "off" },
        controller.melody_id(),
        if controller.looping() { ", looping" } else { "" },
        controller.state()
    );
}

fn print_melodies<B: AudioBackend>(controller: &MusicController<B>) {
    for choice in controller.melodies() {
        let marker = if choice.id == controller.melody_id() { '*' } else { ' ' };
        println!("{} {:<18} {}", marker, choice.id, choice.label);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let backend = CpalBackend::new(DeviceConfig {
        target_latency_s: cli.latency,
    });
    let mut controller = MusicController::with_config(backend, SequencerConfig::default());
    if !controller.supported() {
        eprintln!("No audio output device found; playback controls are inactive.");
    }

    controller.set_melody_id(&cli.melody);
    controller.set_loop(cli.looping);
    controller.set_enabled(!cli.off);
    print_status(&controller);

    let (tx, rx) = mpsc::channel();
    spawn_reader(tx)?;

    let mut next_tick = Instant::now();
    let mut last_state = controller.state();
    loop {
        match rx.recv_timeout(next_tick.saturating_duration_since(Instant::now())) {
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(Command::Toggle) => {
                controller.toggle();
                print_status(&controller);
            }
            Ok(Command::Loop) => {
                controller.set_loop(!controller.looping());
                print_status(&controller);
            }
            Ok(Command::Melody(id)) => {
                controller.set_melody_id(&id);
                print_status(&controller);
            }
            Ok(Command::List) => print_melodies(&controller),
            Err(RecvTimeoutError::Timeout) => {
                let state = controller.tick();
                if state != last_state && state == PlaybackState::Idle {
                    print_status(&controller);
                }
                next_tick += controller.tick_interval();
            }
        }
        last_state = controller.state();
    }

    controller.set_enabled(false);
    Ok(())
}
