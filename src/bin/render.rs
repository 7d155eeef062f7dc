//! Render a melody to a WAV file without an audio device
//!
//! Usage: render [--melody <id>] [--cycles <n>] [--sample-rate <hz>] <output.wav>

use anyhow::Context;
use clap::Parser;
use meowsic::pipeline::{render_melody, RenderOptions, SequencerConfig};
use meowsic::score::{lookup, melodies};
use meowsic::wav::write_wav_16bit;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "render")]
#[command(about = "Render a melody with the meow voice into a 16-bit mono WAV file")]
struct Cli {
    output: PathBuf,
    #[arg(short, long, default_value = "jingle-bells")]
    melody: String,
    /// Loop the melody this many times instead of playing it once
    #[arg(short, long)]
    cycles: Option<u32>,
    #[arg(short, long, default_value_t = 44100)]
    sample_rate: u32,
    /// Seconds kept after the last loop cycle
    #[arg(long, default_value_t = 0.5)]
    tail: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if lookup(&cli.melody).is_none() {
        let known: Vec<_> = melodies().map(|choice| choice.id).collect();
        anyhow::bail!("unknown melody {:?} (known: {})", cli.melody, known.join(", "));
    }
    anyhow::ensure!(cli.sample_rate >= 8000, "sample rate must be at least 8000 Hz");

    let options = RenderOptions {
        melody_id: cli.melody,
        cycles: cli.cycles,
        sample_rate: cli.sample_rate,
        tail: cli.tail,
    };
    let samples = render_melody(&options, SequencerConfig::default());

    let peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
    println!(
        "{}: {:.2}s, peak {:.3}",
        options.melody_id,
        samples.len() as f64 / options.sample_rate as f64,
        peak
    );

    write_wav_16bit(&cli.output, &samples, options.sample_rate)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    println!("Output: {}", cli.output.display());
    Ok(())
}
