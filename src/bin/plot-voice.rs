use anyhow::Context;
use clap::Parser;
use meowsic::generator::{FrameClock, GeneratorState, SignalGenerator};
use meowsic::pipeline::MeowVoice;
use meowsic::score::Note;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

const SAMPLE_RATE: u32 = 44100;
const FRAME_SIZE: usize = 128;

#[derive(Parser)]
#[command(name = "plot-voice")]
#[command(about = "Plot the waveform and amplitude envelope of one meow note as SVG")]
struct Cli {
    /// Note name, e.g. A4, Fs5 or F#5
    note: Note,
    output: PathBuf,
    /// Note length in seconds
    #[arg(short, long, default_value_t = 0.4)]
    duration: f64,
    /// Seed for the attack noise
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn render_voice(voice: &mut MeowVoice) -> Vec<f32> {
    let mut samples = Vec::new();
    let mut frame = [0.0f32; FRAME_SIZE];
    let mut clock = FrameClock::new(SAMPLE_RATE, 0);
    loop {
        let state = voice.process(&mut frame, clock);
        samples.extend_from_slice(&frame);
        clock = clock.advanced(FRAME_SIZE);
        if state == GeneratorState::Complete {
            return samples;
        }
    }
}

fn create_plot(cli: &Cli, voice: &MeowVoice, samples: &[f32]) -> anyhow::Result<()> {
    let root = SVGBackend::new(&cli.output, (1000, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_ms = samples.len() as f32 * 1000.0 / SAMPLE_RATE as f32;
    let title = format!(
        "meow {} ({:.1} Hz), {:.0} ms",
        cli.note,
        cli.note.frequency_hz(),
        cli.duration * 1000.0
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..max_ms, -1.1f32..1.1f32)?;

    chart
        .configure_mesh()
        .x_desc("Time (ms)")
        .y_desc("Amplitude")
        .x_labels(10)
        .y_labels(11)
        .draw()?;

    let time_ms = |i: usize| i as f32 * 1000.0 / SAMPLE_RATE as f32;

    chart
        .draw_series(LineSeries::new(
            samples.iter().enumerate().map(|(i, &s)| (time_ms(i), s)),
            BLUE.stroke_width(1),
        ))?
        .label("output")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(
            (0..samples.len()).step_by(32).map(|i| {
                let time = i as f64 / SAMPLE_RATE as f64;
                (time_ms(i), voice.envelope().value_at(time))
            }),
            RED.stroke_width(2),
        ))?
        .label("envelope")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    anyhow::ensure!(cli.duration > 0.0, "duration must be positive");

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut voice = MeowVoice::new(cli.note.frequency_hz(), 0.0, cli.duration, SAMPLE_RATE, &mut rng);

    let samples = render_voice(&mut voice);
    let peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
    println!(
        "{}: {} samples ({:.1} ms), peak {:.3}",
        cli.note,
        samples.len(),
        samples.len() as f32 * 1000.0 / SAMPLE_RATE as f32,
        peak
    );

    create_plot(&cli, &voice, &samples)
        .with_context(|| format!("failed to plot {}", cli.output.display()))?;
    println!("Output: {}", cli.output.display());
    Ok(())
}
