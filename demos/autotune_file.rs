//! Example: Pitch-correct a single audio file
//!
//! Usage: `cargo run --example autotune_file -- <input> <output.wav> [scale]`
//!
//! The scale defaults to "C minor"; any "<tonic> <pattern>" accepted by
//! `ScaleDefinition` works, e.g. "F# major" or "A minor_pentatonic".

use stratum_autotune::io::{decoder::load_mono, encoder::write_wav};
use stratum_autotune::{autotune, AutotuneConfig, ScaleDefinition};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (input_path, output_path) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (input, output),
        _ => {
            eprintln!("Usage: autotune_file <input> <output.wav> [scale]");
            std::process::exit(2);
        }
    };
    let scale: ScaleDefinition = match args.next() {
        Some(s) => s.parse()?,
        None => ScaleDefinition::default(),
    };

    let input = load_mono(&input_path)?;
    let config = AutotuneConfig {
        normalize_overlap: true,
        ..AutotuneConfig::with_scale(scale)
    };

    let result = autotune(&input, &config)?;
    write_wav(&output_path, &result.output)?;

    let confidence = result.confidence();
    println!("Pitch Correction Results:");
    println!("  Scale: {}", result.metadata.scale);
    println!(
        "  Duration: {:.2} s at {} Hz",
        result.metadata.duration_seconds, result.metadata.sample_rate
    );
    println!(
        "  Voiced frames: {}/{} ({:.0}%)",
        result.metadata.voiced_frames,
        result.metadata.n_frames,
        confidence.voiced_ratio * 100.0
    );
    println!("  Pitch marks: {}", result.metadata.pitch_marks);
    println!(
        "  Mean correction: {:.1} cents (max {:.1})",
        confidence.mean_correction_cents, confidence.max_correction_cents
    );
    println!("  Confidence: {:.2}", confidence.overall_confidence);
    for warning in &result.metadata.warnings {
        println!("  Warning: {}", warning);
    }
    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);

    Ok(())
}
