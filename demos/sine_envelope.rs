//! Print the LPC envelope of a synthetic sine frame as JSON.
//!
//! Usage: cargo run --example sine_envelope -- [freq_hz] [order]

use std::f64::consts::PI;

use vocalize::{analyze_frame, AnalysisConfig, BandTable};

fn main() -> vocalize::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let freq: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1000.0);
    let order: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(12);

    let sample_rate = 44100.0;
    let config = AnalysisConfig {
        order,
        overlay: true,
        ..Default::default()
    };
    let frame: Vec<f64> = (0..config.frame_size)
        .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
        .collect();

    let bands = BandTable::default().get("a")?.bands();
    let analysis = analyze_frame(&frame, sample_rate, &config, &bands)?;

    eprintln!(
        "order {}: residual error {:.6e}, {:?}, envelope peak {:.1} Hz",
        order,
        analysis.lpc().residual_error(),
        analysis.lpc().stability(),
        analysis.envelope().peak_frequency()
    );

    match analysis.render() {
        Some(spec) => println!("{}", spec.to_json()?),
        None => eprintln!("unstable frame, nothing to render"),
    }
    Ok(())
}
