//! Analyze a WAV recording frame by frame and print formant-band hits.
//!
//! Usage: cargo run --example analyze_wav -- <file.wav> [category] [config.json]
//!
//! Set RUST_LOG=debug to see the solver output of every frame.

use std::time::Instant;

use vocalize::{AnalysisConfig, BandTable, FormantBand, Sound};

fn main() -> vocalize::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: analyze_wav <file.wav> [category] [config.json]");
        std::process::exit(2);
    };
    let category = args.next().unwrap_or_else(|| "a".to_string());
    let config = match args.next() {
        Some(config_path) => AnalysisConfig::from_file(config_path)?,
        None => AnalysisConfig::default(),
    };

    println!("Loading: {}", path);
    let sound = match Sound::from_file(&path) {
        Ok(s) => s,
        Err(vocalize::Error::NotMono(ch)) => {
            println!("{} channels, using channel 0", ch);
            Sound::from_file_channel(&path, 0)?
        }
        Err(e) => return Err(e),
    };
    println!("{}", sound);

    let targets = *BandTable::default().get(&category)?;
    let bands = targets.bands();

    let start = Instant::now();
    let envelopes = sound.to_envelopes(&config, &bands)?;
    let elapsed = start.elapsed();
    println!(
        "{} frames in {:.2?} ({:.2?} per frame, budget {:.1} ms)",
        envelopes.len(),
        elapsed,
        elapsed / envelopes.len().max(1) as u32,
        config.frame_duration(sound.sample_rate()) * 1000.0
    );

    println!("{:>8}  {:>10}  {:>10}  {:>10}  status", "time", "peak", "F1", "F2");
    for (t, analysis) in &envelopes {
        let envelope = analysis.envelope();
        let hit = |band: &FormantBand| {
            envelope
                .peak_in_band(band)
                .map(|f| format!("{:.0}", f))
                .unwrap_or_else(|| "-".to_string())
        };
        let status = if analysis.lpc().is_silent() {
            "silent"
        } else if analysis.render().is_none() {
            "unstable"
        } else {
            "ok"
        };
        println!(
            "{:>8.3}  {:>10.1}  {:>10}  {:>10}  {}",
            t,
            envelope.peak_frequency(),
            hit(&targets.f1),
            hit(&targets.f2),
            status
        );
    }

    Ok(())
}
