//! End-to-end analysis scenarios on synthetic frames.

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use vocalize::{
    analyze_frame, apply_window, autocorrelate, evaluate, lpc, solve, AnalysisConfig, Analyzer,
    Autocorrelation, BandTable, Error, RenderOptions, Scale, Stability,
};

fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
        .collect()
}

fn envelope_peak(order: usize) -> (f64, f64) {
    let windowed = apply_window(&sine(1000.0, 44100.0, 2048)).unwrap();
    let result = lpc(&windowed, order).unwrap();
    assert!(result.is_stable(), "order {} should be stable", order);
    let curve = evaluate(result.coefficients(), 44100.0, 5000.0, 500, Scale::Decibel).unwrap();
    (curve.peak_frequency(), curve.bin_width())
}

#[test]
fn silent_frame_gives_zero_coefficients() {
    let windowed = apply_window(&[0.0; 2048]).unwrap();
    let result = lpc(&windowed, 20).unwrap();
    assert_eq!(result.coefficients(), &[0.0; 21][..]);
    assert_eq!(result.residual_error(), 0.0);
    assert_eq!(result.stability(), Stability::Silent);
}

#[test]
fn sine_peak_order_2() {
    let (peak, bin_width) = envelope_peak(2);
    assert_eq!(bin_width, 10.0);
    assert!((peak - 1000.0).abs() <= bin_width, "peak at {} Hz", peak);
}

#[test]
fn sine_peak_order_12() {
    let (peak, _) = envelope_peak(12);
    assert!((peak - 1000.0).abs() <= 50.0, "peak at {} Hz", peak);
}

#[test]
fn low_sample_rate_sine() {
    let windowed = apply_window(&sine(440.0, 16000.0, 512)).unwrap();
    let result = lpc(&windowed, 12).unwrap();
    let curve = evaluate(result.coefficients(), 16000.0, 4000.0, 400, Scale::Decibel).unwrap();
    assert!((curve.peak_frequency() - 440.0).abs() <= curve.bin_width());
}

#[test]
fn invalid_orders_are_rejected() {
    let frame = apply_window(&sine(1000.0, 44100.0, 64)).unwrap();
    for order in [0, 64, 100] {
        assert!(matches!(
            lpc(&frame, order),
            Err(Error::InvalidOrder { frame_len: 64, .. })
        ));
    }

    let config = AnalysisConfig {
        frame_size: 64,
        order: 64,
        ..Default::default()
    };
    assert!(matches!(
        Analyzer::new(config),
        Err(Error::InvalidOrder { .. })
    ));
}

#[test]
fn repeated_analysis_is_bit_identical() {
    let frame = sine(1000.0, 44100.0, 2048);
    let run = || {
        let windowed = apply_window(&frame).unwrap();
        let r = autocorrelate(&windowed, 20).unwrap();
        solve(&r, 20).unwrap()
    };
    assert_eq!(run(), run());

    let mut analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let first = analyzer.analyze(&frame, 44100.0, &[]).unwrap();
    let _other = analyzer.analyze(&sine(300.0, 44100.0, 2048), 44100.0, &[]).unwrap();
    let again = analyzer.analyze(&frame, 44100.0, &[]).unwrap();
    assert_eq!(first.lpc(), again.lpc());
    assert_eq!(first.lpc(), &run());
    assert_eq!(first.render(), again.render());
}

#[test]
fn two_resonances_are_both_peaks() {
    // Poles at 1000 and 3000 Hz with radius 0.95 at fs = 8000:
    // (1 - 2r cos θ₁ z⁻¹ + r² z⁻²)(1 - 2r cos θ₂ z⁻¹ + r² z⁻²) = 1 + r⁴ z⁻⁴
    let a = [1.0, 0.0, 0.0, 0.0, 0.95f64.powi(4)];
    let curve = evaluate(&a, 8000.0, 4000.0, 400, Scale::Decibel).unwrap();
    let peaks: Vec<f64> = curve
        .local_peaks()
        .into_iter()
        .map(|i| curve.frequency(i))
        .collect();
    assert_eq!(peaks.len(), 2);
    assert_abs_diff_eq!(peaks[0], 1000.0, epsilon = 1e-9);
    assert_abs_diff_eq!(peaks[1], 3000.0, epsilon = 1e-9);
}

#[test]
fn non_positive_definite_lags_are_unstable() {
    let r = Autocorrelation::from_lags(vec![1.0, 2.0, 0.5]);
    let result = solve(&r, 2).unwrap();
    assert!(matches!(
        result.stability(),
        Stability::Unstable { step: 1, .. }
    ));
    assert_eq!(result.coefficients().len(), 3);
}

#[test]
fn unstable_frame_is_not_rendered() {
    let config = AnalysisConfig {
        order: 12,
        frame_size: 512,
        num_points: 200,
        ..Default::default()
    };
    let mut frame = sine(1000.0, 16000.0, 512);
    frame[5] = f64::NAN;

    let analysis = analyze_frame(&frame, 16000.0, &config, &[]).unwrap();
    assert!(matches!(
        analysis.lpc().stability(),
        Stability::Unstable { step: 1, .. }
    ));
    assert!(analysis.render().is_none());
    assert_eq!(analysis.lpc().coefficients().len(), 13);
    assert_eq!(analysis.envelope().non_finite_bins(), 200);
    assert!(analysis.envelope().values().iter().all(|&v| v == 0.0));
}

#[test]
fn linear_scale_render_is_normalized() {
    let config = AnalysisConfig {
        order: 12,
        frame_size: 1024,
        num_points: 256,
        max_freq: 0.0,
        scale: Scale::Linear,
        ..Default::default()
    };
    let mut analyzer = Analyzer::new(config).unwrap();
    let analysis = analyzer
        .analyze(&sine(2000.0, 16000.0, 1024), 16000.0, &[])
        .unwrap();

    assert_eq!(analysis.envelope().max_freq(), 8000.0);
    let spec = analysis.render().unwrap();
    let top = spec.points.iter().map(|p| p.y).fold(f64::MIN, f64::max);
    assert_abs_diff_eq!(top, 1.0, epsilon = 1e-12);
    assert!(spec.points.iter().all(|p| (0.0..=1.0).contains(&p.y)));
}

#[test]
fn default_band_table_highlights_first_formants() {
    let table = BandTable::default();
    let bands = table.get("a").unwrap().bands();
    let curve = evaluate(&[1.0, -0.9], 44100.0, 5000.0, 500, Scale::Decibel).unwrap();
    let spec = vocalize::to_renderable(&curve, &bands, &RenderOptions::default());

    assert_eq!(spec.regions.len(), 2);
    assert_abs_diff_eq!(spec.regions[0].x_start, 638.0 / 5000.0);
    assert_abs_diff_eq!(spec.regions[1].x_end, 1353.0 / 5000.0);
    assert!(matches!(table.get("u"), Err(Error::UnknownCategory(_))));
}
