use gazemap::{CalibrationSession, FitConfig, GazePredictor, PredictorConfig};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Nine fixation targets along a diagonal sweep.
    let targets = [
        ([10.0, 5.0], [100.0, 200.0]),
        ([20.0, 10.0], [300.0, 400.0]),
        ([30.0, 15.0], [500.0, 600.0]),
        ([40.0, 20.0], [700.0, 800.0]),
        ([50.0, 25.0], [900.0, 1000.0]),
        ([60.0, 30.0], [1100.0, 1200.0]),
        ([70.0, 35.0], [1300.0, 1400.0]),
        ([80.0, 40.0], [1500.0, 1600.0]),
        ([90.0, 45.0], [1700.0, 1800.0]),
    ];

    let mut session = CalibrationSession::new(FitConfig::default());
    for (delta, screen) in targets {
        session.add_point(delta, screen);
    }

    let (model, report) = session.fit_with_report()?;
    println!(
        "Fitted {} points: rms residual x={:.3} y={:.3}",
        report.n_samples, report.residuals_x.rms, report.residuals_y.rms
    );

    let mut predictor = GazePredictor::new(model, PredictorConfig::default())?;
    let [x, y] = predictor.predict(25.0, 12.0)?;
    println!("Gaze point for (25, 12): ({x:.2}, {y:.2})");

    for _ in 0..5 {
        let [x, y] = predictor.predict(60.0, 30.0)?;
        println!("  smoothing toward (60, 30): ({x:.2}, {y:.2})");
    }
    Ok(())
}
