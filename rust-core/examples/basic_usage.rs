/// Basic usage example: Push sensor readings, get a walked path
use trace_pdr::{ManualSource, SensorTracker, SessionConfig, SessionSnapshot, Vector3};

fn main() -> trace_pdr::Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    println!("=== Trace PDR: Basic Example ===\n");

    // The host's sensor bridge pushes readings into this source
    let source = ManualSource::new();
    let mut tracker = SensorTracker::new(source.clone(), SessionConfig::default());

    // Simulated stream: (magnetometer reading, accelerometer readings)
    let legs: Vec<(Vector3, Vec<[f32; 3]>)> = vec![
        // Walking along +x (field points along +x)
        (
            Vector3::new(30.0, 0.0, -40.0),
            vec![[0.1, 0.2, 9.81], [0.2, 0.1, 11.4], [0.1, 0.2, 9.80], [0.3, 0.1, 11.5]],
        ),
        // Turn left: field now along +y
        (
            Vector3::new(0.0, 30.0, -40.0),
            vec![[0.1, 0.2, 9.79], [0.2, 0.2, 11.3], [0.1, 0.1, 9.81]],
        ),
    ];

    tracker.start()?;
    for (mag, accels) in &legs {
        source.push_magnetometer(*mag);
        for accel in accels {
            source.push_accelerometer((*accel).into());
        }
    }

    // Stopped: readings no longer reach the session
    tracker.stop();
    let delivered = source.push_accelerometer(Vector3::new(0.0, 0.0, 20.0));
    println!("Readings delivered while stopped: {}", delivered);

    print_snapshot(&tracker.snapshot());
    println!("\nSnapshot JSON: {}", tracker.snapshot().to_json()?);

    tracker.reset();
    println!("\nAfter reset: {} point(s)", tracker.snapshot().path.len());

    Ok(())
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!("\n--- Path ---");
    for (i, p) in snapshot.path.iter().enumerate() {
        let marker = if i == 0 {
            "start"
        } else if i == snapshot.path.len() - 1 {
            "current"
        } else {
            ""
        };
        println!("[{i}] ({:.2}, {:.2}) {}", p.x, p.y, marker);
    }
    println!("Steps: {}", snapshot.step_count);
    println!("Distance: {:.2}m", snapshot.total_distance_m);
}
