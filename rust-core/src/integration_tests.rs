/// Integration tests for the complete tracking session
/// Tests walking scenarios end to end: sample streams in, path out, across
/// start/stop/reset transitions.

#[cfg(test)]
mod integration_tests {
    use crate::session::*;
    use crate::types::*;
    use approx::assert_abs_diff_eq;

    /// Route `log` output through env_logger; `RUST_LOG=trace` shows each sample.
    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const STILL: Vector3 = Vector3::new(0.0, 0.0, 0.0);
    const SPIKE: Vector3 = Vector3::new(2.0, 0.0, 0.0);
    const NORTH_X: Vector3 = Vector3::new(1.0, 0.0, 0.0);
    const NORTH_Y: Vector3 = Vector3::new(0.0, 1.0, 0.0);

    /// Helper: Alternate between resting and spiking readings so every
    /// sample after the first fires a step.
    fn walking_profile(num_samples: usize) -> Vec<Vector3> {
        (0..num_samples)
            .map(|i| if i % 2 == 0 { STILL } else { SPIKE })
            .collect()
    }

    /// Helper: Small jitter around gravity that never crosses the threshold.
    fn standing_profile(num_samples: usize) -> Vec<Vector3> {
        (0..num_samples)
            .map(|i| {
                let jitter = if i % 2 == 0 { 0.1 } else { -0.1 };
                Vector3::new(jitter, 0.05, 9.81 + jitter)
            })
            .collect()
    }

    /// Helper: Feed samples and count the position updates produced
    fn run_session_on_profile(session: &mut TrackingSession, samples: &[Vector3]) -> usize {
        samples
            .iter()
            .filter_map(|s| session.on_accelerometer_sample(*s))
            .count()
    }

    fn started_session() -> TrackingSession {
        let mut session = TrackingSession::default();
        session.start();
        session
    }

    // ========================================================================
    // DOCUMENTED SCENARIOS
    // ========================================================================

    #[test]
    fn scenario_single_step_east() {
        init_logger();
        let mut session = started_session();
        session.on_magnetometer_sample(NORTH_X);

        assert!(session.on_accelerometer_sample(STILL).is_none());
        assert!(session.on_accelerometer_sample(SPIKE).is_some());

        assert_eq!(session.path(), &[Point2::new(0.0, 0.0), Point2::new(0.7, 0.0)]);
        assert_eq!(session.position(), Point2::new(0.7, 0.0));
    }

    #[test]
    fn scenario_only_second_sample_steps() {
        init_logger();
        let mut session = started_session();
        let samples = [STILL, SPIKE, Vector3::new(2.5, 0.0, 0.0)];

        assert_eq!(run_session_on_profile(&mut session, &samples), 1);
        assert_eq!(session.path().len(), 2);
    }

    #[test]
    fn scenario_stop_preserves_state_until_restart() {
        init_logger();
        let mut session = started_session();
        session.on_accelerometer_sample(STILL);
        session.on_accelerometer_sample(SPIKE);
        assert_eq!(session.path().len(), 2);

        session.stop();
        for sample in walking_profile(10) {
            session.on_accelerometer_sample(sample);
        }
        assert_eq!(session.path().len(), 2);

        session.start();
        assert!(session.on_accelerometer_sample(STILL).is_some());
        assert_eq!(session.path().len(), 3);
    }

    // ========================================================================
    // PROPERTIES
    // ========================================================================

    #[test]
    fn reset_restores_origin_from_any_state() {
        init_logger();
        let mut idle = TrackingSession::default();
        idle.reset();
        assert_eq!(idle.position(), Point2::origin());
        assert_eq!(idle.path(), &[Point2::origin()]);

        let mut walked = started_session();
        walked.on_magnetometer_sample(NORTH_Y);
        run_session_on_profile(&mut walked, &walking_profile(15));
        walked.reset();
        assert_eq!(walked.position(), Point2::origin());
        assert_eq!(walked.path(), &[Point2::origin()]);
        assert!(!walked.is_tracking());

        walked.reset();
        assert_eq!(walked.path(), &[Point2::origin()]);
    }

    #[test]
    fn idle_session_never_grows_path() {
        init_logger();
        let mut session = TrackingSession::default();
        let mut profile = walking_profile(50);
        profile.extend(standing_profile(50));

        for sample in profile {
            assert!(session.on_accelerometer_sample(sample).is_none());
            assert_eq!(session.path().len(), 1);
        }
    }

    #[test]
    fn path_grows_exactly_once_per_step() {
        init_logger();
        let mut session = started_session();
        let mut profile = standing_profile(20);
        profile.extend(walking_profile(20));
        profile.extend(standing_profile(20));

        let mut expected_len = session.path().len();
        for sample in profile {
            let before = session.path().len();
            let stepped = session.on_accelerometer_sample(sample).is_some();
            if stepped {
                expected_len += 1;
            }
            assert_eq!(session.path().len(), expected_len);
            assert!(session.path().len() >= before);
            assert_eq!(session.path().last().copied(), Some(session.position()));
        }
        assert!(session.step_count() > 0);
    }

    #[test]
    fn threshold_boundary() {
        init_logger();
        let mut at = started_session();
        at.on_accelerometer_sample(STILL);
        assert!(at.on_accelerometer_sample(Vector3::new(1.2, 0.0, 0.0)).is_none());
        assert_eq!(at.path().len(), 1);

        let mut above = started_session();
        above.on_accelerometer_sample(STILL);
        assert!(above.on_accelerometer_sample(Vector3::new(1.2001, 0.0, 0.0)).is_some());
        assert_eq!(above.path().len(), 2);
    }

    #[test]
    fn heading_from_x_axis_is_exact() {
        init_logger();
        let mut session = started_session();
        session.on_magnetometer_sample(NORTH_X);
        session.on_accelerometer_sample(STILL);
        session.on_accelerometer_sample(SPIKE);
        let before = session.position();

        session.on_accelerometer_sample(STILL);
        let after = session.position();
        assert_eq!(after.x - before.x, 0.7);
        assert_eq!(after.y - before.y, 0.0);
    }

    #[test]
    fn heading_from_y_axis() {
        init_logger();
        let mut session = started_session();
        session.on_magnetometer_sample(NORTH_Y);
        session.on_accelerometer_sample(STILL);
        let update = session.on_accelerometer_sample(SPIKE).expect("step");

        assert_abs_diff_eq!(update.heading_rad, std::f32::consts::FRAC_PI_2);
        assert_abs_diff_eq!(update.displacement.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(update.displacement.y, 0.7, epsilon = 1e-6);
    }

    // ========================================================================
    // INTERLEAVING
    // ========================================================================

    #[test]
    fn heading_uses_latest_cached_magnetometer() {
        init_logger();
        let mut session = started_session();
        session.on_accelerometer_sample(STILL);

        session.on_magnetometer_sample(NORTH_Y);
        session.on_magnetometer_sample(NORTH_X);
        let update = session.on_accelerometer_sample(SPIKE).expect("step");
        assert_eq!(update.heading_rad, 0.0);

        session.on_magnetometer_sample(Vector3::new(-1.0, 0.0, 0.0));
        let update = session.on_accelerometer_sample(STILL).expect("step");
        assert_abs_diff_eq!(update.heading_rad, std::f32::consts::PI);
        assert_abs_diff_eq!(session.position().x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn square_walk_closes_loop() {
        init_logger();
        let mut session = started_session();
        let headings = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
        ];
        session.on_accelerometer_sample(STILL);

        let mut spike = true;
        for mag in headings {
            session.on_magnetometer_sample(mag);
            for _ in 0..3 {
                let sample = if spike { SPIKE } else { STILL };
                spike = !spike;
                assert!(session.on_accelerometer_sample(sample).is_some());
            }
        }

        assert_eq!(session.step_count(), 12);
        assert_eq!(session.path().len(), 13);
        assert_abs_diff_eq!(session.position().distance_from_origin(), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(session.total_distance_m(), 8.4, epsilon = 1e-4);
    }

    #[test]
    fn standing_still_produces_no_steps() {
        init_logger();
        let mut session = started_session();
        assert_eq!(run_session_on_profile(&mut session, &standing_profile(500)), 0);
        assert_eq!(session.path(), &[Point2::origin()]);
    }

    #[test]
    fn restart_after_reset_seeds_again() {
        init_logger();
        let mut session = started_session();
        session.on_accelerometer_sample(STILL);
        session.on_accelerometer_sample(SPIKE);

        session.reset();
        session.start();

        // First sample after reset only seeds the detector.
        assert!(session.on_accelerometer_sample(STILL).is_none());
        assert!(session.on_accelerometer_sample(SPIKE).is_some());
        assert_eq!(session.path().len(), 2);
    }
}
