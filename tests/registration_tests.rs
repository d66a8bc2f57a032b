use raster_registration::{
    InterpolationMode, MetricKind, Raster, RegistrationOutcome, RegistrationParams, Registrator,
    SearchStrategy, TransformPipeline,
};

/// Asymmetric L-shaped blob with enough zero margin to survive small shifts.
fn l_shape(width: usize, height: usize) -> Raster {
    Raster::from_fn(width, height, |x, y| {
        let in_vertical = (8..10).contains(&x) && (8..16).contains(&y);
        let in_horizontal = (8..14).contains(&x) && (14..16).contains(&y);
        if in_vertical || in_horizontal {
            255
        } else {
            0
        }
    })
}

fn small_params(strategy: SearchStrategy) -> RegistrationParams {
    RegistrationParams {
        step_translation: 1.0,
        // On a 24x24 pattern, rotations of a few degrees round away to the
        // identity under nearest-neighbour resampling and tie with the true
        // optimum. 15 degree steps keep every nonzero rotation candidate
        // distinguishable, so the zero-rotation winner is unique.
        step_rotation: 15.0,
        search_radius: 4,
        runs: 1,
        scale_per_run: 0.9,
        strategy,
    }
}

#[test]
fn test_recovers_known_translation() {
    let reference = l_shape(24, 24);
    let moving = TransformPipeline::new()
        .translate(3.0, -2.0)
        .apply(&reference, InterpolationMode::NearestNeighbour)
        .unwrap();

    let metric = MetricKind::Sse.create(&reference, &moving).unwrap();
    let registrator = Registrator::new(small_params(SearchStrategy::PerPoint)).unwrap();
    let outcome = registrator
        .register(&reference, &moving, metric.as_ref())
        .unwrap();

    let result = outcome.improved().expect("shifted pair must improve");
    assert_eq!(result.translation, (-3.0, 2.0));
    assert_eq!(result.rotation_degrees, 0.0);
    assert_eq!(result.score, 0.0);
    assert!(result.initial_score > 0.0);
    assert_eq!(result.metric, "SSE");

    // Replaying the reported pipeline reproduces the winning candidate.
    let aligned = result
        .pipeline
        .apply(&moving, InterpolationMode::NearestNeighbour)
        .unwrap();
    assert_eq!(aligned, reference);
}

#[test]
fn test_already_aligned_pair_reports_no_improvement() {
    let reference = l_shape(24, 24);

    let metric = MetricKind::Sse.create(&reference, &reference).unwrap();
    let registrator = Registrator::new(small_params(SearchStrategy::PerPoint)).unwrap();
    let outcome = registrator
        .register(&reference, &reference, metric.as_ref())
        .unwrap();

    match outcome {
        RegistrationOutcome::NoImprovement { initial_score } => {
            assert_eq!(initial_score, 0.0);
        }
        RegistrationOutcome::Improved(result) => {
            panic!("nothing beats a perfect initial score, got {:?}", result);
        }
    }
}

#[test]
fn test_strategies_find_the_same_optimum() {
    let reference = l_shape(24, 24);
    let moving = TransformPipeline::new()
        .translate(-2.0, 1.0)
        .apply(&reference, InterpolationMode::NearestNeighbour)
        .unwrap();
    let metric = MetricKind::Sse.create(&reference, &moving).unwrap();

    let per_point = Registrator::new(small_params(SearchStrategy::PerPoint))
        .unwrap()
        .register(&reference, &moving, metric.as_ref())
        .unwrap();
    let batched = Registrator::new(small_params(SearchStrategy::BatchedRun))
        .unwrap()
        .register(&reference, &moving, metric.as_ref())
        .unwrap();

    let per_point = per_point.improved().expect("per-point must improve");
    let batched = batched.improved().expect("batched must improve");
    assert_eq!(per_point.translation, batched.translation);
    assert_eq!(per_point.rotation_degrees, batched.rotation_degrees);
    assert_eq!(per_point.score, batched.score);
}

#[test]
fn test_mutual_information_search_recovers_translation() {
    let reference = l_shape(24, 24);
    let moving = TransformPipeline::new()
        .translate(2.0, 2.0)
        .apply(&reference, InterpolationMode::NearestNeighbour)
        .unwrap();

    let metric = MetricKind::MutualInformation
        .create(&reference, &moving)
        .unwrap();
    let registrator = Registrator::new(small_params(SearchStrategy::BatchedRun)).unwrap();
    let outcome = registrator
        .register(&reference, &moving, metric.as_ref())
        .unwrap();

    let result = outcome.improved().expect("shifted pair must improve");
    assert_eq!(result.translation, (-2.0, -2.0));
    assert_eq!(result.rotation_degrees, 0.0);
}

#[test]
fn test_rejects_mismatched_image_sizes() {
    let reference = l_shape(24, 24);
    let moving = l_shape(24, 20);
    let metric = MetricKind::Sse.create(&reference, &reference).unwrap();
    let registrator = Registrator::new(small_params(SearchStrategy::PerPoint)).unwrap();

    assert!(registrator
        .register(&reference, &moving, metric.as_ref())
        .is_err());
}

#[test]
fn test_invalid_params_fail_construction() {
    let bad = [
        RegistrationParams {
            runs: 0,
            ..RegistrationParams::default()
        },
        RegistrationParams {
            search_radius: 0,
            ..RegistrationParams::default()
        },
        RegistrationParams {
            search_radius: -3,
            ..RegistrationParams::default()
        },
        RegistrationParams {
            step_translation: 0.0,
            ..RegistrationParams::default()
        },
        RegistrationParams {
            step_rotation: -1.0,
            ..RegistrationParams::default()
        },
        RegistrationParams {
            scale_per_run: 1.0,
            ..RegistrationParams::default()
        },
        RegistrationParams {
            scale_per_run: 0.0,
            ..RegistrationParams::default()
        },
    ];

    for params in bad {
        assert!(Registrator::new(params).is_err());
    }
}

#[test]
fn test_outcome_serializes_with_tag() {
    let reference = l_shape(24, 24);
    let metric = MetricKind::Sse.create(&reference, &reference).unwrap();
    let registrator = Registrator::new(small_params(SearchStrategy::PerPoint)).unwrap();
    let outcome = registrator
        .register(&reference, &reference, metric.as_ref())
        .unwrap();

    let json = serde_json::to_string(&outcome).unwrap();
    assert!(json.contains("\"outcome\":\"no-improvement\""));
    assert!(json.contains("initial_score"));
}
