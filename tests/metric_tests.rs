use raster_registration::{
    InterpolationMode, MetricKind, Raster, RegistrationError, TransformPipeline,
};

/// Binary blob used by the SSE and chamfer tests.
fn blob(width: usize, height: usize) -> Raster {
    Raster::from_fn(width, height, |x, y| {
        if (6..10).contains(&x) && (6..12).contains(&y) {
            255
        } else {
            0
        }
    })
}

/// Left half 0, right half 255: a one-bit intensity distribution.
fn half_and_half() -> Raster {
    Raster::from_fn(8, 8, |x, _| if x < 4 { 0 } else { 255 })
}

#[test]
fn test_sse_perfect_match_scores_zero() {
    let reference = blob(16, 16);
    let metric = MetricKind::Sse.create(&reference, &reference).unwrap();

    assert_eq!(metric.score(&reference, &reference).unwrap(), 0.0);
}

#[test]
fn test_sse_sums_squared_differences() {
    let reference = Raster::from_rows(&[vec![10, 20]]).unwrap();
    let candidate = Raster::from_rows(&[vec![13, 16]]).unwrap();
    let metric = MetricKind::Sse.create(&reference, &candidate).unwrap();

    // 3^2 + 4^2
    assert_eq!(metric.score(&reference, &candidate).unwrap(), 25.0);
}

#[test]
fn test_sse_prefers_lower_scores() {
    let reference = blob(16, 16);
    let metric = MetricKind::Sse.create(&reference, &reference).unwrap();

    assert!(metric.better_than(1.0, 2.0));
    assert!(!metric.better_than(2.0, 1.0));
    assert!(!metric.better_than(1.0, 1.0));
}

#[test]
fn test_sse_rejects_mismatched_sizes() {
    let reference = blob(16, 16);
    let candidate = blob(16, 12);
    let metric = MetricKind::Sse.create(&reference, &reference).unwrap();

    let result = metric.score(&reference, &candidate);
    assert!(matches!(
        result,
        Err(RegistrationError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_mutual_information_of_identical_rasters_is_marginal_entropy() {
    let reference = half_and_half();
    let metric = MetricKind::MutualInformation
        .create(&reference, &reference)
        .unwrap();

    // Two equally likely intensities carry exactly one bit.
    let score = metric.score(&reference, &reference).unwrap();
    assert!((score - 1.0).abs() < 1e-9);
}

#[test]
fn test_mutual_information_drops_for_decorrelated_candidate() {
    let reference = half_and_half();
    // Constant candidate shares no information with the reference.
    let constant = Raster::from_fn(8, 8, |_, _| 255);
    let metric = MetricKind::MutualInformation
        .create(&reference, &constant)
        .unwrap();

    let aligned = metric.score(&reference, &reference).unwrap();
    let decorrelated = metric.score(&reference, &constant).unwrap();
    assert!(decorrelated.abs() < 1e-9);
    assert!(metric.better_than(aligned, decorrelated));
}

#[test]
fn test_mutual_information_prefers_higher_scores() {
    let reference = half_and_half();
    let metric = MetricKind::MutualInformation
        .create(&reference, &reference)
        .unwrap();

    assert!(metric.better_than(2.0, 1.0));
    assert!(!metric.better_than(1.0, 2.0));
}

#[test]
fn test_chamfer_prefers_the_aligned_candidate() {
    let reference = blob(16, 16);
    let metric = MetricKind::ChamferMatching
        .create(&reference, &reference)
        .unwrap();

    let shifted = TransformPipeline::new()
        .translate(1.0, 0.0)
        .apply(&reference, InterpolationMode::NearestNeighbour)
        .unwrap();

    let aligned = metric.score(&reference, &reference).unwrap();
    let displaced = metric.score(&reference, &shifted).unwrap();
    assert!(metric.better_than(aligned, displaced));
}

#[test]
fn test_chamfer_ignores_flat_regions_of_the_reference() {
    // A uniform mid-gray reference has zero gradient everywhere inside; only
    // the 28 border pixels (where the 3x3 neighborhood is cut off) respond
    // to the edge extraction. Against a candidate with a single foreground
    // pixel in the corner, the chamfer sum over that border ring is
    //   top row:     0 + 1 + ... + 7                        = 28
    //   left column: 1 + ... + 7                            = 28
    //   bottom row:  sum over x of 1.41*min(x,7) + |x - 7|  = 60.48
    //   right column (y = 1..=6): same diagonal form        = 50.61
    // for a total of 167.09. Interior pixels, were they recorded, would add
    // their own distances on top.
    let reference = Raster::from_fn(8, 8, |_, _| 100);
    let mut candidate = Raster::new(8, 8);
    candidate.set(0, 0, 255);

    let metric = MetricKind::ChamferMatching
        .create(&reference, &candidate)
        .unwrap();
    let score = metric.score(&reference, &candidate).unwrap();
    assert!((score - 167.09).abs() < 1e-6, "got {}", score);
}

#[test]
fn test_chamfer_rejects_pairs_smaller_than_the_init_reference() {
    let reference = blob(16, 16);
    let metric = MetricKind::ChamferMatching
        .create(&reference, &reference)
        .unwrap();

    let small = Raster::new(8, 8);
    let result = metric.score(&small, &small);
    assert!(matches!(
        result,
        Err(RegistrationError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_chamfer_score_grows_with_displacement() {
    let reference = blob(20, 20);
    let metric = MetricKind::ChamferMatching
        .create(&reference, &reference)
        .unwrap();

    let shift_one = TransformPipeline::new()
        .translate(1.0, 0.0)
        .apply(&reference, InterpolationMode::NearestNeighbour)
        .unwrap();
    let shift_three = TransformPipeline::new()
        .translate(3.0, 0.0)
        .apply(&reference, InterpolationMode::NearestNeighbour)
        .unwrap();

    let near = metric.score(&reference, &shift_one).unwrap();
    let far = metric.score(&reference, &shift_three).unwrap();
    assert!(near > 0.0);
    assert!(far > near);
    assert!(metric.better_than(near, far));
}

#[test]
fn test_metric_names() {
    let reference = blob(16, 16);

    let cases = [
        (MetricKind::Sse, "SSE"),
        (MetricKind::MutualInformation, "MutualInformation"),
        (MetricKind::ChamferMatching, "ChamferMatching"),
    ];
    for (kind, expected) in cases {
        let metric = kind.create(&reference, &reference).unwrap();
        assert_eq!(metric.name(), expected);
    }
}
