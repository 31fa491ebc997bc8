use ivp_core::{Domain, Interval, PiecewiseFunction, Region, Utility};
use ivp_solve::{Problem, ProblemConfig, Seeding};

/// `x` in [0, 20] sampled every 2.
fn course_domain() -> Domain {
    Domain::new()
        .with_var("x", 0.0, 20.0, 11)
        .expect("valid variable")
}

fn halves(domain: &Domain, low: f64, high: f64) -> PiecewiseFunction {
    PiecewiseFunction::new(
        domain.clone(),
        vec![
            Region::new(vec![Interval::closed_open(0, 5)], Utility::constant(low)),
            Region::new(vec![Interval::closed(5, 10)], Utility::constant(high)),
        ],
    )
    .expect("valid partition")
}

#[test]
fn priorities_weight_the_sum() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();

    let domain = course_domain();
    let mut problem = Problem::new(domain.clone());

    let prefers_low = halves(&domain, 10.0, 0.0).with_label("low");
    let prefers_high = halves(&domain, 0.0, 10.0)
        .with_priority(2.0)
        .expect("valid priority")
        .with_label("high");
    assert!(problem.add_function(prefers_low).expect("aligned"));
    assert!(problem.add_function(prefers_high).expect("aligned"));

    let solution = problem
        .solve()
        .expect("valid input")
        .expect("solution exists");

    // Sorted by priority: the weight-2 function comes first.
    assert_eq!(problem.functions()[0].label(), Some("high"));
    assert_eq!(solution.pieces, vec![1, 1]);
    assert_eq!(solution.value, 20.0);
    // Midpoint of [5, 10] is index 7.
    assert_eq!(problem.result_value("x"), Some(14.0));
    assert_eq!(problem.result_value("y"), None);
    assert!(problem.last_stats().leaves > 0);
}

#[test]
fn non_positive_priority_is_dropped() {
    let domain = course_domain();
    let mut problem = Problem::new(domain.clone());

    let muted = halves(&domain, 1.0, 2.0)
        .with_priority(0.0)
        .expect("zero is a valid priority");
    assert!(!problem.add_function(muted).expect("dropped, not an error"));
    assert!(problem.functions().is_empty());
    assert!(problem.solve().expect("valid input").is_none());
    assert_eq!(problem.result_value("x"), None);
}

#[test]
fn wide_ranges_are_normalized_before_weighting() {
    let domain = course_domain();
    let mut problem = Problem::new(domain.clone());

    let wide = PiecewiseFunction::new(
        domain.clone(),
        vec![Region::new(
            domain.universe(),
            Utility::linear(vec![100.0], 0.0),
        )],
    )
    .expect("valid partition")
    .with_priority(0.5)
    .expect("valid priority");
    problem.add_function(wide).expect("aligned");

    let narrow = halves(&domain, 0.0, 40.0);
    problem.add_function(narrow).expect("aligned");

    let f = &problem.functions()[0];
    assert_eq!(f.min_value(), Some(0.0));
    assert_eq!(f.max_value(), Some(50.0));
    // Within range: left alone.
    assert_eq!(problem.functions()[1].max_value(), Some(40.0));
}

#[test]
fn normalization_can_be_disabled() {
    let domain = course_domain();
    let mut problem = Problem::new(domain.clone()).with_config(ProblemConfig {
        normalize_range: None,
        ..ProblemConfig::default()
    });

    let wide = PiecewiseFunction::new(
        domain.clone(),
        vec![Region::new(
            domain.universe(),
            Utility::linear(vec![100.0], 0.0),
        )],
    )
    .expect("valid partition");
    problem.add_function(wide).expect("aligned");

    assert_eq!(problem.functions()[0].max_value(), Some(1000.0));
}

#[test]
fn functions_over_a_subset_of_variables_are_aligned() {
    let domain = course_domain()
        .with_var("speed", 0.0, 4.0, 5)
        .expect("valid variable");
    let mut problem = Problem::new(domain.clone());

    let speed_only = Domain::new()
        .with_var("speed", 0.0, 4.0, 5)
        .expect("valid variable");
    let prefers_fast = PiecewiseFunction::new(
        speed_only.clone(),
        vec![Region::new(
            speed_only.universe(),
            Utility::linear(vec![1.0], 0.0),
        )],
    )
    .expect("valid partition");
    let course = halves(&course_domain(), 3.0, 1.0);

    problem.add_function(prefers_fast).expect("aligned");
    problem.add_function(course).expect("aligned");
    assert_eq!(problem.piece_avg(), 1.5);

    let solution = problem
        .solve()
        .expect("valid input")
        .expect("solution exists");
    assert_eq!(solution.value, 7.0);
    assert_eq!(problem.result_value("speed"), Some(4.0));
    assert_eq!(problem.result_value("x"), Some(4.0));
}

#[test]
fn foreign_variables_are_rejected() {
    let mut problem = Problem::new(course_domain());
    let other = Domain::new()
        .with_var("depth", 0.0, 100.0, 11)
        .expect("valid variable");
    let f = PiecewiseFunction::new(other, Vec::new()).expect("empty is allowed");

    assert!(problem.add_function(f).is_err());
    assert_eq!(problem.piece_avg(), 0.0);
}

#[test]
fn hint_seeds_the_search() {
    let domain = course_domain();
    let mut problem = Problem::new(domain.clone());
    problem
        .add_function(halves(&domain, 2.0, 2.0))
        .expect("aligned");

    let solution = problem
        .solve_with_hint(&[9])
        .expect("valid input")
        .expect("solution exists");
    // The flat function never beats the seed.
    assert_eq!(solution.point, vec![9]);
    assert_eq!(problem.result_value("x"), Some(18.0));
    assert_eq!(problem.solution(), Some(&solution));
}

fn seeded_problem(seeding: Seeding) -> Problem {
    let domain = course_domain();
    let mut problem = Problem::new(domain.clone()).with_config(ProblemConfig {
        seeding,
        ..ProblemConfig::default()
    });
    assert!(problem
        .add_function(halves(&domain, 5.0, 1.0))
        .expect("aligned"));
    assert!(problem
        .add_function(halves(&domain, 2.0, 3.0))
        .expect("aligned"));
    problem
}

#[test]
fn seeding_from_function_maxima_keeps_the_optimum() {
    let mut plain = seeded_problem(Seeding::None);
    let expected = plain
        .solve()
        .expect("valid input")
        .expect("solution exists");
    assert_eq!(expected.value, 7.0);
    assert_eq!(expected.point, vec![2]);
    let plain_stats = plain.last_stats();
    assert_eq!(plain_stats.improvements, 1);

    for seeding in [Seeding::TopPriority, Seeding::EveryFunction] {
        let mut problem = seeded_problem(seeding);
        let solution = problem
            .solve()
            .expect("valid input")
            .expect("solution exists");

        assert_eq!(solution.value, expected.value, "{seeding:?}");
        assert_eq!(solution.point, expected.point, "{seeding:?}");
        assert_eq!(solution.pieces, expected.pieces, "{seeding:?}");

        let stats = problem.last_stats();
        assert!(stats.nodes <= plain_stats.nodes, "{seeding:?}: {stats:?}");
        // The seed already is the optimum.
        assert_eq!(stats.improvements, 0, "{seeding:?}");
    }
}

#[test]
fn explicit_hint_overrides_configured_seeding() {
    let mut problem = seeded_problem(Seeding::TopPriority);
    let solution = problem
        .solve_with_hint(&[9])
        .expect("valid input")
        .expect("solution exists");

    // The hint (value 4) is beaten by the optimum.
    assert_eq!(solution.value, 7.0);
    assert_eq!(problem.last_stats().improvements, 1);
}
