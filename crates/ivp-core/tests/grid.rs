use ivp_core::{Bounds, Domain, Interval, Region, SpatialIndex, Utility};

fn line_domain() -> Domain {
    Domain::new()
        .with_var("x", 0.0, 99.0, 100)
        .expect("valid variable")
}

fn three_pieces() -> Vec<Region> {
    vec![
        Region::new(vec![Interval::closed_open(0, 10)], Utility::constant(1.0)),
        Region::new(vec![Interval::closed_open(10, 50)], Utility::constant(5.0)),
        Region::new(vec![Interval::closed(50, 99)], Utility::constant(3.0)),
    ]
}

fn query(lo: i64, hi: i64) -> Bounds {
    Bounds::new(vec![Interval::closed(lo, hi)])
}

#[test]
fn candidates_are_exact_ascending_and_unique() {
    let domain = line_domain();
    let regions = three_pieces();

    for widths in [&[][..], &[2][..], &[10][..], &[100][..]] {
        let index = if widths.is_empty() {
            SpatialIndex::new(&domain, &regions)
        } else {
            SpatialIndex::with_cell_width(&domain, &regions, widths)
        };

        assert_eq!(index.candidates(&regions, &query(5, 60)), vec![0, 1, 2]);
        assert_eq!(index.candidates(&regions, &query(10, 10)), vec![1]);
        assert_eq!(index.candidates(&regions, &query(9, 10)), vec![0, 1]);
        assert_eq!(index.candidates(&regions, &query(50, 99)), vec![2]);
    }
}

#[test]
fn candidates_into_reuses_the_buffer() {
    let domain = line_domain();
    let regions = three_pieces();
    let index = SpatialIndex::with_cell_width(&domain, &regions, &[4]);

    let mut out = vec![42, 43];
    index.candidates_into(&regions, &query(0, 3), &mut out);
    assert_eq!(out, vec![0]);

    index.candidates_into(&regions, &query(45, 55), &mut out);
    assert_eq!(out, vec![1, 2]);
}

#[test]
fn cell_widths_are_clamped() {
    let domain = line_domain();
    let regions = three_pieces();

    let fine = SpatialIndex::with_cell_width(&domain, &regions, &[1]);
    assert_eq!(fine.cell_width(), &[2]);
    assert_eq!(fine.cell_count(), 50);

    let coarse = SpatialIndex::with_cell_width(&domain, &regions, &[1000]);
    assert_eq!(coarse.cell_width(), &[100]);
    assert_eq!(coarse.cell_count(), 1);
    assert_eq!(coarse.regions_per_cell(), 3.0);
}

#[test]
fn upper_bound_covers_touched_cells_only() {
    let domain = line_domain();
    let regions = three_pieces();
    let index = SpatialIndex::with_cell_width(&domain, &regions, &[10]);

    assert_eq!(index.upper_bound(&query(0, 5)), Some(1.0));
    assert_eq!(index.upper_bound(&query(60, 99)), Some(3.0));
    assert_eq!(index.upper_bound(&query(0, 99)), Some(5.0));
}

#[test]
fn upper_bound_never_underestimates() {
    let domain = line_domain();
    let regions = vec![
        Region::new(
            vec![Interval::closed(0, 40)],
            Utility::linear(vec![1.0], 0.0),
        ),
        Region::new(
            vec![Interval::closed(41, 99)],
            Utility::quadratic(vec![-0.5], vec![70.0], 0.0),
        ),
    ];
    let index = SpatialIndex::new(&domain, &regions);

    for lo in (0..100).step_by(7) {
        let q = query(lo, (lo + 13).min(99));
        let exact = index
            .candidates(&regions, &q)
            .into_iter()
            .filter_map(|r| regions[r].intersect(&Region::new(q.clone(), Utility::default())))
            .filter_map(|r| r.max_value())
            .fold(f64::NEG_INFINITY, f64::max);
        let bound = index.upper_bound(&q).expect("query touches regions");
        assert!(bound >= exact, "lo={lo} bound={bound} exact={exact}");
    }
}

#[test]
fn refresh_bounds_tracks_rescaled_utilities() {
    let domain = line_domain();
    let mut regions = three_pieces();
    let mut index = SpatialIndex::with_cell_width(&domain, &regions, &[10]);

    for region in regions.iter_mut() {
        region.utility.scale(2.0);
    }
    index.refresh_bounds(&regions);

    assert_eq!(index.upper_bound(&query(0, 99)), Some(10.0));
    assert_eq!(index.upper_bound(&query(0, 5)), Some(2.0));
}

#[test]
fn two_dimensional_quadrants() {
    let domain = Domain::new()
        .with_var("x", 0.0, 19.0, 20)
        .expect("valid variable")
        .with_var("y", 0.0, 19.0, 20)
        .expect("valid variable");

    let half = |lo: bool| {
        if lo {
            Interval::closed_open(0, 10)
        } else {
            Interval::closed(10, 19)
        }
    };
    let regions: Vec<Region> = [(true, true), (false, true), (true, false), (false, false)]
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| Region::new(vec![half(x), half(y)], Utility::constant(i as f64)))
        .collect();

    let index = SpatialIndex::with_cell_width(&domain, &regions, &[3, 7]);
    let centre = Bounds::new(vec![Interval::closed(9, 10), Interval::closed(9, 10)]);
    assert_eq!(index.candidates(&regions, &centre), vec![0, 1, 2, 3]);

    let corner = Bounds::new(vec![Interval::closed(15, 19), Interval::closed(0, 3)]);
    assert_eq!(index.candidates(&regions, &corner), vec![1]);
    assert_eq!(index.dim(), 2);
}

#[test]
fn empty_index_has_no_bound() {
    let domain = line_domain();
    let index = SpatialIndex::new(&domain, &[]);

    assert!(index.candidates(&[], &query(0, 99)).is_empty());
    assert_eq!(index.upper_bound(&query(0, 99)), None);
}

#[test]
fn oversized_explicit_widths_fall_back_to_a_bounded_grid() {
    let mut domain = Domain::new();
    for d in 0..10 {
        domain
            .add_var(format!("x{d}"), 0.0, 999.0, 1000)
            .expect("valid variable");
    }
    let regions = vec![Region::new(
        domain.universe().intervals().to_vec(),
        Utility::constant(2.0),
    )];

    let index = SpatialIndex::with_cell_width(&domain, &regions, &[2; 10]);
    assert!(index.cell_count() <= ivp_core::grid::MAX_CELLS);
    assert_eq!(index.candidates(&regions, &domain.universe()), vec![0]);
    assert_eq!(index.upper_bound(&Bounds::point(&[500; 10])), Some(2.0));
}
