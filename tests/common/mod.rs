use patchwork::math::Point3;

/// Installs a log subscriber controlled by `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A gently curved `rows x cols` grid whose first row sits at `x = offset`.
#[allow(dead_code)]
pub fn wavy_grid(rows: usize, cols: usize, offset: f64) -> Vec<Vec<Point3>> {
    (0..rows)
        .map(|i| {
            (0..cols)
                .map(|j| {
                    let (x, y) = (i as f64 + offset, j as f64);
                    Point3::new(x, y, 0.25 * (0.9 * x + 0.4 * y).sin())
                })
                .collect()
        })
        .collect()
}
