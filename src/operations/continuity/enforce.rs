use tracing::{debug, trace, warn};

use crate::error::{ContinuityError, Result};
use crate::math::TOLERANCE;

use super::strip::{BoundaryStrip, ControlNet};
use super::{Continuity, EdgeLink, Orientation};

/// Makes the target boundary meet a source boundary with the requested
/// continuity, moving only the target rows at distance `0..=order`.
pub struct EnforceContinuity<B> {
    link: EdgeLink<B>,
    order: Continuity,
    tension: f64,
}

impl<B: Copy + Ord + std::fmt::Display + std::fmt::Debug> EnforceContinuity<B> {
    /// Creates a new `EnforceContinuity` operation with unit tension.
    #[must_use]
    pub fn new(link: EdgeLink<B>, order: Continuity) -> Self {
        Self {
            link,
            order,
            tension: 1.0,
        }
    }

    /// Sets the tension factor `f` (ratio of target to source cross-boundary
    /// speed).
    #[must_use]
    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }

    /// Executes the operation against a distinct source net.
    ///
    /// # Errors
    ///
    /// Returns an error if the edges are incompatible, the degree across
    /// either edge is too low, or the tension is invalid.
    pub fn execute<T, S>(&self, target: &mut T, source: &S) -> Result<()>
    where
        T: ControlNet<Boundary = B>,
        S: ControlNet<Boundary = B>,
    {
        let source_strip = BoundaryStrip::extract(source, self.link.source_edge, self.order.level())?;
        self.apply(target, &source_strip)
    }

    /// Executes the operation between two edges of the same net. The source
    /// rows are captured before anything moves.
    ///
    /// # Errors
    ///
    /// Same as [`EnforceContinuity::execute`], plus
    /// [`ContinuityError::OverlappingRows`] unless the edges are opposite
    /// and the net is at least `2 * (order + 1)` rows deep.
    pub fn execute_on_self<N>(&self, net: &mut N) -> Result<()>
    where
        N: ControlNet<Boundary = B>,
    {
        check_self_link(&*net, self.link, self.order.level())?;
        let source_strip = BoundaryStrip::extract(&*net, self.link.source_edge, self.order.level())?;
        self.apply(net, &source_strip)
    }

    fn apply<T>(&self, target: &mut T, source: &BoundaryStrip) -> Result<()>
    where
        T: ControlNet<Boundary = B>,
    {
        debug!(
            target_edge = %self.link.target_edge,
            source_edge = %self.link.source_edge,
            order = ?self.order,
            tension = self.tension,
            "enforcing continuity"
        );
        let order = self.order.level();
        if order > 0 {
            // row 0 of the target takes the source's weights at G0
            let strip = BoundaryStrip::extract(&*target, self.link.target_edge, order)?;
            check_compatible(&strip, source, self.link.orientation)?;
            let base = mapped_row(&source.weights[0], self.link.orientation);
            check_separable(&strip, &base, source, order)?;
        }
        for level in 0..=self.order.level() {
            enforce_level(target, self.link, source, level, self.tension)?;
        }
        Ok(())
    }
}

/// Applies only the requested level (without lower levels first).
pub(super) fn enforce_level<T>(
    target: &mut T,
    link: EdgeLink<T::Boundary>,
    source: &BoundaryStrip,
    level: usize,
    tension: f64,
) -> Result<()>
where
    T: ControlNet,
{
    if level > 0 && !(tension.is_finite() && tension > 0.0) {
        return Err(ContinuityError::InvalidTension(tension).into());
    }
    let strip = BoundaryStrip::extract(&*target, link.target_edge, level)?;
    check_compatible(&strip, source, link.orientation)?;
    check_separable(&strip, &strip.weights[0], source, level)?;
    trace!(target_edge = %link.target_edge, level, "solving boundary rows");
    match level {
        0 => enforce_g0(target, link, source),
        1 => enforce_g1(target, link, &strip, source, tension),
        _ => enforce_g2(target, link, &strip, source, tension),
    }
}

/// Source column matched with target column `j`.
fn source_column(orientation: Orientation, columns: usize, j: usize) -> usize {
    match orientation {
        Orientation::Aligned => j,
        Orientation::Reversed => columns - 1 - j,
    }
}

/// Rejects a link between two boundaries of one net whose rows `0..=order`
/// would overlap.
pub(super) fn check_self_link<N: ControlNet>(net: &N, link: EdgeLink<N::Boundary>, order: usize) -> Result<()> {
    let disjoint = N::opposite(link.target_edge) == link.source_edge
        && 2 * (order + 1) <= net.depth(link.target_edge);
    if disjoint {
        Ok(())
    } else {
        Err(ContinuityError::OverlappingRows {
            target_edge: net.describe(link.target_edge),
            source_edge: net.describe(link.source_edge),
        }
        .into())
    }
}

/// Row 0 of the source in target column order.
fn mapped_row(row: &[f64], orientation: Orientation) -> Vec<f64> {
    (0..row.len())
        .map(|j| row[source_column(orientation, row.len(), j)])
        .collect()
}

/// Whether every row is a constant multiple of `base`.
fn rows_proportional(rows: &[Vec<f64>], base: &[f64]) -> bool {
    rows.iter().all(|row| {
        let ratio = row[0] / base[0];
        row.iter()
            .zip(base)
            .all(|(w, b)| (w / b - ratio).abs() <= TOLERANCE * ratio.max(1.0))
    })
}

/// The column-wise solve is exact along the whole edge only when the rows
/// `1..=level` of both strips are proportional to their boundary row.
fn check_separable(target: &BoundaryStrip, target_base: &[f64], source: &BoundaryStrip, level: usize) -> Result<()> {
    if level == 0 || !(target.rational || source.rational) {
        return Ok(());
    }
    let separable = rows_proportional(&source.weights[1..=level], &source.weights[0])
        && rows_proportional(&target.weights[1..=level], target_base);
    if separable {
        return Ok(());
    }
    warn!(
        target_edge = %target.description,
        source_edge = %source.description,
        level,
        "refusing non-separable weights"
    );
    Err(ContinuityError::NonSeparableWeights {
        target_edge: target.description.clone(),
        source_edge: source.description.clone(),
    }
    .into())
}

fn check_compatible(target: &BoundaryStrip, source: &BoundaryStrip, orientation: Orientation) -> Result<()> {
    let source_knots = match orientation {
        Orientation::Aligned => source.edge_knots.clone(),
        Orientation::Reversed => source.edge_knots.mirrored(),
    };
    let compatible = target.columns() == source.columns()
        && target.edge_degree == source.edge_degree
        && target.edge_knots.approx_eq(&source_knots, TOLERANCE)
        && (target.rational || !source.rational);
    if compatible {
        Ok(())
    } else {
        Err(ContinuityError::IncompatibleEdge {
            target_edge: target.description.clone(),
            source_edge: source.description.clone(),
        }
        .into())
    }
}

fn enforce_g0<T: ControlNet>(target: &mut T, link: EdgeLink<T::Boundary>, source: &BoundaryStrip) -> Result<()> {
    let columns = source.columns();
    let rational = target.is_rational();
    for j in 0..columns {
        let c = source_column(link.orientation, columns, j);
        target.set_point(link.target_edge, 0, j, source.points[0][c])?;
        if rational {
            target.set_weight(link.target_edge, 0, j, source.weights[0][c])?;
        }
    }
    Ok(())
}

/// Solves row 1 so that `S_t' = −f · S_s'` in every column.
fn enforce_g1<T: ControlNet>(
    target: &mut T,
    link: EdgeLink<T::Boundary>,
    strip: &BoundaryStrip,
    source: &BoundaryStrip,
    tension: f64,
) -> Result<()> {
    let columns = strip.columns();
    let a = &strip.coefficients;
    for j in 0..columns {
        let c = source_column(link.orientation, columns, j);
        let wanted = source.column_derivatives(c)[1] * -tension;
        let w = strip.weight_derivatives(j);
        let s0 = strip.points[0][j].coords;
        let (w0, w1) = (strip.weights[0][j], strip.weights[1][j]);
        let a1 = wanted * w[0] + s0 * w[1] - s0 * (a[1][0] * w0);
        let p1 = a1 / (a[1][1] * w1);
        target.set_point(link.target_edge, 1, j, p1.into())?;
    }
    Ok(())
}

/// Solves row 2 so that `S_t'' = f² · S_s''` in every column, given rows 0
/// and 1 of the target.
fn enforce_g2<T: ControlNet>(
    target: &mut T,
    link: EdgeLink<T::Boundary>,
    strip: &BoundaryStrip,
    source: &BoundaryStrip,
    tension: f64,
) -> Result<()> {
    let columns = strip.columns();
    let a = &strip.coefficients;
    for j in 0..columns {
        let c = source_column(link.orientation, columns, j);
        let wanted = source.column_derivatives(c)[2] * (tension * tension);
        let own = strip.column_derivatives(j);
        let w = strip.weight_derivatives(j);
        let (p0, p1) = (strip.points[0][j].coords, strip.points[1][j].coords);
        let (w0, w1, w2) = (strip.weights[0][j], strip.weights[1][j], strip.weights[2][j]);
        let a2 = wanted * w[0] + own[1] * (2.0 * w[1]) + own[0] * w[2];
        let p2 = (a2 - p0 * (a[2][0] * w0) - p1 * (a[2][1] * w1)) / (a[2][2] * w2);
        target.set_point(link.target_edge, 2, j, p2.into())?;
    }
    Ok(())
}
