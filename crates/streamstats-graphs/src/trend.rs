//! Least-squares polynomial trend lines

use streamstats_common::{bail, ensure, Result, StatsError};
use tracing::{debug, warn};

/// Highest degree used for viewer trend lines
pub const MAX_TREND_DEGREE: usize = 2;

const PIVOT_EPSILON: f64 = 1e-12;

/// A fitted polynomial.
///
/// Fitting happens on x values mapped onto `[0, 1]`, which keeps the normal
/// equations well conditioned for long series.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
    x_offset: f64,
    x_scale: f64,
}

impl Polynomial {
    /// Least-squares fit of `degree` through the points `(xs[i], ys[i])`
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self> {
        ensure!(
            xs.len() == ys.len(),
            StatsError::graph(format!(
                "Trend fit needs matching coordinates, got {} x and {} y values",
                xs.len(),
                ys.len()
            ))
        );
        ensure!(
            xs.len() > degree,
            StatsError::graph(format!(
                "Degree {degree} fit needs more than {degree} points, got {}",
                xs.len()
            ))
        );
        ensure!(
            xs.iter().chain(ys).all(|v| v.is_finite()),
            StatsError::graph("Trend fit input is not finite")
        );

        let x_offset = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let x_scale = if x_max > x_offset { x_max - x_offset } else { 1.0 };

        let size = degree + 1;
        let mut system = vec![vec![0.0; size + 1]; size];

        for (&x, &y) in xs.iter().zip(ys) {
            let t = (x - x_offset) / x_scale;
            let powers: Vec<f64> = (0..=2 * degree)
                .scan(1.0, |acc, _| {
                    let current = *acc;
                    *acc *= t;
                    Some(current)
                })
                .collect();

            for (row, equation) in system.iter_mut().enumerate() {
                for col in 0..size {
                    equation[col] += powers[row + col];
                }
                equation[size] += powers[row] * y;
            }
        }

        let coefficients = solve(system)?;
        debug!(degree, ?coefficients, "Fitted trend polynomial");

        Ok(Self {
            coefficients,
            x_offset,
            x_scale,
        })
    }

    /// Value at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        let t = (x - self.x_offset) / self.x_scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, coefficient| acc * t + coefficient)
    }

    /// Degree of the fit
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }
}

/// Gaussian elimination with partial pivoting on an augmented matrix
fn solve(mut system: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let size = system.len();
    let scale = system
        .iter()
        .flat_map(|row| row[..size].iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));

    for col in 0..size {
        let pivot_row = (col..size)
            .max_by(|&a, &b| system[a][col].abs().total_cmp(&system[b][col].abs()))
            .unwrap_or(col);

        if system[pivot_row][col].abs() <= PIVOT_EPSILON * scale.max(1.0) {
            bail!(StatsError::graph("Trend fit is ill-conditioned"));
        }
        system.swap(col, pivot_row);

        for row in col + 1..size {
            let factor = system[row][col] / system[col][col];
            for k in col..=size {
                system[row][k] -= factor * system[col][k];
            }
        }
    }

    let mut solution = vec![0.0; size];
    for row in (0..size).rev() {
        let tail: f64 = (row + 1..size)
            .map(|k| system[row][k] * solution[k])
            .sum();
        solution[row] = (system[row][size] - tail) / system[row][row];
    }

    if solution.iter().all(|v| v.is_finite()) {
        Ok(solution)
    } else {
        Err(StatsError::graph("Trend fit produced non-finite coefficients"))
    }
}

/// Degree used for `points` plotted values: quadratic, linear for two points,
/// none below that
pub fn trend_degree(points: usize) -> Option<usize> {
    (points >= 2).then(|| (points - 1).min(MAX_TREND_DEGREE))
}

/// Fit a trend through the given points and evaluate it at each of
/// `positions`. Fit failures are logged and yield `None`.
pub fn fit_trend(xs: &[f64], ys: &[f64], positions: &[f64]) -> Option<Vec<f64>> {
    let degree = trend_degree(xs.len())?;

    match Polynomial::fit(xs, ys, degree) {
        Ok(polynomial) => Some(positions.iter().map(|&x| polynomial.evaluate(x)).collect()),
        Err(e) => {
            warn!(error = %e, points = xs.len(), "Skipping trend line");
            None
        }
    }
}
