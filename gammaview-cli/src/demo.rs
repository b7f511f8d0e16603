//! Synthetic coincidence matrix for demonstrations.

use gammaview_core::{Axis, DenseMatrix, Result};

/// Gamma lines of the demo source, in keV.
const LINES: [f64; 8] = [121.8, 244.7, 344.3, 411.1, 778.9, 964.1, 1085.8, 1408.0];

/// Pairs of lines emitted in coincidence.
const CASCADES: [(f64, f64); 5] = [
    (121.8, 1408.0),
    (244.7, 964.1),
    (344.3, 778.9),
    (121.8, 244.7),
    (411.1, 344.3),
];

fn gauss(e: f64, center: f64) -> f64 {
    let sigma = 1.5 + 0.002 * center;
    (-0.5 * ((e - center) / sigma).powi(2)).exp()
}

/// Projection of the demo source: falling background plus peaks.
fn singles(e: f64) -> f64 {
    40.0 * (-e / 350.0).exp() + LINES.iter().map(|&c| 150.0 * gauss(e, c)).sum::<f64>()
}

/// Build a symmetric `bins x bins` matrix over `[0, max_energy)` keV.
///
/// # Errors
///
/// Returns an error for zero bins or a non-positive energy range.
pub fn coincidence_matrix(bins: usize, max_energy: f64) -> Result<DenseMatrix> {
    let axis = Axis::new(0.0, max_energy, bins)?;
    DenseMatrix::from_fn(axis, axis, |x, y| {
        let random = singles(x) * singles(y) / 400.0;
        let true_coincidences: f64 = CASCADES
            .iter()
            .map(|&(a, b)| 800.0 * (gauss(x, a) * gauss(y, b) + gauss(x, b) * gauss(y, a)))
            .sum();
        (random + true_coincidences).round()
    })
}
