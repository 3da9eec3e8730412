// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Energy Distribution
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Exponentially graded beam energies between two bounds.

use eltrace_math::linalg::solve_2x2;
use eltrace_types::constants::KEV_TO_JOULE;
use eltrace_types::error::{SimError, SimResult};

/// `count` energies [J] falling from `high_kev` to `low_kev`.
///
/// The shape is `exp(-u / steepness)` for `u` evenly spaced on `[0, 10]`,
/// rescaled by an affine map so the first value is exactly `high_kev` and
/// the last exactly `low_kev`. Larger `steepness` flattens the curve.
pub fn scaled_energies_j(
    low_kev: f64,
    high_kev: f64,
    count: usize,
    steepness: f64,
) -> SimResult<Vec<f64>> {
    if count < 2 {
        return Err(SimError::ConfigError(format!(
            "energy spread needs at least 2 particles, got {count}"
        )));
    }
    if !low_kev.is_finite() || !high_kev.is_finite() {
        return Err(SimError::ConfigError(
            "energy bounds must be finite".to_string(),
        ));
    }
    if !steepness.is_finite() || steepness <= 0.0 {
        return Err(SimError::ConfigError(format!(
            "steepness must be finite and > 0, got {steepness}"
        )));
    }

    let step = 10.0 / (count - 1) as f64;
    let raw: Vec<f64> = (0..count)
        .map(|i| (-(step * i as f64) / steepness).exp())
        .collect();
    let last_raw = raw[count - 1];
    let span = high_kev - low_kev;

    let [alpha, beta] = solve_2x2(
        &[[low_kev, span], [low_kev, last_raw * span]],
        &[high_kev, low_kev],
    )?;

    Ok(raw
        .iter()
        .map(|r| (alpha * low_kev + beta * r * span) * KEV_TO_JOULE)
        .collect())
}
