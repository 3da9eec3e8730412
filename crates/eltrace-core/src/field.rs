// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Field Sampling
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Electric field from the relaxed potential, E = -∇φ.
//!
//! Central differences per axis, evaluated only where both neighbours
//! exist. On a boundary layer of an axis the corresponding component is
//! zero; there is no one-sided fallback.

use eltrace_types::state::Grid3D;
use ndarray::{Array3, Zip};

/// Electric field [V/m] at node (i, j, k).
#[inline]
pub fn sample_electric_field(
    potential: &Array3<f64>,
    grid: &Grid3D,
    i: usize,
    j: usize,
    k: usize,
) -> [f64; 3] {
    let (nx, ny, nz) = potential.dim();
    let mut e = [0.0; 3];
    if i > 0 && i + 1 < nx {
        e[0] = -(potential[[i + 1, j, k]] - potential[[i - 1, j, k]]) / (2.0 * grid.dx);
    }
    if j > 0 && j + 1 < ny {
        e[1] = -(potential[[i, j + 1, k]] - potential[[i, j - 1, k]]) / (2.0 * grid.dy);
    }
    if k > 0 && k + 1 < nz {
        e[2] = -(potential[[i, j, k + 1]] - potential[[i, j, k - 1]]) / (2.0 * grid.dz);
    }
    e
}

/// Sampled field at every node, as `(Ex, Ey, Ez)`.
pub fn electric_field_map(
    potential: &Array3<f64>,
    grid: &Grid3D,
) -> (Array3<f64>, Array3<f64>, Array3<f64>) {
    let shape = potential.dim();
    let mut ex = Array3::zeros(shape);
    let mut ey = Array3::zeros(shape);
    let mut ez = Array3::zeros(shape);
    Zip::indexed(&mut ex)
        .and(&mut ey)
        .and(&mut ez)
        .par_for_each(|(i, j, k), ex, ey, ez| {
            let [x, y, z] = sample_electric_field(potential, grid, i, j, k);
            *ex = x;
            *ey = y;
            *ez = z;
        });
    (ex, ey, ez)
}
