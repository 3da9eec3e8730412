// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Laplace Relaxation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Relaxation solver for the discrete 3D Laplace equation.
//!
//! Every free node is driven toward the average of the axis neighbours
//! that exist inside the box:
//!
//! | location | neighbours | weight |
//! |----------|------------|--------|
//! | interior | 6          | 1/6    |
//! | face     | 5          | 1/5    |
//! | edge     | 4          | 1/4    |
//! | corner   | 3          | 1/3    |
//!
//! No ghost layer and no grounded outer wall: the bounding box is an open
//! boundary. Fixed (electrode) nodes are never written.
//!
//! Three update disciplines:
//! - **Jacobi**: new array from the old one, computed in parallel.
//! - **Gauss-Seidel**: in place, following a [`SweepPlan`].
//! - **Red-Black**: in place per parity colour. Same-colour nodes never
//!   neighbour each other, so each colour pass is computed in parallel.

use eltrace_types::config::RelaxationMethod;
use eltrace_types::error::{SimError, SimResult};
use eltrace_types::state::{Grid3D, RelaxationReport};
use ndarray::{Array3, Zip};
use rayon::prelude::*;

/// Number of axis neighbours of node (i, j, k) inside an `(nx, ny, nz)` box.
pub fn stencil_order(shape: (usize, usize, usize), i: usize, j: usize, k: usize) -> usize {
    let (nx, ny, nz) = shape;
    let axis = |idx: usize, n: usize| usize::from(idx > 0) + usize::from(idx + 1 < n);
    axis(i, nx) + axis(j, ny) + axis(k, nz)
}

/// Average of the existing axis neighbours of node (i, j, k).
#[inline(always)]
pub fn neighbor_average(potential: &Array3<f64>, i: usize, j: usize, k: usize) -> f64 {
    let (nx, ny, nz) = potential.dim();
    let mut sum = 0.0;
    let mut count = 0usize;

    if i + 1 < nx {
        sum += potential[[i + 1, j, k]];
        count += 1;
    }
    if i > 0 {
        sum += potential[[i - 1, j, k]];
        count += 1;
    }
    if j + 1 < ny {
        sum += potential[[i, j + 1, k]];
        count += 1;
    }
    if j > 0 {
        sum += potential[[i, j - 1, k]];
        count += 1;
    }
    if k + 1 < nz {
        sum += potential[[i, j, k + 1]];
        count += 1;
    }
    if k > 0 {
        sum += potential[[i, j, k - 1]];
        count += 1;
    }

    sum * (1.0 / count as f64)
}

/// Fixed Gauss-Seidel traversal order.
///
/// Interior nodes first (lexicographic), then the x-, y- and z-faces,
/// then the edges running along z, y and x, then the eight corners.
/// Each node appears exactly once.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    nodes: Vec<[usize; 3]>,
}

impl SweepPlan {
    pub fn new(grid: &Grid3D) -> Self {
        let (nx, ny, nz) = grid.shape();
        let (xl, yl, zl) = (nx - 1, ny - 1, nz - 1);
        let mut nodes = Vec::with_capacity(grid.len());

        // Interior
        for i in 1..xl {
            for j in 1..yl {
                for k in 1..zl {
                    nodes.push([i, j, k]);
                }
            }
        }

        // Faces
        for j in 1..yl {
            for k in 1..zl {
                nodes.push([0, j, k]);
                nodes.push([xl, j, k]);
            }
        }
        for i in 1..xl {
            for k in 1..zl {
                nodes.push([i, 0, k]);
                nodes.push([i, yl, k]);
            }
        }
        for i in 1..xl {
            for j in 1..yl {
                nodes.push([i, j, 0]);
                nodes.push([i, j, zl]);
            }
        }

        // Edges
        for k in 1..zl {
            nodes.push([0, 0, k]);
            nodes.push([0, yl, k]);
            nodes.push([xl, 0, k]);
            nodes.push([xl, yl, k]);
        }
        for j in 1..yl {
            nodes.push([0, j, 0]);
            nodes.push([xl, j, 0]);
            nodes.push([0, j, zl]);
            nodes.push([xl, j, zl]);
        }
        for i in 1..xl {
            nodes.push([i, 0, 0]);
            nodes.push([i, yl, 0]);
            nodes.push([i, 0, zl]);
            nodes.push([i, yl, zl]);
        }

        // Corners
        nodes.extend_from_slice(&[
            [0, 0, 0],
            [xl, 0, 0],
            [0, yl, 0],
            [xl, yl, 0],
            [0, 0, zl],
            [xl, 0, zl],
            [0, yl, zl],
            [xl, yl, zl],
        ]);

        SweepPlan { nodes }
    }

    pub fn nodes(&self) -> &[[usize; 3]] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Running max that lets NaN through, so a diverged sweep is never
/// mistaken for a converged one.
#[inline(always)]
fn max_propagating_nan(acc: f64, value: f64) -> f64 {
    if value > acc || value.is_nan() {
        value
    } else {
        acc
    }
}

fn max_abs_diff(a: &Array3<f64>, b: &Array3<f64>) -> f64 {
    match (a.as_slice(), b.as_slice()) {
        (Some(xs), Some(ys)) => xs
            .par_iter()
            .zip(ys.par_iter())
            .map(|(x, y)| (x - y).abs())
            .reduce(|| 0.0_f64, max_propagating_nan),
        _ => Zip::from(a)
            .and(b)
            .fold(0.0_f64, |acc, &x, &y| max_propagating_nan(acc, (x - y).abs())),
    }
}

/// One synchronous Jacobi sweep. Returns the max absolute nodewise change.
pub fn jacobi_sweep(potential: &mut Array3<f64>, fixed: &Array3<bool>) -> f64 {
    let mut next = potential.clone();
    {
        let current = &*potential;
        Zip::indexed(&mut next)
            .and(fixed)
            .par_for_each(|(i, j, k), value, &is_fixed| {
                if !is_fixed {
                    *value = neighbor_average(current, i, j, k);
                }
            });
    }
    let max_change = max_abs_diff(&next, potential);
    *potential = next;
    max_change
}

/// One in-place Gauss-Seidel sweep in `plan` order.
pub fn gauss_seidel_sweep(
    potential: &mut Array3<f64>,
    fixed: &Array3<bool>,
    plan: &SweepPlan,
) -> f64 {
    let mut max_change = 0.0_f64;
    for &[i, j, k] in plan.nodes() {
        if fixed[[i, j, k]] {
            continue;
        }
        let updated = neighbor_average(potential, i, j, k);
        max_change = max_propagating_nan(max_change, (updated - potential[[i, j, k]]).abs());
        potential[[i, j, k]] = updated;
    }
    max_change
}

/// One red-black sweep: even `i+j+k` first, then odd.
pub fn red_black_sweep(potential: &mut Array3<f64>, fixed: &Array3<bool>) -> f64 {
    let mut max_change = 0.0_f64;
    for color in 0..2usize {
        let mut next = potential.clone();
        {
            let current = &*potential;
            Zip::indexed(&mut next)
                .and(fixed)
                .par_for_each(|(i, j, k), value, &is_fixed| {
                    if !is_fixed && (i + j + k) % 2 == color {
                        *value = neighbor_average(current, i, j, k);
                    }
                });
        }
        max_change = max_propagating_nan(max_change, max_abs_diff(&next, potential));
        *potential = next;
    }
    max_change
}

/// Relax `potential` until the max nodewise change of a sweep is `<= tol`
/// or `max_iter` sweeps have run.
///
/// Hitting the cap is reported through `converged = false`, not as an error.
pub fn relax(
    potential: &mut Array3<f64>,
    fixed: &Array3<bool>,
    grid: &Grid3D,
    method: RelaxationMethod,
    max_iter: usize,
    tol: f64,
) -> SimResult<RelaxationReport> {
    let expected = grid.shape();
    if potential.dim() != expected || fixed.dim() != expected {
        return Err(SimError::ConfigError(format!(
            "relaxation shape mismatch: potential {:?}, fixed {:?}, grid {:?}",
            potential.dim(),
            fixed.dim(),
            expected
        )));
    }
    if !tol.is_finite() || tol < 0.0 {
        return Err(SimError::ConfigError(format!(
            "tol must be finite and >= 0, got {tol}"
        )));
    }

    let plan = match method {
        RelaxationMethod::GaussSeidel => Some(SweepPlan::new(grid)),
        _ => None,
    };

    let mut max_change = f64::INFINITY;
    for iter in 0..max_iter {
        max_change = match (method, plan.as_ref()) {
            (RelaxationMethod::GaussSeidel, Some(plan)) => {
                gauss_seidel_sweep(potential, fixed, plan)
            }
            (RelaxationMethod::RedBlack, _) => red_black_sweep(potential, fixed),
            _ => jacobi_sweep(potential, fixed),
        };
        log::debug!("{method} iteration {iter}, max change = {max_change:e}");

        if !max_change.is_finite() {
            return Err(SimError::SolverDiverged {
                iteration: iter,
                message: "NaN or Inf detected in potential".to_string(),
            });
        }

        if max_change <= tol {
            log::info!("{method} converged at iteration {iter}, max change = {max_change:e}");
            return Ok(RelaxationReport {
                method,
                converged: true,
                iterations: iter + 1,
                max_change,
            });
        }
    }

    log::warn!(
        "{method} stopped after {max_iter} iterations without converging (max change = {max_change:e}, tol = {tol:e})"
    );
    Ok(RelaxationReport {
        method,
        converged: false,
        iterations: max_iter,
        max_change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn two_plate_setup(n: usize) -> (Grid3D, Array3<f64>, Array3<bool>) {
        let grid = Grid3D::new(n, 5, 5, 1.0, 0.4, 0.4).unwrap();
        let mut potential = Array3::zeros(grid.shape());
        let mut fixed = Array3::from_elem(grid.shape(), false);
        for j in 0..5 {
            for k in 0..5 {
                potential[[0, j, k]] = 10.0;
                fixed[[0, j, k]] = true;
                potential[[n - 1, j, k]] = -10.0;
                fixed[[n - 1, j, k]] = true;
            }
        }
        (grid, potential, fixed)
    }

    #[test]
    fn test_stencil_order_by_location() {
        let shape = (4, 5, 6);
        assert_eq!(stencil_order(shape, 1, 2, 3), 6);
        assert_eq!(stencil_order(shape, 0, 2, 3), 5);
        assert_eq!(stencil_order(shape, 3, 4, 3), 4);
        assert_eq!(stencil_order(shape, 0, 4, 5), 3);
        assert_eq!(stencil_order((2, 2, 2), 1, 0, 1), 3);
    }

    #[test]
    fn test_neighbor_average_weights() {
        let mut potential = Array3::zeros((3, 3, 3));
        potential[[1, 0, 0]] = 3.0;
        potential[[0, 1, 0]] = 6.0;
        potential[[0, 0, 1]] = 9.0;
        assert!((neighbor_average(&potential, 0, 0, 0) - 6.0).abs() < 1e-15);

        potential[[1, 1, 1]] = 100.0;
        potential[[1, 1, 0]] = 12.0;
        // face node (1,1,0): neighbours (2,1,0), (0,1,0), (1,2,0), (1,0,0), (1,1,1)
        let expected = (0.0 + 6.0 + 0.0 + 3.0 + 100.0) / 5.0;
        assert!((neighbor_average(&potential, 1, 1, 0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_plan_covers_every_node_once() {
        for (nx, ny, nz) in [(2, 2, 2), (3, 4, 5), (6, 2, 3)] {
            let grid = Grid3D::new(nx, ny, nz, 1.0, 1.0, 1.0).unwrap();
            let plan = SweepPlan::new(&grid);
            assert_eq!(plan.len(), grid.len());
            let unique: HashSet<[usize; 3]> = plan.nodes().iter().copied().collect();
            assert_eq!(unique.len(), grid.len());
        }
    }

    #[test]
    fn test_sweep_plan_order_interior_then_boundary() {
        let grid = Grid3D::new(4, 4, 4, 1.0, 1.0, 1.0).unwrap();
        let plan = SweepPlan::new(&grid);
        let shape = grid.shape();
        let orders: Vec<usize> = plan
            .nodes()
            .iter()
            .map(|&[i, j, k]| stencil_order(shape, i, j, k))
            .collect();
        // Stencil order is non-increasing along the plan: 6 → 5 → 4 → 3.
        assert!(orders.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(plan.nodes()[0], [1, 1, 1]);
        assert_eq!(*plan.nodes().last().unwrap(), [3, 3, 3]);
    }

    #[test]
    fn test_fixed_nodes_never_change() {
        for method in [
            RelaxationMethod::Jacobi,
            RelaxationMethod::GaussSeidel,
            RelaxationMethod::RedBlack,
        ] {
            let (grid, mut potential, fixed) = two_plate_setup(9);
            relax(&mut potential, &fixed, &grid, method, 50, 0.0).unwrap();
            for j in 0..5 {
                for k in 0..5 {
                    assert_eq!(potential[[0, j, k]], 10.0, "{method}");
                    assert_eq!(potential[[8, j, k]], -10.0, "{method}");
                }
            }
        }
    }

    #[test]
    fn test_two_plates_converge_to_linear_profile() {
        for method in [
            RelaxationMethod::Jacobi,
            RelaxationMethod::GaussSeidel,
            RelaxationMethod::RedBlack,
        ] {
            let (grid, mut potential, fixed) = two_plate_setup(11);
            let report = relax(&mut potential, &fixed, &grid, method, 20_000, 1e-10).unwrap();
            assert!(report.converged, "{method} did not converge: {report:?}");
            for i in 0..11 {
                let expected = 10.0 - 20.0 * i as f64 / 10.0;
                for j in 0..5 {
                    for k in 0..5 {
                        let v = potential[[i, j, k]];
                        assert!(
                            (v - expected).abs() < 1e-6,
                            "{method}: V[{i},{j},{k}] = {v}, expected {expected}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_iteration_cap_is_not_an_error() {
        let (grid, mut potential, fixed) = two_plate_setup(21);
        let report = relax(
            &mut potential,
            &fixed,
            &grid,
            RelaxationMethod::Jacobi,
            3,
            1e-12,
        )
        .unwrap();
        assert!(!report.converged);
        assert_eq!(report.iterations, 3);
        assert!(report.max_change > 1e-12);
    }

    #[test]
    fn test_zero_iterations_reports_unconverged() {
        let (grid, mut potential, fixed) = two_plate_setup(5);
        let report =
            relax(&mut potential, &fixed, &grid, RelaxationMethod::RedBlack, 0, 1.0).unwrap();
        assert!(!report.converged);
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn test_gauss_seidel_converges_in_fewer_sweeps_than_jacobi() {
        let (grid, mut jacobi, fixed) = two_plate_setup(15);
        let mut gs = jacobi.clone();
        let rj = relax(&mut jacobi, &fixed, &grid, RelaxationMethod::Jacobi, 50_000, 1e-8).unwrap();
        let rg = relax(&mut gs, &fixed, &grid, RelaxationMethod::GaussSeidel, 50_000, 1e-8)
            .unwrap();
        assert!(rj.converged && rg.converged);
        assert!(
            rg.iterations < rj.iterations,
            "GS {} sweeps vs Jacobi {}",
            rg.iterations,
            rj.iterations
        );
    }

    #[test]
    fn test_max_abs_diff_parallel_and_strided_paths_agree() {
        use ndarray::ShapeBuilder;
        let a = Array3::from_shape_fn((5, 4, 3), |(i, j, k)| (i * 12 + j * 3 + k) as f64);
        let mut b = a.clone();
        b[[3, 1, 2]] += 2.5;
        b[[0, 0, 1]] -= 1.0;
        assert_eq!(max_abs_diff(&a, &b), 2.5);

        let mut a_f = Array3::zeros((5, 4, 3).f());
        a_f.assign(&a);
        let mut b_f = Array3::zeros((5, 4, 3).f());
        b_f.assign(&b);
        assert!(a_f.as_slice().is_none());
        assert_eq!(max_abs_diff(&a_f, &b_f), 2.5);

        b[[4, 3, 0]] = f64::NAN;
        assert!(max_abs_diff(&a, &b).is_nan());
    }

    #[test]
    fn test_shape_mismatch_errors() {
        let grid = Grid3D::new(4, 4, 4, 1.0, 1.0, 1.0).unwrap();
        let mut potential = Array3::zeros((4, 4, 3));
        let fixed = Array3::from_elem((4, 4, 4), false);
        let err = relax(&mut potential, &fixed, &grid, RelaxationMethod::Jacobi, 1, 0.0)
            .unwrap_err();
        match err {
            SimError::ConfigError(msg) => assert!(msg.contains("shape mismatch")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_potential_reports_divergence() {
        let grid = Grid3D::new(4, 4, 4, 1.0, 1.0, 1.0).unwrap();
        let mut potential = Array3::zeros(grid.shape());
        let mut fixed = Array3::from_elem(grid.shape(), false);
        potential[[0, 0, 0]] = f64::NAN;
        fixed[[0, 0, 0]] = true;
        let err = relax(&mut potential, &fixed, &grid, RelaxationMethod::GaussSeidel, 10, 0.0)
            .unwrap_err();
        match err {
            SimError::SolverDiverged { iteration, .. } => assert_eq!(iteration, 0),
            other => panic!("Unexpected error: {other:?}"),
        }
    }
}
