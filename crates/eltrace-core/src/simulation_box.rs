// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Simulation Box
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The potential grid: node potentials, the electrode mask and the
//! geometry snapshot, plus the voxelize and solve phases that fill them.
//!
//! Mutation goes through `&mut self` (voxelize, solve); particle
//! integration only ever borrows the box immutably, so a solve can never
//! overlap a push.

use eltrace_math::relaxation::relax;
use eltrace_types::config::RelaxationMethod;
use eltrace_types::error::SimResult;
use eltrace_types::state::{Grid3D, RelaxationReport};
use ndarray::{Array3, Zip};

use crate::electrode::ElectrodeSpec;

#[derive(Debug, Clone)]
pub struct SimulationBox {
    grid: Grid3D,
    potential: Array3<f64>,
    fixed: Array3<bool>,
    geometry: Array3<f64>,
}

impl SimulationBox {
    /// Empty box: every node free at `potential_offset`, empty geometry.
    pub fn new(grid: Grid3D, potential_offset: f64) -> Self {
        let shape = grid.shape();
        SimulationBox {
            grid,
            potential: Array3::from_elem(shape, potential_offset),
            fixed: Array3::from_elem(shape, false),
            geometry: Array3::zeros(shape),
        }
    }

    /// Voxelize one electrode. Every node whose position satisfies the
    /// predicate is pinned to the electrode potential, overwriting whatever
    /// an earlier electrode assigned. Returns the number of claimed nodes.
    pub fn apply(&mut self, spec: &ElectrodeSpec) -> usize {
        let grid = self.grid;
        let shape = spec.shape;

        let mut hits = Array3::from_elem(grid.shape(), false);
        Zip::indexed(&mut hits).par_for_each(|(i, j, k), hit| {
            *hit = shape.contains(grid.position(i, j, k));
        });

        let mut claimed = 0usize;
        Zip::from(&hits)
            .and(&mut self.potential)
            .and(&mut self.fixed)
            .and(&mut self.geometry)
            .for_each(|&hit, v, fixed, geom| {
                if hit {
                    *v = spec.potential;
                    *geom = spec.potential;
                    *fixed = true;
                    claimed += 1;
                }
            });

        if claimed == 0 {
            log::warn!("electrode {:?} claimed no grid nodes", spec.shape);
        } else {
            log::debug!(
                "electrode {:?} at {} V claimed {claimed} nodes",
                spec.shape,
                spec.potential
            );
        }
        claimed
    }

    /// Voxelize electrodes strictly in iteration order. Returns the claim
    /// count of each electrode.
    pub fn apply_all<'a, I>(&mut self, specs: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a ElectrodeSpec>,
    {
        specs.into_iter().map(|spec| self.apply(spec)).collect()
    }

    /// Relax the free nodes. The method token is parsed before any sweep,
    /// so an unknown method leaves the potential untouched.
    pub fn solve(&mut self, method: &str, max_iter: usize, tol: f64) -> SimResult<RelaxationReport> {
        let method: RelaxationMethod = method.parse()?;
        self.solve_with(method, max_iter, tol)
    }

    pub fn solve_with(
        &mut self,
        method: RelaxationMethod,
        max_iter: usize,
        tol: f64,
    ) -> SimResult<RelaxationReport> {
        log::info!(
            "solving {}x{}x{} grid with {method} ({} fixed nodes, max_iter={max_iter}, tol={tol:e})",
            self.grid.nx,
            self.grid.ny,
            self.grid.nz,
            self.fixed_count()
        );
        relax(
            &mut self.potential,
            &self.fixed,
            &self.grid,
            method,
            max_iter,
            tol,
        )
    }

    pub fn grid(&self) -> &Grid3D {
        &self.grid
    }

    pub fn potential(&self) -> &Array3<f64> {
        &self.potential
    }

    pub fn fixed_mask(&self) -> &Array3<bool> {
        &self.fixed
    }

    pub fn geometry(&self) -> &Array3<f64> {
        &self.geometry
    }

    /// Whether node (i, j, k) is an electrode node; `None` off the grid.
    pub fn is_fixed(&self, i: usize, j: usize, k: usize) -> Option<bool> {
        self.fixed.get([i, j, k]).copied()
    }

    pub fn fixed_count(&self) -> usize {
        self.fixed.iter().filter(|&&f| f).count()
    }

    /// Geometry values in node-major order (`i*ny*nz + j*nz + k`).
    pub fn geometry_snapshot(&self) -> Vec<f64> {
        self.geometry.iter().copied().collect()
    }

    /// Potential values in node-major order.
    pub fn potential_snapshot(&self) -> Vec<f64> {
        self.potential.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::electrode::Electrode;
    use eltrace_types::config::Axis;
    use eltrace_types::error::SimError;

    fn unit_box(n: usize) -> SimulationBox {
        SimulationBox::new(Grid3D::new(n, n, n, 1.0, 1.0, 1.0).unwrap(), 0.0)
    }

    fn sphere(center: [f64; 3], radius: f64, potential: f64) -> ElectrodeSpec {
        ElectrodeSpec::new(Electrode::Sphere { center, radius }, potential).unwrap()
    }

    #[test]
    fn test_new_box_is_free_at_offset() {
        let sim = SimulationBox::new(Grid3D::new(3, 4, 5, 1.0, 1.0, 1.0).unwrap(), 7.5);
        assert_eq!(sim.potential().dim(), (3, 4, 5));
        assert!(sim.potential().iter().all(|&v| v == 7.5));
        assert_eq!(sim.fixed_count(), 0);
        assert!(sim.geometry().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_is_fixed_is_none_off_grid() {
        let sim = SimulationBox::new(Grid3D::new(3, 4, 5, 1.0, 1.0, 1.0).unwrap(), 0.0);
        assert_eq!(sim.is_fixed(2, 3, 4), Some(false));
        assert_eq!(sim.is_fixed(3, 0, 0), None);
        assert_eq!(sim.is_fixed(0, 4, 0), None);
        assert_eq!(sim.is_fixed(0, 0, usize::MAX), None);
    }

    #[test]
    fn test_apply_pins_exactly_the_member_nodes() {
        let mut sim = unit_box(11);
        let spec = sphere([0.5, 0.5, 0.5], 0.2, 42.0);
        let claimed = sim.apply(&spec);
        assert!(claimed > 0);
        assert_eq!(claimed, sim.fixed_count());

        let grid = *sim.grid();
        for ((i, j, k), &v) in sim.potential().indexed_iter() {
            let inside = spec.shape.contains(grid.position(i, j, k));
            assert_eq!(sim.is_fixed(i, j, k), Some(inside));
            if inside {
                assert_eq!(v, 42.0);
                assert_eq!(sim.geometry()[[i, j, k]], 42.0);
            } else {
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn test_later_electrode_overwrites_overlap() {
        let mut sim = unit_box(11);
        let first = sphere([0.5, 0.5, 0.5], 0.3, 10.0);
        let second = ElectrodeSpec::new(
            Electrode::AxisAlignedBox {
                min: [0.5, 0.0, 0.0],
                max: [1.0, 1.0, 1.0],
            },
            -5.0,
        )
        .unwrap();
        sim.apply_all([&first, &second]);
        assert_eq!(sim.potential()[[5, 5, 5]], -5.0);
        assert_eq!(sim.potential()[[4, 5, 5]], 10.0);
        assert_eq!(sim.geometry()[[5, 5, 5]], -5.0);

        let mut reversed = unit_box(11);
        reversed.apply_all([&second, &first]);
        assert_eq!(reversed.potential()[[5, 5, 5]], 10.0);
        assert_eq!(reversed.potential()[[10, 0, 0]], -5.0);
    }

    #[test]
    fn test_apply_returns_zero_for_outside_shape() {
        let mut sim = unit_box(5);
        let far = sphere([5.0, 5.0, 5.0], 0.1, 1.0);
        assert_eq!(sim.apply(&far), 0);
        assert_eq!(sim.fixed_count(), 0);
    }

    #[test]
    fn test_unknown_method_fails_before_any_sweep() {
        let mut sim = unit_box(5);
        sim.apply(&sphere([0.0, 0.0, 0.0], 0.3, 100.0));
        let before = sim.potential().clone();
        let err = sim.solve("sor", 100, 1e-6).unwrap_err();
        match err {
            SimError::ConfigError(msg) => assert!(msg.contains("sor")),
            other => panic!("Unexpected error: {other:?}"),
        }
        assert_eq!(sim.potential(), &before);
    }

    #[test]
    fn test_solve_keeps_electrodes_and_relaxes_free_nodes() {
        let mut sim = unit_box(9);
        let rod = ElectrodeSpec::new(
            Electrode::Cylinder {
                base: [0.5, 0.5, 0.0],
                radius: 0.1,
                height: 1.0,
                axis: Axis::Z,
            },
            100.0,
        )
        .unwrap();
        sim.apply(&rod);
        let report = sim.solve("gauss-seidel", 20_000, 1e-9).unwrap();
        assert!(report.converged);
        assert_eq!(report.method, RelaxationMethod::GaussSeidel);
        for ((i, j, k), &v) in sim.potential().indexed_iter() {
            if sim.is_fixed(i, j, k) == Some(true) {
                assert_eq!(v, 100.0);
            }
        }
        // With no other electrode and open outer faces, every free node
        // relaxes to the rod potential.
        assert!(sim.potential().iter().all(|&v| (v - 100.0).abs() < 1e-6));
    }

    #[test]
    fn test_snapshots_are_node_major() {
        let grid = Grid3D::new(2, 3, 4, 1.0, 1.0, 1.0).unwrap();
        let mut sim = SimulationBox::new(grid, 0.0);
        let corner = ElectrodeSpec::new(
            Electrode::AxisAlignedBox {
                min: [1.0, 1.0, 1.0],
                max: [1.0, 1.0, 1.0],
            },
            3.0,
        )
        .unwrap();
        // node (1, 2, 3) is at (1.0, 1.0, 1.0)
        assert_eq!(sim.apply(&corner), 1);
        let snapshot = sim.geometry_snapshot();
        assert_eq!(snapshot.len(), grid.len());
        let idx = grid.flatten(1, 2, 3);
        assert_eq!(idx, snapshot.len() - 1);
        assert_eq!(snapshot[idx], 3.0);
        assert_eq!(sim.potential_snapshot()[idx], 3.0);
    }
}
