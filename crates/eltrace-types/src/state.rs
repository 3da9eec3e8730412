// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::config::RelaxationMethod;
use crate::error::{SimError, SimResult};

/// Regular 3D node grid spanning `[0, lx] x [0, ly] x [0, lz]` (metres).
///
/// Node (i, j, k) sits at `(i*dx, j*dy, k*dz)` and has linear index
/// `i*ny*nz + j*nz + k`. Every array in the workspace uses this layout,
/// which is also the standard-order layout of an `Array3` of shape
/// `(nx, ny, nz)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid3D {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub lx: f64,
    pub ly: f64,
    pub lz: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Grid3D {
    /// Create a grid with `n` nodes per axis over extents `l` (metres).
    ///
    /// Each axis needs at least two nodes so the spacing `l/(n-1)` exists.
    pub fn new(nx: usize, ny: usize, nz: usize, lx: f64, ly: f64, lz: f64) -> SimResult<Self> {
        for (label, n) in [("nx", nx), ("ny", ny), ("nz", nz)] {
            if n < 2 {
                return Err(SimError::ConfigError(format!(
                    "{label} must be >= 2, got {n}"
                )));
            }
        }
        for (label, l) in [("lx", lx), ("ly", ly), ("lz", lz)] {
            if !l.is_finite() || l <= 0.0 {
                return Err(SimError::ConfigError(format!(
                    "{label} must be finite and > 0, got {l}"
                )));
            }
        }
        Ok(Grid3D {
            nx,
            ny,
            nz,
            lx,
            ly,
            lz,
            dx: lx / (nx - 1) as f64,
            dy: ly / (ny - 1) as f64,
            dz: lz / (nz - 1) as f64,
        })
    }

    /// Array shape `(nx, ny, nz)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Total node count.
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flatten(&self, i: usize, j: usize, k: usize) -> usize {
        i * self.ny * self.nz + j * self.nz + k
    }

    pub fn unflatten(&self, idx: usize) -> (usize, usize, usize) {
        let plane = self.ny * self.nz;
        (idx / plane, (idx % plane) / self.nz, idx % self.nz)
    }

    /// Checked variant of [`Grid3D::flatten`].
    pub fn try_flatten(&self, i: usize, j: usize, k: usize) -> SimResult<usize> {
        if self.contains_index(i, j, k) {
            Ok(self.flatten(i, j, k))
        } else {
            Err(SimError::GridOutOfBounds { i, j, k })
        }
    }

    pub fn contains_index(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.nx && j < self.ny && k < self.nz
    }

    /// Physical position of node (i, j, k).
    pub fn position(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        [i as f64 * self.dx, j as f64 * self.dy, k as f64 * self.dz]
    }

    /// Half-open box test: `0 <= x < lx` per axis. Non-finite positions are outside.
    pub fn contains_position(&self, pos: [f64; 3]) -> bool {
        (0.0..self.lx).contains(&pos[0])
            && (0.0..self.ly).contains(&pos[1])
            && (0.0..self.lz).contains(&pos[2])
    }

    /// Node index by truncating division of the position by the spacing.
    ///
    /// Returns `None` when the truncated index falls outside the grid.
    /// Callers are expected to have checked [`Grid3D::contains_position`].
    pub fn node_of(&self, pos: [f64; 3]) -> Option<(usize, usize, usize)> {
        let ti = (pos[0] / self.dx).trunc();
        let tj = (pos[1] / self.dy).trunc();
        let tk = (pos[2] / self.dz).trunc();
        if ti < 0.0 || tj < 0.0 || tk < 0.0 || !ti.is_finite() || !tj.is_finite() || !tk.is_finite()
        {
            return None;
        }
        let (i, j, k) = (ti as usize, tj as usize, tk as usize);
        self.contains_index(i, j, k).then_some((i, j, k))
    }
}

/// Outcome of one relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationReport {
    pub method: RelaxationMethod,
    pub converged: bool,
    /// Completed sweeps.
    pub iterations: usize,
    /// Max absolute nodewise change of the last sweep [V].
    pub max_change: f64,
}
