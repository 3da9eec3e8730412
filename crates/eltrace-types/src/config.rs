// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::CM;
use crate::error::{SimError, SimResult};
use crate::state::Grid3D;

/// Top-level simulation configuration.
/// Maps 1:1 to the `config.json` written by the geometry editor.
/// Lengths are in centimetres, the magnetic field in tesla.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    #[serde(rename = "Lx")]
    pub lx_cm: f64,
    #[serde(rename = "Ly")]
    pub ly_cm: f64,
    #[serde(rename = "Lz")]
    pub lz_cm: f64,
    #[serde(rename = "Bx", default)]
    pub bx: f64,
    #[serde(rename = "By", default)]
    pub by: f64,
    #[serde(rename = "Bz", default)]
    pub bz: f64,
    /// Relaxation method token: "jacobi", "gauss-seidel" or "red-black".
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Convergence threshold on the max nodewise change per sweep [V].
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Total simulated particle time [s].
    #[serde(default = "default_t_max")]
    pub t_max: f64,
    /// Particle timestep [s].
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Initial potential of every node before electrodes are applied [V].
    #[serde(default)]
    pub potential_offset: f64,
}

fn default_method() -> String {
    RelaxationMethod::Jacobi.as_str().to_string()
}
fn default_max_iter() -> usize {
    1000
}
fn default_tol() -> f64 {
    1e-4
}
fn default_t_max() -> f64 {
    1e-7
}
fn default_dt() -> f64 {
    1e-11
}

impl SimulationConfig {
    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Check everything that would otherwise fail half-way through a run.
    pub fn validate(&self) -> SimResult<()> {
        self.create_grid()?;
        self.relaxation_method()?;
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(SimError::ConfigError(format!(
                "tol must be finite and >= 0, got {}",
                self.tol
            )));
        }
        self.push_config().validate()?;
        Ok(())
    }

    /// Grid in metres.
    pub fn create_grid(&self) -> SimResult<Grid3D> {
        Grid3D::new(
            self.nx,
            self.ny,
            self.nz,
            self.lx_cm * CM,
            self.ly_cm * CM,
            self.lz_cm * CM,
        )
    }

    pub fn relaxation_method(&self) -> SimResult<RelaxationMethod> {
        self.method.parse()
    }

    pub fn magnetic_field(&self) -> [f64; 3] {
        [self.bx, self.by, self.bz]
    }

    pub fn push_config(&self) -> PushConfig {
        PushConfig {
            t_max_s: self.t_max,
            dt_s: self.dt,
            magnetic_field_t: self.magnetic_field(),
        }
    }
}

/// Relaxation update discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelaxationMethod {
    /// Synchronous update: every node reads the previous sweep.
    Jacobi,
    /// In-place update in a fixed traversal order.
    GaussSeidel,
    /// Two-colour parity Gauss-Seidel; each colour pass is order-independent.
    RedBlack,
}

impl RelaxationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelaxationMethod::Jacobi => "jacobi",
            RelaxationMethod::GaussSeidel => "gauss-seidel",
            RelaxationMethod::RedBlack => "red-black",
        }
    }
}

impl FromStr for RelaxationMethod {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s {
            "jacobi" => Ok(RelaxationMethod::Jacobi),
            "gauss-seidel" => Ok(RelaxationMethod::GaussSeidel),
            "red-black" => Ok(RelaxationMethod::RedBlack),
            other => Err(SimError::ConfigError(format!(
                "unknown relaxation method '{other}' (expected jacobi, gauss-seidel or red-black)"
            ))),
        }
    }
}

impl fmt::Display for RelaxationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Particle integration settings. The magnetic field is uniform and is
/// passed explicitly to every propagate call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushConfig {
    pub t_max_s: f64,
    pub dt_s: f64,
    pub magnetic_field_t: [f64; 3],
}

impl PushConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !self.dt_s.is_finite() || self.dt_s <= 0.0 {
            return Err(SimError::ConfigError(format!(
                "dt must be finite and > 0, got {}",
                self.dt_s
            )));
        }
        if !self.t_max_s.is_finite() || self.t_max_s < 0.0 {
            return Err(SimError::ConfigError(format!(
                "t_max must be finite and >= 0, got {}",
                self.t_max_s
            )));
        }
        if self.magnetic_field_t.iter().any(|b| !b.is_finite()) {
            return Err(SimError::ConfigError(
                "magnetic field components must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of integration steps, `floor(t_max / dt)`.
    pub fn steps(&self) -> usize {
        (self.t_max_s / self.dt_s).floor() as usize
    }
}

/// Coordinate axis selector for axial primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse the optional axis string of a record: only its first character
    /// counts, and an absent or empty string means `z`.
    pub fn from_record(raw: Option<&str>) -> SimResult<Axis> {
        match raw.and_then(|s| s.chars().next()) {
            None => Ok(Axis::Z),
            Some('x') => Ok(Axis::X),
            Some('y') => Ok(Axis::Y),
            Some('z') => Ok(Axis::Z),
            Some(c) => Err(SimError::malformed(
                "axis",
                format!("axis must start with x, y or z, got '{c}'"),
            )),
        }
    }
}

/// One electrode file: `{"electrodes": [ ... ]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectrodeFile {
    pub electrodes: Vec<ElectrodeRecord>,
}

/// Electrode record as written by the geometry editor. Lengths in cm,
/// potential in volts. Plate normals `A, B, C` are unitless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElectrodeRecord {
    Plate {
        #[serde(rename = "A")]
        a: f64,
        #[serde(rename = "B")]
        b: f64,
        #[serde(rename = "C")]
        c: f64,
        #[serde(rename = "D")]
        d: f64,
        thickness: f64,
        potential: f64,
    },
    Cylinder {
        cx: f64,
        cy: f64,
        cz: f64,
        radius: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        axis: Option<String>,
        potential: f64,
    },
    HollowRod {
        cx: f64,
        cy: f64,
        cz: f64,
        radius: f64,
        thickness: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        axis: Option<String>,
        potential: f64,
    },
    Box {
        x0: f64,
        y0: f64,
        z0: f64,
        x1: f64,
        y1: f64,
        z1: f64,
        potential: f64,
    },
    Spherical {
        cx: f64,
        cy: f64,
        cz: f64,
        radius: f64,
        potential: f64,
    },
    Ellipsoidal {
        cx: f64,
        cy: f64,
        cz: f64,
        rx: f64,
        ry: f64,
        rz: f64,
        potential: f64,
    },
    Hyperboloidal {
        cx: f64,
        cy: f64,
        cz: f64,
        a: f64,
        b: f64,
        c: f64,
        waist: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        axis: Option<String>,
        potential: f64,
    },
}

/// One particle file: `{"particle": [ ... ]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleFile {
    pub particle: Vec<ParticleRecord>,
}

/// Particle record as written by the particle editor.
/// Position in cm, kinetic energy in keV, direction unnormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Species tag: Proton, Electron, C1..C6, O1..O8 or Custom.
    #[serde(rename = "type")]
    pub species: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(rename = "Energy")]
    pub energy_kev: f64,
    #[serde(rename = "x̂")]
    pub dir_x: f64,
    #[serde(rename = "ŷ")]
    pub dir_y: f64,
    #[serde(rename = "ẑ")]
    pub dir_z: f64,
    /// Custom species only, in hydrogen masses.
    #[serde(rename = "mass(in mH)", default, skip_serializing_if = "Option::is_none")]
    pub mass_mh: Option<f64>,
    /// Custom species only, in elementary charges.
    #[serde(rename = "charge (in qe)", default, skip_serializing_if = "Option::is_none")]
    pub charge_qe: Option<f64>,
}
