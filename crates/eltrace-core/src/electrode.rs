// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Electrode Primitives
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Analytic electrode shapes and their membership predicates.
//!
//! All coordinates are metres in the grid frame (origin at node (0,0,0)).
//! Boundary conventions are inclusive everywhere; a node lying exactly on
//! a surface belongs to the electrode.

use eltrace_types::config::{Axis, ElectrodeRecord};
use eltrace_types::constants::CM;
use eltrace_types::error::{SimError, SimResult};

/// Closed-form electrode geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Electrode {
    Sphere {
        center: [f64; 3],
        radius: f64,
    },
    AxisAlignedBox {
        min: [f64; 3],
        max: [f64; 3],
    },
    /// Solid cylinder. `base` is the centre of the end cap; the body
    /// extends `height` along +axis.
    Cylinder {
        base: [f64; 3],
        radius: f64,
        height: f64,
        axis: Axis,
    },
    /// Cylindrical shell of wall `thickness` centred on `radius`.
    HollowPipe {
        base: [f64; 3],
        radius: f64,
        thickness: f64,
        height: f64,
        axis: Axis,
    },
    Ellipsoid {
        center: [f64; 3],
        semi_axes: [f64; 3],
    },
    /// Quadric `Σ ±((p - c)/s)² <= waist²` with the selected axis negative.
    Hyperboloid {
        center: [f64; 3],
        scale: [f64; 3],
        waist: f64,
        axis: Axis,
    },
    /// Slab `|A x + B y + C z + D| / |(A,B,C)| <= thickness/2`.
    Plane {
        normal: [f64; 3],
        offset: f64,
        thickness: f64,
    },
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

/// Squared distance from the axis line through `base`, plus the axial
/// coordinate of `p`.
#[inline]
fn radial_and_axial(p: [f64; 3], base: [f64; 3], axis: Axis) -> (f64, f64) {
    let a = axis_index(axis);
    let mut r2 = 0.0;
    for d in 0..3 {
        if d != a {
            r2 += (p[d] - base[d]) * (p[d] - base[d]);
        }
    }
    (r2, p[a])
}

#[inline]
fn within_height(axial: f64, start: f64, height: f64) -> bool {
    axial >= start && axial <= start + height
}

fn require_finite(label: &str, values: &[f64]) -> SimResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SimError::ConfigError(format!("{label} must be finite")))
    }
}

fn require_non_negative(label: &str, value: f64) -> SimResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::ConfigError(format!(
            "{label} must be >= 0, got {value}"
        )))
    }
}

fn require_non_zero(label: &str, values: &[f64]) -> SimResult<()> {
    if values.iter().all(|v| *v != 0.0) {
        Ok(())
    } else {
        Err(SimError::ConfigError(format!("{label} must be non-zero")))
    }
}

impl Electrode {
    /// Membership test at physical position `p`.
    pub fn contains(&self, p: [f64; 3]) -> bool {
        match *self {
            Electrode::Sphere { center, radius } => {
                let dist = ((p[0] - center[0]) * (p[0] - center[0])
                    + (p[1] - center[1]) * (p[1] - center[1])
                    + (p[2] - center[2]) * (p[2] - center[2]))
                    .sqrt();
                dist <= radius
            }
            Electrode::AxisAlignedBox { min, max } => {
                (0..3).all(|d| p[d] >= min[d] && p[d] <= max[d])
            }
            Electrode::Cylinder {
                base,
                radius,
                height,
                axis,
            } => {
                let (r2, axial) = radial_and_axial(p, base, axis);
                r2 <= radius * radius && within_height(axial, base[axis_index(axis)], height)
            }
            Electrode::HollowPipe {
                base,
                radius,
                thickness,
                height,
                axis,
            } => {
                let r_outer2 = (radius + thickness / 2.0) * (radius + thickness / 2.0);
                let r_inner2 = (radius - thickness / 2.0) * (radius - thickness / 2.0);
                let (r2, axial) = radial_and_axial(p, base, axis);
                r2 >= r_inner2
                    && r2 <= r_outer2
                    && within_height(axial, base[axis_index(axis)], height)
            }
            Electrode::Ellipsoid { center, semi_axes } => {
                let mut value = 0.0;
                for d in 0..3 {
                    let u = (p[d] - center[d]) / semi_axes[d];
                    value += u * u;
                }
                value <= 1.0
            }
            Electrode::Hyperboloid {
                center,
                scale,
                waist,
                axis,
            } => {
                let negative = axis_index(axis);
                let mut value = 0.0;
                for d in 0..3 {
                    let u = (p[d] - center[d]) / scale[d];
                    if d == negative {
                        value -= u * u;
                    } else {
                        value += u * u;
                    }
                }
                value <= waist * waist
            }
            Electrode::Plane {
                normal,
                offset,
                thickness,
            } => {
                let norm = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2])
                    .sqrt();
                let dist = (normal[0] * p[0] + normal[1] * p[1] + normal[2] * p[2] + offset) / norm;
                dist.abs() <= thickness / 2.0
            }
        }
    }

    /// Reject parameters that would make the predicate meaningless
    /// (non-finite values, zero divisors, negative lengths).
    pub fn validate(&self) -> SimResult<()> {
        match *self {
            Electrode::Sphere { center, radius } => {
                require_finite("sphere center", &center[..])?;
                require_finite("sphere radius", &[radius])?;
                require_non_negative("sphere radius", radius)
            }
            Electrode::AxisAlignedBox { min, max } => {
                require_finite("box corner", &min[..])?;
                require_finite("box corner", &max[..])
            }
            Electrode::Cylinder {
                base,
                radius,
                height,
                ..
            } => {
                require_finite("cylinder parameters", &[base[0], base[1], base[2], radius, height])?;
                require_non_negative("cylinder radius", radius)?;
                require_non_negative("cylinder height", height)
            }
            Electrode::HollowPipe {
                base,
                radius,
                thickness,
                height,
                ..
            } => {
                require_finite(
                    "hollow pipe parameters",
                    &[base[0], base[1], base[2], radius, thickness, height],
                )?;
                require_non_negative("hollow pipe radius", radius)?;
                require_non_negative("hollow pipe thickness", thickness)?;
                require_non_negative("hollow pipe height", height)
            }
            Electrode::Ellipsoid { center, semi_axes } => {
                require_finite("ellipsoid center", &center[..])?;
                require_finite("ellipsoid semi-axes", &semi_axes[..])?;
                require_non_zero("ellipsoid semi-axes", &semi_axes[..])
            }
            Electrode::Hyperboloid {
                center,
                scale,
                waist,
                ..
            } => {
                require_finite("hyperboloid center", &center[..])?;
                require_finite("hyperboloid parameters", &[scale[0], scale[1], scale[2], waist])?;
                require_non_zero("hyperboloid a, b, c", &scale[..])
            }
            Electrode::Plane {
                normal,
                offset,
                thickness,
            } => {
                require_finite("plane coefficients", &[normal[0], normal[1], normal[2], offset])?;
                require_finite("plane thickness", &[thickness])?;
                require_non_negative("plane thickness", thickness)?;
                if normal.iter().all(|c| *c == 0.0) {
                    return Err(SimError::ConfigError(
                        "plane normal (A, B, C) must be non-zero".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// An electrode shape with the potential it pins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectrodeSpec {
    pub shape: Electrode,
    pub potential: f64,
}

impl ElectrodeSpec {
    pub fn new(shape: Electrode, potential: f64) -> SimResult<Self> {
        shape.validate()?;
        if !potential.is_finite() {
            return Err(SimError::ConfigError(format!(
                "potential must be finite, got {potential}"
            )));
        }
        Ok(ElectrodeSpec { shape, potential })
    }

    /// Convert an editor record (centimetres) into metres.
    ///
    /// Plate normals are unitless; only `D` and `thickness` are scaled.
    pub fn from_record(record: &ElectrodeRecord) -> SimResult<Self> {
        let cm3 = |x: f64, y: f64, z: f64| [x * CM, y * CM, z * CM];
        let axis = |raw: &Option<String>| Axis::from_record(raw.as_deref());

        let (shape, potential) = match record {
            ElectrodeRecord::Plate {
                a,
                b,
                c,
                d,
                thickness,
                potential,
            } => (
                Electrode::Plane {
                    normal: [*a, *b, *c],
                    offset: d * CM,
                    thickness: thickness * CM,
                },
                *potential,
            ),
            ElectrodeRecord::Cylinder {
                cx,
                cy,
                cz,
                radius,
                height,
                axis: raw_axis,
                potential,
            } => (
                Electrode::Cylinder {
                    base: cm3(*cx, *cy, *cz),
                    radius: radius * CM,
                    height: height * CM,
                    axis: axis(raw_axis)?,
                },
                *potential,
            ),
            ElectrodeRecord::HollowRod {
                cx,
                cy,
                cz,
                radius,
                thickness,
                height,
                axis: raw_axis,
                potential,
            } => (
                Electrode::HollowPipe {
                    base: cm3(*cx, *cy, *cz),
                    radius: radius * CM,
                    thickness: thickness * CM,
                    height: height * CM,
                    axis: axis(raw_axis)?,
                },
                *potential,
            ),
            ElectrodeRecord::Box {
                x0,
                y0,
                z0,
                x1,
                y1,
                z1,
                potential,
            } => (
                Electrode::AxisAlignedBox {
                    min: cm3(*x0, *y0, *z0),
                    max: cm3(*x1, *y1, *z1),
                },
                *potential,
            ),
            ElectrodeRecord::Spherical {
                cx,
                cy,
                cz,
                radius,
                potential,
            } => (
                Electrode::Sphere {
                    center: cm3(*cx, *cy, *cz),
                    radius: radius * CM,
                },
                *potential,
            ),
            ElectrodeRecord::Ellipsoidal {
                cx,
                cy,
                cz,
                rx,
                ry,
                rz,
                potential,
            } => (
                Electrode::Ellipsoid {
                    center: cm3(*cx, *cy, *cz),
                    semi_axes: cm3(*rx, *ry, *rz),
                },
                *potential,
            ),
            ElectrodeRecord::Hyperboloidal {
                cx,
                cy,
                cz,
                a,
                b,
                c,
                waist,
                axis: raw_axis,
                potential,
            } => (
                Electrode::Hyperboloid {
                    center: cm3(*cx, *cy, *cz),
                    scale: cm3(*a, *b, *c),
                    waist: waist * CM,
                    axis: axis(raw_axis)?,
                },
                *potential,
            ),
        };

        ElectrodeSpec::new(shape, potential)
    }
}
