// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Species
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ion and electron species, and the conversion from particle records
//! (cm, keV, direction) to SI initial states.

use std::fmt;

use eltrace_types::config::ParticleRecord;
use eltrace_types::constants::{
    CARBON_MASS_NUMBER, CM, KEV_TO_JOULE, M_ELECTRON, M_HYDROGEN, OXYGEN_MASS_NUMBER, Q_ELECTRON,
};
use eltrace_types::error::{SimError, SimResult};

use crate::distribution::scaled_energies_j;
use crate::particles::Particle;

const MAX_CARBON_CHARGE: u8 = 6;
const MAX_OXYGEN_CHARGE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Species {
    Proton,
    Electron,
    /// Carbon ion with charge state `+n` (1..=6).
    Carbon(u8),
    /// Oxygen ion with charge state `+n` (1..=8).
    Oxygen(u8),
    /// Arbitrary mass (hydrogen masses) and charge (elementary charges).
    Custom { mass_mh: f64, charge_qe: f64 },
}

impl Species {
    /// Parse a built-in species tag (`Proton`, `Electron`, `C1`..`C6`,
    /// `O1`..`O8`). `Custom` needs its mass and charge and is not handled
    /// here.
    pub fn from_tag(tag: &str) -> Option<Species> {
        match tag {
            "Proton" => Some(Species::Proton),
            "Electron" => Some(Species::Electron),
            _ => {
                let (element, charge) = tag.split_at(tag.char_indices().nth(1)?.0);
                let n: u8 = charge.parse().ok()?;
                match element {
                    "C" if (1..=MAX_CARBON_CHARGE).contains(&n) => Some(Species::Carbon(n)),
                    "O" if (1..=MAX_OXYGEN_CHARGE).contains(&n) => Some(Species::Oxygen(n)),
                    _ => None,
                }
            }
        }
    }

    /// Species of a particle record, including `Custom`.
    pub fn from_record(record: &ParticleRecord) -> SimResult<Species> {
        if record.species == "Custom" {
            let mass_mh = record.mass_mh.ok_or_else(|| {
                SimError::malformed("particle", "Custom particle needs \"mass(in mH)\"")
            })?;
            let charge_qe = record.charge_qe.ok_or_else(|| {
                SimError::malformed("particle", "Custom particle needs \"charge (in qe)\"")
            })?;
            if !mass_mh.is_finite() || mass_mh <= 0.0 {
                return Err(SimError::malformed(
                    "particle",
                    format!("custom mass must be finite and > 0, got {mass_mh}"),
                ));
            }
            if !charge_qe.is_finite() {
                return Err(SimError::malformed(
                    "particle",
                    format!("custom charge must be finite, got {charge_qe}"),
                ));
            }
            return Ok(Species::Custom { mass_mh, charge_qe });
        }
        Species::from_tag(&record.species).ok_or_else(|| {
            SimError::malformed(
                "particle",
                format!("unknown particle type '{}'", record.species),
            )
        })
    }

    pub fn mass_kg(&self) -> f64 {
        match *self {
            Species::Proton => M_HYDROGEN,
            Species::Electron => M_ELECTRON,
            Species::Carbon(_) => CARBON_MASS_NUMBER * M_HYDROGEN,
            Species::Oxygen(_) => OXYGEN_MASS_NUMBER * M_HYDROGEN,
            Species::Custom { mass_mh, .. } => mass_mh * M_HYDROGEN,
        }
    }

    pub fn charge_c(&self) -> f64 {
        match *self {
            Species::Proton => Q_ELECTRON,
            Species::Electron => -Q_ELECTRON,
            Species::Carbon(n) | Species::Oxygen(n) => n as f64 * Q_ELECTRON,
            Species::Custom { charge_qe, .. } => charge_qe * Q_ELECTRON,
        }
    }

    /// Particle launched from `position_m` along `direction` with kinetic
    /// energy `energy_j`.
    pub fn launch(
        &self,
        position_m: [f64; 3],
        direction: [f64; 3],
        energy_j: f64,
    ) -> SimResult<Particle> {
        if !energy_j.is_finite() || energy_j < 0.0 {
            return Err(SimError::PhysicsViolation(format!(
                "kinetic energy must be finite and >= 0, got {energy_j}"
            )));
        }
        let velocity = launch_velocity(direction, energy_j, self.mass_kg())?;
        Particle::new(position_m, velocity, self.charge_c(), self.mass_kg())
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Proton => f.write_str("Proton"),
            Species::Electron => f.write_str("Electron"),
            Species::Carbon(n) => write!(f, "C{n}"),
            Species::Oxygen(n) => write!(f, "O{n}"),
            Species::Custom { mass_mh, charge_qe } => {
                write!(f, "Custom({mass_mh} mH, {charge_qe} qe)")
            }
        }
    }
}

/// Non-relativistic launch velocity `sqrt(2E/m)` along the normalised
/// `direction`. A zero direction gives a particle at rest.
pub fn launch_velocity(direction: [f64; 3], energy_j: f64, mass_kg: f64) -> SimResult<[f64; 3]> {
    if direction.iter().any(|d| !d.is_finite()) {
        return Err(SimError::PhysicsViolation(
            "launch direction must be finite".to_string(),
        ));
    }
    let norm = (direction[0] * direction[0]
        + direction[1] * direction[1]
        + direction[2] * direction[2])
        .sqrt();
    if norm == 0.0 {
        return Ok([0.0; 3]);
    }
    let speed = (2.0 * energy_j / mass_kg).sqrt();
    Ok([
        speed * direction[0] / norm,
        speed * direction[1] / norm,
        speed * direction[2] / norm,
    ])
}

/// Build the initial particle described by a record.
pub fn particle_from_record(record: &ParticleRecord) -> SimResult<Particle> {
    let species = Species::from_record(record)?;
    let position = [record.x * CM, record.y * CM, record.z * CM];
    let direction = [record.dir_x, record.dir_y, record.dir_z];
    species.launch(position, direction, record.energy_kev * KEV_TO_JOULE)
}

/// `count` particles of one species from a common origin and direction,
/// with energies graded from `high_kev` down to `low_kev`.
pub fn seed_beam(
    species: Species,
    position_m: [f64; 3],
    direction: [f64; 3],
    low_kev: f64,
    high_kev: f64,
    count: usize,
    steepness: f64,
) -> SimResult<Vec<Particle>> {
    scaled_energies_j(low_kev, high_kev, count, steepness)?
        .into_iter()
        .map(|energy_j| species.launch(position_m, direction, energy_j))
        .collect()
}
