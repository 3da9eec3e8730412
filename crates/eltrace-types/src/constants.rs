// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Centimetre in metres. Every length in the external records is in cm.
pub const CM: f64 = 1e-2;

/// Elementary charge (C)
pub const Q_ELECTRON: f64 = 1.602_176_634e-19;

/// Electron rest mass (kg)
pub const M_ELECTRON: f64 = 9.109_383_7e-31;

/// Hydrogen atom mass (kg), the mass unit of custom particle records
pub const M_HYDROGEN: f64 = 1.672_621_92e-27;

/// Carbon ion mass in units of M_HYDROGEN
pub const CARBON_MASS_NUMBER: f64 = 12.0;

/// Oxygen ion mass in units of M_HYDROGEN
pub const OXYGEN_MASS_NUMBER: f64 = 16.0;

/// 1 keV in joules
pub const KEV_TO_JOULE: f64 = 1.0e3 * Q_ELECTRON;
