// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Electrode voxelization, potential solve, field sampling and particle
//! tracing.
//!
//! Phase order: electrodes → `SimulationBox::apply` → `SimulationBox::solve`
//! → `particles::propagate_many`.

pub mod distribution;
pub mod electrode;
pub mod field;
pub mod io;
pub mod particles;
pub mod simulation_box;
pub mod species;
