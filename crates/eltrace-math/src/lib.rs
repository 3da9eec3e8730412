// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Numerical kernels for the electrode tracer: Laplace relaxation and
//! small dense solves.

pub mod linalg;
pub mod relaxation;
