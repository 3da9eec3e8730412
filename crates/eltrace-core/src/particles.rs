// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Particles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Charged test particles pushed through the relaxed electrode field with
//! the Boris integrator.
//!
//! The field is sampled at the node obtained by truncating the position
//! (no interpolation) and the magnetic field is uniform. Particles never
//! feed back into the potential, so a batch is pushed in parallel against
//! one shared `&SimulationBox`.

use std::fmt;

use eltrace_types::config::PushConfig;
use eltrace_types::error::{SimError, SimResult};
use rayon::prelude::*;

use crate::field::sample_electric_field;
use crate::simulation_box::SimulationBox;

/// Integration state. Everything except `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleState {
    Active,
    /// Position left the half-open box `[0, L)` on some axis.
    LeftDomain,
    /// Truncated node index fell outside the grid.
    ReachedGridEdge,
    /// Truncated node is an electrode node.
    HitElectrode,
    /// The step budget `floor(t_max / dt)` ran out.
    TimeExhausted,
}

impl ParticleState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ParticleState::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleState::Active => "active",
            ParticleState::LeftDomain => "left-domain",
            ParticleState::ReachedGridEdge => "reached-grid-edge",
            ParticleState::HitElectrode => "hit-electrode",
            ParticleState::TimeExhausted => "time-exhausted",
        }
    }
}

impl fmt::Display for ParticleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Charged test particle (SI units).
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub charge_c: f64,
    pub mass_kg: f64,
    trajectory: Vec<[f64; 3]>,
    speed_m_s: f64,
    kinetic_energy_j: f64,
    state: ParticleState,
    steps_taken: usize,
}

impl Particle {
    pub fn new(
        position: [f64; 3],
        velocity: [f64; 3],
        charge_c: f64,
        mass_kg: f64,
    ) -> SimResult<Self> {
        let mut particle = Particle {
            position,
            velocity,
            charge_c,
            mass_kg,
            trajectory: Vec::new(),
            speed_m_s: 0.0,
            kinetic_energy_j: 0.0,
            state: ParticleState::Active,
            steps_taken: 0,
        };
        validate_particle_state(&particle, "particle")?;
        if position.iter().any(|x| !x.is_finite()) {
            return Err(SimError::PhysicsViolation(
                "particle position components must be finite".to_string(),
            ));
        }
        particle.refresh_kinematics();
        Ok(particle)
    }

    /// Positions after each completed step. Append-only.
    pub fn trajectory(&self) -> &[[f64; 3]] {
        &self.trajectory
    }

    /// Speed at creation, refreshed on termination.
    pub fn speed_m_s(&self) -> f64 {
        self.speed_m_s
    }

    /// Non-relativistic kinetic energy [J] at creation, refreshed on termination.
    pub fn kinetic_energy_j(&self) -> f64 {
        self.kinetic_energy_j
    }

    pub fn state(&self) -> ParticleState {
        self.state
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    fn refresh_kinematics(&mut self) {
        let v = dot(self.velocity, self.velocity).sqrt();
        self.speed_m_s = v;
        self.kinetic_energy_j = 0.5 * self.mass_kg * v * v;
    }

    fn finish(&mut self, state: ParticleState) -> ParticleState {
        self.state = state;
        self.refresh_kinematics();
        log::info!(
            "particle terminated ({state}) after {} steps, E = {:e} J",
            self.steps_taken,
            self.kinetic_energy_j
        );
        state
    }
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn validate_particle_state(particle: &Particle, label: &str) -> SimResult<()> {
    if particle.velocity.iter().any(|v| !v.is_finite()) {
        return Err(SimError::PhysicsViolation(format!(
            "{label} velocity components must be finite"
        )));
    }
    if !particle.charge_c.is_finite() {
        return Err(SimError::PhysicsViolation(format!(
            "{label}.charge_c must be finite"
        )));
    }
    if !particle.mass_kg.is_finite() || particle.mass_kg <= 0.0 {
        return Err(SimError::PhysicsViolation(format!(
            "{label}.mass_kg must be finite and > 0"
        )));
    }
    Ok(())
}

/// Advance one particle by one Boris step: half electric kick, magnetic
/// rotation, half electric kick, then drift. The trajectory is not touched.
pub fn boris_push_step(
    particle: &mut Particle,
    electric_v_m: [f64; 3],
    magnetic_t: [f64; 3],
    dt_s: f64,
) -> SimResult<()> {
    if !dt_s.is_finite() || dt_s <= 0.0 {
        return Err(SimError::PhysicsViolation(format!(
            "Boris step needs finite dt > 0, got {dt_s}"
        )));
    }
    validate_particle_state(particle, "particle")?;

    let qmdt2 = particle.charge_c * dt_s / (2.0 * particle.mass_kg);
    let v_minus = [
        particle.velocity[0] + qmdt2 * electric_v_m[0],
        particle.velocity[1] + qmdt2 * electric_v_m[1],
        particle.velocity[2] + qmdt2 * electric_v_m[2],
    ];

    let t = [
        qmdt2 * magnetic_t[0],
        qmdt2 * magnetic_t[1],
        qmdt2 * magnetic_t[2],
    ];
    let t2 = dot(t, t);
    let s = [
        (2.0 * t[0]) / (1.0 + t2),
        (2.0 * t[1]) / (1.0 + t2),
        (2.0 * t[2]) / (1.0 + t2),
    ];

    let v_prime = {
        let c = cross(v_minus, t);
        [v_minus[0] + c[0], v_minus[1] + c[1], v_minus[2] + c[2]]
    };
    let v_plus = {
        let c = cross(v_prime, s);
        [v_minus[0] + c[0], v_minus[1] + c[1], v_minus[2] + c[2]]
    };

    particle.velocity = [
        v_plus[0] + qmdt2 * electric_v_m[0],
        v_plus[1] + qmdt2 * electric_v_m[1],
        v_plus[2] + qmdt2 * electric_v_m[2],
    ];
    for d in 0..3 {
        particle.position[d] += particle.velocity[d] * dt_s;
    }
    Ok(())
}

/// Push `particle` through the solved box until it terminates.
///
/// Before every step: domain check, node lookup, electrode check. A
/// particle that is already terminal is left untouched.
pub fn propagate(
    particle: &mut Particle,
    sim: &SimulationBox,
    push: &PushConfig,
) -> SimResult<ParticleState> {
    if particle.state.is_terminal() {
        return Ok(particle.state);
    }
    push.validate()?;
    validate_particle_state(particle, "particle")?;

    let grid = sim.grid();
    let steps = push.steps();
    particle.trajectory.reserve(steps.saturating_sub(particle.steps_taken));

    while particle.steps_taken < steps {
        if !grid.contains_position(particle.position) {
            return Ok(particle.finish(ParticleState::LeftDomain));
        }
        let Some((i, j, k)) = grid.node_of(particle.position) else {
            return Ok(particle.finish(ParticleState::ReachedGridEdge));
        };
        if sim.is_fixed(i, j, k) == Some(true) {
            return Ok(particle.finish(ParticleState::HitElectrode));
        }

        let e = sample_electric_field(sim.potential(), grid, i, j, k);
        boris_push_step(particle, e, push.magnetic_field_t, push.dt_s)?;
        particle.trajectory.push(particle.position);
        particle.steps_taken += 1;
    }

    Ok(particle.finish(ParticleState::TimeExhausted))
}

/// Push a batch of independent particles in parallel.
pub fn propagate_many(
    particles: &mut [Particle],
    sim: &SimulationBox,
    push: &PushConfig,
) -> SimResult<Vec<ParticleState>> {
    push.validate()?;
    particles
        .par_iter_mut()
        .map(|particle| propagate(particle, sim, push))
        .collect()
}

/// Terminal-state tally and energy statistics of a particle batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticlePopulationSummary {
    pub count: usize,
    pub active: usize,
    pub left_domain: usize,
    pub reached_grid_edge: usize,
    pub hit_electrode: usize,
    pub time_exhausted: usize,
    pub mean_energy_j: f64,
    pub max_energy_j: f64,
}

pub fn summarize_particle_population(particles: &[Particle]) -> ParticlePopulationSummary {
    let mut summary = ParticlePopulationSummary {
        count: particles.len(),
        active: 0,
        left_domain: 0,
        reached_grid_edge: 0,
        hit_electrode: 0,
        time_exhausted: 0,
        mean_energy_j: 0.0,
        max_energy_j: 0.0,
    };
    if particles.is_empty() {
        return summary;
    }

    let mut total = 0.0;
    for particle in particles {
        match particle.state() {
            ParticleState::Active => summary.active += 1,
            ParticleState::LeftDomain => summary.left_domain += 1,
            ParticleState::ReachedGridEdge => summary.reached_grid_edge += 1,
            ParticleState::HitElectrode => summary.hit_electrode += 1,
            ParticleState::TimeExhausted => summary.time_exhausted += 1,
        }
        let energy = particle.kinetic_energy_j();
        total += energy;
        summary.max_energy_j = summary.max_energy_j.max(energy);
    }
    summary.mean_energy_j = total / particles.len() as f64;
    summary
}
