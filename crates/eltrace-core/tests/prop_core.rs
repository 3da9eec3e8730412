// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Property-Based Tests (proptest) for eltrace-core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for eltrace-core using proptest.
//!
//! Covers: voxelization (membership, overwrite order, electrode values
//! surviving relaxation), the Boris push (speed under pure magnetic
//! rotation, trajectory bookkeeping) and species launch energies.

use eltrace_core::electrode::{Electrode, ElectrodeSpec};
use eltrace_core::particles::{boris_push_step, propagate, Particle, ParticleState};
use eltrace_core::simulation_box::SimulationBox;
use eltrace_core::species::Species;
use eltrace_types::config::PushConfig;
use eltrace_types::constants::{KEV_TO_JOULE, M_HYDROGEN, Q_ELECTRON};
use eltrace_types::state::Grid3D;
use proptest::prelude::*;

fn unit_grid(n: usize) -> Grid3D {
    Grid3D::new(n, n, n, 1.0, 1.0, 1.0).unwrap()
}

// ── Voxelization Properties ──────────────────────────────────────────

proptest! {
    /// A node is fixed exactly when the sphere contains its position, and
    /// relaxation never moves it afterwards.
    #[test]
    fn sphere_membership_fixes_nodes(
        n in 4usize..10,
        cx in 0.0f64..1.0, cy in 0.0f64..1.0, cz in 0.0f64..1.0,
        radius in 0.05f64..0.6,
        potential in -1000.0f64..1000.0,
    ) {
        let grid = unit_grid(n);
        let sphere = Electrode::Sphere { center: [cx, cy, cz], radius };
        let spec = ElectrodeSpec::new(sphere, potential).unwrap();
        let mut sim = SimulationBox::new(grid, 0.0);
        let claimed = sim.apply(&spec);

        let mut expected = 0;
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let inside = sphere.contains(grid.position(i, j, k));
                    prop_assert_eq!(sim.is_fixed(i, j, k), Some(inside));
                    if inside {
                        expected += 1;
                        prop_assert_eq!(sim.potential()[[i, j, k]], potential);
                    }
                }
            }
        }
        prop_assert_eq!(claimed, expected);

        sim.solve("red-black", 25, 0.0).unwrap();
        for ((i, j, k), &fixed) in sim.fixed_mask().indexed_iter() {
            if fixed {
                prop_assert_eq!(sim.potential()[[i, j, k]], potential);
            }
        }
    }

    /// Where two electrodes overlap, the one applied last owns the node.
    #[test]
    fn later_electrode_wins_overlap(
        n in 4usize..9,
        split in 0.2f64..0.8,
        overlap in 0.05f64..0.3,
        v_first in -500.0f64..500.0,
        v_second in -500.0f64..500.0,
    ) {
        let grid = unit_grid(n);
        let first = Electrode::AxisAlignedBox { min: [0.0; 3], max: [split + overlap, 1.0, 1.0] };
        let second = Electrode::AxisAlignedBox { min: [split, 0.0, 0.0], max: [1.0; 3] };
        let mut sim = SimulationBox::new(grid, 0.0);
        sim.apply_all([
            &ElectrodeSpec::new(first, v_first).unwrap(),
            &ElectrodeSpec::new(second, v_second).unwrap(),
        ]);

        for ((i, j, k), &v) in sim.potential().indexed_iter() {
            let p = grid.position(i, j, k);
            if second.contains(p) {
                prop_assert_eq!(v, v_second);
            } else if first.contains(p) {
                prop_assert_eq!(v, v_first);
            }
            prop_assert_eq!(sim.geometry()[[i, j, k]], v);
        }
    }
}

// ── Particle Push Properties ─────────────────────────────────────────

proptest! {
    /// With no electric field the Boris rotation preserves speed.
    #[test]
    fn magnetic_rotation_preserves_speed(
        vx in -1e6f64..1e6, vy in -1e6f64..1e6, vz in -1e6f64..1e6,
        bx in -2.0f64..2.0, by in -2.0f64..2.0, bz in -2.0f64..2.0,
        steps in 1usize..400,
    ) {
        let mut p = Particle::new([0.5; 3], [vx, vy, vz], Q_ELECTRON, M_HYDROGEN).unwrap();
        let speed_0 = (vx * vx + vy * vy + vz * vz).sqrt();
        for _ in 0..steps {
            boris_push_step(&mut p, [0.0; 3], [bx, by, bz], 1e-9).unwrap();
        }
        let v = p.velocity;
        let speed = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        prop_assert!((speed - speed_0).abs() <= 1e-12 * speed_0.max(1.0));
    }

    /// One trajectory point per completed step, never more than the budget,
    /// and every point before the last was a legal free node.
    #[test]
    fn trajectory_tracks_completed_steps(
        x in 0.0f64..1.0, y in 0.0f64..1.0, z in 0.0f64..1.0,
        vx in -5e7f64..5e7, vy in -5e7f64..5e7, vz in -5e7f64..5e7,
        budget in 0usize..300,
    ) {
        let grid = unit_grid(9);
        let mut sim = SimulationBox::new(grid, 0.0);
        sim.apply(&ElectrodeSpec::new(
            Electrode::Sphere { center: [0.5; 3], radius: 0.2 },
            300.0,
        ).unwrap());
        sim.solve("gauss-seidel", 200, 1e-6).unwrap();

        let push = PushConfig {
            t_max_s: budget as f64 * 1e-9 + 5e-10,
            dt_s: 1e-9,
            magnetic_field_t: [0.0, 0.0, 0.5],
        };
        let mut p = Particle::new([x, y, z], [vx, vy, vz], Q_ELECTRON, M_HYDROGEN).unwrap();
        let state = propagate(&mut p, &sim, &push).unwrap();

        prop_assert!(state.is_terminal());
        prop_assert_eq!(p.state(), state);
        prop_assert_eq!(p.trajectory().len(), p.steps_taken());
        prop_assert!(p.steps_taken() <= push.steps());
        if state == ParticleState::TimeExhausted {
            prop_assert_eq!(p.steps_taken(), budget);
        }
        let settled = p.trajectory().len().saturating_sub(1);
        for point in &p.trajectory()[..settled] {
            prop_assert!(grid.contains_position(*point));
            let (i, j, k) = grid.node_of(*point).unwrap();
            prop_assert_eq!(sim.is_fixed(i, j, k), Some(false));
        }
    }

    /// Launching at energy E along any non-zero direction yields kinetic energy E.
    #[test]
    fn launch_energy_matches_request(
        energy_kev in 0.001f64..500.0,
        dx in -1.0f64..1.0, dy in -1.0f64..1.0, dz in -1.0f64..1.0,
        charge in 1u8..7,
    ) {
        prop_assume!(dx.abs() + dy.abs() + dz.abs() > 1e-3);
        let energy_j = energy_kev * KEV_TO_JOULE;
        let p = Species::Carbon(charge)
            .launch([0.1, 0.1, 0.1], [dx, dy, dz], energy_j)
            .unwrap();
        prop_assert!((p.kinetic_energy_j() - energy_j).abs() <= 1e-12 * energy_j);
        prop_assert_eq!(p.charge_c, charge as f64 * Q_ELECTRON);
    }
}
