// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Command-Line Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `eltrace [WORKDIR]`
//!
//! Reads `config.json`, `ElectrodeConfig_<n>.json` and
//! `ParticleConfig_<n>.json` from WORKDIR (default `.`) and writes
//! `geometry.txt`, `potential.txt`, `electric_field.txt` and one
//! `particle_track_<n>.txt` per particle next to them.

use std::env;
use std::path::Path;

use eltrace_core::field::electric_field_map;
use eltrace_core::io;
use eltrace_core::particles::{propagate_many, summarize_particle_population};
use eltrace_core::simulation_box::SimulationBox;
use eltrace_types::config::SimulationConfig;
use eltrace_types::error::SimResult;
use ndarray::Zip;

fn run(workdir: &Path) -> SimResult<()> {
    let config = SimulationConfig::from_file(workdir.join("config.json"))?;
    config.validate()?;
    let grid = config.create_grid()?;
    log::info!(
        "grid {}x{}x{} over {:.4} x {:.4} x {:.4} m, B = {:?} T",
        grid.nx,
        grid.ny,
        grid.nz,
        grid.lx,
        grid.ly,
        grid.lz,
        config.magnetic_field()
    );

    // Voxelize
    let mut sim = SimulationBox::new(grid, config.potential_offset);
    let electrodes = io::accepted(io::scan_electrode_dir(workdir)?);
    if electrodes.is_empty() {
        log::warn!("no electrodes found in {}", workdir.display());
    }
    let claimed = sim.apply_all(&electrodes);
    log::info!(
        "applied {} electrodes, {} fixed nodes ({} claims)",
        electrodes.len(),
        sim.fixed_count(),
        claimed.iter().sum::<usize>()
    );
    io::write_node_values(workdir.join("geometry.txt"), &sim.geometry_snapshot())?;

    // Solve
    let report = sim.solve(&config.method, config.max_iter, config.tol)?;
    log::info!(
        "{} solve: converged={}, iterations={}, max change={:e}",
        report.method,
        report.converged,
        report.iterations,
        report.max_change
    );
    io::write_node_values(workdir.join("potential.txt"), &sim.potential_snapshot())?;

    let (ex, ey, ez) = electric_field_map(sim.potential(), sim.grid());
    let mut rows = Vec::with_capacity(grid.len());
    Zip::from(&ex).and(&ey).and(&ez).for_each(|&x, &y, &z| rows.push([x, y, z]));
    io::write_vector_rows(workdir.join("electric_field.txt"), &rows)?;

    // Push
    // Tracks are numbered by record position, so a rejected record leaves a gap.
    let (numbers, mut particles): (Vec<usize>, Vec<_>) =
        io::accepted_numbered(io::scan_particle_dir(workdir)?)
            .into_iter()
            .unzip();
    if particles.is_empty() {
        log::warn!("no particles found in {}", workdir.display());
        return Ok(());
    }
    let push = config.push_config();
    log::info!(
        "tracing {} particles for {} steps of {:e} s",
        particles.len(),
        push.steps(),
        push.dt_s
    );
    let states = propagate_many(&mut particles, &sim, &push)?;

    for ((particle, state), number) in particles.iter().zip(&states).zip(&numbers) {
        let track = workdir.join(format!("particle_track_{number}.txt"));
        io::write_trajectory(&track, particle.trajectory())?;
        log::info!(
            "particle {number}: {state} after {} steps, v = {:.4e} m/s, E = {:.4e} J",
            particle.steps_taken(),
            particle.speed_m_s(),
            particle.kinetic_energy_j()
        );
    }

    let summary = summarize_particle_population(&particles);
    log::info!(
        "{} particles: {} hit electrodes, {} left the domain, {} reached the grid edge, {} ran out of time; mean E = {:.4e} J",
        summary.count,
        summary.hit_electrode,
        summary.left_domain,
        summary.reached_grid_edge,
        summary.time_exhausted,
        summary.mean_energy_j
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let workdir = match args.len() {
        1 => Path::new("."),
        2 => Path::new(&args[1]),
        _ => {
            eprintln!("usage: eltrace [WORKDIR]");
            std::process::exit(1)
        }
    };

    if let Err(e) = run(workdir) {
        log::error!("{e}");
        std::process::exit(1)
    }
}
