// ─────────────────────────────────────────────────────────────────────
// SCPN Electrode Tracer — Record Loading and Artifacts
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Electrode/particle record files in, plain-text artifacts out.
//!
//! Loading never aborts on a bad record: every entry of every file yields
//! a [`RecordOutcome`], and the caller keeps the `Ok` ones in order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use eltrace_types::config::{ElectrodeRecord, ParticleRecord};
use eltrace_types::error::{SimError, SimResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::electrode::ElectrodeSpec;
use crate::particles::Particle;
use crate::species::particle_from_record;

pub const ELECTRODE_FILE_PREFIX: &str = "ElectrodeConfig_";
pub const PARTICLE_FILE_PREFIX: &str = "ParticleConfig_";

/// Result of loading one record (or one unreadable file, `index = None`).
#[derive(Debug)]
pub struct RecordOutcome<T> {
    pub source: PathBuf,
    pub index: Option<usize>,
    pub result: SimResult<T>,
}

fn record_label(source: &Path, index: Option<usize>) -> String {
    match index {
        Some(i) => format!("{}[{i}]", source.display()),
        None => source.display().to_string(),
    }
}

/// Re-tag a conversion failure with the file and entry it came from.
fn locate_record_error(label: String, err: SimError) -> SimError {
    match err {
        SimError::MalformedRecord { reason, .. }
        | SimError::ConfigError(reason)
        | SimError::PhysicsViolation(reason) => SimError::malformed(label, reason),
        SimError::Json(e) => SimError::malformed(label, e.to_string()),
        other => SimError::malformed(label, other.to_string()),
    }
}

/// `<prefix><n>.json` files in `dir`, ordered by numeric suffix, then name.
pub fn numbered_files(dir: impl AsRef<Path>, prefix: &str) -> SimResult<Vec<PathBuf>> {
    let mut found: Vec<(u64, String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(".json"))
        else {
            continue;
        };
        let order = stem.parse::<u64>().unwrap_or(u64::MAX);
        found.push((order, name.to_string(), path));
    }
    found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(found.into_iter().map(|(_, _, path)| path).collect())
}

/// Split one record file into per-entry outcomes.
fn load_records<R, T, F>(path: &Path, key: &str, convert: F) -> Vec<RecordOutcome<T>>
where
    R: DeserializeOwned,
    F: Fn(&R) -> SimResult<T>,
{
    let whole_file_failure = |reason: String| {
        vec![RecordOutcome {
            source: path.to_path_buf(),
            index: None,
            result: Err(SimError::malformed(record_label(path, None), reason)),
        }]
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            return vec![RecordOutcome {
                source: path.to_path_buf(),
                index: None,
                result: Err(e.into()),
            }]
        }
    };
    let document: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => return whole_file_failure(format!("invalid JSON: {e}")),
    };
    let entries = match document.get(key).and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries,
        Some(_) => return whole_file_failure(format!("\"{key}\" array is empty")),
        None => return whole_file_failure(format!("missing \"{key}\" array")),
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let result = serde_json::from_value::<R>(entry.clone())
                .map_err(SimError::from)
                .and_then(|record| convert(&record))
                .map_err(|e| locate_record_error(record_label(path, Some(i)), e));
            RecordOutcome {
                source: path.to_path_buf(),
                index: Some(i),
                result,
            }
        })
        .collect()
}

/// Load every electrode of one `{"electrodes": [...]}` file.
pub fn load_electrode_file(path: impl AsRef<Path>) -> Vec<RecordOutcome<ElectrodeSpec>> {
    load_records::<ElectrodeRecord, _, _>(path.as_ref(), "electrodes", ElectrodeSpec::from_record)
}

/// Load every particle of one `{"particle": [...]}` file.
pub fn load_particle_file(path: impl AsRef<Path>) -> Vec<RecordOutcome<Particle>> {
    load_records::<ParticleRecord, _, _>(path.as_ref(), "particle", particle_from_record)
}

/// All electrode records of `ElectrodeConfig_<n>.json` files in `dir`, in
/// application order.
pub fn scan_electrode_dir(dir: impl AsRef<Path>) -> SimResult<Vec<RecordOutcome<ElectrodeSpec>>> {
    let files = numbered_files(dir, ELECTRODE_FILE_PREFIX)?;
    Ok(files.iter().flat_map(load_electrode_file).collect())
}

/// All particle records of `ParticleConfig_<n>.json` files in `dir`.
pub fn scan_particle_dir(dir: impl AsRef<Path>) -> SimResult<Vec<RecordOutcome<Particle>>> {
    let files = numbered_files(dir, PARTICLE_FILE_PREFIX)?;
    Ok(files.iter().flat_map(load_particle_file).collect())
}

/// Keep accepted records in order; log and drop the rest.
pub fn accepted<T>(outcomes: Vec<RecordOutcome<T>>) -> Vec<T> {
    accepted_numbered(outcomes)
        .into_iter()
        .map(|(_, value)| value)
        .collect()
}

/// Like [`accepted`], paired with each record's 1-based number across
/// all scanned files. Rejected records still consume their number, so
/// numbering follows the files, not the survivors. Whole-file failures
/// (`index = None`) hold no record and take no number.
pub fn accepted_numbered<T>(outcomes: Vec<RecordOutcome<T>>) -> Vec<(usize, T)> {
    let mut kept = Vec::with_capacity(outcomes.len());
    let mut number = 0;
    for outcome in outcomes {
        if outcome.index.is_some() {
            number += 1;
        }
        match outcome.result {
            Ok(value) => kept.push((number, value)),
            Err(e) => log::warn!("skipping record: {e}"),
        }
    }
    kept
}

/// One value per line, in the order given (node-major for grid arrays).
pub fn write_node_values(path: impl AsRef<Path>, values: &[f64]) -> SimResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for v in values {
        writeln!(out, "{v}")?;
    }
    out.flush()?;
    Ok(())
}

/// `x y z` per line.
pub fn write_vector_rows(path: impl AsRef<Path>, rows: &[[f64; 3]]) -> SimResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for [x, y, z] in rows {
        writeln!(out, "{x} {y} {z}")?;
    }
    out.flush()?;
    Ok(())
}

/// Particle track: one position per completed step.
pub fn write_trajectory(path: impl AsRef<Path>, trajectory: &[[f64; 3]]) -> SimResult<()> {
    write_vector_rows(path, trajectory)
}
