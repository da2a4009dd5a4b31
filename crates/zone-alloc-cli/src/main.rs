// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use zone_alloc_model::prelude::{Assignment, AssignmentSet, Problem, ProblemLoader};
use zone_alloc_solver::prelude::{
    AssignmentEngine, CancellationToken, DistanceOracle, EngineConfig, FacilityLoad,
    HaversineOracle, OsrmOracle, RunStatus,
};

const OSRM_URL_ENV: &str = "ZONE_ALLOC_OSRM_URL";
const OSRM_PROFILE_ENV: &str = "ZONE_ALLOC_OSRM_PROFILE";
const USAGE: &str =
    "usage: zone-alloc <import.json> [--config <config.json>] [--out <record.json>] [--csv <export.csv>] [--offline]";

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();
}

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    input: PathBuf,
    config: Option<PathBuf>,
    out: PathBuf,
    csv: Option<PathBuf>,
    offline: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliArgs, String> {
    let mut input = None;
    let mut config = None;
    let mut out = PathBuf::from("zone_alloc_results.json");
    let mut csv = None;
    let mut offline = false;

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .map(PathBuf::from)
                .ok_or_else(|| format!("{flag} expects a path"))
        };
        match arg.as_str() {
            "--config" => config = Some(value("--config")?),
            "--out" => out = value("--out")?,
            "--csv" => csv = Some(value("--csv")?),
            "--offline" => offline = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            _ if input.is_none() => input = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument {arg}")),
        }
    }

    Ok(CliArgs {
        input: input.ok_or_else(|| "missing import file".to_string())?,
        config,
        out,
        csv,
        offline,
    })
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(serde_json::from_reader(File::open(p)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn make_oracle(
    offline: bool,
    config: &EngineConfig,
) -> Result<(Box<dyn DistanceOracle>, String), Box<dyn std::error::Error>> {
    match std::env::var(OSRM_URL_ENV) {
        Ok(url) if !offline => {
            let profile = std::env::var(OSRM_PROFILE_ENV).unwrap_or_else(|_| "driving".to_string());
            let label = format!("osrm {url} ({profile})");
            Ok((Box::new(OsrmOracle::new(url, profile)?), label))
        }
        _ => {
            let factor = config.bands.detour_factor;
            Ok((
                Box::new(HaversineOracle::new().with_detour_factor(factor)),
                format!("haversine x{factor}"),
            ))
        }
    }
}

#[derive(Serialize)]
struct RunRecord<'a> {
    input: String,
    oracle: String,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    status: RunStatus,
    zones: usize,
    facilities: usize,
    rejected_zones: usize,
    unresolved_zones: usize,
    covered: usize,
    uncovered: usize,
    overrides: usize,
    rebalancing_moves: usize,
    config: &'a EngineConfig,
    loads: &'a [FacilityLoad],
    assignments: &'a AssignmentSet,
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_row(a: &Assignment, problem: &Problem) -> String {
    let zone_name = problem.zone(a.zone()).map_or("", |z| z.name());
    let facility = a.facility().or(a.best_option());
    let facility_name = facility
        .and_then(|f| problem.facility(f))
        .map_or("", |f| f.name());
    let fields = [
        a.zone().value().to_string(),
        csv_field(zone_name),
        a.group().id().map(|g| g.value().to_string()).unwrap_or_default(),
        facility.map(|f| f.value().to_string()).unwrap_or_default(),
        csv_field(facility_name),
        format!("{:?}", a.status()),
        a.distance_km().map(|d| format!("{d:.3}")).unwrap_or_default(),
        format!("{:?}", a.tier()),
        a.is_rebalanced().to_string(),
        a.is_manual().to_string(),
        csv_field(a.reason().unwrap_or("")),
    ];
    fields.join(",")
}

fn write_csv(path: &Path, assignments: &AssignmentSet, problem: &Problem) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(
        w,
        "zone,zone_name,group,facility,facility_name,status,distance_km,tier,rebalanced,manual,reason"
    )?;
    for a in assignments.iter() {
        writeln!(w, "{}", csv_row(a, problem))?;
    }
    w.flush()
}

fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let import = ProblemLoader::new().from_path(&args.input)?;
    for r in &import.rejected {
        tracing::warn!("Zone {} ({}) rejected: {}", r.id(), r.name(), r.error());
    }
    tracing::info!(
        "Loaded {}: {} zones, {} facilities, {} overrides, {} rejected zones",
        args.input.display(),
        import.problem.zones().len(),
        import.problem.facilities().len(),
        import.overrides.len(),
        import.rejected.len()
    );

    let (oracle, oracle_label) = make_oracle(args.offline, &config)?;
    let engine = AssignmentEngine::new(config, oracle.as_ref());

    let start_ts = Utc::now();
    let t0 = Instant::now();
    let outcome = engine.run(&import.problem, &CancellationToken::new())?;
    let runtime = t0.elapsed();
    let end_ts = Utc::now();

    let merged = outcome.merged(&import.overrides, &import.problem);
    tracing::info!(
        "Finished {} run in {:?}: {} covered, {} uncovered, {} unresolved",
        outcome.status,
        runtime,
        merged.covered_count(),
        merged.uncovered_count(),
        outcome.unresolved.len()
    );

    let record = RunRecord {
        input: args.input.display().to_string(),
        oracle: oracle_label,
        start_ts,
        end_ts,
        runtime_ms: runtime.as_millis(),
        status: outcome.status,
        zones: import.problem.zones().len(),
        facilities: import.problem.facilities().len(),
        rejected_zones: import.rejected.len(),
        unresolved_zones: outcome.unresolved.len(),
        covered: merged.covered_count(),
        uncovered: merged.uncovered_count(),
        overrides: import.overrides.len(),
        rebalancing_moves: outcome.moves.len(),
        config: engine.config(),
        loads: &outcome.loads,
        assignments: &merged,
    };
    let mut f = BufWriter::new(File::create(&args.out)?);
    serde_json::to_writer_pretty(&mut f, &record)?;
    f.flush()?;
    tracing::info!("Wrote run record to {}", args.out.display());

    if let Some(csv) = &args.csv {
        write_csv(csv, &merged, &import.problem)?;
        tracing::info!("Wrote {} assignments to {}", merged.len(), csv.display());
    }
    Ok(())
}

fn main() {
    enable_tracing();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(2);
        }
    };
    if let Err(e) = run(args) {
        tracing::error!("zone-alloc failed: {}", e);
        std::process::exit(1);
    }
}
