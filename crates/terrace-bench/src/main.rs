use std::path::PathBuf;
use std::process;

use terrace_bench::report;
use terrace_bench::runner::BenchmarkRunner;
use terrace_bench::scenes;

fn arg_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("missing value for {flag}");
            process::exit(1);
        }
    }
}

fn parse_or_exit<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("invalid {flag} value: {value}");
        process::exit(1);
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut thresholds = report::Thresholds::default();
    let mut stroke_scale = 1.0f32;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--baseline" => {
                i += 1;
                baseline_path = Some(PathBuf::from(arg_value(&args, i, "--baseline")));
            }
            "--output" => {
                i += 1;
                output_path = Some(PathBuf::from(arg_value(&args, i, "--output")));
            }
            "--time-threshold" => {
                i += 1;
                let value = arg_value(&args, i, "--time-threshold");
                thresholds.time_pct = parse_or_exit(&value, "--time-threshold");
            }
            "--size-threshold" => {
                i += 1;
                let value = arg_value(&args, i, "--size-threshold");
                thresholds.size_pct = parse_or_exit(&value, "--size-threshold");
            }
            "--stroke-scale" => {
                i += 1;
                let value = arg_value(&args, i, "--stroke-scale");
                stroke_scale = parse_or_exit(&value, "--stroke-scale");
            }
            "--help" | "-h" => {
                eprintln!("Usage: bench-runner [OPTIONS]");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!("  --time-threshold <pct>         Allowed stroke rebuild p95 growth (default: 10)");
                eprintln!("  --size-threshold <pct>         Allowed saved-map growth (default: 2)");
                eprintln!("  --stroke-scale <f>             Multiply strokes per scene (default: 1)");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let runner = BenchmarkRunner::new(stroke_scale);

    let mut results = Vec::new();
    for config in &scenes::standard_scenes() {
        match runner.run_scene(config) {
            Ok(result) => results.push(result),
            Err(e) => {
                log::error!("scene '{}' failed: {e}", config.name);
                process::exit(1);
            }
        }
    }

    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: run_stamp(),
            results: results.clone(),
        };
        if let Err(e) = baseline.write(path) {
            log::error!("failed to save baseline: {e}");
            process::exit(1);
        }
        log::info!("Saved baseline to {}", path.display());
    }

    if let Some(ref path) = baseline_path {
        match report::Baseline::read(path) {
            Ok(Some(baseline)) => {
                let regressions = report::compare(&results, &baseline, thresholds);
                println!("{}", report::format_regressions(&regressions, thresholds));
                if !regressions.is_empty() {
                    eprintln!(
                        "ERROR: {} regressions detected, exiting with code 1",
                        regressions.len()
                    );
                    process::exit(1);
                }
            }
            Ok(None) => log::warn!("Baseline file not found: {}", path.display()),
            Err(e) => {
                log::error!("unreadable baseline: {e}");
                process::exit(1);
            }
        }
    }

    log::info!("Benchmark complete.");
}

fn run_stamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("bench-{secs}")
}
