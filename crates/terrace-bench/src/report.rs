use std::fmt::Write as _;
use std::path::Path;

use crate::runner::BenchmarkResult;

/// Results of one bench run, stored as JSON for later comparison.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

impl Baseline {
    /// Read a stored baseline. A missing file is `Ok(None)`; an unreadable one is an error.
    pub fn read(path: &Path) -> Result<Option<Baseline>, String> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("{}: {e}", path.display())),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| format!("{}: {e}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("{}: {e}", path.display()))
    }

    fn scene(&self, name: &str) -> Option<&BenchmarkResult> {
        self.results.iter().find(|r| r.scene_name == name)
    }
}

/// What a regression was measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// 95th percentile time from stroke end to rebuilt geometry.
    StrokeRebuildP95,
    /// Size of the saved map; growth means the RLE layers compress worse.
    SavedBytes,
    /// Merged block count; the merge is deterministic, so any growth counts.
    Blocks,
}

impl Metric {
    fn label(self) -> &'static str {
        match self {
            Metric::StrokeRebuildP95 => "stroke rebuild p95",
            Metric::SavedBytes => "saved bytes",
            Metric::Blocks => "blocks",
        }
    }
}

/// Allowed growth per metric, in percent.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub time_pct: f64,
    pub size_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            time_pct: 10.0,
            size_pct: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub scene: String,
    pub metric: Metric,
    pub baseline: f64,
    pub current: f64,
}

impl Regression {
    pub fn growth_pct(&self) -> f64 {
        if self.baseline == 0.0 {
            return f64::INFINITY;
        }
        (self.current - self.baseline) / self.baseline * 100.0
    }
}

/// Compare each scene with its baseline entry. Scenes missing from the
/// baseline are skipped; timings with a zero baseline are too noisy to judge.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    thresholds: Thresholds,
) -> Vec<Regression> {
    let mut regressions = Vec::new();
    for result in current {
        let Some(base) = baseline.scene(&result.scene_name) else {
            continue;
        };
        let mut check = |metric: Metric, was: f64, now: f64, limit_pct: Option<f64>| {
            let regressed = match limit_pct {
                Some(limit) => was > 0.0 && (now - was) / was * 100.0 > limit,
                None => now > was,
            };
            if regressed {
                regressions.push(Regression {
                    scene: result.scene_name.clone(),
                    metric,
                    baseline: was,
                    current: now,
                });
            }
        };
        check(
            Metric::StrokeRebuildP95,
            base.timings.p95_ms,
            result.timings.p95_ms,
            Some(thresholds.time_pct),
        );
        check(
            Metric::SavedBytes,
            base.saved_bytes as f64,
            result.saved_bytes as f64,
            Some(thresholds.size_pct),
        );
        // Only comparable when the scene replayed the same edits.
        if base.edits == result.edits {
            check(
                Metric::Blocks,
                base.block_count as f64,
                result.block_count as f64,
                None,
            );
        }
    }
    regressions
}

/// Markdown table of per-stroke rebuild cost and map shape per scene.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Edits | Chunks | Blocks | Saved (B) | B/chunk | Mean (ms) | P95 (ms) | Max (ms) |\n");
    out.push_str("|-------|-------|--------|--------|-----------|---------|-----------|----------|----------|\n");
    for r in results {
        let per_chunk = r.saved_bytes / (r.chunk_count.max(1) as usize);
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {:.3} | {:.3} | {:.3} |",
            r.scene_name,
            r.edits,
            r.chunk_count,
            r.block_count,
            r.saved_bytes,
            per_chunk,
            r.timings.mean_ms,
            r.timings.p95_ms,
            r.timings.max_ms,
        );
    }
    out
}

pub fn format_regressions(regressions: &[Regression], thresholds: Thresholds) -> String {
    if regressions.is_empty() {
        return format!(
            "No regressions (time +{:.0}%, size +{:.0}%, blocks must not grow).\n",
            thresholds.time_pct, thresholds.size_pct
        );
    }
    let mut out = String::from("REGRESSIONS DETECTED:\n");
    for r in regressions {
        let _ = writeln!(
            out,
            "  - {} {}: {:.3} -> {:.3} ({:+.1}%)",
            r.scene,
            r.metric.label(),
            r.baseline,
            r.current,
            r.growth_pct()
        );
    }
    out
}
