//! Chart jobs against a rendered scene.

use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::chart::ChartPipeline;
use crate::chart::collector::{SceneLabelQuery, scene_from_str};
use crate::config::ChartSpec;
use crate::error::{DigestError, Result};
use crate::models::{ChartReport, GroupedResult, SourceOutcome};

/// Read and parse a scene snapshot from disk.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_scene(path: &Path) -> Result<Box<dyn SceneLabelQuery>> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| DigestError::io(path.display().to_string(), e))?;
    let scene = scene_from_str(&raw)?;
    info!(bytes = raw.len(), "Loaded scene snapshot");
    Ok(scene)
}

/// Run every chart job against one scene.
#[instrument(level = "info", skip_all, fields(jobs = specs.len()))]
pub fn run_charts(
    scene: &dyn SceneLabelQuery,
    pipeline: &ChartPipeline,
    specs: &[ChartSpec],
) -> Vec<ChartReport> {
    let reports: Vec<ChartReport> = specs
        .iter()
        .map(|spec| {
            let outcome = pipeline.run(scene, spec);
            match &outcome {
                SourceOutcome::Success(_) => {}
                SourceOutcome::Empty(reason) => warn!(chart = %spec.id, %reason, "Chart produced no data"),
                SourceOutcome::Failed(reason) => error!(chart = %spec.id, %reason, "Chart failed"),
            }
            report(spec, outcome)
        })
        .collect();

    let ok = reports.iter().filter(|r| r.outcome.is_success()).count();
    info!(total = reports.len(), successful = ok, "Chart jobs complete");
    reports
}

/// Every job marked failed, for when the scene itself could not be loaded.
pub fn failed_charts(specs: &[ChartSpec], reason: &str) -> Vec<ChartReport> {
    specs
        .iter()
        .map(|spec| report(spec, SourceOutcome::Failed(reason.to_string())))
        .collect()
}

/// Load the scene at `path` and run the jobs, degrading to failed reports.
pub async fn chart_reports(
    path: &Path,
    pipeline: &ChartPipeline,
    specs: &[ChartSpec],
) -> Vec<ChartReport> {
    match load_scene(path).await {
        Ok(scene) => run_charts(scene.as_ref(), pipeline, specs),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Scene unavailable; marking every chart failed");
            failed_charts(specs, &e.to_string())
        }
    }
}

fn report(spec: &ChartSpec, outcome: SourceOutcome<GroupedResult>) -> ChartReport {
    ChartReport {
        id: spec.id.clone(),
        title: spec.title.clone(),
        left_label: spec.left_label.clone(),
        right_label: spec.right_label.clone(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChartConfig, EngineConfig};
    use tempfile::tempdir;

    const SCENE: &str = r#"{"containers":{"top-influence-1":[
        {"text":"HDB","x":10,"y":0},{"text":"-2.10","x":10,"y":20},
        {"text":"STB","x":300,"y":0},{"text":"1.50","x":300,"y":20}
    ]}}"#;

    fn pipeline() -> ChartPipeline {
        ChartPipeline::new(&ChartConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_one_empty_chart_does_not_stop_the_rest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, SCENE).unwrap();

        let specs = EngineConfig::default().charts;
        let reports = chart_reports(&path, &pipeline(), &specs).await;
        assert_eq!(reports.len(), 3);
        assert!(reports[0].outcome.is_success());
        assert!(matches!(reports[1].outcome, SourceOutcome::Empty(_)));
        assert!(matches!(reports[2].outcome, SourceOutcome::Empty(_)));
        assert_eq!(reports[0].title, "VN-INDEX");
    }

    #[tokio::test]
    async fn test_missing_scene_fails_every_chart() {
        let dir = tempdir().unwrap();
        let specs = EngineConfig::default().charts;
        let reports = chart_reports(&dir.path().join("missing.html"), &pipeline(), &specs).await;
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| matches!(r.outcome, SourceOutcome::Failed(_))));
    }
}
