//! Integration tests for run staging, output post-processing and
//! per-category aggregation.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use valrun::cli::RunConfig;
use valrun::launcher::LaunchMode;
use valrun::{
    compare_categories, CategoryOutcome, CompareOptions, LineFilter, OutputCategory, RunKind,
    RunWorkspace,
};

struct Fixture {
    _inputs: TempDir,
    work: TempDir,
    config: RunConfig,
}

fn touch(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn fixture(with_reference: bool) -> Fixture {
    let inputs = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    let new_binary = touch(inputs.path(), "MarDyn.new", "#!/bin/sh\n");
    let old_binary = touch(inputs.path(), "MarDyn.old", "#!/bin/sh\n");
    let cfg = touch(inputs.path(), "lj.cfg", "timestepLength 0.002\n");
    let inp = touch(inputs.path(), "lj.inp", "N 100\n");

    let config = RunConfig {
        new_binary,
        old_binary: with_reference.then_some(old_binary),
        cfg,
        inp,
        iterations: 25,
        launch: LaunchMode::Sequential,
        categories: vec![OutputCategory::ResultWriter, OutputCategory::Rdf],
        filter: LineFilter::new(&["[Mm]ar[Dd]yn"]).unwrap(),
        compare: CompareOptions::default(),
        work_dir: work.path().to_path_buf(),
        json_report: None,
    };

    Fixture {
        _inputs: inputs,
        work,
        config,
    }
}

#[test]
fn test_prepare_stages_inputs_and_appends_plugins() {
    let fx = fixture(true);
    let ws = RunWorkspace::new(fx.work.path());
    ws.prepare(&fx.config).unwrap();

    for kind in [RunKind::New, RunKind::Reference] {
        let dir = ws.run_dir(kind);
        assert!(dir.join("lj.inp").is_file());
        let cfg = fs::read_to_string(dir.join("lj.cfg")).unwrap();
        assert!(cfg.starts_with("timestepLength 0.002\n"));
        assert!(cfg.contains("output ResultWriter 1 val.comparison\n"));
        assert!(cfg.contains("RDFOutputPrefix val.comparison\n"));
    }
    assert!(ws.run_dir(RunKind::New).join("MarDyn.new").is_file());
    assert!(ws.run_dir(RunKind::Reference).join("MarDyn.old").is_file());
}

#[test]
fn test_prepare_clears_new_but_keeps_reference_without_old_binary() {
    let fx = fixture(false);
    let ws = RunWorkspace::new(fx.work.path());
    fs::create_dir_all(ws.run_dir(RunKind::New).join("stale")).unwrap();
    fs::create_dir_all(ws.run_dir(RunKind::Reference)).unwrap();
    touch(&ws.run_dir(RunKind::New), "old.res", "1\n");
    let kept = touch(&ws.run_dir(RunKind::Reference), "val.comparison.res", "1\n");

    ws.prepare(&fx.config).unwrap();

    assert!(!ws.run_dir(RunKind::New).join("old.res").exists());
    assert!(!ws.run_dir(RunKind::New).join("stale").exists());
    assert!(kept.is_file());
    assert!(!ws.run_dir(RunKind::Reference).join("lj.cfg").exists());
}

#[test]
fn test_collect_outputs_strips_banner_lines() {
    let fx = fixture(true);
    let ws = RunWorkspace::new(fx.work.path());
    ws.prepare(&fx.config).unwrap();

    let res = touch(
        &ws.run_dir(RunKind::New),
        "val.comparison.res",
        "# MarDyn version 1.1 started 2016-05-08 12:00\n1 -0.5 0.9\n2 -0.6 0.8\n",
    );
    ws.collect_outputs(RunKind::New, &fx.config.categories, &fx.config.filter)
        .unwrap();

    assert_eq!(fs::read_to_string(&res).unwrap(), "1 -0.5 0.9\n2 -0.6 0.8\n");
    let backup = ws.run_dir(RunKind::New).join("val.comparison.res.bak");
    assert!(fs::read_to_string(backup).unwrap().contains("MarDyn version"));
}

#[test]
fn test_collect_outputs_promotes_rdf_file() {
    let fx = fixture(true);
    let ws = RunWorkspace::new(fx.work.path());
    ws.prepare(&fx.config).unwrap();

    let dir = ws.run_dir(RunKind::New);
    touch(&dir, "val.comparison.000000010.rdf", "0.1 1.0\n");
    ws.collect_outputs(RunKind::New, &[OutputCategory::Rdf], &LineFilter::default())
        .unwrap();

    assert!(!dir.join("val.comparison.000000010.rdf").exists());
    assert_eq!(
        fs::read_to_string(dir.join("val.comparison.rdf")).unwrap(),
        "0.1 1.0\n"
    );
}

#[test]
fn test_missing_category_does_not_stop_others() {
    let fx = fixture(true);
    let ws = RunWorkspace::new(fx.work.path());
    ws.prepare(&fx.config).unwrap();

    touch(&ws.run_dir(RunKind::Reference), "val.comparison.res", "1 2\n");
    touch(&ws.run_dir(RunKind::New), "val.comparison.res", "1 3\n");
    touch(&ws.run_dir(RunKind::Reference), "val.comparison.gamma", "0.5\n");
    touch(&ws.run_dir(RunKind::New), "val.comparison.gamma", "0.5\n");

    let summary = compare_categories(
        &ws,
        &[
            OutputCategory::Rdf,
            OutputCategory::ResultWriter,
            OutputCategory::GammaWriter,
        ],
        &CompareOptions::default(),
    );

    assert_eq!(summary.results.len(), 3);
    assert!(matches!(
        summary.results[0].outcome,
        CategoryOutcome::Failed { .. }
    ));
    assert_eq!(
        summary.results[1].outcome,
        CategoryOutcome::Mismatched { count: 1 }
    );
    assert_eq!(summary.results[2].outcome, CategoryOutcome::Identical);
    assert!(!summary.all_identical());
    assert_eq!(summary.total_mismatches(), 1);
}

#[test]
fn test_summary_serializes_to_json() {
    let fx = fixture(true);
    let ws = RunWorkspace::new(fx.work.path());
    ws.prepare(&fx.config).unwrap();
    touch(&ws.run_dir(RunKind::Reference), "val.comparison.res", "1\n");
    touch(&ws.run_dir(RunKind::New), "val.comparison.res", "1\n");

    let summary = compare_categories(
        &ws,
        &[OutputCategory::ResultWriter],
        &CompareOptions::default(),
    );
    let report = fx.work.path().join("summary.json");
    summary.write_json(&report).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(json["results"][0]["category"], "ResultWriter");
    assert_eq!(json["results"][0]["outcome"]["status"], "identical");
}
