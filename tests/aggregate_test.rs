use nerf_capture_dataset::DatasetError;
use nerf_capture_dataset::aggregate::{AggregateSummary, DEBUG_MANIFEST, aggregate};
use nerf_capture_dataset::dataset::{DatasetOptions, write_dataset};
use nerf_capture_dataset::io::object_from_json;
use nerf_capture_dataset::rig::{CameraRig, RigConfig};
use nerf_capture_dataset::synthetic::capture;
use nerf_capture_dataset::types::Frame;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fake_dataset(dir: &Path, marker: &str) {
    fs::create_dir_all(dir.join("rgbs")).unwrap();
    fs::write(dir.join("rgbs/000.png"), marker).unwrap();
    fs::write(dir.join("transforms.json"), format!("{{\"marker\": \"{}\"}}", marker)).unwrap();
}

fn experiment(root: &Path, trials: &[&str]) {
    for t in trials {
        fake_dataset(&root.join(t).join("nerf_dataset"), t);
    }
    fs::write(root.join("full_exp_cfg.txt"), "{\"exp\": 1}").unwrap();
    fs::create_dir_all(root.join("demos")).unwrap();
    fs::write(root.join("demos/target_descriptors.npz"), [1u8, 2, 3]).unwrap();
}

fn tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut out = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.file_name().unwrap() != DEBUG_MANIFEST {
                out.insert(path.strip_prefix(root).unwrap().to_path_buf(), fs::read(&path).unwrap());
            }
        }
    }
    out
}

#[test]
fn test_aggregate_layout() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("eval");
    let target = temp_dir.path().join("datasets");
    experiment(&source, &["seed_0/trial_0", "seed_0/trial_1", "seed_1/trial_12"]);

    let summary = aggregate(&source, &target).unwrap();
    assert_eq!(summary.num_datasets, 3);
    for trial in ["trial_0", "trial_1", "trial_12"] {
        assert!(target.join(trial).join("transforms.json").is_file());
        assert!(target.join(trial).join("rgbs/000.png").is_file());
    }
    assert_eq!(
        fs::read_to_string(target.join("trial_12/rgbs/000.png")).unwrap(),
        "seed_1/trial_12"
    );
    assert!(target.join("full_exp_cfg.json").is_file());
    assert!(!target.join("full_exp_cfg.txt").exists());
    assert_eq!(fs::read(target.join("target_descriptors.npz")).unwrap(), vec![1, 2, 3]);

    let debug: AggregateSummary = object_from_json(&target.join(DEBUG_MANIFEST)).unwrap();
    assert_eq!(debug.num_datasets, 3);
    assert!(!debug.timestamp.is_empty());
    let key = fs::canonicalize(&source)
        .unwrap()
        .join("seed_1/trial_12/nerf_dataset");
    assert_eq!(
        debug.dataset_path_to_trial[&key.to_string_lossy().into_owned()],
        "trial_12"
    );
}

#[test]
fn test_aggregate_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("eval");
    let target = temp_dir.path().join("datasets");
    experiment(&source, &["trial_0", "run/trial_3"]);

    let first = aggregate(&source, &target).unwrap();
    let first_tree = tree(&target);
    // stale content in the target is removed on the next run
    fs::write(target.join("stale.txt"), "old").unwrap();
    let second = aggregate(&source, &target).unwrap();

    assert_eq!(first_tree, tree(&target));
    assert_eq!(first.dataset_path_to_trial, second.dataset_path_to_trial);
    assert_eq!(first.num_datasets, second.num_datasets);
}

#[test]
fn test_duplicate_trial_fails() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("eval");
    let target = temp_dir.path().join("datasets");
    experiment(&source, &["a/trial_1", "b/trial_1", "a/trial_2"]);

    let result = aggregate(&source, &target);
    match result {
        Err(DatasetError::DuplicateTrial { source_path, target: slot }) => {
            let source = fs::canonicalize(&source).unwrap();
            let target = fs::canonicalize(&target).unwrap();
            assert_eq!(source_path, source.join("b/trial_1/nerf_dataset"));
            assert_eq!(slot, target.join("trial_1"));
        }
        other => panic!("expected duplicate trial, got {:?}", other),
    }
    // the slot keeps the first dataset only
    assert_eq!(
        fs::read_to_string(target.join("trial_1/rgbs/000.png")).unwrap(),
        "a/trial_1"
    );
}

#[test]
fn test_target_containing_source_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("eval");
    experiment(&source, &["trial_0", "trial_1"]);
    let before = tree(&source);

    for target in [temp_dir.path().to_path_buf(), source.clone(), source.join("..")] {
        assert!(matches!(
            aggregate(&source, &target),
            Err(DatasetError::TargetContainsSource { .. })
        ));
        assert_eq!(tree(&source), before);
    }
    assert!(source.join("full_exp_cfg.txt").is_file());
}

#[test]
fn test_unexpected_layout_fails() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("eval");
    experiment(&source, &["trial_0", "seed_4"]);
    let result = aggregate(&source, &temp_dir.path().join("out"));
    assert!(matches!(result, Err(DatasetError::TrialPattern { .. })));
}

#[test]
fn test_singleton_files_required() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("eval");
    let target = temp_dir.path().join("out");
    experiment(&source, &["trial_0"]);

    fs::write(source.join("trial_0/full_exp_cfg.txt"), "{}").unwrap();
    match aggregate(&source, &target) {
        Err(DatasetError::SingletonCount { name, count, paths }) => {
            assert_eq!(name, "full_exp_cfg.txt");
            assert_eq!(count, 2);
            assert_eq!(paths.len(), 2);
        }
        other => panic!("expected singleton error, got {:?}", other),
    }

    fs::remove_file(source.join("trial_0/full_exp_cfg.txt")).unwrap();
    fs::remove_file(source.join("demos/target_descriptors.npz")).unwrap();
    assert!(matches!(
        aggregate(&source, &target),
        Err(DatasetError::SingletonCount { count: 0, .. })
    ));
}

#[test]
fn test_aggregate_written_datasets() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("eval");
    let config = RigConfig {
        n_cameras: 5,
        width: 8,
        height: 6,
        ..Default::default()
    };
    let rig = CameraRig::from_config(&config).unwrap();
    let (rgbs, depths) = Frame::unzip(capture(&rig, 0.05));
    for trial in ["trial_0", "trial_1"] {
        let dir = source.join(trial).join("nerf_dataset");
        write_dataset(&rig, &rgbs, &depths, &dir, &DatasetOptions::default()).unwrap();
    }
    fs::write(source.join("full_exp_cfg.txt"), "{}").unwrap();
    fs::write(source.join("target_descriptors.npz"), b"").unwrap();

    let target = temp_dir.path().join("agg");
    let summary = aggregate(&source, &target).unwrap();
    assert_eq!(summary.num_datasets, 2);
    assert_eq!(tree(&source.join("trial_1/nerf_dataset")), tree(&target.join("trial_1")));
}
