use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::glob;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::io::object_to_json;

/// Directory name written by the evaluation loop for each trial's dataset.
pub const DATASET_DIR_NAME: &str = "nerf_dataset";
/// Prefix of the directory holding a dataset, followed by decimal digits.
pub const TRIAL_PREFIX: &str = "trial_";
/// Human readable form of the layout every discovered dataset must follow.
pub const TRIAL_LAYOUT: &str = ".../trial_<N>/nerf_dataset";
pub const DEBUG_MANIFEST: &str = "aggregate_debug.json";

/// Experiment-wide files that must exist exactly once in the source tree,
/// with the name they get at the top of the target.
pub const SINGLETON_FILES: [(&str, &str); 2] = [
    ("full_exp_cfg.txt", "full_exp_cfg.json"),
    ("target_descriptors.npz", "target_descriptors.npz"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub num_datasets: usize,
    /// Discovered dataset path to the trial directory it was copied to.
    pub dataset_path_to_trial: BTreeMap<String, String>,
    pub timestamp: String,
}

/// `trial_<N>` from the parent of a dataset directory.
pub fn trial_name(dataset_path: &Path) -> Result<String> {
    let err = || DatasetError::TrialPattern {
        path: dataset_path.to_path_buf(),
        expected: TRIAL_LAYOUT,
    };
    if dataset_path.file_name().and_then(|n| n.to_str()) != Some(DATASET_DIR_NAME) {
        return Err(err());
    }
    let parent = dataset_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .ok_or_else(err)?;
    match parent.strip_prefix(TRIAL_PREFIX) {
        Some(id) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(parent.to_string())
        }
        _ => Err(err()),
    }
}

fn glob_under(root: &Path, tail: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        tail
    );
    let mut paths = glob(&pattern)?.collect::<std::result::Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

/// Every `nerf_dataset` directory below `source_root`, sorted.
pub fn find_datasets(source_root: &Path) -> Result<Vec<PathBuf>> {
    Ok(glob_under(source_root, DATASET_DIR_NAME)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect())
}

/// Recursive copy; `target` must not exist yet.
pub fn copy_dir(source: &Path, target: &Path) -> Result<()> {
    std::fs::create_dir_all(target).map_err(DatasetError::io(target))?;
    let entries = std::fs::read_dir(source).map_err(DatasetError::io(source))?;
    for entry in entries {
        let entry = entry.map_err(DatasetError::io(source))?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if from.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            std::fs::copy(&from, &to).map_err(DatasetError::io(&from))?;
        }
    }
    Ok(())
}

fn clear_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(DatasetError::io(dir))?;
        debug!("removed {}", dir.display());
    }
    std::fs::create_dir_all(dir).map_err(DatasetError::io(dir))
}

fn timestamp() -> String {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    now.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Gathers every trial dataset under `source_root` into `target_root`.
///
/// `target_root` is wiped first, so re-running gives the same tree. Each
/// dataset lands in `target_root/trial_<N>`, the experiment config and the
/// target descriptors are copied once to the top level, and a debug manifest
/// records what went where. Both roots are canonicalized, and a target that
/// contains the source is refused before anything is removed.
pub fn aggregate(source_root: &Path, target_root: &Path) -> Result<AggregateSummary> {
    let source = std::fs::canonicalize(source_root).map_err(DatasetError::io(source_root))?;
    if target_root.exists() {
        let target = std::fs::canonicalize(target_root).map_err(DatasetError::io(target_root))?;
        if source.starts_with(&target) {
            return Err(DatasetError::TargetContainsSource {
                source_root: source,
                target,
            });
        }
    }
    clear_dir(target_root)?;
    let target = std::fs::canonicalize(target_root).map_err(DatasetError::io(target_root))?;
    let (source_root, target_root) = (source.as_path(), target.as_path());

    let mut dataset_path_to_trial = BTreeMap::new();
    for dataset in find_datasets(source_root)? {
        if dataset.starts_with(target_root) {
            continue;
        }
        let trial = trial_name(&dataset)?;
        let target_trial_dir = target_root.join(&trial);
        if target_trial_dir.exists() {
            return Err(DatasetError::DuplicateTrial {
                source_path: dataset,
                target: target_trial_dir,
            });
        }
        copy_dir(&dataset, &target_trial_dir)?;
        debug!(
            "copied {} to {}",
            dataset.display(),
            target_trial_dir.display()
        );
        dataset_path_to_trial.insert(dataset.to_string_lossy().into_owned(), trial);
    }

    for (name, target_name) in SINGLETON_FILES {
        let paths: Vec<_> = glob_under(source_root, name)?
            .into_iter()
            .filter(|p| p.is_file() && !p.starts_with(target_root))
            .collect();
        if paths.len() != 1 {
            return Err(DatasetError::SingletonCount {
                name,
                count: paths.len(),
                paths,
            });
        }
        let path = &paths[0];
        let target_path = target_root.join(target_name);
        std::fs::copy(path, &target_path).map_err(DatasetError::io(path))?;
        debug!("copied {} to {}", path.display(), target_path.display());
    }

    let summary = AggregateSummary {
        num_datasets: dataset_path_to_trial.len(),
        dataset_path_to_trial,
        timestamp: timestamp(),
    };
    object_to_json(&target_root.join(DEBUG_MANIFEST), &summary)?;
    info!(
        "found {} datasets in {} and copied them to {}",
        summary.num_datasets,
        source_root.display(),
        target_root.display()
    );
    Ok(summary)
}
