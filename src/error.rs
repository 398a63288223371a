use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors raised while capturing, normalizing, writing or aggregating datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Number of RGB frames, depth frames and rig cameras disagree.
    #[error("frame count mismatch: rig has {cameras} cameras, got {rgbs} rgb and {depths} depth frames")]
    FrameCountMismatch {
        cameras: usize,
        rgbs: usize,
        depths: usize,
    },
    /// An image does not have the rig resolution.
    #[error("{kind} frame {index} is {got:?}, rig resolution is {expected:?}")]
    ResolutionMismatch {
        kind: &'static str,
        index: usize,
        got: (u32, u32),
        expected: (u32, u32),
    },
    /// Camera `index` does not share the intrinsics of camera 0.
    #[error("camera {index} intrinsics differ from camera 0")]
    IntrinsicsMismatch { index: usize },
    /// A rig without cameras has no intrinsics.
    #[error("rig has no cameras")]
    EmptyRig,
    /// Camera `index` has a scaled, sheared or reflected pose.
    #[error("camera {index} pose is not a rigid transform")]
    NonRigidPose { index: usize },
    /// Rig schedules are too short or describe an impossible camera.
    #[error("invalid rig config: {0}")]
    InvalidRigConfig(String),
    /// Center of attention needs at least one pose.
    #[error("cannot normalize an empty set of poses")]
    NoPoses,
    /// All camera rays are (close to) parallel.
    #[error("camera rays are parallel, center of attention is undefined (det = {det:e})")]
    SingularGeometry { det: f64 },
    /// Every camera sits on the center of attention, leaving no scale.
    #[error("average camera distance to the center of attention is {scale}, scale must be positive")]
    DegenerateScale { scale: f64 },
    /// Stored normalization params carry a scale that cannot be inverted.
    #[error("normalization scale must be positive and finite, got {0}")]
    InvalidScale(f64),
    /// A discovered dataset does not sit under a `trial_<N>` directory.
    #[error("{path:?} does not match the expected layout `{expected}`")]
    TrialPattern { path: PathBuf, expected: &'static str },
    /// Two datasets resolve to the same trial directory.
    #[error("target directory {target:?} already exists while copying {source_path:?}; source root contains more than one experiment")]
    DuplicateTrial {
        source_path: PathBuf,
        target: PathBuf,
    },
    /// The aggregation target would be cleared together with the source.
    #[error("target root {target:?} contains the source root {source_root:?}")]
    TargetContainsSource {
        source_root: PathBuf,
        target: PathBuf,
    },
    /// A file that must appear exactly once was found `count` times.
    #[error("expected exactly one `{name}` under the source root, found {count}: {paths:?}")]
    SingletonCount {
        name: &'static str,
        count: usize,
        paths: Vec<PathBuf>,
    },
    /// Filesystem failure at `path`.
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Manifest or config (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Image encoding failure.
    #[error(transparent)]
    Image(#[from] image::ImageError),
    /// Discovery pattern built from a root that glob cannot parse.
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
    /// Unreadable entry met during discovery.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> DatasetError {
        let path = path.into();
        move |source| DatasetError::Io { path, source }
    }
}
