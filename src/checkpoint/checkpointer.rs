//! Checkpoint persistence for the four network parameter sets.
//!
//! Layout: one directory per tag, containing one bincode file per network.
//! The `final` tag marks the end-of-run checkpoint; interval saves use
//! per-episode tags. A missing tag is a normal condition; a corrupt or
//! partial checkpoint is a fatal error, never a silent fresh start.

use crate::core::target_sync::ParameterSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Well-known tag for the end-of-run checkpoint.
pub const FINAL_TAG: &str = "final";

const NETWORK_FILES: [&str; 4] = [
    "policy.bin",
    "value.bin",
    "target_policy.bin",
    "target_value.bin",
];

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    /// Root directory for all tags.
    pub checkpoint_dir: PathBuf,
}

impl CheckpointConfig {
    /// Create a config rooted at the given directory.
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
        }
    }
}

/// Error type for checkpoint operations.
#[derive(Debug)]
pub enum CheckpointError {
    /// IO error during save/load.
    Io(io::Error),
    /// Serialization or deserialization failure (corrupt data).
    Codec(String),
    /// Tag directory exists but is missing one of the network files.
    Partial {
        /// The incomplete tag.
        tag: String,
        /// The missing file name.
        missing: String,
    },
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::Io(e) => write!(f, "IO error: {}", e),
            CheckpointError::Codec(e) => write!(f, "codec error: {}", e),
            CheckpointError::Partial { tag, missing } => {
                write!(f, "checkpoint '{}' is incomplete: missing {}", tag, missing)
            }
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        CheckpointError::Io(e)
    }
}

/// The four parameter sets persisted per tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointBundle {
    /// Live policy network.
    pub policy: ParameterSet,
    /// Live value network.
    pub value: ParameterSet,
    /// Target policy network.
    pub target_policy: ParameterSet,
    /// Target value network.
    pub target_value: ParameterSet,
}

impl CheckpointBundle {
    fn as_files(&self) -> [(&str, &ParameterSet); 4] {
        [
            (NETWORK_FILES[0], &self.policy),
            (NETWORK_FILES[1], &self.value),
            (NETWORK_FILES[2], &self.target_policy),
            (NETWORK_FILES[3], &self.target_value),
        ]
    }
}

/// Periodic and final persistence/restoration of network parameters.
pub struct CheckpointManager {
    config: CheckpointConfig,
}

impl CheckpointManager {
    /// Create a manager, creating the root directory if needed.
    pub fn new(config: CheckpointConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    /// Tag for an interval save at episode `episode`.
    pub fn episode_tag(episode: usize) -> String {
        format!("episode_{:06}", episode)
    }

    fn tag_dir(&self, tag: &str) -> PathBuf {
        self.config.checkpoint_dir.join(tag)
    }

    /// Persist all four parameter sets under `tag`.
    pub fn save(&self, tag: &str, bundle: &CheckpointBundle) -> Result<PathBuf, CheckpointError> {
        let dir = self.tag_dir(tag);
        fs::create_dir_all(&dir)?;

        for (name, params) in bundle.as_files() {
            let file = File::create(dir.join(name))?;
            let writer = BufWriter::new(file);
            bincode::serialize_into(writer, params)
                .map_err(|e| CheckpointError::Codec(e.to_string()))?;
        }
        Ok(dir)
    }

    /// Check whether a checkpoint exists for `tag`.
    pub fn exists(&self, tag: &str) -> bool {
        self.tag_dir(tag).is_dir()
    }

    /// Restore the bundle saved under `tag`, if present.
    ///
    /// Returns `Ok(None)` when the tag was never saved; absence is normal.
    /// A tag directory with missing or undecodable files is an error: a
    /// failed resume must not masquerade as a fresh start.
    pub fn load_if_present(&self, tag: &str) -> Result<Option<CheckpointBundle>, CheckpointError> {
        let dir = self.tag_dir(tag);
        if !dir.is_dir() {
            return Ok(None);
        }

        let read = |name: &str| -> Result<ParameterSet, CheckpointError> {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(CheckpointError::Partial {
                    tag: tag.to_string(),
                    missing: name.to_string(),
                });
            }
            Self::read_set(&path)
        };

        Ok(Some(CheckpointBundle {
            policy: read(NETWORK_FILES[0])?,
            value: read(NETWORK_FILES[1])?,
            target_policy: read(NETWORK_FILES[2])?,
            target_value: read(NETWORK_FILES[3])?,
        }))
    }

    /// List all saved tags, sorted.
    pub fn list_tags(&self) -> Result<Vec<String>, CheckpointError> {
        let mut tags: Vec<String> = fs::read_dir(&self.config.checkpoint_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        tags.sort();
        Ok(tags)
    }

    fn read_set(path: &Path) -> Result<ParameterSet, CheckpointError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        bincode::deserialize_from(reader).map_err(|e| CheckpointError::Codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target_sync::ParameterTensor;
    use std::io::Write;
    use tempfile::tempdir;

    fn set(tag: f32) -> ParameterSet {
        let mut s = ParameterSet::new();
        s.push(ParameterTensor::new("w", vec![2], vec![tag, tag + 1.0]));
        s
    }

    fn bundle(tag: f32) -> CheckpointBundle {
        CheckpointBundle {
            policy: set(tag),
            value: set(tag + 10.0),
            target_policy: set(tag + 20.0),
            target_value: set(tag + 30.0),
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let manager = CheckpointManager::new(CheckpointConfig::new(dir.path())).unwrap();

        let saved = bundle(1.0);
        manager.save(FINAL_TAG, &saved).unwrap();

        let loaded = manager.load_if_present(FINAL_TAG).unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_missing_tag_is_none() {
        let dir = tempdir().unwrap();
        let manager = CheckpointManager::new(CheckpointConfig::new(dir.path())).unwrap();
        assert!(manager.load_if_present(FINAL_TAG).unwrap().is_none());
        assert!(!manager.exists(FINAL_TAG));
    }

    #[test]
    fn test_partial_checkpoint_is_error() {
        let dir = tempdir().unwrap();
        let manager = CheckpointManager::new(CheckpointConfig::new(dir.path())).unwrap();
        manager.save("episode_000500", &bundle(2.0)).unwrap();

        fs::remove_file(dir.path().join("episode_000500").join("value.bin")).unwrap();

        let err = manager.load_if_present("episode_000500").unwrap_err();
        assert!(matches!(err, CheckpointError::Partial { .. }));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let manager = CheckpointManager::new(CheckpointConfig::new(dir.path())).unwrap();
        manager.save(FINAL_TAG, &bundle(3.0)).unwrap();

        let mut f = File::create(dir.path().join(FINAL_TAG).join("policy.bin")).unwrap();
        f.write_all(b"not a parameter set").unwrap();

        let err = manager.load_if_present(FINAL_TAG).unwrap_err();
        assert!(matches!(err, CheckpointError::Codec(_)));
    }

    #[test]
    fn test_overwrite_same_tag() {
        let dir = tempdir().unwrap();
        let manager = CheckpointManager::new(CheckpointConfig::new(dir.path())).unwrap();

        manager.save(FINAL_TAG, &bundle(1.0)).unwrap();
        manager.save(FINAL_TAG, &bundle(9.0)).unwrap();

        let loaded = manager.load_if_present(FINAL_TAG).unwrap().unwrap();
        assert_eq!(loaded, bundle(9.0));
    }

    #[test]
    fn test_list_tags_sorted() {
        let dir = tempdir().unwrap();
        let manager = CheckpointManager::new(CheckpointConfig::new(dir.path())).unwrap();

        manager
            .save(&CheckpointManager::episode_tag(1000), &bundle(0.0))
            .unwrap();
        manager
            .save(&CheckpointManager::episode_tag(500), &bundle(0.0))
            .unwrap();
        manager.save(FINAL_TAG, &bundle(0.0)).unwrap();

        assert_eq!(
            manager.list_tags().unwrap(),
            vec![
                "episode_000500".to_string(),
                "episode_001000".to_string(),
                "final".to_string()
            ]
        );
    }

    #[test]
    fn test_checkpoint_dir_creation() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested/checkpoints");
        let _manager = CheckpointManager::new(CheckpointConfig::new(&nested)).unwrap();
        assert!(nested.exists());
    }
}
