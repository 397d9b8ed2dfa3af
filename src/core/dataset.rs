//! Folder-backed sample sequences ("underfolders").
//!
//! Per-sample files live in `<root>/data/` as `<index>_<key>.<ext>`. Files
//! directly under `<root>` are shared items attached to every sample.

use crate::core::imaging::{self, ImageError};
use crate::core::model::{ImageKind, MetadataKind};
use image::DynamicImage;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "data";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset folder not found: {0}")]
    MissingFolder(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse metadata {path}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    #[error("item '{key}' is not metadata")]
    NotMetadata { key: String },

    #[error("missing field '{0}'")]
    MissingField(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Image(ImageKind),
    Metadata(MetadataKind),
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    path: PathBuf,
    kind: ItemKind,
}

impl Item {
    fn from_path(path: PathBuf, ext: &str) -> Self {
        let kind = if let Some(k) = ImageKind::from_extension(ext) {
            ItemKind::Image(k)
        } else if let Some(k) = MetadataKind::from_extension(ext) {
            ItemKind::Metadata(k)
        } else {
            ItemKind::Other
        };
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ItemKind::Image(_))
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self.kind, ItemKind::Metadata(_))
    }

    pub fn load_image(&self) -> Result<DynamicImage, ImageError> {
        imaging::load_image(&self.path)
    }

    /// Parses the backing file. Only valid for metadata items.
    pub fn metadata(&self) -> Result<Value, DatasetError> {
        let ItemKind::Metadata(kind) = self.kind else {
            return Err(DatasetError::NotMetadata {
                key: self.path.display().to_string(),
            });
        };
        let text = fs::read_to_string(&self.path).map_err(|source| DatasetError::Io {
            path: self.path.clone(),
            source,
        })?;
        let parsed: Result<Value, String> = match kind {
            MetadataKind::Json => serde_json::from_str(&text).map_err(|e| e.to_string()),
            MetadataKind::Yaml => serde_yaml::from_str(&text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| DatasetError::Metadata {
            path: self.path.clone(),
            reason,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    index: u64,
    items: BTreeMap<String, Item>,
}

impl Sample {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.items.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Sorted item keys.
    pub fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn retain_keys(&mut self, keys: &[String]) {
        self.items.retain(|k, _| keys.iter().any(|want| want == k));
    }
}

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    root: PathBuf,
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn open(root: &Path) -> Result<Self, DatasetError> {
        if !root.exists() {
            return Err(DatasetError::MissingFolder(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(DatasetError::NotADirectory(root.to_path_buf()));
        }

        let shared = read_shared_items(root)?;

        let mut by_index: BTreeMap<u64, BTreeMap<String, Item>> = BTreeMap::new();
        let data_dir = root.join(DATA_DIR);
        if data_dir.is_dir() {
            for path in list_files(&data_dir)? {
                let Some((index, key, ext)) = parse_sample_file_name(&path) else {
                    log::debug!("skipping {}: not <index>_<key>.<ext>", path.display());
                    continue;
                };
                let item = Item::from_path(path.clone(), &ext);
                by_index.entry(index).or_default().insert(key, item);
            }
        }

        let samples = by_index
            .into_iter()
            .map(|(index, mut items)| {
                for (key, item) in &shared {
                    items.entry(key.clone()).or_insert_with(|| item.clone());
                }
                Sample { index, items }
            })
            .collect::<Vec<_>>();

        log::info!(
            "opened dataset {} ({} samples, {} shared items)",
            root.display(),
            samples.len(),
            shared.len()
        );

        Ok(Self {
            root: root.to_path_buf(),
            samples,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Sample> {
        self.samples.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Restricts every sample to `keys`; unknown keys are ignored.
    pub fn filter_keys(mut self, keys: &[String]) -> Self {
        for sample in &mut self.samples {
            sample.retain_keys(keys);
        }
        self
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_shared_items(root: &Path) -> Result<BTreeMap<String, Item>, DatasetError> {
    let mut shared = BTreeMap::new();
    for path in list_files(root)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let Some((key, ext)) = name.split_once('.') else {
            continue;
        };
        let (key, ext) = (key.to_string(), ext.to_string());
        shared.insert(key, Item::from_path(path, &ext));
    }
    Ok(shared)
}

/// Splits `000012_image.png` into `(12, "image", "png")`.
fn parse_sample_file_name(path: &Path) -> Option<(u64, String, String)> {
    let name = path.file_name()?.to_str()?;
    let (index, rest) = name.split_once('_')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (key, ext) = rest.split_once('.')?;
    if key.is_empty() {
        return None;
    }
    Some((index.parse().ok()?, key.to_string(), ext.to_string()))
}
