use crate::core::color::{color_value_to_hex, label_to_hex};
use crate::core::dataset::{Dataset, Item, Sample};
use crate::core::fields::FieldPath;
use crate::core::imaging::{self, encode_to_data_url};
use crate::core::label::to_label;
use crate::core::model::Label;
use crate::report::html::{GlobalParams, ImagesClustersParams, ImagesTableParams};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

/// Format used when cluster images are embedded.
pub const CLUSTER_EMBED_FORMAT: &str = "jpeg";

pub struct TableConfig {
    pub title: String,
    pub keys: Vec<String>,
    pub mkeys: Vec<String>,
    pub embed: bool,
    pub embed_quality: u8,
    pub group_size: Option<usize>,
    pub show_indices: bool,
}

pub struct ClustersConfig {
    pub title: String,
    pub image_key: String,
    pub label_key: FieldPath,
    pub color_key: Option<FieldPath>,
    pub embed: bool,
    pub embed_quality: u8,
}

pub fn build_table(dataset: Dataset, cfg: &TableConfig) -> Result<ImagesTableParams> {
    let t0 = Instant::now();

    // No keys means "every key of the first sample"; filtering only applies
    // when the caller named both kinds of keys.
    let (keys, dataset) = if cfg.keys.is_empty() {
        let keys = dataset.get(0).map(Sample::keys).unwrap_or_default();
        (keys, dataset)
    } else if !cfg.mkeys.is_empty() {
        let wanted: Vec<String> = cfg.keys.iter().chain(&cfg.mkeys).cloned().collect();
        (cfg.keys.clone(), dataset.filter_keys(&wanted))
    } else {
        (cfg.keys.clone(), dataset)
    };

    let mut images = Vec::with_capacity(dataset.len());
    let mut metadatas = Vec::with_capacity(dataset.len());
    for sample in &dataset {
        let mut row = BTreeMap::new();
        for key in &keys {
            match sample.get(key) {
                Some(item) if item.is_image() => {
                    row.insert(key.clone(), table_image_url(item, cfg)?);
                }
                Some(_) => {}
                None => log::warn!("sample {} has no item '{}'", sample.index(), key),
            }
        }
        images.push(row);

        let mut mrow = BTreeMap::new();
        for mkey in &cfg.mkeys {
            let Some(item) = sample.get(mkey).filter(|i| i.is_metadata()) else {
                continue;
            };
            let value = item
                .metadata()
                .with_context(|| format!("sample {}: failed to load '{}'", sample.index(), mkey))?;
            mrow.insert(mkey.clone(), flatten_metadata(&value));
        }
        metadatas.push(mrow);
    }

    log::info!(
        "table: {} samples, {} image keys, {} metadata keys in {:?}",
        images.len(),
        keys.len(),
        cfg.mkeys.len(),
        t0.elapsed()
    );

    Ok(ImagesTableParams {
        title: cfg.title.clone(),
        keys,
        images,
        mkeys: cfg.mkeys.clone(),
        metadatas,
        group_size: cfg.group_size,
        show_indices: cfg.show_indices,
        global: GlobalParams::default(),
    })
}

pub fn build_clusters(dataset: &Dataset, cfg: &ClustersConfig) -> Result<ImagesClustersParams> {
    let t0 = Instant::now();
    let mut clusters: BTreeMap<Label, Vec<String>> = BTreeMap::new();
    let mut colors: BTreeMap<Label, String> = BTreeMap::new();
    let mut skipped = 0usize;

    for sample in dataset {
        let Some(item) = sample.get(&cfg.image_key).filter(|i| i.is_image()) else {
            skipped += 1;
            continue;
        };

        let raw = cfg
            .label_key
            .resolve(sample)
            .with_context(|| format!("sample {}: cannot read label", sample.index()))?;
        let label = to_label(&raw)?;

        if !colors.contains_key(&label) {
            let color = match &cfg.color_key {
                Some(path) => {
                    let value = path
                        .resolve(sample)
                        .with_context(|| format!("sample {}: cannot read color", sample.index()))?;
                    color_value_to_hex(&value)?
                }
                None => label_to_hex(label),
            };
            colors.insert(label, color);
        }

        let url = cluster_image_url(item, cfg)?;
        clusters.entry(label).or_default().push(url);
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} samples without an image at '{}'", cfg.image_key);
    }
    log::info!(
        "clusters: {} labels from {} samples in {:?}",
        clusters.len(),
        dataset.len() - skipped,
        t0.elapsed()
    );

    Ok(ImagesClustersParams {
        title: cfg.title.clone(),
        images_clusters: clusters,
        labels_colors: colors,
        global: GlobalParams::default(),
    })
}

/// Flattens a metadata document into printable `field -> text` pairs.
pub fn flatten_metadata(value: &Value) -> BTreeMap<String, String> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), format_metadata_value(v)))
            .collect(),
        other => BTreeMap::from([("value".to_string(), format_metadata_value(other))]),
    }
}

pub fn format_metadata_value(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => format!("{f:.4}"),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn table_image_url(item: &Item, cfg: &TableConfig) -> Result<String> {
    if !cfg.embed {
        return Ok(item.path().display().to_string());
    }
    imaging::file_to_data_url(item.path(), cfg.embed_quality, None)
        .with_context(|| format!("failed to embed {}", item.path().display()))
}

fn cluster_image_url(item: &Item, cfg: &ClustersConfig) -> Result<String> {
    if !cfg.embed {
        return Ok(item.path().display().to_string());
    }
    let image = item.load_image()?;
    encode_to_data_url(&image, cfg.embed_quality, CLUSTER_EMBED_FORMAT)
        .with_context(|| format!("failed to embed {}", item.path().display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_values_are_formatted() {
        assert_eq!(format_metadata_value(&json!(0.123456)), "0.1235");
        assert_eq!(format_metadata_value(&json!(1.0)), "1.0000");
        assert_eq!(format_metadata_value(&json!(3)), "3");
        assert_eq!(format_metadata_value(&json!("cat")), "cat");
        assert_eq!(format_metadata_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn flatten_objects_and_scalars() {
        let flat = flatten_metadata(&json!({"score": 0.5, "name": "x"}));
        assert_eq!(flat.get("score").map(String::as_str), Some("0.5000"));
        assert_eq!(flat.get("name").map(String::as_str), Some("x"));

        let flat = flatten_metadata(&json!(7));
        assert_eq!(flat.get("value").map(String::as_str), Some("7"));
    }
}
