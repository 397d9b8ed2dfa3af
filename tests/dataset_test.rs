// Underfolder layout handling.
mod common;

use labelview::core::dataset::{Dataset, DatasetError};
use labelview::core::fields::FieldPath;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;

#[test]
fn samples_are_ordered_numerically() {
    let dir = tempfile::tempdir().unwrap();
    let data = common::data_dir(dir.path());
    for idx in [10u32, 2, 1] {
        common::write_png(&data.join(format!("{idx}_image.png")), [0, 0, 0]);
    }
    fs::write(data.join("README"), "ignored").unwrap();

    let ds = Dataset::open(dir.path()).unwrap();
    let order: Vec<u64> = ds.iter().map(|s| s.index()).collect();
    assert_eq!(order, vec![1, 2, 10]);
    assert_eq!(ds.len(), 3);
}

#[test]
fn shared_items_reach_every_sample() {
    let dir = tempfile::tempdir().unwrap();
    common::write_sample(dir.path(), 0, [0, 0, 0], Some(r#"{"label": 1}"#));
    common::write_sample(dir.path(), 1, [0, 0, 0], None);
    fs::write(dir.path().join("metadata.yml"), "label: 9\n").unwrap();
    fs::write(dir.path().join("info.yaml"), "split: train\n").unwrap();

    let ds = Dataset::open(dir.path()).unwrap();
    let labels = FieldPath::parse("metadata.label");
    let first = ds.get(0).unwrap();
    let second = ds.get(1).unwrap();

    // a per-sample item wins over the shared one
    assert_eq!(labels.resolve(first).unwrap(), json!(1));
    assert_eq!(labels.resolve(second).unwrap(), json!(9));
    assert_eq!(
        FieldPath::parse("info.split").resolve(second).unwrap(),
        json!("train")
    );
    assert_eq!(first.keys(), vec!["image", "info", "metadata"]);
}

#[test]
fn filter_keys_restricts_items() {
    let dir = tempfile::tempdir().unwrap();
    common::write_sample(dir.path(), 0, [0, 0, 0], Some("{}"));
    let ds = Dataset::open(dir.path())
        .unwrap()
        .filter_keys(&["image".to_string(), "absent".to_string()]);
    let sample = ds.get(0).unwrap();
    assert_eq!(sample.keys(), vec!["image"]);
    assert!(sample.get("image").unwrap().is_image());
}

#[test]
fn whole_item_and_nested_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let data = common::data_dir(dir.path());
    fs::write(data.join("000000_label.json"), "4").unwrap();
    fs::write(
        data.join("000000_meta.yml"),
        "cls:\n  id: 2\n  name: dog\n",
    )
    .unwrap();

    let ds = Dataset::open(dir.path()).unwrap();
    let s = ds.get(0).unwrap();
    assert_eq!(FieldPath::parse("label").resolve(s).unwrap(), json!(4));
    assert_eq!(FieldPath::parse("meta.cls.id").resolve(s).unwrap(), json!(2));
    assert!(matches!(
        FieldPath::parse("meta.cls.age").resolve(s),
        Err(DatasetError::MissingField(_))
    ));
    assert!(matches!(
        FieldPath::parse("nothing.here").resolve(s),
        Err(DatasetError::MissingField(_))
    ));
}

#[test]
fn image_items_are_not_metadata() {
    let dir = tempfile::tempdir().unwrap();
    common::write_sample(dir.path(), 0, [0, 0, 0], None);
    let ds = Dataset::open(dir.path()).unwrap();
    assert!(matches!(
        FieldPath::parse("image.label").resolve(ds.get(0).unwrap()),
        Err(DatasetError::NotMetadata { .. })
    ));
}

#[test]
fn broken_metadata_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    common::write_sample(dir.path(), 0, [0, 0, 0], Some("{not json"));
    let ds = Dataset::open(dir.path()).unwrap();
    let err = FieldPath::parse("metadata.label")
        .resolve(ds.get(0).unwrap())
        .unwrap_err();
    assert!(matches!(err, DatasetError::Metadata { .. }));
    assert!(err.to_string().contains("000000_metadata.json"));
}

#[test]
fn a_file_is_not_a_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();
    assert!(matches!(
        Dataset::open(&file),
        Err(DatasetError::NotADirectory(_))
    ));
}
