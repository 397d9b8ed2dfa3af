#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

pub fn write_png(path: &Path, color: [u8; 3]) {
    let img = RgbImage::from_pixel(2, 2, Rgb(color));
    img.save(path).unwrap();
}

/// Builds `<root>/data/` and returns its path.
pub fn data_dir(root: &Path) -> PathBuf {
    let dir = root.join("data");
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes `<index>_image.png` plus `<index>_metadata.json` holding `metadata`.
pub fn write_sample(root: &Path, index: u32, color: [u8; 3], metadata: Option<&str>) -> PathBuf {
    let dir = data_dir(root);
    let image = dir.join(format!("{index:06}_image.png"));
    write_png(&image, color);
    if let Some(meta) = metadata {
        fs::write(dir.join(format!("{index:06}_metadata.json")), meta).unwrap();
    }
    image
}
