use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `html` to `path` through a sibling `.tmp` file so a failed run never
/// leaves a truncated report behind.
pub fn write_html(path: &Path, html: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("output path has no file name: {}", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    match write_file(&tmp_path, html) {
        Ok(()) => {
            fs::rename(&tmp_path, path)
                .with_context(|| format!("failed to move report to {}", path.display()))?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

/// Persists `html` into a fresh `*.html` file in the system temp dir.
pub fn write_temp_html(html: &str) -> Result<PathBuf> {
    let mut tmp = tempfile::Builder::new()
        .prefix("labelview-")
        .suffix(".html")
        .tempfile()
        .with_context(|| "failed to create temporary report file")?;
    tmp.write_all(html.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.flush()?;
    let (_, path) = tmp
        .keep()
        .with_context(|| "failed to keep temporary report file")?;
    Ok(path)
}

/// Writes to `output` when given, otherwise to a temp file. Returns the path.
pub fn save(output: Option<&Path>, html: &str) -> Result<PathBuf> {
    match output {
        Some(path) => {
            write_html(path, html)?;
            Ok(path.to_path_buf())
        }
        None => write_temp_html(html),
    }
}

fn write_file(path: &Path, html: &str) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    w.write_all(html.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    w.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
