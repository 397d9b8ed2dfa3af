use crate::core::model::Label;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::time::{SystemTime, UNIX_EPOCH};

/// A report template: structured parameters in, a complete HTML document out.
pub trait Render {
    type Params;

    fn render(&self, params: &Self::Params) -> Result<String>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalParams {
    pub footnotes: String,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            footnotes: format!(
                "Generated by labelview {} &middot; {}",
                env!("CARGO_PKG_VERSION"),
                current_year()
            ),
        }
    }
}

/// One row per sample. `images[i]` maps image key to URL, `metadatas[i]` maps
/// metadata key to its flattened fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagesTableParams {
    pub title: String,
    pub keys: Vec<String>,
    pub images: Vec<BTreeMap<String, String>>,
    pub mkeys: Vec<String>,
    pub metadatas: Vec<BTreeMap<String, BTreeMap<String, String>>>,
    pub group_size: Option<usize>,
    pub show_indices: bool,
    pub global: GlobalParams,
}

impl Default for ImagesTableParams {
    fn default() -> Self {
        Self {
            title: "Images Table".to_string(),
            keys: Vec::new(),
            images: Vec::new(),
            mkeys: Vec::new(),
            metadatas: Vec::new(),
            group_size: None,
            show_indices: false,
            global: GlobalParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagesClustersParams {
    pub title: String,
    pub images_clusters: BTreeMap<Label, Vec<String>>,
    pub labels_colors: BTreeMap<Label, String>,
    pub global: GlobalParams,
}

impl Default for ImagesClustersParams {
    fn default() -> Self {
        Self {
            title: "Images Clusters".to_string(),
            images_clusters: BTreeMap::new(),
            labels_colors: BTreeMap::new(),
            global: GlobalParams::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ImagesTable;

#[derive(Clone, Copy, Debug, Default)]
pub struct ImagesClusters;

impl Render for ImagesTable {
    type Params = ImagesTableParams;

    fn render(&self, p: &ImagesTableParams) -> Result<String> {
        let mut html = String::with_capacity(16 * 1024);
        write_head(&mut html, &p.title)?;

        writeln!(html, "<h1>{}</h1>", escape(&p.title))?;
        writeln!(
            html,
            "<div class=\"meta\">Samples: <b>{}</b></div>",
            p.images.len().max(p.metadatas.len())
        )?;

        writeln!(html, "<table class=\"table\">")?;
        write!(html, "<thead><tr>")?;
        if p.show_indices {
            write!(html, "<th>#</th>")?;
        }
        for key in p.keys.iter().chain(&p.mkeys) {
            write!(html, "<th>{}</th>", escape(key))?;
        }
        writeln!(html, "</tr></thead>")?;
        writeln!(html, "<tbody>")?;

        let columns = p.keys.len() + p.mkeys.len() + usize::from(p.show_indices);
        let rows = p.images.len().max(p.metadatas.len());
        let empty_images = BTreeMap::new();
        let empty_meta = BTreeMap::new();
        for row in 0..rows {
            if let Some(n) = p.group_size.filter(|n| *n > 0) {
                if row > 0 && row % n == 0 {
                    writeln!(
                        html,
                        "<tr class=\"group-divider\"><td colspan=\"{}\"></td></tr>",
                        columns.max(1)
                    )?;
                }
            }

            let images = p.images.get(row).unwrap_or(&empty_images);
            let metadatas = p.metadatas.get(row).unwrap_or(&empty_meta);

            write!(html, "<tr>")?;
            if p.show_indices {
                write!(html, "<td class=\"index\">{row}</td>")?;
            }
            for key in &p.keys {
                match images.get(key) {
                    Some(url) => write!(
                        html,
                        "<td><img class=\"thumb\" src=\"{}\" alt=\"{}\" loading=\"lazy\"/></td>",
                        escape(url),
                        escape(key)
                    )?,
                    None => write!(html, "<td class=\"missing\">&ndash;</td>")?,
                }
            }
            for mkey in &p.mkeys {
                write!(html, "<td class=\"metadata\">")?;
                if let Some(fields) = metadatas.get(mkey) {
                    for (name, value) in fields {
                        write!(
                            html,
                            "<div><span class=\"mkey\">{}</span>: {}</div>",
                            escape(name),
                            escape(value)
                        )?;
                    }
                }
                write!(html, "</td>")?;
            }
            writeln!(html, "</tr>")?;
        }

        writeln!(html, "</tbody>")?;
        writeln!(html, "</table>")?;
        write_footer(&mut html, &p.global)?;
        Ok(html)
    }
}

impl Render for ImagesClusters {
    type Params = ImagesClustersParams;

    fn render(&self, p: &ImagesClustersParams) -> Result<String> {
        let mut html = String::with_capacity(16 * 1024);
        write_head(&mut html, &p.title)?;

        writeln!(html, "<h1>{}</h1>", escape(&p.title))?;
        let total: usize = p.images_clusters.values().map(Vec::len).sum();
        writeln!(
            html,
            "<div class=\"meta\">Clusters: <b>{}</b><br/>Images: <b>{}</b></div>",
            p.images_clusters.len(),
            total
        )?;

        for (label, urls) in &p.images_clusters {
            let color = p
                .labels_colors
                .get(label)
                .map(String::as_str)
                .unwrap_or("#9e9e9e");
            let color = escape(color);
            writeln!(
                html,
                "<section class=\"cluster\" id=\"cluster-{label}\" data-label=\"{label}\">"
            )?;
            writeln!(
                html,
                "<h2><span class=\"swatch\" style=\"background-color:{color}\"></span>Cluster {label} <span class=\"count\">({})</span></h2>",
                urls.len()
            )?;
            writeln!(html, "<div class=\"grid\">")?;
            for url in urls {
                writeln!(
                    html,
                    "<div class=\"card border-[{color}]\" style=\"border-color:{color}\"><img src=\"{}\" alt=\"cluster {label}\" loading=\"lazy\"/></div>",
                    escape(url)
                )?;
            }
            writeln!(html, "</div>")?;
            writeln!(html, "</section>")?;
        }

        write_footer(&mut html, &p.global)?;
        Ok(html)
    }
}

fn write_head(out: &mut String, title: &str) -> Result<()> {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(out, "<title>{}</title>", escape(title))?;
    writeln!(out, "<style>")?;
    writeln!(
        out,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(out, "h1{{margin:0 0 8px 0;font-size:24px;}}")?;
    writeln!(
        out,
        "h2{{margin:24px 0 8px 0;font-size:18px;display:flex;align-items:center;gap:8px;}}"
    )?;
    writeln!(out, ".meta{{color:#555;font-size:13px;margin-bottom:16px;}}")?;
    writeln!(out, ".table{{border-collapse:collapse;font-size:12px;}}")?;
    writeln!(
        out,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 6px;text-align:left;vertical-align:top;}}"
    )?;
    writeln!(out, ".table th{{background:#f5f5f5;position:sticky;top:0;}}")?;
    writeln!(out, ".thumb{{max-width:256px;max-height:256px;display:block;}}")?;
    writeln!(out, ".index{{color:#777;}}")?;
    writeln!(out, ".missing{{color:#aaa;text-align:center;}}")?;
    writeln!(out, ".mkey{{color:#555;font-weight:bold;}}")?;
    writeln!(out, ".group-divider td{{background:#333;height:3px;padding:0;}}")?;
    writeln!(
        out,
        ".swatch{{display:inline-block;width:16px;height:16px;border-radius:3px;}}"
    )?;
    writeln!(out, ".count{{color:#777;font-weight:normal;}}")?;
    writeln!(
        out,
        ".grid{{display:flex;flex-wrap:wrap;gap:8px;}}"
    )?;
    writeln!(
        out,
        ".card{{border-width:3px;border-style:solid;border-radius:4px;padding:2px;}}"
    )?;
    writeln!(out, ".card img{{max-width:160px;max-height:160px;display:block;}}")?;
    writeln!(
        out,
        "footer{{margin-top:32px;border-top:1px solid #eee;padding-top:8px;color:#777;font-size:12px;}}"
    )?;
    writeln!(out, "</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    Ok(())
}

fn write_footer(out: &mut String, global: &GlobalParams) -> Result<()> {
    // Footnotes are trusted markup.
    writeln!(out, "<footer>{}</footer>", global.footnotes)?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(())
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn current_year() -> i64 {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    year_from_unix(ts)
}

fn year_from_unix(ts: u64) -> i64 {
    let days = (ts / 86_400) as i64;
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let m = mp + if mp < 10 { 3 } else { -9 };
    y + if m <= 2 { 1 } else { 0 }
}
