use crate::cli::args::{
    CheckArgs, Cli, Commands, Image2Base64Args, ImagesClustersArgs, ImagesTableArgs,
};
use crate::core::dataset::Dataset;
use crate::core::engine::{self, ClustersConfig, TableConfig};
use crate::core::fields::FieldPath;
use crate::core::imaging;
use crate::report::html::{ImagesClusters, ImagesTable, Render};
use crate::report::output;
use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const EMPTY_DATASET_MESSAGE: &str = "No images found in the folder";

pub fn entry() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    execute(cli)
}

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check(args) => check(args),
        Commands::Image2Base64(args) => image2base64(args),
        Commands::ImagesTableSimple(args) => images_table_simple(args).map(|_| ()),
        Commands::ImagesClustersSimple(args) => images_clusters_simple(args).map(|_| ()),
    }
}

fn check(args: CheckArgs) -> Result<()> {
    println!("Hello {}", args.name);
    Ok(())
}

fn image2base64(args: Image2Base64Args) -> Result<()> {
    let url = imaging::file_to_data_url(&args.image_path, args.quality, args.format.as_deref())
        .with_context(|| format!("failed to encode {}", args.image_path.display()))?;
    println!("{url}");
    Ok(())
}

/// Returns the written report path, or `None` when the dataset was empty.
pub fn images_table_simple(args: ImagesTableArgs) -> Result<Option<PathBuf>> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    let Some(dataset) = open_dataset(stats, &args.folder)? else {
        return Ok(None);
    };

    let config = TableConfig {
        title: args.title,
        keys: args.keys,
        mkeys: args.mkeys,
        embed: args.embed,
        embed_quality: args.embed_quality,
        group_size: args.group_size,
        show_indices: args.show_indices,
    };

    let t_build = Instant::now();
    let params = engine::build_table(dataset, &config)?;
    stage_done(stats, "collect", t_build);

    let t_render = Instant::now();
    let html = ImagesTable.render(&params)?;
    stage_done(stats, "render", t_render);

    let path = save(stats, args.output_file.as_deref(), &html)?;
    if stats {
        eprintln!("LABELVIEW_STATS total={}", fmt_dur(t0.elapsed()));
    }
    Ok(Some(path))
}

/// Returns the written report path, or `None` when the dataset was empty.
pub fn images_clusters_simple(args: ImagesClustersArgs) -> Result<Option<PathBuf>> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    let Some(dataset) = open_dataset(stats, &args.folder)? else {
        return Ok(None);
    };

    let color_key = if args.color_key.is_empty() {
        None
    } else {
        Some(FieldPath::parse(&args.color_key))
    };
    let config = ClustersConfig {
        title: args.title,
        image_key: args.image_key,
        label_key: FieldPath::parse(&args.label_key),
        color_key,
        embed: args.embed,
        embed_quality: args.embed_quality,
    };

    let t_build = Instant::now();
    let params = engine::build_clusters(&dataset, &config)?;
    stage_done(stats, "collect", t_build);

    let t_render = Instant::now();
    let html = ImagesClusters.render(&params)?;
    stage_done(stats, "render", t_render);

    let path = save(stats, args.output_file.as_deref(), &html)?;
    if stats {
        eprintln!("LABELVIEW_STATS total={}", fmt_dur(t0.elapsed()));
    }
    Ok(Some(path))
}

fn open_dataset(stats: bool, folder: &Path) -> Result<Option<Dataset>> {
    let t = Instant::now();
    let dataset = Dataset::open(folder)
        .with_context(|| format!("failed to open dataset {}", folder.display()))?;
    stage_done(stats, "open", t);

    if dataset.is_empty() {
        println!("{EMPTY_DATASET_MESSAGE}");
        return Ok(None);
    }
    if stats {
        eprintln!(
            "LABELVIEW_STATS input={} samples={}",
            folder.display(),
            dataset.len()
        );
    }
    Ok(Some(dataset))
}

fn save(stats: bool, output_file: Option<&Path>, html: &str) -> Result<PathBuf> {
    let t = Instant::now();
    let path = output::save(output_file, html)?;
    stage_done(stats, "write", t);
    if stats {
        eprintln!(
            "LABELVIEW_STATS output html={} bytes={}",
            path.display(),
            html.len()
        );
    }
    println!("HTML file saved at {}", path.display());
    Ok(path)
}

fn stats_enabled() -> bool {
    matches!(env::var("LABELVIEW_STATS").as_deref(), Ok("1"))
}

fn stage_done(stats: bool, name: &str, t: Instant) {
    if stats {
        eprintln!("LABELVIEW_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
