use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "labelview",
    version,
    about = "Static HTML reports for labeled image datasets",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Smoke test: greets NAME
    #[command(name = "check")]
    Check(CheckArgs),

    /// Print an image file as a base64 data URL
    #[command(name = "image2base64")]
    Image2Base64(Image2Base64Args),

    /// Render a table with one row per sample
    #[command(name = "images_table_simple")]
    ImagesTableSimple(ImagesTableArgs),

    /// Render images grouped by label
    #[command(name = "images_clusters_simple")]
    ImagesClustersSimple(ImagesClustersArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// The name of the person to greet
    #[arg(long)]
    pub name: String,
}

#[derive(Parser, Debug)]
pub struct Image2Base64Args {
    /// The input image file
    #[arg(short = 'i', long = "image-path")]
    pub image_path: PathBuf,

    /// Quality for lossy formats (0-100)
    #[arg(short = 'q', long, default_value_t = 70, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: u8,

    /// Target format; defaults to the file extension
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ImagesTableArgs {
    /// The title of the generated HTML file
    #[arg(long, default_value = "Images Table")]
    pub title: String,

    /// The underfolder containing the samples
    #[arg(long)]
    pub folder: PathBuf,

    /// Image keys to show; all keys of the first sample when omitted
    #[arg(long = "keys")]
    pub keys: Vec<String>,

    /// Metadata keys to show
    #[arg(long = "mkeys", visible_alias = "metadata-keys")]
    pub mkeys: Vec<String>,

    /// Embed images directly in the HTML file
    #[arg(long, default_value_t = false)]
    pub embed: bool,

    /// Quality of embedded images (0-100)
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub embed_quality: u8,

    /// Where to save the HTML file; a temporary file when omitted
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Draw a divider every N rows
    #[arg(long)]
    pub group_size: Option<usize>,

    /// Show the sample index in the first column
    #[arg(long, default_value_t = false)]
    pub show_indices: bool,
}

#[derive(Parser, Debug)]
pub struct ImagesClustersArgs {
    /// The title of the generated HTML file
    #[arg(long, default_value = "Images Clusters")]
    pub title: String,

    /// The underfolder containing the samples
    #[arg(long)]
    pub folder: PathBuf,

    /// Key of the image item
    #[arg(long, default_value = "image")]
    pub image_key: String,

    /// Label location, dot notation for nested keys
    #[arg(long, default_value = "metadata.label")]
    pub label_key: String,

    /// RGB color location, dot notation for nested keys; palette colors when empty
    #[arg(long, default_value = "")]
    pub color_key: String,

    /// Embed images directly in the HTML file
    #[arg(long, default_value_t = false)]
    pub embed: bool,

    /// Quality of embedded images (0-100)
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub embed_quality: u8,

    /// Where to save the HTML file; a temporary file when omitted
    #[arg(long)]
    pub output_file: Option<PathBuf>,
}
