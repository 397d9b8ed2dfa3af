use std::fmt;
use std::str::FromStr;

pub type Label = i64;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColorFormat {
    Rgb,
    Rgba,
    Hex,
}

impl ColorFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorFormat::Rgb => "rgb",
            ColorFormat::Rgba => "rgba",
            ColorFormat::Hex => "hex",
        }
    }
}

impl FromStr for ColorFormat {
    type Err = crate::core::color::ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rgb" => Ok(ColorFormat::Rgb),
            "rgba" => Ok(ColorFormat::Rgba),
            "hex" => Ok(ColorFormat::Hex),
            other => Err(crate::core::color::ColorError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A palette color in one of the three output encodings.
#[derive(Clone, Debug, PartialEq)]
pub enum Color {
    Rgb([f64; 3]),
    /// Alpha is on the same normalized scale as the channels.
    Rgba([f64; 4]),
    Hex(String),
}

impl Color {
    pub fn as_hex(&self) -> Option<&str> {
        match self {
            Color::Hex(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Bmp,
}

impl ImageKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "bmp" => Some(ImageKind::Bmp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
            ImageKind::Bmp => "bmp",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetadataKind {
    Json,
    Yaml,
}

impl MetadataKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(MetadataKind::Json),
            "yml" | "yaml" => Some(MetadataKind::Yaml),
            _ => None,
        }
    }
}
