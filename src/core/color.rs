use crate::core::model::{Color, ColorFormat, Label};
use serde_json::Value;

pub const PALETTE: [[u8; 3]; 15] = [
    [244, 67, 54], // 0  red
    [76, 175, 80], // 1  green
    [33, 150, 243], // 2  blue
    [255, 235, 59], // 3  yellow
    [156, 39, 176], // 4  purple
    [0, 188, 212], // 5  cyan
    [255, 152, 0], // 6  orange
    [233, 30, 99], // 7  pink
    [0, 150, 136], // 8  teal
    [63, 81, 181], // 9  indigo
    [205, 220, 57], // 10 lime
    [121, 85, 72], // 11 brown
    [255, 87, 34], // 12 deep orange
    [3, 169, 244], // 13 light blue
    [96, 125, 139], // 14 blue grey
];

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("unknown color format '{0}' (expected rgb, rgba or hex)")]
    UnknownFormat(String),

    #[error("invalid color value {0}: expected a list of three integers in 0..=255")]
    InvalidValue(String),
}

pub fn palette_entry(label: Label) -> [u8; 3] {
    // rem_euclid keeps negative labels on the same cycle as positive ones.
    PALETTE[label.rem_euclid(PALETTE.len() as i64) as usize]
}

pub fn assign_color(label: Label, format: ColorFormat) -> Color {
    let rgb = normalize(palette_entry(label));
    match format {
        ColorFormat::Rgb => Color::Rgb(rgb),
        ColorFormat::Rgba => Color::Rgba([rgb[0], rgb[1], rgb[2], 1.0]),
        ColorFormat::Hex => Color::Hex(normalized_to_hex(rgb)),
    }
}

/// Hex string for `label`; shorthand for `assign_color(label, ColorFormat::Hex)`.
pub fn label_to_hex(label: Label) -> String {
    normalized_to_hex(normalize(palette_entry(label)))
}

pub fn rgb_bytes_to_hex(rgb: [u8; 3]) -> String {
    normalized_to_hex(normalize(rgb))
}

/// Converts a metadata color such as `[255, 0, 0]` to `#ff0000`.
pub fn color_value_to_hex(value: &Value) -> Result<String, ColorError> {
    let invalid = || ColorError::InvalidValue(value.to_string());
    let items = value.as_array().ok_or_else(invalid)?;
    if items.len() != 3 {
        return Err(invalid());
    }
    let mut rgb = [0u8; 3];
    for (slot, item) in rgb.iter_mut().zip(items) {
        let v = item.as_u64().ok_or_else(invalid)?;
        *slot = u8::try_from(v).map_err(|_| invalid())?;
    }
    Ok(rgb_bytes_to_hex(rgb))
}

fn normalize(rgb: [u8; 3]) -> [f64; 3] {
    [
        rgb[0] as f64 / 255.0,
        rgb[1] as f64 / 255.0,
        rgb[2] as f64 / 255.0,
    ]
}

fn normalized_to_hex(rgb: [f64; 3]) -> String {
    let to_byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        to_byte(rgb[0]),
        to_byte(rgb[1]),
        to_byte(rgb[2])
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_entry_is_red_500() {
        assert_eq!(assign_color(0, ColorFormat::Hex), Color::Hex("#f44336".into()));
    }

    #[test]
    fn congruent_labels_share_a_color() {
        for label in -45..45 {
            assert_eq!(label_to_hex(label), label_to_hex(label + 15));
            assert_eq!(label_to_hex(label), label_to_hex(label - 30));
        }
        assert_eq!(label_to_hex(-1), label_to_hex(14));
        assert_eq!(label_to_hex(i64::MIN), label_to_hex(i64::MIN.rem_euclid(15)));
    }

    #[test]
    fn rgb_is_normalized() {
        let Color::Rgb(rgb) = assign_color(2, ColorFormat::Rgb) else {
            panic!("expected rgb");
        };
        let expected = [33.0 / 255.0, 150.0 / 255.0, 243.0 / 255.0];
        for (got, want) in rgb.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn rgba_appends_opaque_alpha() {
        let Color::Rgba(rgba) = assign_color(1, ColorFormat::Rgba) else {
            panic!("expected rgba");
        };
        assert_eq!(rgba[3], 1.0);
        assert!((rgba[1] - 175.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn byte_hex_agrees_with_palette_hex() {
        assert_eq!(rgb_bytes_to_hex([255, 0, 0]), "#ff0000");
        for (i, rgb) in PALETTE.iter().enumerate() {
            assert_eq!(rgb_bytes_to_hex(*rgb), label_to_hex(i as i64));
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!("cmyk".parse::<ColorFormat>().is_err());
        assert!("HEX".parse::<ColorFormat>().is_err());
        assert_eq!("rgba".parse::<ColorFormat>().unwrap(), ColorFormat::Rgba);
    }

    #[test]
    fn metadata_color_values() {
        assert_eq!(color_value_to_hex(&json!([0, 255, 16])).unwrap(), "#00ff10");
        assert!(color_value_to_hex(&json!([0, 256, 16])).is_err());
        assert!(color_value_to_hex(&json!([0, 1])).is_err());
        assert!(color_value_to_hex(&json!("red")).is_err());
    }
}
