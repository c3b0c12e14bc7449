/// A resolved color: normalized `#RRGGBB` hex plus an optional opacity
/// string carried separately, since SVG splits color and alpha across
/// attributes (`fill` / `fill-opacity`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorValue {
    pub hex: String,
    pub alpha: Option<String>,
}

impl ColorValue {
    pub fn opaque(hex: impl Into<String>) -> Self {
        ColorValue {
            hex: hex.into(),
            alpha: None,
        }
    }

    pub fn with_alpha(hex: impl Into<String>, alpha: impl Into<String>) -> Self {
        ColorValue {
            hex: hex.into(),
            alpha: Some(alpha.into()),
        }
    }
}

/// The color names Android's resource compiler accepts, with the platform's
/// values (gray is #888888 here, not the web's #808080).
pub fn named(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "aqua" => Some("#00FFFF"),
        "black" => Some("#000000"),
        "blue" => Some("#0000FF"),
        "cyan" => Some("#00FFFF"),
        "darkgray" => Some("#444444"),
        "darkgrey" => Some("#444444"),
        "fuchsia" => Some("#FF00FF"),
        "gray" => Some("#888888"),
        "green" => Some("#00FF00"),
        "grey" => Some("#888888"),
        "lightgray" => Some("#CCCCCC"),
        "lightgrey" => Some("#CCCCCC"),
        "lime" => Some("#00FF00"),
        "magenta" => Some("#FF00FF"),
        "maroon" => Some("#800000"),
        "navy" => Some("#000080"),
        "olive" => Some("#808000"),
        "purple" => Some("#800080"),
        "red" => Some("#FF0000"),
        "silver" => Some("#C0C0C0"),
        "teal" => Some("#008080"),
        "white" => Some("#FFFFFF"),
        "yellow" => Some("#FFFF00"),
        _ => None,
    }
}

/// Parses an Android hex color literal. Accepts #RGB, #ARGB, #RRGGBB and
/// #AARRGGBB; shorthand forms expand by digit doubling before the long
/// rules apply. Alpha, when present, leads.
pub fn parse_hex(literal: &str) -> Option<ColorValue> {
    let digits = literal.strip_prefix('#')?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match digits.len() {
        3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => digits.to_string(),
        _ => return None,
    };
    if expanded.len() == 6 {
        return Some(ColorValue::opaque(format!("#{}", expanded)));
    }
    let alpha = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    Some(ColorValue::with_alpha(
        format!("#{}", &expanded[2..]),
        format_alpha(alpha),
    ))
}

/// Renders an alpha byte as the SVG opacity string: value/255 rounded to
/// two decimals, trailing zeros trimmed (0x80 -> "0.5", 0xFF -> "1").
pub fn format_alpha(alpha: u8) -> String {
    let rounded = (alpha as f64 / 255.0 * 100.0).round() / 100.0;
    let mut out = format!("{:.2}", rounded);
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    out
}
