use crate::lexer::{has_unquoted_space, split_words, unquote};
use crate::types::{Color, Coord, Value};
use regex::Regex;
use std::sync::OnceLock;

fn color_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b([RGBA]):\s*(\d+)"))
        .as_ref()
        .ok()
}

fn coord_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b([XYZ]):\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)")
    })
    .as_ref()
    .ok()
}

/// Whether every one of `letters` appears as a marker the scan `re` reads.
fn has_markers(re: Option<&Regex>, text: &str, letters: &[char]) -> bool {
    let Some(re) = re else {
        return false;
    };
    let found: Vec<char> = re
        .captures_iter(text)
        .filter_map(|caps| caps[1].chars().next())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    letters.iter().all(|l| found.contains(l))
}

/// Infers a typed [`Value`] from raw property text.
///
/// Precedence, first match wins: quoted string, color, percentage,
/// coordinate, boolean, integer, float, list, plain string. The order
/// matters: list splitting only happens once nothing earlier matched.
pub fn coerce(raw: &str) -> Value {
    let text = raw.trim();
    if text.is_empty() {
        return Value::String(String::new());
    }

    if is_fully_quoted(text) {
        return Value::String(unquote(text).to_string());
    }

    if has_markers(color_regex(), text, &['R', 'G', 'B']) {
        return Value::Color(parse_color(text));
    }

    if let Some(prefix) = text.strip_suffix('%') {
        if let Some(v) = parse_float(prefix.trim()) {
            return Value::Float(v / 100.0);
        }
    }

    if has_markers(coord_regex(), text, &['X', 'Y']) {
        return Value::Coord(parse_coord(text));
    }

    if let Some(b) = parse_bool(text) {
        return Value::Bool(b);
    }

    if let Ok(v) = text.parse::<i64>() {
        return Value::Int(v);
    }

    if let Some(v) = parse_float(text) {
        return Value::Float(v);
    }

    if has_unquoted_space(text) {
        return Value::List(
            split_words(text)
                .into_iter()
                .map(|word| Value::String(unquote(word).to_string()))
                .collect(),
        );
    }

    Value::String(text.to_string())
}

fn is_fully_quoted(text: &str) -> bool {
    text.len() >= 2
        && text.starts_with('"')
        && text.ends_with('"')
        && !text[1..text.len() - 1].contains('"')
}

/// `yes`/`true` and `no`/`false`, any case.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

/// Finite decimal float literal. Rejects the digit-less words Rust's parser
/// accepts (`inf`, `NaN`) and literals that overflow to infinity.
pub fn parse_float(text: &str) -> Option<f64> {
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_color(text: &str) -> Color {
    let mut color = Color::default();
    let mut seen = [false; 4];
    let Some(re) = color_regex() else {
        return color;
    };
    for caps in re.captures_iter(text) {
        let channel = caps[1].to_ascii_uppercase();
        let level = caps[2].parse::<u32>().map_or(255, |v| v.min(255)) as u8;
        let slot = match channel.as_str() {
            "R" => 0,
            "G" => 1,
            "B" => 2,
            _ => 3,
        };
        if seen[slot] {
            continue;
        }
        seen[slot] = true;
        match slot {
            0 => color.r = level,
            1 => color.g = level,
            2 => color.b = level,
            _ => color.a = level,
        }
    }
    color
}

fn parse_coord(text: &str) -> Coord {
    let mut coord = Coord::default();
    let mut seen = [false; 3];
    let Some(re) = coord_regex() else {
        return coord;
    };
    for caps in re.captures_iter(text) {
        let Ok(v) = caps[2].parse::<f64>() else {
            continue;
        };
        let slot = match caps[1].to_ascii_uppercase().as_str() {
            "X" => 0,
            "Y" => 1,
            _ => 2,
        };
        if seen[slot] {
            continue;
        }
        seen[slot] = true;
        match slot {
            0 => coord.x = v,
            1 => coord.y = v,
            _ => coord.z = v,
        }
    }
    coord
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Value {
        Value::List(items.iter().map(|s| Value::String(s.to_string())).collect())
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(coerce("12"), Value::Int(12));
        assert_eq!(coerce("-7"), Value::Int(-7));
        assert_eq!(coerce("12.5"), Value::Float(12.5));
        assert_eq!(coerce("25%"), Value::Float(0.25));
        assert_eq!(coerce("yes"), Value::Bool(true));
        assert_eq!(coerce("FALSE"), Value::Bool(false));
        assert_eq!(coerce("No"), Value::Bool(false));
        assert_eq!(coerce(""), Value::String(String::new()));
        assert_eq!(coerce("   "), Value::String(String::new()));
        assert_eq!(coerce("GLA"), Value::String("GLA".to_string()));
    }

    #[test]
    fn test_coerce_quoted_string() {
        assert_eq!(
            coerce("\"Hello World\""),
            Value::String("Hello World".to_string())
        );
        assert_eq!(coerce("\"12\""), Value::String("12".to_string()));
        assert_eq!(coerce("\"\""), Value::String(String::new()));
    }

    #[test]
    fn test_coerce_color() {
        assert_eq!(
            coerce("R:100 G:150 B:255"),
            Value::Color(Color {
                r: 100,
                g: 150,
                b: 255,
                a: 255
            })
        );
        assert_eq!(
            coerce("b:1 a:2 r:3 g:4"),
            Value::Color(Color {
                r: 3,
                g: 4,
                b: 1,
                a: 2
            })
        );
        // Out of range channels clamp.
        assert_eq!(coerce("R:999 G:0 B:0").as_color().map(|c| c.r), Some(255));
    }

    #[test]
    fn test_coerce_coord() {
        assert_eq!(
            coerce("X:1.5 Y:-2"),
            Value::Coord(Coord {
                x: 1.5,
                y: -2.0,
                z: 0.0
            })
        );
        assert_eq!(
            coerce("X:0 Y:0 Z:10.25"),
            Value::Coord(Coord {
                x: 0.0,
                y: 0.0,
                z: 10.25
            })
        );
    }

    #[test]
    fn test_coerce_list() {
        assert_eq!(
            coerce("INFANTRY SELECTABLE"),
            strings(&["INFANTRY", "SELECTABLE"])
        );
        assert_eq!(coerce("A  \"b c\"  D"), strings(&["A", "b c", "D"]));
    }

    #[test]
    fn test_coerce_precedence() {
        // Percentage is checked before list splitting.
        assert_eq!(coerce("50 %"), Value::Float(0.5));
        // Color markers win over everything but quotes.
        assert!(matches!(coerce("R:1 G:2 B:3 X:4 Y:5"), Value::Color(_)));
        assert_eq!(coerce("\"R:1 G:2 B:3\""), Value::String("R:1 G:2 B:3".into()));
        // Not a number word.
        assert_eq!(coerce("NaN"), Value::String("NaN".to_string()));
        assert_eq!(coerce("abc%"), Value::String("abc%".to_string()));
    }

    #[test]
    fn test_markers_need_word_boundary() {
        // `COLOR:` ends in `R:` but is not a red channel.
        assert_eq!(
            coerce("COLOR:5 G:1 B:2"),
            strings(&["COLOR:5", "G:1", "B:2"])
        );
        assert_eq!(coerce("MAX:1 Y:2"), strings(&["MAX:1", "Y:2"]));
        assert!(matches!(coerce("r: 5 g: 1 b: 2"), Value::Color(_)));
    }

    #[test]
    fn test_parse_float_rejects_non_finite() {
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("infinity"), None);
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("1e999"), None);
        assert_eq!(parse_float("-2.5e3"), Some(-2500.0));
    }
}
