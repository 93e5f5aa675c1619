//! Media query evaluation for `matchMedia`.
//!
//! Supports media types (`all`, `screen`, `print`), the `not` and `only`
//! prefixes, comma-separated query lists and the range features
//! `width`/`height` with `min-`/`max-` prefixes, plus `orientation` and
//! `prefers-color-scheme`. Anything else never matches.

use serde::Serialize;

use super::WindowConfig;

/// Result of `window.matchMedia(query)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaQueryList {
    pub media: String,
    pub matches: bool,
}

pub fn evaluate(query: &str, config: &WindowConfig) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    query.split(',').any(|q| evaluate_query(q, config))
}

fn evaluate_query(query: &str, config: &WindowConfig) -> bool {
    let Some(tokens) = tokenize(&query.to_ascii_lowercase()) else {
        return false;
    };
    let mut tokens = tokens.as_slice();
    let negate = match tokens.first().map(String::as_str) {
        Some("not") => {
            tokens = &tokens[1..];
            true
        }
        Some("only") => {
            tokens = &tokens[1..];
            false
        }
        _ => false,
    };
    if tokens.is_empty() {
        return false;
    }

    let mut matched = true;
    for (i, token) in tokens.iter().enumerate() {
        let expect_condition = i % 2 == 0;
        if !expect_condition {
            if token != "and" {
                return false;
            }
            continue;
        }
        let result = match token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            Some(feature) => evaluate_feature(feature, config),
            None => match token.as_str() {
                "all" => true,
                "screen" | "print" => token == config.media_type.as_str(),
                _ => return false,
            },
        };
        matched &= result;
    }
    // a trailing "and" is malformed
    if tokens.len() % 2 == 0 {
        return false;
    }
    matched != negate
}

fn tokenize(query: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = query.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            let mut group = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                group.push(c);
                if c == ')' {
                    closed = true;
                    break;
                }
            }
            if !closed {
                return None;
            }
            tokens.push(group);
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '(' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(word);
        }
    }
    Some(tokens)
}

fn evaluate_feature(feature: &str, config: &WindowConfig) -> bool {
    let (name, value) = match feature.split_once(':') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (feature.trim(), None),
    };
    let width = config.inner_width;
    let height = config.inner_height;

    match (name, value) {
        ("width", Some(v)) => length(v).is_some_and(|px| width == px),
        ("min-width", Some(v)) => length(v).is_some_and(|px| width >= px),
        ("max-width", Some(v)) => length(v).is_some_and(|px| width <= px),
        ("height", Some(v)) => length(v).is_some_and(|px| height == px),
        ("min-height", Some(v)) => length(v).is_some_and(|px| height >= px),
        ("max-height", Some(v)) => length(v).is_some_and(|px| height <= px),
        ("orientation", Some("portrait")) => height >= width,
        ("orientation", Some("landscape")) => width > height,
        ("prefers-color-scheme", Some(v)) => v == config.color_scheme.as_str(),
        ("width", None) => width > 0.0,
        ("height", None) => height > 0.0,
        ("orientation" | "prefers-color-scheme", None) => true,
        _ => false,
    }
}

fn length(value: &str) -> Option<f32> {
    if value == "0" {
        return Some(0.0);
    }
    if let Some(v) = value.strip_suffix("px") {
        return v.trim().parse().ok();
    }
    if let Some(v) = value.strip_suffix("rem").or_else(|| value.strip_suffix("em")) {
        return v.trim().parse::<f32>().ok().map(|v| v * 16.0);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{ColorScheme, MediaType};

    fn config() -> WindowConfig {
        WindowConfig {
            inner_width: 800.0,
            inner_height: 600.0,
            ..Default::default()
        }
    }

    #[test]
    fn width_ranges() {
        let config = config();
        assert!(evaluate("(min-width: 768px)", &config));
        assert!(!evaluate("(min-width: 1024px)", &config));
        assert!(evaluate("(max-width: 50em)", &config));
        assert!(evaluate("screen and (min-width: 600px) and (max-width: 900px)", &config));
    }

    #[test]
    fn media_types_and_negation() {
        let mut config = config();
        assert!(evaluate("screen", &config));
        assert!(evaluate("only screen", &config));
        assert!(!evaluate("print", &config));
        assert!(evaluate("not print", &config));
        config.media_type = MediaType::Print;
        assert!(evaluate("print, (min-width: 5000px)", &config));
    }

    #[test]
    fn orientation_and_color_scheme() {
        let mut config = config();
        assert!(evaluate("(orientation: landscape)", &config));
        assert!(!evaluate("(prefers-color-scheme: dark)", &config));
        config.color_scheme = ColorScheme::Dark;
        assert!(evaluate("(prefers-color-scheme: dark)", &config));
    }

    #[test]
    fn malformed_and_unknown_never_match() {
        let config = config();
        assert!(evaluate("", &config));
        assert!(!evaluate("(min-width: 100px", &config));
        assert!(!evaluate("screen and", &config));
        assert!(!evaluate("(hover: hover)", &config));
        assert!(!evaluate("tv", &config));
    }
}
