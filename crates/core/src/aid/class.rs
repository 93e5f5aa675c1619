//! Class manipulation strategies.
//!
//! `NativeClassList` goes through the element's token list. `LegacyClassName`
//! edits the `class` string directly with whitespace-delimited patterns, the way
//! code written for engines without `classList` did.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dom::Node;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassMode {
    #[default]
    Native,
    Legacy,
}

impl ClassMode {
    pub(crate) fn strategy(self) -> Box<dyn ClassStrategy> {
        match self {
            ClassMode::Native => Box::new(NativeClassList),
            ClassMode::Legacy => Box::new(LegacyClassName),
        }
    }
}

pub trait ClassStrategy {
    fn contains(&self, element: &Node, name: &str) -> bool;

    fn add(&self, element: &Node, names: &[String]);

    fn remove(&self, element: &Node, names: &[String]);
}

pub struct NativeClassList;

impl ClassStrategy for NativeClassList {
    fn contains(&self, element: &Node, name: &str) -> bool {
        element.class_list().contains(name)
    }

    fn add(&self, element: &Node, names: &[String]) {
        let list = element.class_list();
        for name in names {
            list.add(name);
        }
    }

    fn remove(&self, element: &Node, names: &[String]) {
        let list = element.class_list();
        for name in names {
            list.remove(name);
        }
    }
}

pub struct LegacyClassName;

/// Matches any of `alternatives` as a whole class token: delimited by
/// whitespace or the ends of the string.
fn token_pattern(alternatives: &str, case_insensitive: bool) -> Option<Regex> {
    let flags = if case_insensitive { "(?i)" } else { "" };
    Regex::new(&format!(r"{flags}(?:^|\s)(?:{alternatives})(?:\s|$)")).ok()
}

impl ClassStrategy for LegacyClassName {
    fn contains(&self, element: &Node, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        token_pattern(&regex::escape(name), false)
            .is_some_and(|pattern| pattern.is_match(&element.class_name()))
    }

    fn add(&self, element: &Node, names: &[String]) {
        let added = names.join(" ");
        let current = element.class_name();
        if current.is_empty() {
            element.set_class_name(&added);
        } else {
            element.set_class_name(&format!("{current} {added}"));
        }
    }

    fn remove(&self, element: &Node, names: &[String]) {
        if !element.has_attribute("class") || names.is_empty() {
            return;
        }
        let alternatives = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let Some(pattern) = token_pattern(&alternatives, true) else {
            return;
        };
        let mut current = element.class_name();
        if !pattern.is_match(&current) {
            return;
        }
        // a match consumes its delimiters, so adjacent tokens need another pass
        while pattern.is_match(&current) {
            current = pattern.replace_all(&current, " ").into_owned();
        }
        let normalized = current.split_whitespace().collect::<Vec<_>>().join(" ");
        element.set_class_name(&normalized);
    }
}
