//! Inline style declarations, the model behind `element.style`.

/// An ordered list of `property: value` pairs parsed from a `style`
/// attribute. Property names are stored hyphenated and lowercase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDeclaration {
    properties: Vec<(String, String)>,
}

impl StyleDeclaration {
    pub fn parse(css: &str) -> Self {
        let mut style = Self::default();
        for declaration in css.split(';') {
            let declaration = declaration.trim();
            if declaration.is_empty() {
                continue;
            }
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            style.set(&normalize_name(name), value.trim());
        }
        style
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let name = normalize_name(name);
        self.properties
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
    }

    /// Set a property in place. An empty value removes it.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = normalize_name(name);
        let value = value.trim();
        if value.is_empty() {
            self.remove(&name);
            return;
        }
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.properties.push((name, value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = normalize_name(name);
        let index = self.properties.iter().position(|(n, _)| *n == name)?;
        Some(self.properties.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Serialize as `cssText`, e.g. `width: 10px; color: red;`.
    pub fn to_css_text(&self) -> String {
        self.properties
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn normalize_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// Convert a camelCase property name to the hyphenated form that
/// `removeProperty` expects: a hyphen goes before every uppercase letter
/// that follows a letter, then the whole name is lowercased.
/// `backgroundColor` becomes `background-color`.
pub fn hyphenate(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        out.push(c.to_ascii_lowercase());
        let next_upper = chars.get(i + 1).is_some_and(|n| n.is_ascii_uppercase());
        if c.is_ascii_alphabetic() && next_upper {
            out.push('-');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphenates_camel_case() {
        assert_eq!(hyphenate("backgroundColor"), "background-color");
        assert_eq!(hyphenate("borderTopLeftRadius"), "border-top-left-radius");
        assert_eq!(hyphenate("width"), "width");
        assert_eq!(hyphenate("margin-top"), "margin-top");
        assert_eq!(hyphenate("--accentColor"), "--accentColor");
    }

    #[test]
    fn parse_skips_garbage_and_keeps_order() {
        let style = StyleDeclaration::parse("WIDTH: 10px;; bogus; height :20px ;");
        let pairs: Vec<_> = style.iter().collect();
        assert_eq!(pairs, vec![("width", "10px"), ("height", "20px")]);
        assert_eq!(style.to_css_text(), "width: 10px; height: 20px;");
    }

    #[test]
    fn empty_value_removes() {
        let mut style = StyleDeclaration::parse("display: none; color: red");
        style.set("display", "");
        assert_eq!(style.get("display"), None);
        assert_eq!(style.to_css_text(), "color: red;");
    }

    #[test]
    fn set_replaces_in_place() {
        let mut style = StyleDeclaration::parse("a: 1; b: 2");
        style.set("a", "3");
        assert_eq!(style.to_css_text(), "a: 3; b: 2;");
        assert_eq!(style.remove("b").as_deref(), Some("2"));
        assert_eq!(style.len(), 1);
    }
}
