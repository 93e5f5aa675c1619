use super::Node;

/// `Element.classList`: an ordered, duplicate-free view over the `class`
/// attribute. Every mutation rewrites the attribute in normalized form.
pub struct ClassList<'a> {
    element: &'a Node,
}

impl<'a> ClassList<'a> {
    pub(super) fn new(element: &'a Node) -> Self {
        Self { element }
    }

    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for token in self.element.class_name().split_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }
        tokens
    }

    pub fn len(&self) -> usize {
        self.tokens().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens().is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens().iter().any(|t| t == token)
    }

    /// Tokens that are empty or contain whitespace are ignored.
    pub fn add(&self, token: &str) {
        if !valid_token(token) {
            return;
        }
        let mut tokens = self.tokens();
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
        self.update(&tokens);
    }

    pub fn remove(&self, token: &str) {
        if !valid_token(token) {
            return;
        }
        let mut tokens = self.tokens();
        tokens.retain(|t| t != token);
        self.update(&tokens);
    }

    /// Returns whether the token is present afterwards.
    pub fn toggle(&self, token: &str) -> bool {
        if !valid_token(token) {
            return false;
        }
        if self.contains(token) {
            self.remove(token);
            false
        } else {
            self.add(token);
            true
        }
    }

    fn update(&self, tokens: &[String]) {
        if !self.element.has_attribute("class") && tokens.is_empty() {
            return;
        }
        self.element.set_class_name(&tokens.join(" "));
    }
}

fn valid_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_dedupes_and_normalizes() {
        let el = Node::new_element("div");
        el.set_class_name("  a   b a ");
        el.class_list().add("c");
        el.class_list().add("a");
        assert_eq!(el.class_name(), "a b c");
    }

    #[test]
    fn remove_without_attribute_creates_nothing() {
        let el = Node::new_element("div");
        el.class_list().remove("a");
        assert!(!el.has_attribute("class"));
    }

    #[test]
    fn removing_last_token_leaves_empty_attribute() {
        let el = Node::new_element("div");
        el.class_list().add("a");
        el.class_list().remove("a");
        assert_eq!(el.get_attribute("class").as_deref(), Some(""));
    }

    #[test]
    fn toggle_reports_presence() {
        let el = Node::new_element("div");
        assert!(el.class_list().toggle("x"));
        assert!(!el.class_list().toggle("x"));
        assert!(!el.class_list().contains("x"));
    }
}
