use serde::{Deserialize, Serialize};

/// Serializable identification record for a hidden element.
///
/// Produced by `describe` at capture time and persisted per site. Every field
/// but `tag_name` may be missing in records written by older versions, so all
/// of them default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    /// Uppercase tag name, e.g. `DIV`.
    pub tag_name: String,

    #[serde(default)]
    pub id: Option<String>,

    /// Class list at capture time, marker classes removed.
    #[serde(default)]
    pub classes: Vec<String>,

    /// Trimmed text content, at most 100 characters. Display only.
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub unique_id: Option<String>,

    #[serde(default)]
    pub xpath: Option<String>,
}

impl ElementDescriptor {
    /// A descriptor carrying only legacy identification (tag + id/classes).
    pub fn legacy(tag_name: &str, id: Option<&str>, classes: &[&str]) -> Self {
        Self {
            tag_name: tag_name.to_ascii_uppercase(),
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            text: String::new(),
            unique_id: None,
            xpath: None,
        }
    }

    /// Panel identity: the unique id, else `TAG#id.c1.c2`.
    pub fn key(&self) -> String {
        if let Some(unique_id) = self.unique_id.as_deref().filter(|u| !u.is_empty()) {
            return unique_id.to_string();
        }

        let mut key = self.tag_name.clone();
        if let Some(id) = self.non_empty_id() {
            key.push('#');
            key.push_str(id);
        }
        if !self.classes.is_empty() {
            key.push('.');
            key.push_str(&self.classes.join("."));
        }
        key
    }

    /// Short human label: `div#id.c1.c2 \u{2014} text...`.
    pub fn display_label(&self) -> String {
        let mut label = self.tag_name.to_lowercase();
        if let Some(id) = self.non_empty_id() {
            label.push('#');
            label.push_str(id);
        }
        if !self.classes.is_empty() {
            let shown: Vec<&str> = self.classes.iter().take(2).map(String::as_str).collect();
            label.push('.');
            label.push_str(&shown.join("."));
        }
        if !self.text.is_empty() {
            let snippet: String = self.text.chars().take(40).collect();
            label.push_str(&format!(" \u{2014} {}...", snippet));
        }
        label
    }

    pub fn non_empty_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}
