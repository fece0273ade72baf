use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Lowercase category key as used on the wire (`java`, `gk`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(pub String);

impl CategoryKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased label used on category buttons.
    pub fn display_label(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a question as issued by the quiz service.
///
/// The service issues string ids (`"java_3"`); numeric ids are accepted and
/// kept in their decimal form so they echo back unchanged on submit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for QuestionId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => QuestionId(text),
            RawId::Int(value) => QuestionId(value.to_string()),
        })
    }
}

/// A main topic and the category keys grouped under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainTopic {
    pub name: &'static str,
    pub categories: &'static [&'static str],
}

impl MainTopic {
    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|key| *key == category)
    }

    pub fn category_keys(&self) -> Vec<CategoryKey> {
        self.categories.iter().map(|key| CategoryKey::new(*key)).collect()
    }
}

/// The fixed catalog offered on the home screen.
pub const CATALOG: &[MainTopic] = &[
    MainTopic {
        name: "Technical",
        categories: &["java", "c", "python"],
    },
    MainTopic {
        name: "Non-Technical",
        categories: &["gk"],
    },
];

pub fn find_main_topic(name: &str) -> Option<&'static MainTopic> {
    CATALOG.iter().find(|topic| topic.name == name)
}

pub fn all_categories() -> impl Iterator<Item = CategoryKey> {
    CATALOG.iter().flat_map(|topic| topic.category_keys())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_groups_categories_under_main_topics() {
        let technical = find_main_topic("Technical").expect("technical topic");
        assert!(technical.contains("java"));
        assert!(technical.contains("python"));
        assert!(!technical.contains("gk"));

        let general = find_main_topic("Non-Technical").expect("non-technical topic");
        assert_eq!(general.category_keys(), vec![CategoryKey::new("gk")]);

        assert!(find_main_topic("technical").is_none());
    }

    #[test]
    fn question_id_accepts_string_and_numeric_forms() {
        let text: QuestionId = serde_json::from_str("\"java_3\"").expect("text id");
        assert_eq!(text.as_str(), "java_3");

        let numeric: QuestionId = serde_json::from_str("1").expect("numeric id");
        assert_eq!(numeric, QuestionId::from(1));
        assert_eq!(serde_json::to_string(&numeric).expect("encode"), "\"1\"");
    }

    #[test]
    fn all_categories_lists_every_catalog_key() {
        let keys: Vec<String> = all_categories().map(|key| key.0).collect();
        assert_eq!(keys, vec!["java", "c", "python", "gk"]);
    }
}
