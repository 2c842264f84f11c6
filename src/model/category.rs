use serde::{Deserialize, Serialize};

/// Color used for categories created without one, and for unknown IDs
pub const DEFAULT_COLOR: &str = "#6B7280";

/// A task category (a named, colored pool of unscheduled tasks)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Category {
            id: id.into(),
            name: name.into(),
            color: default_color(),
        }
    }
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Body of a category create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

/// Partial update for a category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_defaults_when_missing() {
        let cat: Category = serde_json::from_str(r#"{"id":"work","name":"Work"}"#).unwrap();
        assert_eq!(cat.color, DEFAULT_COLOR);
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = CategoryPatch {
            name: Some("Errands".into()),
            color: None,
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"name":"Errands"}"#);
    }
}
