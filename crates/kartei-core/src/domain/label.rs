use crate::domain::ids::LabelId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    pub created_at: i64,
}

impl Label {
    pub fn new(name: &str, now: i64) -> Result<Self, CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyLabelName);
        }

        Ok(Self {
            id: LabelId::new(),
            name: trimmed.to_string(),
            created_at: now,
        })
    }
}

/// Labels match case-insensitively but keep the casing they were first seen with.
pub fn label_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{label_key, Label};

    #[test]
    fn label_key_is_case_insensitive() {
        assert_eq!(label_key("VIP"), label_key("vip"));
        assert_eq!(label_key(" Walk-In "), "walk-in");
    }

    #[test]
    fn label_keeps_original_casing() {
        let label = Label::new(" VIP ", 0).unwrap();
        assert_eq!(label.name, "VIP");
    }

    #[test]
    fn label_rejects_blank_name() {
        assert!(Label::new("   ", 0).is_err());
    }
}
