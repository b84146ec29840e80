use crate::domain::ids::LocationId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Assigned when a sheet row carries no usable studio location.
pub const FALLBACK_LOCATION_NAME: &str = "Unbekannt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub admin_only: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Location {
    pub fn new(name: &str, admin_only: bool, now: i64) -> Result<Self, CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyLocationName);
        }

        Ok(Self {
            id: LocationId::new(),
            name: trimmed.to_string(),
            admin_only,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Locations match case-insensitively but keep the casing they were first seen with.
pub fn location_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_fallback_location(name: &str) -> bool {
    location_key(name) == location_key(FALLBACK_LOCATION_NAME)
}

#[cfg(test)]
mod tests {
    use super::{is_fallback_location, location_key, Location};

    #[test]
    fn location_key_is_case_insensitive() {
        assert_eq!(location_key("Berlin"), location_key("BERLIN"));
        assert_eq!(location_key("  Wien "), "wien");
    }

    #[test]
    fn fallback_matches_any_casing() {
        assert!(is_fallback_location("Unbekannt"));
        assert!(is_fallback_location("unbekannt"));
        assert!(is_fallback_location(" UNBEKANNT "));
        assert!(!is_fallback_location("Berlin"));
    }

    #[test]
    fn location_keeps_original_casing() {
        let location = Location::new(" Berlin Mitte ", false, 0).unwrap();
        assert_eq!(location.name, "Berlin Mitte");
        assert!(!location.admin_only);
    }

    #[test]
    fn location_rejects_blank_name() {
        assert!(Location::new("", false, 0).is_err());
    }
}
