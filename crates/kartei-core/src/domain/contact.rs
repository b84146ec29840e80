use crate::domain::ids::{ContactId, LocationId};
use crate::domain::phone::is_canonical_phone;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub phone_e164: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub telegram: Option<String>,
    pub origin: Option<String>,
    pub tattoo_size: Option<String>,
    pub artist: Option<String>,
    pub signup_date: Option<String>,
    pub consultation_date: Option<String>,
    pub appointment_date: Option<String>,
    pub price_deposit_cents: Option<i64>,
    pub price_total_cents: Option<i64>,
    pub last_message_sent_at: Option<String>,
    pub last_message_received_at: Option<String>,
    pub location_id: LocationId,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Contact {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !is_canonical_phone(&self.phone_e164) {
            return Err(CoreError::InvalidPhone(self.phone_e164.clone()));
        }

        Ok(())
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.phone_e164.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Contact;
    use crate::domain::ids::{ContactId, LocationId};

    fn sample_contact() -> Contact {
        Contact {
            id: ContactId::new(),
            phone_e164: "+491512345678".to_string(),
            first_name: Some("Mara".to_string()),
            last_name: Some("Klein".to_string()),
            gender: None,
            email: None,
            telegram: None,
            origin: None,
            tattoo_size: None,
            artist: None,
            signup_date: None,
            consultation_date: None,
            appointment_date: None,
            price_deposit_cents: None,
            price_total_cents: None,
            last_message_sent_at: None,
            last_message_received_at: None,
            location_id: LocationId::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn validate_accepts_canonical_phone() {
        assert!(sample_contact().validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_canonical_phone() {
        let mut contact = sample_contact();
        contact.phone_e164 = "0151 2345678".to_string();
        assert!(contact.validate().is_err());
    }

    #[test]
    fn display_name_falls_back_to_phone() {
        let mut contact = sample_contact();
        contact.first_name = None;
        contact.last_name = None;
        assert_eq!(contact.display_name(), "+491512345678");
    }

    #[test]
    fn display_name_joins_first_and_last() {
        assert_eq!(sample_contact().display_name(), "Mara Klein");
    }
}
