pub mod contact;
pub mod ids;
pub mod label;
pub mod location;
pub mod phone;

pub use contact::Contact;
pub use ids::{ContactId, LabelId, LocationId};
pub use label::{label_key, Label};
pub use location::{is_fallback_location, location_key, Location, FALLBACK_LOCATION_NAME};
pub use phone::{
    is_canonical_phone, is_valid_country_code, normalize_phone, normalize_phone_with_country,
    DEFAULT_COUNTRY_CODE,
};
