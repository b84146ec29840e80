use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("phone is not in canonical +<digits> form: {0}")]
    InvalidPhone(String),
    #[error("location name is required")]
    EmptyLocationName,
    #[error("label name is required")]
    EmptyLabelName,
}
