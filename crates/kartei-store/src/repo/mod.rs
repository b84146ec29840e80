pub mod contacts;
pub mod labels;
pub mod locations;

pub use contacts::{ContactNew, ContactsRepo};
pub use labels::LabelsRepo;
pub use locations::LocationsRepo;
