pub mod school;

pub use school::{ImageUpload, NewSchool, School, SchoolDraft};
pub use school::validation::{SchoolValidator, ValidationReport};
