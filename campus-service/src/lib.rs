pub mod school;

pub use school::{DefaultSchoolService, SchoolError, SchoolService};
