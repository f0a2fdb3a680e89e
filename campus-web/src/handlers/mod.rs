pub mod schools;

pub use schools::*;
