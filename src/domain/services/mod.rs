pub mod billing;
pub mod overlap;
pub mod persons;
