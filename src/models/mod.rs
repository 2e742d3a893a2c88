pub mod mode;
pub mod types;
