pub mod batch;
pub mod compare;
pub mod config;
pub mod extract;
pub mod fields;
