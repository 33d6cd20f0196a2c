pub mod aggregation;
pub mod analysis;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod report;
pub mod semantic;
pub mod snapshot;
pub mod syntax;
pub mod types;
