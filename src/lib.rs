pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod outcome;
pub mod premium;
pub mod provider;
pub mod quote;
pub mod report;
pub mod retrospective;
pub mod types;
