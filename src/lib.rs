pub mod alignment;
pub mod config;
pub mod error;
pub mod external;
pub mod lang;
pub mod pipelines;
pub mod processing;
