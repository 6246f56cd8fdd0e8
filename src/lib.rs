pub mod analysis;
pub mod bands;
pub mod categorize;
pub mod config;
pub mod error;
pub mod kpi;
pub mod loader;
pub mod measure;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod schema;
pub mod stats;
