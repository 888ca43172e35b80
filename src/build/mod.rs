pub mod config;
pub mod engine;
pub mod report;

pub use config::*;
pub use engine::*;
pub use report::*;
