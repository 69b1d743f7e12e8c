pub mod analyze;
pub mod args;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod stats;
pub mod store;
pub mod timestamp;
pub mod utils;
pub mod visit;

pub use analyze::Analyzer;
pub use args::Args;
pub use error::{Error, Result};
pub use pipeline::{run, Config};
pub use report::OutputFormat;
pub use stats::{DomainCount, SleepEstimate, Statistics};
pub use timestamp::TimeWindow;
pub use visit::Visit;
