pub mod cleaner;
pub mod loader;
pub mod profiler;
pub mod types;
pub mod utils;

pub use cleaner::{parse_cleaning_options, DatasetCleaner};
pub use loader::TableLoader;
pub use profiler::DatasetProfiler;
