pub mod checkpoint;
pub mod fetcher;
pub mod filename;
pub mod output_layout;
pub mod product_search;
pub mod progress_log;
pub mod source_resolver;

pub use checkpoint::CheckpointWriter;
pub use fetcher::PdfFetcher;
pub use filename::sanitize_filename;
pub use output_layout::{partition_folder, OutputLayout};
pub use product_search::BrowserSearch;
pub use progress_log::ProgressLog;
pub use source_resolver::{resolve_source, Resolution, SearchProvider};
