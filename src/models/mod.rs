pub mod loaders;
pub mod record;
pub mod sheet;

pub use loaders::{load_records, load_sheet};
pub use record::{DownloadStatus, Outcome, Record};
pub use sheet::Sheet;
