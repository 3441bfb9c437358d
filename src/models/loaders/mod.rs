pub mod sheet_loader;

pub use sheet_loader::{load_records, load_sheet};
