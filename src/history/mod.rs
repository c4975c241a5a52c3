pub mod filter;
pub mod record;
pub mod store;

pub use filter::{
    date_bounds, diet_options, export_csv, export_to_dir, filter, HistoryQuery, EXPORT_FILE_NAME,
};
pub use record::QueryRecord;
pub use store::HistoryStore;
