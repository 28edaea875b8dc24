pub mod analyze;
pub mod model;

pub use analyze::{analyze_entries, build_report, decode_entries, EdgeKind, EdgeOut, EntryOut, Report};
pub use model::{load_table, parse_addr, read_word};
