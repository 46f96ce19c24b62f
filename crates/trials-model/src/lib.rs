#![deny(unsafe_code)]

pub mod error;
pub mod frame;
pub mod ids;
pub mod page;
pub mod record;
pub mod table;

pub use error::{ModelError, Result};
pub use frame::{frame_to_table, table_to_frame};
pub use ids::{DatasetId, RecordId};
pub use page::RawPage;
pub use record::{FieldRecord, FieldValue};
pub use table::{CellValue, Table};
