pub mod errors;
pub mod model;
mod workbook;

pub use errors::ParserError;
pub use model::RawExport;
pub use workbook::parse_export;
