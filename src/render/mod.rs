//! Report and error output.

pub mod csv;
pub mod error;
pub mod pager;
pub mod table;

pub use self::csv::write_csv;
pub use error::render_error;
pub use pager::page;
pub use table::render_table;
