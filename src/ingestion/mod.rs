//! Reading raw tabular input.
//!
//! Only CSV is read here. Typed SQL results are handed to the cleaning pipeline directly as a
//! [`crate::types::DataSet`] whose numeric columns are declared [`crate::types::DataType::Float64`]
//! or [`crate::types::DataType::Int64`].

pub mod csv;

pub use self::csv::{read_raw_csv_from_path, read_raw_csv_from_reader};
