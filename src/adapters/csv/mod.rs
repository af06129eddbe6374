pub mod csv_parser;

pub use csv_parser::{parse_csv_file, parse_csv_reader, CsvParseError};
