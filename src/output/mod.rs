//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{write_history_csv, write_ports_csv};
pub use json_format::print_json;
pub use plain::{
    print_confirmation, print_error, print_exchange_footer, print_exchange_header, print_history,
    print_info, print_ports, print_record, print_success, print_validation, print_version, print_warning,
};
