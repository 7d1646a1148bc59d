//! Value coercion shared by the dataset normalizers.

pub mod numeric;
pub mod text;

pub use numeric::{is_suppressed, parse_coordinate, parse_count, parse_numeric, parse_year};
pub use text::{clean_identifier, clean_text, normalize_zip};
