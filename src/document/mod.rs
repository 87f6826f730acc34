//! Document model shared by the validator, the query builder and the store

mod object_id;
mod time;
mod value;

pub use object_id::generate_id;
pub use time::{format_timestamp, parse_timestamp};
pub use value::{DocValue, Document, ID_FIELD};
