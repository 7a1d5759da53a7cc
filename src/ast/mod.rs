pub mod nodes;
pub mod values;

pub use nodes::*;
pub use values::{Date, Timestamp, Value};
