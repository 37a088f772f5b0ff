//! Tabular representation of exported documents
//!
//! - `value`: the tagged [`Value`] model and BSON conversion
//! - `table`: [`Table`], built per batch and concatenated

mod table;
mod value;

pub use table::{Cell, Table};
pub use value::Value;
