use std::path::Path;

use shorts::{PublisherConfig, UiTable};

use crate::error::Result;

/// The table a publish run would use, or the one in `file`.
pub fn execute(config: &PublisherConfig, file: Option<&Path>) -> Result<UiTable> {
	let table = match file {
		Some(path) => UiTable::from_file(path)?,
		None => config.load_ui_table()?,
	};
	Ok(table)
}
