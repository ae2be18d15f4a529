//! Reading entity and link tables from CSV bytes, and project documents
//! from JSON text.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{debug, info};
use serde_json::Value;

use super::export::ProjectExport;
use super::types::RawRow;
use crate::error::ImportError;

/// Encoding a CSV file was decoded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
	Utf8,
	/// The WHATWG `iso-8859-1` label, which browsers resolve to
	/// windows-1252: bytes 0x80 to 0x9F are `€`, curly quotes and the like,
	/// not C1 controls.
	Latin1,
}

impl TextEncoding {
	pub fn label(self) -> &'static str {
		match self {
			TextEncoding::Utf8 => "UTF-8",
			TextEncoding::Latin1 => "ISO-8859-1",
		}
	}
}

/// Decodes strict UTF-8 (BOM removed), else falls back to the single-byte
/// `iso-8859-1` label, which maps every byte.
pub fn decode_text(bytes: &[u8], file: &str) -> (String, TextEncoding) {
	let (text, malformed) = UTF_8.decode_with_bom_removal(bytes);
	let (text, encoding) = if malformed {
		let single_byte = Encoding::for_label(b"iso-8859-1").unwrap_or(WINDOWS_1252);
		(single_byte.decode_without_bom_handling(bytes).0, TextEncoding::Latin1)
	} else {
		(text, TextEncoding::Utf8)
	};
	debug!("toile: {file} decoded as {}", encoding.label());
	(text.into_owned(), encoding)
}

/// Removes C0 and C1 control characters, then trims.
pub fn strip_control_chars(input: &str) -> String {
	input
		.chars()
		.filter(|&c| !matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}'))
		.collect::<String>()
		.trim()
		.to_string()
}

/// Rejects file names that do not end in `extension` (case-insensitive).
pub fn expect_extension(file: &str, extension: &'static str) -> Result<(), ImportError> {
	if file.to_lowercase().ends_with(extension) {
		Ok(())
	} else {
		Err(ImportError::WrongExtension {
			file: file.to_string(),
			expected: extension,
		})
	}
}

/// A parsed CSV file: cleaned header names and one row per record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
	pub columns: Vec<String>,
	pub rows: Vec<RawRow>,
}

/// Parses header-first CSV text. Blank lines are skipped; a record whose
/// field count differs from the header is an error.
pub fn parse_csv(text: &str, file: &str) -> Result<Table, ImportError> {
	let csv_error = |err: csv::Error| ImportError::Csv {
		file: file.to_string(),
		message: err.to_string(),
	};

	let mut reader = csv::ReaderBuilder::new()
		.has_headers(true)
		.flexible(false)
		.from_reader(text.as_bytes());

	let keys: Vec<String> = reader
		.headers()
		.map_err(csv_error)?
		.iter()
		.map(strip_control_chars)
		.collect();

	let mut columns: Vec<String> = Vec::with_capacity(keys.len());
	for key in &keys {
		if !key.is_empty() && !columns.contains(key) {
			columns.push(key.clone());
		}
	}

	let mut rows = Vec::new();
	for record in reader.records() {
		let record = record.map_err(csv_error)?;
		let mut row = RawRow::new();
		for (key, field) in keys.iter().zip(record.iter()) {
			if !key.is_empty() {
				row.insert(key.clone(), Value::String(strip_control_chars(field)));
			}
		}
		rows.push(row);
	}

	Ok(Table { columns, rows })
}

/// Decodes and parses one CSV file.
pub fn read_csv(bytes: &[u8], file: &str) -> Result<Table, ImportError> {
	let (text, _) = decode_text(bytes, file);
	parse_csv(&text, file)
}

/// Raw rows and columns of both tables, as handed to the mapping stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedData {
	pub nodes: Vec<RawRow>,
	pub links: Vec<RawRow>,
	pub node_columns: Vec<String>,
	pub link_columns: Vec<String>,
}

/// A file picked on the import screen.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
	pub name: String,
	pub bytes: Vec<u8>,
}

/// Reads the entities and links CSV files into [`ImportedData`].
pub fn import_csv_pair(entities: &SourceFile, links: &SourceFile) -> Result<ImportedData, ImportError> {
	expect_extension(&entities.name, ".csv")?;
	expect_extension(&links.name, ".csv")?;
	let nodes = read_csv(&entities.bytes, &entities.name)?;
	let links = read_csv(&links.bytes, &links.name)?;
	info!(
		"toile: imported {} entity rows, {} link rows",
		nodes.rows.len(),
		links.rows.len()
	);
	Ok(ImportedData {
		nodes: nodes.rows,
		links: links.rows,
		node_columns: nodes.columns,
		link_columns: links.columns,
	})
}

/// Parses a previously exported project document. Missing sections default
/// to empty.
pub fn import_project_json(text: &str) -> Result<ProjectExport, ImportError> {
	let project: ProjectExport = serde_json::from_str(text)?;
	info!(
		"toile: loaded project with {} entity rows, {} link rows",
		project.nodes.len(),
		project.links.len()
	);
	Ok(project)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	fn file(name: &str, text: &str) -> SourceFile {
		SourceFile {
			name: name.into(),
			bytes: text.as_bytes().to_vec(),
		}
	}

	#[test]
	fn utf8_wins_and_bom_is_dropped() {
		let (text, encoding) = decode_text("\u{feff}id,name\n1,Zoë\n".as_bytes(), "a.csv");
		assert_eq!(encoding, TextEncoding::Utf8);
		assert!(text.starts_with("id,"));
	}

	#[test]
	fn invalid_utf8_falls_back_to_latin1() {
		let bytes = b"id,name\n1,Caf\xe9\n";
		let (text, encoding) = decode_text(bytes, "a.csv");
		assert_eq!(encoding, TextEncoding::Latin1);
		assert!(text.contains("Café"));
	}

	#[test]
	fn single_byte_fallback_keeps_windows_1252_punctuation() {
		let table = read_csv(b"id,name\n1,Caf\xe9 \x80 \x93ok\x94\n", "n.csv").unwrap();
		assert_eq!(table.rows[0]["name"], "Café € \u{201c}ok\u{201d}");
	}

	#[test]
	fn control_characters_are_removed() {
		assert_eq!(strip_control_chars("\u{0007} Lyon\t\u{0085}"), "Lyon");
		assert_eq!(strip_control_chars("a\u{0000}b"), "ab");
	}

	#[test]
	fn parses_rows_with_cleaned_keys() {
		let table = parse_csv("id, name\u{0001} ,\n1,Plant,x\n\n2, Depot ,y\n", "n.csv").unwrap();
		assert_eq!(table.columns, vec!["id", "name"]);
		assert_eq!(table.rows.len(), 2);
		assert_eq!(json!(table.rows[1]), json!({"id": "2", "name": "Depot"}));
	}

	#[test]
	fn duplicate_headers_keep_first_position_and_last_value() {
		let table = parse_csv("id,kind,id\n1,a,2\n", "n.csv").unwrap();
		assert_eq!(table.columns, vec!["id", "kind"]);
		let keys: Vec<_> = table.rows[0].keys().cloned().collect();
		assert_eq!(keys, vec!["id", "kind"]);
		assert_eq!(table.rows[0]["id"], "2");
	}

	#[test]
	fn header_only_file_still_has_columns() {
		let table = parse_csv("source,target\n", "l.csv").unwrap();
		assert_eq!(table.columns, vec!["source", "target"]);
		assert!(table.rows.is_empty());
	}

	#[test]
	fn ragged_rows_are_rejected() {
		let err = parse_csv("a,b\n1,2\n3\n", "l.csv").unwrap_err();
		assert!(matches!(err, ImportError::Csv { ref file, .. } if file == "l.csv"));
	}

	#[test]
	fn csv_pair_requires_csv_extensions() {
		let nodes = file("nodes.CSV", "id\n1\n");
		let links = file("links.txt", "source,target\n1,1\n");
		assert!(matches!(
			import_csv_pair(&nodes, &links),
			Err(ImportError::WrongExtension { expected: ".csv", .. })
		));

		let links = file("links.csv", "source,target\n1,1\n");
		let data = import_csv_pair(&nodes, &links).unwrap();
		assert_eq!(data.node_columns, vec!["id"]);
		assert_eq!(data.links.len(), 1);
	}

	#[test]
	fn project_json_defaults_missing_sections() {
		let project = import_project_json(r#"{"nodes":[{"id":"a"}],"nodeColumns":["id"]}"#).unwrap();
		assert_eq!(project.nodes.len(), 1);
		assert!(project.links.is_empty());
		assert!(project.node_mapping.is_none());

		assert!(matches!(import_project_json("{nodes:"), Err(ImportError::Json(_))));
	}
}
