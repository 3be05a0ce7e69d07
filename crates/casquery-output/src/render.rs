//! Rendering of [`Record`]s into the supported output formats.
//!
//! Every renderer is a pure function of its input: the same records and
//! format always produce byte-identical text.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;

use crate::error::{OutputError, Result};
use crate::format::OutputFormat;
use crate::record::Record;

/// Text shown by the table renderer when there is nothing to show.
pub const EMPTY_TABLE_MESSAGE: &str = "No results returned.";

const XML_ROOT: &str = "casResults";
const XML_RESULT: &str = "result";

/// Render `records` in `format`.
///
/// # Errors
///
/// Returns an [`OutputError`] if the underlying serializer fails.
pub fn render<T: Record>(records: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(records)),
        OutputFormat::Json => render_json(records),
        OutputFormat::Xml => render_xml(records),
        OutputFormat::Csv => render_csv(records),
    }
}

/// Fixed-layout table, ordered by each record's sort key.
pub fn render_table<T: Record>(records: &[T]) -> String {
    if records.is_empty() {
        return EMPTY_TABLE_MESSAGE.to_string();
    }
    let ordered = sorted(records);
    let names = column_names(&ordered);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(names.clone());
    for record in &ordered {
        table.add_row(row_values(&names, *record));
    }
    for column in table.column_iter_mut() {
        column.set_cell_alignment(CellAlignment::Left);
    }
    table.to_string()
}

/// Pretty-printed JSON array.
///
/// # Errors
///
/// Fails if a record cannot be serialized.
pub fn render_json<T: Serialize>(records: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// `<casResults>` document with one `<result>` element per record.
///
/// # Errors
///
/// Fails if the XML writer reports an error.
pub fn render_xml<T: Record>(records: &[T]) -> Result<String> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut xml,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    emit(&mut xml, Event::Start(BytesStart::new(XML_ROOT)))?;
    for record in records {
        emit(&mut xml, Event::Start(BytesStart::new(XML_RESULT)))?;
        for (name, value) in record.columns() {
            let element = xml_element_name(&name);
            if value.is_empty() {
                emit(&mut xml, Event::Empty(BytesStart::new(element.as_str())))?;
                continue;
            }
            emit(&mut xml, Event::Start(BytesStart::new(element.as_str())))?;
            emit(&mut xml, Event::Text(BytesText::new(&value)))?;
            emit(&mut xml, Event::End(BytesEnd::new(element.as_str())))?;
        }
        emit(&mut xml, Event::End(BytesEnd::new(XML_RESULT)))?;
    }
    emit(&mut xml, Event::End(BytesEnd::new(XML_ROOT)))?;

    Ok(String::from_utf8(xml.into_inner())?)
}

/// CSV with a header row; fields are quoted only where needed.
///
/// # Errors
///
/// Fails if the CSV writer reports an error.
pub fn render_csv<T: Record>(records: &[T]) -> Result<String> {
    let rows: Vec<&T> = records.iter().collect();
    let names = column_names(&rows);
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !names.is_empty() {
        writer.write_record(&names)?;
    }
    for record in rows {
        writer.write_record(row_values(&names, record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|error| OutputError::Csv(csv::Error::from(error.into_error())))?;
    Ok(String::from_utf8(bytes)?)
}

fn emit<W: std::io::Write>(xml: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    xml.write_event(event)
        .map_err(|error| OutputError::Xml(error.to_string()))
}

/// Records in sort-key order; records without a key keep their position
/// relative to each other.
fn sorted<T: Record>(records: &[T]) -> Vec<&T> {
    let mut ordered: Vec<&T> = records.iter().collect();
    ordered.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    ordered
}

/// Column names in first-seen order across all records.
fn column_names<T: Record>(records: &[&T]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        for (name, _) in record.columns() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Values of `record` aligned to `names`; absent columns are empty.
fn row_values<T: Record>(names: &[String], record: &T) -> Vec<String> {
    let mut columns = record.columns();
    names
        .iter()
        .map(|name| {
            columns
                .iter()
                .position(|(column, _)| column == name)
                .map(|index| columns.swap_remove(index).1)
                .unwrap_or_default()
        })
        .collect()
}

/// Map a column name onto a valid XML element name.
fn xml_element_name(name: &str) -> String {
    let mut element: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let starts_ok = element
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        element.insert(0, '_');
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_names_are_sanitized() {
        assert_eq!(xml_element_name("cas_rn"), "cas_rn");
        assert_eq!(xml_element_name("sample id"), "sample_id");
        assert_eq!(xml_element_name("1st"), "_1st");
        assert_eq!(xml_element_name(""), "_");
    }
}
