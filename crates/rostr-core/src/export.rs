//! Export formatting for member collections
//!
//! CSV columns follow a fixed policy: id, short_id, the schema field ids in
//! schema order, then category. Member keys outside that list are dropped;
//! missing fields become empty cells.

use crate::member::{FieldDef, Member};
use crate::{Error, Result};

/// Format members as CSV text.
///
/// An empty member collection yields an empty string, not a header-only
/// document.
pub fn to_csv(members: &[Member], schema: &[FieldDef]) -> Result<String> {
    if members.is_empty() {
        return Ok(String::new());
    }

    let mut columns = vec!["id".to_string(), "short_id".to_string()];
    columns.extend(schema.iter().map(|f| f.id.clone()));
    columns.push("category".to_string());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for member in members {
        let row: Vec<String> = columns.iter().map(|c| member.export_cell(c)).collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
}

/// Format the member collection as pretty-printed JSON
pub fn to_json(members: &[Member]) -> Result<String> {
    Ok(serde_json::to_string_pretty(members)?)
}

/// Format a single record as pretty-printed JSON
pub fn to_json_one<T: serde::Serialize>(record: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{FieldType, starter_schema};
    use serde_json::json;

    fn sample_member() -> Member {
        let mut m = Member::new("abc");
        m.short_id = Some("MEM-001".to_string());
        m.category = Some("General".to_string());
        m.set_field("name", json!("Ada"));
        m.set_field("dob", json!("1815-12-10"));
        m
    }

    #[test]
    fn empty_collection_yields_empty_string() {
        assert_eq!(to_csv(&[], &starter_schema()).unwrap(), "");
    }

    #[test]
    fn single_member_has_header_and_one_row() {
        let csv = to_csv(&[sample_member()], &starter_schema()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "id,short_id,name,dob,category");
        assert_eq!(lines[1], "abc,MEM-001,Ada,1815-12-10,General");
    }

    #[test]
    fn missing_fields_are_empty_cells_and_extras_dropped() {
        let mut m = Member::new("abc");
        m.set_field("nickname", json!("The Countess"));

        let csv = to_csv(&[m], &starter_schema()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[1], "abc,,,,");
        assert!(!csv.contains("Countess"));
    }

    #[test]
    fn cells_with_commas_are_quoted() {
        let mut m = sample_member();
        m.set_field("name", json!("Lovelace, Ada"));
        let csv = to_csv(&[m], &starter_schema()).unwrap();
        assert!(csv.contains("\"Lovelace, Ada\""));
    }

    #[test]
    fn schema_order_drives_columns() {
        let schema = vec![
            FieldDef::new("dob", "Date of Birth", FieldType::Date),
            FieldDef::new("name", "Name", FieldType::Text),
        ];
        let csv = to_csv(&[sample_member()], &schema).unwrap();
        assert!(csv.starts_with("id,short_id,dob,name,category"));
    }

    #[test]
    fn json_is_pretty_printed() {
        let text = to_json(&[sample_member()]).unwrap();
        assert!(text.contains('\n'));
        let back: Vec<Member> = serde_json::from_str(&text).unwrap();
        assert_eq!(back[0], sample_member());
    }
}
