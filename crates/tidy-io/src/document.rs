//! Structured documents: a sequence of mappings, one per record, keys in
//! header order.

use std::io;

use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::{Error, Result, Table};

// ─── Writing ─────────────────────────────────────────────────────────────────

/// Serialises as a map whose keys follow the header order.
struct OrderedRecord<'a> {
  headers: &'a [String],
  cells:   &'a [String],
}

impl Serialize for OrderedRecord<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.headers.len()))?;
    for (key, value) in self.headers.iter().zip(self.cells) {
      map.serialize_entry(key, value)?;
    }
    map.end()
  }
}

fn ordered(table: &Table) -> Vec<OrderedRecord<'_>> {
  table
    .rows
    .iter()
    .map(|row| OrderedRecord { headers: &table.headers, cells: row })
    .collect()
}

pub fn write_yaml<W: io::Write>(writer: W, table: &Table) -> Result<()> {
  serde_yaml::to_writer(writer, &ordered(table))?;
  Ok(())
}

pub fn write_json<W: io::Write>(mut writer: W, table: &Table) -> Result<()> {
  serde_json::to_writer_pretty(&mut writer, &ordered(table))?;
  writer.write_all(b"\n")?;
  Ok(())
}

// ─── Reading ─────────────────────────────────────────────────────────────────

pub fn read_yaml<R: io::Read>(reader: R) -> Result<Table> {
  let docs: Option<Vec<serde_yaml::Mapping>> = serde_yaml::from_reader(reader)?;
  let mut builder = TableBuilder::default();
  for mapping in docs.unwrap_or_default() {
    let mut pairs = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
      let key = yaml_scalar(&key).ok_or_else(|| Error::NonScalarValue(format!("{key:?}")))?;
      let value = yaml_scalar(&value).ok_or_else(|| Error::NonScalarValue(key.clone()))?;
      pairs.push((key, value));
    }
    builder.push(pairs);
  }
  builder.finish()
}

pub fn read_json<R: io::Read>(reader: R) -> Result<Table> {
  let docs: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_reader(reader)?;
  let mut builder = TableBuilder::default();
  for object in docs {
    let mut pairs = Vec::with_capacity(object.len());
    for (key, value) in object {
      let value = json_scalar(&value).ok_or_else(|| Error::NonScalarValue(key.clone()))?;
      pairs.push((key, value));
    }
    builder.push(pairs);
  }
  builder.finish()
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
  use serde_yaml::Value;
  match value {
    Value::Null => Some(String::new()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::String(s) => Some(s.clone()),
    Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
  }
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
  use serde_json::Value;
  match value {
    Value::Null => Some(String::new()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::String(s) => Some(s.clone()),
    Value::Array(_) | Value::Object(_) => None,
  }
}

/// Collects key/value records into a rectangular [`Table`]. Headers are the
/// union of all keys in first-seen order, and every record must carry every
/// header.
#[derive(Default)]
struct TableBuilder {
  headers: Vec<String>,
  records: Vec<Vec<(String, String)>>,
}

impl TableBuilder {
  fn push(&mut self, pairs: Vec<(String, String)>) {
    for (key, _) in &pairs {
      if !self.headers.contains(key) {
        self.headers.push(key.clone());
      }
    }
    self.records.push(pairs);
  }

  fn finish(self) -> Result<Table> {
    let Self { headers, records } = self;
    let rows = records
      .into_iter()
      .map(|mut pairs| {
        headers
          .iter()
          .map(|h| {
            pairs
              .iter()
              .position(|(k, _)| k == h)
              .map(|i| pairs.swap_remove(i).1)
              .ok_or_else(|| Error::MissingColumn(h.clone()))
          })
          .collect::<Result<Vec<_>>>()
      })
      .collect::<Result<_>>()?;
    Ok(Table { headers, rows })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Table {
    Table {
      headers: vec!["signal_uuid".into(), "signal_name".into(), "size".into()],
      rows:    vec![
        vec!["u-1".into(), "speed".into(), "4".into()],
        vec!["u-2".into(), "current".into(), "".into()],
      ],
    }
  }

  #[test]
  fn yaml_keys_follow_header_order() {
    let mut out = Vec::new();
    write_yaml(&mut out, &sample()).unwrap();
    let text = String::from_utf8(out).unwrap();
    let uuid_at = text.find("signal_uuid").unwrap();
    let name_at = text.find("signal_name").unwrap();
    let size_at = text.find("size").unwrap();
    assert!(uuid_at < name_at && name_at < size_at, "got:\n{text}");
  }

  #[test]
  fn numeric_looking_cells_stay_strings() {
    let mut out = Vec::new();
    write_yaml(&mut out, &sample()).unwrap();
    let back = read_yaml(out.as_slice()).unwrap();
    assert_eq!(back.rows[0][2], "4");
    assert_eq!(back.rows[1][2], "");
  }

  #[test]
  fn empty_table_is_empty_sequence() {
    let table = Table::new(vec!["signal_uuid".into()]);

    let mut yaml = Vec::new();
    write_yaml(&mut yaml, &table).unwrap();
    assert_eq!(String::from_utf8(yaml).unwrap().trim(), "[]");

    let mut json = Vec::new();
    write_json(&mut json, &table).unwrap();
    assert_eq!(String::from_utf8(json).unwrap().trim(), "[]");
  }

  #[test]
  fn hand_written_yaml_with_numbers() {
    let input = "- signal_name: speed\n  default_value: 1\n  size: 4\n\
                 - size: ~\n  signal_name: torque\n  default_value: 0.5\n";
    let table = read_yaml(input.as_bytes()).unwrap();
    assert_eq!(table.headers, ["signal_name", "default_value", "size"]);
    assert_eq!(table.rows[0], ["speed", "1", "4"]);
    assert_eq!(table.rows[1], ["torque", "0.5", ""]);
  }

  #[test]
  fn record_missing_a_key_rejected() {
    let input = "- signal_name: a\n  unit: kph\n  size: 4\n- signal_name: b\n  size: 2\n";
    assert!(matches!(
      read_yaml(input.as_bytes()),
      Err(Error::MissingColumn(ref k)) if k == "unit"
    ));

    let input = r#"[{"signal_name": "a"}, {"signal_name": "b", "unit": "kph"}]"#;
    assert!(matches!(
      read_json(input.as_bytes()),
      Err(Error::MissingColumn(ref k)) if k == "unit"
    ));
  }

  #[test]
  fn nested_value_rejected() {
    let input = "- signal_name: speed\n  size: [1, 2]\n";
    assert!(matches!(
      read_yaml(input.as_bytes()),
      Err(Error::NonScalarValue(ref k)) if k == "size"
    ));
  }

  #[test]
  fn json_objects_read_by_key() {
    let mut out = Vec::new();
    write_json(&mut out, &sample()).unwrap();
    let back = read_json(out.as_slice()).unwrap();
    let rec = back.records().nth(1).unwrap();
    assert_eq!(rec.get("signal_name"), Some("current"));
    assert_eq!(rec.get("signal_uuid"), Some("u-2"));
  }

  #[test]
  fn json_keys_keep_document_order() {
    let input = r#"[{"signal_name": "speed", "default_value": "0", "size": "4"}]"#;
    let table = read_json(input.as_bytes()).unwrap();
    assert_eq!(table.headers, ["signal_name", "default_value", "size"]);
  }
}
