//! Comma-separated tables with a mandatory header row.

use std::io;

use crate::{Result, Table};

pub fn write<W: io::Write>(writer: W, table: &Table) -> Result<()> {
  let mut w = csv::Writer::from_writer(writer);
  w.write_record(&table.headers)?;
  for row in &table.rows {
    w.write_record(row)?;
  }
  w.flush()?;
  Ok(())
}

/// Rows whose field count differs from the header are rejected by the csv
/// reader.
pub fn read<R: io::Read>(reader: R) -> Result<Table> {
  let mut r = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

  let headers = r.headers()?.iter().map(str::to_owned).collect();
  let rows = r
    .records()
    .map(|rec| rec.map(|rec| rec.iter().map(str::to_owned).collect()))
    .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

  Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  fn sample() -> Table {
    Table {
      headers: vec!["signal_name".into(), "unit".into(), "default_value".into()],
      rows:    vec![
        vec!["speed".into(), "kph".into(), "0".into()],
        vec!["label, quoted".into(), "".into(), "[1]".into()],
      ],
    }
  }

  #[test]
  fn header_then_rows() {
    let mut out = Vec::new();
    write(&mut out, &sample()).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
      text,
      "signal_name,unit,default_value\nspeed,kph,0\n\"label, quoted\",,[1]\n"
    );
  }

  #[test]
  fn empty_table_is_header_only() {
    let mut out = Vec::new();
    write(&mut out, &Table::new(vec!["a".into(), "b".into()])).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a,b\n");
  }

  #[test]
  fn read_preserves_file_order() {
    let input = "unit,signal_name\nkph,speed\nA,current\n";
    let table = read(input.as_bytes()).unwrap();
    assert_eq!(table.headers, ["unit", "signal_name"]);
    assert_eq!(table.rows[1], ["A", "current"]);
  }

  #[test]
  fn read_what_was_written() {
    let mut out = Vec::new();
    write(&mut out, &sample()).unwrap();
    assert_eq!(read(out.as_slice()).unwrap(), sample());
  }

  #[test]
  fn ragged_row_rejected() {
    let input = "a,b\n1,2\n3\n";
    assert!(matches!(read(input.as_bytes()), Err(Error::Csv(_))));
  }
}
