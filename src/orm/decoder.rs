//! Row decoding
//!
//! Turns raw result buffers back into model instances. Each row gets a fresh
//! `M::default()` and a freshly resolved schema; result columns are matched to
//! descriptors by column name.

use crate::core::value::{DatabaseValue, RawValue, RowSet};
use crate::model::{Field, FieldKind, Model};
use std::collections::HashMap;

/// Decode every row of a result set
pub fn decode_rows<M: Model>(rows: &RowSet) -> Vec<M> {
    rows.rows
        .iter()
        .map(|row| decode_row::<M>(&rows.columns, row))
        .collect()
}

/// Decode one row into a new model instance
///
/// Unknown columns, ignored or read-only fields and SQL NULLs are skipped; the field keeps
/// its zero value.
pub fn decode_row<M: Model>(columns: &[String], row: &[RawValue]) -> M {
    let mut record = M::default();
    let schema = M::schema();

    let by_column: HashMap<&str, &Field<M>> = schema
        .fields()
        .iter()
        .filter(|f| !f.is_ignore())
        .map(|f| (f.column_name(), f))
        .collect();

    for (column, raw) in columns.iter().zip(row) {
        let Some(field) = by_column.get(strip_quotes(column)) else {
            continue;
        };
        if !field.is_settable() {
            continue;
        }
        let Some(bytes) = raw else {
            continue;
        };

        let value = decode_raw(field.kind(), bytes);
        if let Err(e) = field.set(&mut record, &value) {
            log::warn!("cannot set {}.{}: {}", M::table_name(), field.name(), e);
        }
    }

    record
}

/// Convert a raw text buffer into a value of the given kind
///
/// Integers and floats that fail to parse decode as zero. Booleans are true
/// for `1`, `true`, `yes` or any non-zero integer.
pub fn decode_raw(kind: FieldKind, raw: &[u8]) -> DatabaseValue {
    let text = String::from_utf8_lossy(raw);

    match kind {
        FieldKind::String => DatabaseValue::String(text.into_owned()),
        FieldKind::Integer => DatabaseValue::Long(text.trim().parse().unwrap_or_else(|_| {
            log::warn!("cannot parse {:?} as integer, using 0", text);
            0
        })),
        FieldKind::Float => DatabaseValue::Double(text.trim().parse().unwrap_or_else(|_| {
            log::warn!("cannot parse {:?} as float, using 0", text);
            0.0
        })),
        FieldKind::Boolean => {
            let text = text.trim();
            let flag = DatabaseValue::from(text)
                .as_bool()
                .or_else(|| text.parse::<i64>().ok().map(|v| v != 0))
                .unwrap_or(false);
            DatabaseValue::Bool(flag)
        }
    }
}

fn strip_quotes(column: &str) -> &str {
    column.trim_matches(|c| c == '`' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Schema;

    #[derive(Debug, Default, PartialEq)]
    struct Pet {
        id: i64,
        name: String,
        age: i32,
        vaccinated: bool,
        weight: f64,
        tag_id: i64,
    }

    impl Model for Pet {
        fn schema() -> Schema<Self> {
            Schema::builder()
                .field("id", "PRIMARY_KEY;", |p: &Pet| &p.id, |p: &mut Pet| &mut p.id)
                .field("name", "", |p: &Pet| &p.name, |p: &mut Pet| &mut p.name)
                .field("age", "", |p: &Pet| &p.age, |p: &mut Pet| &mut p.age)
                .field("vaccinated", "", |p: &Pet| &p.vaccinated, |p: &mut Pet| &mut p.vaccinated)
                .field("weight", "", |p: &Pet| &p.weight, |p: &mut Pet| &mut p.weight)
                .read_only("tag_id", "", |p: &Pet| &p.tag_id)
                .build()
        }
    }

    #[derive(Debug, Default)]
    struct Badge {
        name: String,
        display: String,
        note: String,
    }

    impl Model for Badge {
        fn schema() -> Schema<Self> {
            Schema::builder()
                .field("name", "", |b: &Badge| &b.name, |b: &mut Badge| &mut b.name)
                .field("display", "column:name;-;", |b: &Badge| &b.display, |b: &mut Badge| &mut b.display)
                .field("note", "-;", |b: &Badge| &b.note, |b: &mut Badge| &mut b.note)
                .build()
        }
    }

    fn raw(text: &str) -> RawValue {
        Some(text.as_bytes().to_vec())
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_row() {
        let pet: Pet = decode_row(
            &columns(&["id", "name", "age", "vaccinated", "weight"]),
            &[raw("4"), raw("Rex"), raw("7"), raw("1"), raw("12.5")],
        );

        assert_eq!(
            pet,
            Pet {
                id: 4,
                name: "Rex".to_string(),
                age: 7,
                vaccinated: true,
                weight: 12.5,
                tag_id: 0,
            }
        );
    }

    #[test]
    fn test_quoted_and_unknown_columns() {
        let pet: Pet = decode_row(
            &columns(&["`name`", "\"age\"", "owner"]),
            &[raw("Tom"), raw("3"), raw("ignored")],
        );

        assert_eq!(pet.name, "Tom");
        assert_eq!(pet.age, 3);
    }

    #[test]
    fn test_null_and_read_only_skipped() {
        let pet: Pet = decode_row(
            &columns(&["name", "tag_id"]),
            &[None, raw("88")],
        );

        assert_eq!(pet, Pet::default());
    }

    #[test]
    fn test_ignored_fields_never_decoded() {
        let badge: Badge = decode_row(
            &columns(&["name", "note"]),
            &[raw("gold"), raw("hidden")],
        );

        assert_eq!(badge.name, "gold");
        assert!(badge.display.is_empty());
        assert!(badge.note.is_empty());
    }

    #[test]
    fn test_integer_parse_failure_is_zero() {
        assert_eq!(decode_raw(FieldKind::Integer, b"abc"), DatabaseValue::Long(0));
        assert_eq!(decode_raw(FieldKind::Integer, b"-12"), DatabaseValue::Long(-12));
        assert_eq!(decode_raw(FieldKind::Float, b""), DatabaseValue::Double(0.0));
    }

    #[test]
    fn test_boolean_decoding() {
        assert_eq!(decode_raw(FieldKind::Boolean, b"1"), DatabaseValue::Bool(true));
        assert_eq!(decode_raw(FieldKind::Boolean, b"0"), DatabaseValue::Bool(false));
        assert_eq!(decode_raw(FieldKind::Boolean, b"TRUE"), DatabaseValue::Bool(true));
        assert_eq!(decode_raw(FieldKind::Boolean, b"2"), DatabaseValue::Bool(true));
        assert_eq!(decode_raw(FieldKind::Boolean, b""), DatabaseValue::Bool(false));
    }

    #[test]
    fn test_decode_rows_keeps_order() {
        let mut rows = RowSet::new(columns(&["id"]));
        rows.rows.push(vec![raw("2")]);
        rows.rows.push(vec![raw("1")]);

        let pets: Vec<Pet> = decode_rows(&rows);
        assert_eq!(pets.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 1]);
    }
}
