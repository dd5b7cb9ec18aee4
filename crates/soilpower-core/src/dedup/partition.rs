//! Identity-key partitioning of a table into candidate-duplicate groups.

use std::collections::HashMap;

use crate::coords::{IdentityKey, LAT, LON, YEAR};
use crate::error::{Result, SoilError};
use crate::table::Table;

/// Row indices sharing one identity key, in original relative order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: IdentityKey,
    pub rows: Vec<usize>,
}

/// Column positions of the identity key fields.
#[derive(Debug, Clone, Copy)]
struct KeyColumns {
    lat: usize,
    lon: usize,
    year: usize,
}

impl KeyColumns {
    fn locate(table: &Table) -> Result<Self> {
        Ok(Self {
            lat: table.require_column(LAT)?,
            lon: table.require_column(LON)?,
            year: table.require_column(YEAR)?,
        })
    }
}

/// Partition `table` by (LAT, LON, YEAR).
///
/// Groups come back in ascending key order. A row with any key field missing is
/// a validation error; nothing is silently dropped.
pub fn partition(table: &Table) -> Result<Vec<Group>> {
    let kc = KeyColumns::locate(table)?;

    let mut slot_of: HashMap<IdentityKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for (i, row) in table.rows.iter().enumerate() {
        let field = |col: usize, name: &str| {
            row[col].ok_or_else(|| SoilError::MissingKey { row: i + 1, column: name.to_string() })
        };
        let key = IdentityKey::new(field(kc.lat, LAT)?, field(kc.lon, LON)?, field(kc.year, YEAR)?);

        let slot = *slot_of.entry(key).or_insert_with(|| {
            groups.push(Group { key, rows: Vec::new() });
            groups.len() - 1
        });
        groups[slot].rows.push(i);
    }

    groups.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<Option<f64>>>) -> Table {
        Table::with_rows(vec!["LAT".into(), "LON".into(), "YEAR".into(), "V".into()], rows)
    }

    #[test]
    fn groups_partition_every_row() {
        let t = table(vec![
            vec![Some(1.0), Some(2.0), Some(2000.0), Some(1.0)],
            vec![Some(0.5), Some(2.0), Some(2000.0), None],
            vec![Some(1.0), Some(2.0), Some(2000.0), Some(3.0)],
            vec![Some(1.0), Some(2.0), Some(2001.0), None],
        ]);
        let groups = partition(&t).unwrap();
        assert_eq!(groups.len(), 3);

        let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.rows.iter().copied()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);

        // Ascending key order, input order within a group.
        assert_eq!(groups[0].rows, vec![1]);
        assert_eq!(groups[1].rows, vec![0, 2]);
        assert_eq!(groups[2].rows, vec![3]);
    }

    #[test]
    fn missing_key_field_is_an_error() {
        let t = table(vec![
            vec![Some(1.0), Some(2.0), Some(2000.0), None],
            vec![Some(1.0), Some(2.0), None, None],
        ]);
        match partition(&t) {
            Err(SoilError::MissingKey { row, column }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "YEAR");
            }
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let t = Table::with_rows(vec!["LAT".into(), "LON".into()], vec![]);
        assert!(matches!(partition(&t), Err(SoilError::MissingColumn { .. })));
    }

    #[test]
    fn empty_table_has_no_groups() {
        assert!(partition(&table(vec![])).unwrap().is_empty());
    }
}
