//! Positional numeric field readers.
//!
//! NSHM source records are whitespace-delimited, order-significant lines of
//! numbers. Every reader here is strict: a missing or unparsable field is a
//! fatal [`ModelError`], never a default.

use crate::ModelError;

/// Splits `line` on whitespace and parses the field at `pos` as an `i64`.
pub fn read_int(line: &str, pos: usize) -> Result<i64, ModelError> {
    let raw = field_at(line, pos)?;
    raw.parse::<i64>().map_err(|_| ModelError::BadField {
        line: line.to_owned(),
        pos,
    })
}

/// Splits `line` on whitespace and parses the field at `pos` as an `f64`.
pub fn read_f64(line: &str, pos: usize) -> Result<f64, ModelError> {
    let raw = field_at(line, pos)?;
    raw.parse::<f64>().map_err(|_| ModelError::BadField {
        line: line.to_owned(),
        pos,
    })
}

/// Parses the first `n` whitespace-delimited fields of `line` as `f64`s.
pub fn read_f64s(line: &str, n: usize) -> Result<Vec<f64>, ModelError> {
    (0..n).map(|pos| read_f64(line, pos)).collect()
}

/// Parses the first `n` whitespace-delimited fields of `line` as `i64`s.
pub fn read_ints(line: &str, n: usize) -> Result<Vec<i64>, ModelError> {
    (0..n).map(|pos| read_int(line, pos)).collect()
}

/// Joins the fields of `line` from `start` onward with single spaces.
///
/// Source names trail the numeric fields of a record line; rejoining on a
/// single space normalizes the variable column alignment of the inputs.
pub fn join_from(line: &str, start: usize) -> String {
    line.split_whitespace()
        .skip(start)
        .collect::<Vec<_>>()
        .join(" ")
}

fn field_at(line: &str, pos: usize) -> Result<&str, ModelError> {
    line.split_whitespace()
        .nth(pos)
        .ok_or_else(|| ModelError::MissingField {
            line: line.to_owned(),
            pos,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_positional_fields() {
        let line = "  2 3 1   805 Juniper Mountain fault";
        assert_eq!(read_int(line, 0).unwrap(), 2);
        assert_eq!(read_int(line, 2).unwrap(), 1);
        assert_eq!(read_f64(line, 3).unwrap(), 805.0);
        assert_eq!(join_from(line, 4), "Juniper Mountain fault");
    }

    #[test]
    fn missing_field_is_fatal() {
        assert!(matches!(
            read_f64("1.0 2.0", 5),
            Err(ModelError::MissingField { pos: 5, .. })
        ));
    }

    #[test]
    fn unparsable_field_is_fatal() {
        assert!(matches!(
            read_f64("1.0 abc", 1),
            Err(ModelError::BadField { pos: 1, .. })
        ));
    }

    #[test]
    fn reads_fixed_count_arrays() {
        let vals = read_f64s("6.5 0.002 1.0", 3).unwrap();
        assert_eq!(vals, vec![6.5, 0.002, 1.0]);
        assert!(read_f64s("6.5 0.002", 3).is_err());
    }
}
