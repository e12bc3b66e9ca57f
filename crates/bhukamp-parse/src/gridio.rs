//! Binary auxiliary grid decoding.
//!
//! Grid files store little-endian f32 values row-major from the top-left
//! corner; gridded regions index from the bottom-left. Both readers flip
//! rows while decoding so the output lines up with region node order.

use crate::ParseError;

/// Maps a top-left row-major index to the bottom-left node order.
pub fn calc_index(idx: usize, n_rows: usize, n_cols: usize) -> usize {
    (n_rows - (idx / n_cols) - 1) * n_cols + (idx % n_cols)
}

/// Decodes an `nRows x nCols` little-endian f32 grid into node order.
pub fn read_grid(
    bytes: &[u8],
    n_rows: usize,
    n_cols: usize,
    path: &str,
) -> Result<Vec<f64>, ParseError> {
    let count = n_rows * n_cols;
    if bytes.len() < count * 4 {
        return Err(ParseError::GridSize {
            path: path.to_string(),
            expected: count,
            actual: bytes.len() / 4,
        });
    }
    let mut data = vec![0.0; count];
    for i in 0..count {
        let off = i * 4;
        let v = f32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]]);
        data[calc_index(i, n_rows, n_cols)] = f64::from(v);
    }
    Ok(data)
}

/// Decodes a Fortran logical mask file into node order.
///
/// These files carry a 4-byte record header and one 4-byte logical per
/// cell; only the first byte of each logical is meaningful.
pub fn read_bool_grid(
    bytes: &[u8],
    n_rows: usize,
    n_cols: usize,
    path: &str,
) -> Result<Vec<bool>, ParseError> {
    let count = n_rows * n_cols;
    if bytes.len() < 4 + count * 4 {
        return Err(ParseError::GridSize {
            path: path.to_string(),
            expected: count,
            actual: bytes.len().saturating_sub(4) / 4,
        });
    }
    let mut data = vec![false; count];
    for i in 0..count {
        data[calc_index(i, n_rows, n_cols)] = bytes[4 + i * 4] != 0;
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn calc_index_flips_rows_only() {
        // 3 rows x 2 cols: storage row 0 is the north edge
        assert_eq!(calc_index(0, 3, 2), 4);
        assert_eq!(calc_index(1, 3, 2), 5);
        assert_eq!(calc_index(4, 3, 2), 0);
        assert_eq!(calc_index(5, 3, 2), 1);
    }

    #[test]
    fn read_grid_reorders_to_node_order() {
        // 2x2 grid stored top-left first: [10, 20] over [30, 40]
        let mut bytes = Vec::new();
        for v in [10f32, 20.0, 30.0, 40.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let g = read_grid(&bytes, 2, 2, "t").unwrap();
        assert_relative_eq!(g[0], 30.0); // southwest
        assert_relative_eq!(g[1], 40.0);
        assert_relative_eq!(g[2], 10.0); // northwest
        assert_relative_eq!(g[3], 20.0);
    }

    #[test]
    fn short_grid_is_an_error() {
        let bytes = vec![0u8; 12];
        assert!(matches!(
            read_grid(&bytes, 2, 2, "short"),
            Err(ParseError::GridSize { expected: 4, .. })
        ));
    }

    #[test]
    fn bool_grid_skips_header_and_reads_first_bytes() {
        // header + 4 logicals for a 2x2 grid: T F / F T in storage order
        let mut bytes = vec![0u8; 4];
        for flag in [1u8, 0, 0, 1] {
            bytes.extend_from_slice(&[flag, 0, 0, 0]);
        }
        let g = read_bool_grid(&bytes, 2, 2, "t").unwrap();
        assert_eq!(g, vec![false, true, true, false]);
    }
}
