//! Auxiliary vector artifacts
//!
//! The consumer kernel multiplies the layout by an all-ones vector; the
//! expected result is then simply the row sums of the input matrix.

use cacheblock_core::{CooMatrix, Error, Result};
use std::io::{BufWriter, Write};

/// Write `len` followed by `len` ones
pub fn write_ones_vector<W: Write>(len: usize, out: W) -> Result<()> {
    let mut out = BufWriter::new(out);
    write!(out, "{len}")?;
    for _ in 0..len {
        write!(out, " 1")?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write `matrix * 1`, space-separated
pub fn write_expected_result<W: Write>(matrix: &CooMatrix, out: W) -> Result<()> {
    let mut out = BufWriter::new(out);
    let sums = matrix.row_sums();
    for (i, sum) in sums.iter().enumerate() {
        if i > 0 {
            write!(out, " ")?;
        }
        write!(out, "{sum}")?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Parse a whitespace-separated vector, as written by the kernel
pub fn parse_vector(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token.parse().map_err(|_| {
                Error::InvalidInput(format!("entry {i} is not a number: '{token}'"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ones_vector_has_length_prefix() {
        let mut buffer = Vec::new();
        write_ones_vector(3, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "3 1 1 1\n");
    }

    #[test]
    fn test_expected_result_is_row_sums() {
        let matrix = CooMatrix::from_triplets(3, 3, &[(0, 0, 1.0), (0, 2, 2.5), (2, 1, -4.0)]).unwrap();
        let mut buffer = Vec::new();
        write_expected_result(&matrix, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "3.5 0 -4\n");
        assert_eq!(parse_vector(&text).unwrap(), vec![3.5, 0.0, -4.0]);
    }

    #[test]
    fn test_parse_vector_rejects_garbage() {
        assert!(parse_vector("1 two 3").is_err());
        assert!(parse_vector("").unwrap().is_empty());
    }
}
