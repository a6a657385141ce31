//! Matrix Market coordinate reader
//!
//! Supports the `matrix coordinate` object with `real`, `integer` or
//! `pattern` fields and `general`, `symmetric` or `skew-symmetric`
//! storage. Symmetric storage is expanded so the result holds every
//! nonzero explicitly.

use cacheblock_core::{CooEntry, CooMatrix, Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Real,
    Integer,
    Pattern,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
    SkewSymmetric,
}

/// Parsed `%%MatrixMarket` banner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Banner {
    field: Field,
    symmetry: Symmetry,
}

impl Banner {
    fn parse(line: &str) -> Result<Self> {
        let words: Vec<String> = line.split_whitespace().map(str::to_ascii_lowercase).collect();
        let [head, object, format, field, symmetry] = words.as_slice() else {
            return Err(Error::parse(1, "banner must have five words"));
        };
        if head != "%%matrixmarket" || object != "matrix" {
            return Err(Error::parse(1, format!("not a Matrix Market matrix: '{line}'")));
        }
        if format != "coordinate" {
            return Err(Error::InvalidInput(format!(
                "only coordinate format is supported, found '{format}'"
            )));
        }
        let field = match field.as_str() {
            "real" | "double" => Field::Real,
            "integer" => Field::Integer,
            "pattern" => Field::Pattern,
            other => {
                return Err(Error::InvalidInput(format!("unsupported field '{other}'")));
            }
        };
        let symmetry = match symmetry.as_str() {
            "general" => Symmetry::General,
            "symmetric" => Symmetry::Symmetric,
            "skew-symmetric" => Symmetry::SkewSymmetric,
            other => {
                return Err(Error::InvalidInput(format!(
                    "unsupported symmetry '{other}'"
                )));
            }
        };
        Ok(Self { field, symmetry })
    }
}

/// Read a coordinate matrix from Matrix Market text
pub fn read_matrix_market<R: BufRead>(reader: R) -> Result<CooMatrix> {
    let mut lines = reader.lines().enumerate();

    let banner = match lines.next() {
        Some((_, line)) => Banner::parse(&line?)?,
        None => return Err(Error::parse(1, "empty input")),
    };

    let mut size: Option<(usize, usize, usize)> = None;
    let mut entries = Vec::new();
    let mut declared_read = 0;

    for (index, line) in lines {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();

        let Some((rows, cols, nnz)) = size else {
            let [rows, cols, nnz] = fields.as_slice() else {
                return Err(Error::parse(line_no, "size line must be 'rows cols nnz'"));
            };
            size = Some((
                parse_index(rows, line_no)?,
                parse_index(cols, line_no)?,
                parse_index(nnz, line_no)?,
            ));
            continue;
        };

        if declared_read == nnz {
            return Err(Error::parse(line_no, format!("more than {nnz} entries")));
        }
        let expected_fields = if banner.field == Field::Pattern { 2 } else { 3 };
        if fields.len() != expected_fields {
            return Err(Error::parse(
                line_no,
                format!("expected {expected_fields} fields, found {}", fields.len()),
            ));
        }

        let row = one_based(fields[0], rows, line_no)?;
        let col = one_based(fields[1], cols, line_no)?;
        let value = match banner.field {
            Field::Pattern => 1.0,
            Field::Integer => fields[2]
                .parse::<i64>()
                .map_err(|_| Error::parse(line_no, format!("invalid integer '{}'", fields[2])))?
                as f64,
            Field::Real => fields[2]
                .parse::<f64>()
                .map_err(|_| Error::parse(line_no, format!("invalid value '{}'", fields[2])))?,
        };
        declared_read += 1;

        entries.push(CooEntry::new(row, col, value));
        if row != col {
            match banner.symmetry {
                Symmetry::General => {}
                Symmetry::Symmetric => entries.push(CooEntry::new(col, row, value)),
                Symmetry::SkewSymmetric => entries.push(CooEntry::new(col, row, -value)),
            }
        }
    }

    let Some((rows, cols, nnz)) = size else {
        return Err(Error::parse(1, "missing size line"));
    };
    if declared_read != nnz {
        return Err(Error::InvalidInput(format!(
            "declared {nnz} entries but found {declared_read}"
        )));
    }

    debug!(rows, cols, declared = nnz, stored = entries.len(), "read matrix market");
    CooMatrix::new(rows, cols, entries)
}

/// Read a Matrix Market file from disk
pub fn read_matrix_market_file<P: AsRef<Path>>(path: P) -> Result<CooMatrix> {
    let file = File::open(path.as_ref())?;
    read_matrix_market(BufReader::new(file))
}

fn parse_index(token: &str, line: usize) -> Result<usize> {
    token
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid integer '{token}'")))
}

/// Convert a 1-based index, checking it against `limit`
fn one_based(token: &str, limit: usize, line: usize) -> Result<usize> {
    let index = parse_index(token, line)?;
    if index == 0 || index > limit {
        return Err(Error::parse(
            line,
            format!("index {index} outside 1..={limit}"),
        ));
    }
    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(text: &str) -> Result<CooMatrix> {
        read_matrix_market(Cursor::new(text))
    }

    #[test]
    fn test_general_real() {
        let m = read(
            "%%MatrixMarket matrix coordinate real general\n\
             % a comment\n\
             3 4 2\n\
             1 1 2.5\n\
             3 4 -1\n",
        )
        .unwrap();
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.entries()[1], CooEntry::new(2, 3, -1.0));
    }

    #[test]
    fn test_symmetric_expanded() {
        let m = read(
            "%%MatrixMarket matrix coordinate integer symmetric\n\
             3 3 2\n\
             1 1 4\n\
             3 1 7\n",
        )
        .unwrap();
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row_sums(), vec![11.0, 0.0, 7.0]);
    }

    #[test]
    fn test_skew_symmetric_negates_mirror() {
        let m = read(
            "%%MatrixMarket matrix coordinate real skew-symmetric\n\
             2 2 1\n\
             2 1 3\n",
        )
        .unwrap();
        assert_eq!(m.row_sums(), vec![-3.0, 3.0]);
    }

    #[test]
    fn test_pattern_values_are_one() {
        let m = read(
            "%%MatrixMarket matrix coordinate pattern general\n\
             2 2 2\n\
             1 2\n\
             2 1\n",
        )
        .unwrap();
        assert!(m.entries().iter().all(|e| e.value == 1.0));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            read("%%MatrixMarket matrix array real general\n2 2\n"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            read("%%MatrixMarket matrix coordinate real general\n2 2 1\n3 1 1.0\n"),
            Err(Error::Parse { line: 3, .. })
        ));
        assert!(matches!(
            read("%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1.0\n"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            read("%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1.0\n1 1 2.0\n"),
            Err(Error::DuplicateEntry { row: 0, col: 0 })
        ));
        assert!(read("").is_err());
    }

    #[test]
    fn test_oversized_declared_count_is_an_error() {
        let err = read(
            "%%MatrixMarket matrix coordinate real general\n\
             2 2 18446744073709551615\n\
             1 1 1.0\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
