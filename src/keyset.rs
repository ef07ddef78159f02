//! Parsing of line-oriented key-set files.
//!
//! The revoked and unrevoked identifier sets are persisted as plain text: one unsigned 64-bit
//! integer per line, decimal or hexadecimal with a `0x` prefix. This is the only external data
//! format the membership structures consume.

use std::io::{self, BufRead};

/// Reads a key set from `reader`, one integer per line.
///
/// Blank lines and surrounding whitespace are ignored. A line that does not parse as an unsigned
/// 64-bit integer produces an `io::Error` of kind `InvalidData` naming the offending line number.
///
/// # Examples
///
/// ```
/// use revocation_filters::keyset::read_keys;
///
/// let input = "12345\n0xdeadbeef\n\n42\n";
/// let keys = read_keys(input.as_bytes()).unwrap();
/// assert_eq!(keys, vec![12345, 0xDEAD_BEEF, 42]);
/// ```
pub fn read_keys<R>(reader: R) -> io::Result<Vec<u64>>
where
    R: BufRead,
{
    let mut keys = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let parsed = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else {
            token.parse()
        };
        match parsed {
            Ok(key) => keys.push(key),
            Err(err) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line {}: invalid key {:?}: {}", line_number + 1, token, err),
                ));
            }
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::read_keys;
    use std::io::ErrorKind;

    #[test]
    fn test_decimal_and_hex() {
        let keys = read_keys("1\n0xFF\n0X10\n18446744073709551615\n".as_bytes()).unwrap();
        assert_eq!(keys, vec![1, 255, 16, u64::max_value()]);
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let keys = read_keys("  7 \n\n\t9\n".as_bytes()).unwrap();
        assert_eq!(keys, vec![7, 9]);
    }

    #[test]
    fn test_invalid_line_reports_position() {
        let err = read_keys("1\nnot-a-key\n3\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_empty_input() {
        assert!(read_keys("".as_bytes()).unwrap().is_empty());
    }
}
