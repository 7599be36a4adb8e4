//! Line and token helpers shared by the instance readers.

use std::io::{BufRead, BufReader, Read};
use std::str::{FromStr, SplitWhitespace};

use crate::error::ModelError;

/// Buffered line reader that remembers the last line read.
pub(super) struct LineReader<R: Read> {
    buffer: String,
    reader: BufReader<R>,
    line_no: usize,
}

impl<R: Read> LineReader<R> {
    pub(super) fn new(reader: BufReader<R>) -> Self {
        Self {
            buffer: String::new(),
            reader,
            line_no: 0,
        }
    }

    /// Reads the next line into the buffer; `false` at end of input.
    pub(super) fn read_line(&mut self) -> Result<bool, ModelError> {
        self.buffer.clear();
        let read = self.reader.read_line(&mut self.buffer)?;
        if read > 0 {
            self.line_no += 1;
        }
        Ok(read > 0)
    }

    pub(super) fn skip_lines(&mut self, count: usize) -> Result<(), ModelError> {
        for _ in 0..count {
            if !self.read_line()? {
                return Err(ModelError::malformed(format!(
                    "unexpected end of file after line {}",
                    self.line_no
                )));
            }
        }
        Ok(())
    }

    /// Next line with content, or `None` at end of input.
    pub(super) fn next_data_line(&mut self) -> Result<Option<&str>, ModelError> {
        loop {
            if !self.read_line()? {
                return Ok(None);
            }
            if !self.buffer.trim().is_empty() {
                return Ok(Some(self.buffer.trim()));
            }
        }
    }

    /// Like [`next_data_line`](Self::next_data_line) but fails at end of input.
    pub(super) fn expect_data_line(&mut self, what: &str) -> Result<&str, ModelError> {
        let line_no = self.line_no;
        self.next_data_line()?.ok_or_else(|| {
            ModelError::malformed(format!(
                "unexpected end of file after line {line_no}, expected {what}"
            ))
        })
    }

    pub(super) fn line_no(&self) -> usize {
        self.line_no
    }
}

/// Parses exactly `expected` whitespace-separated numbers from a line.
pub(super) fn parse_numbers<T: FromStr>(
    line: &str,
    expected: usize,
    what: &str,
) -> Result<Vec<T>, ModelError> {
    let values = line
        .split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|_| ModelError::malformed(format!("cannot parse '{token}' in {what}")))
        })
        .collect::<Result<Vec<T>, _>>()?;
    if values.len() < expected {
        return Err(ModelError::malformed(format!(
            "{what} has {} fields, expected {expected}",
            values.len()
        )));
    }
    Ok(values)
}

/// Converts a numeric field that must hold a whole number fitting `T`.
pub(super) fn integer<T: TryFrom<i64>>(value: f64, what: &str) -> Result<T, ModelError> {
    // beyond 2^53 an f64 no longer holds every integer
    let exact = value.fract() == 0.0 && value.abs() <= 9_007_199_254_740_992.0;
    exact
        .then(|| T::try_from(value as i64).ok())
        .flatten()
        .ok_or_else(|| ModelError::malformed(format!("invalid {what} {value}")))
}

/// Whitespace token stream over a whole document.
pub(super) struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    pub(super) fn next_token(&mut self, what: &str) -> Result<&'a str, ModelError> {
        self.inner
            .next()
            .ok_or_else(|| ModelError::malformed(format!("unexpected end of file, expected {what}")))
    }

    pub(super) fn parse<T: FromStr>(&mut self, what: &str) -> Result<T, ModelError> {
        let token = self.next_token(what)?;
        token
            .parse()
            .map_err(|_| ModelError::malformed(format!("cannot parse '{token}' as {what}")))
    }

    /// Reads the value of a `KEY : value` header entry (the colon may be
    /// glued to the key or stand alone).
    pub(super) fn header_value(&mut self, key: &str) -> Result<&'a str, ModelError> {
        let token = self.next_token(key)?;
        if token == ":" {
            return self.next_token(key);
        }
        Ok(token.strip_prefix(':').filter(|t| !t.is_empty()).unwrap_or(token))
    }

    pub(super) fn expect(&mut self, keyword: &str) -> Result<(), ModelError> {
        let token = self.next_token(keyword)?;
        if token != keyword {
            return Err(ModelError::malformed(format!(
                "expected {keyword}, found '{token}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_reader_skips_blanks() {
        let text = "first\n\n   \nsecond\n";
        let mut reader = LineReader::new(BufReader::new(text.as_bytes()));
        assert_eq!(reader.next_data_line().expect("io"), Some("first"));
        assert_eq!(reader.next_data_line().expect("io"), Some("second"));
        assert_eq!(reader.line_no(), 4);
        assert_eq!(reader.next_data_line().expect("io"), None);
    }

    #[test]
    fn test_skip_past_end() {
        let mut reader = LineReader::new(BufReader::new("a\nb\n".as_bytes()));
        assert!(reader.skip_lines(3).is_err());
    }

    #[test]
    fn test_parse_numbers() {
        let v: Vec<f64> = parse_numbers("1 2.5  -3", 3, "row").expect("valid");
        assert_eq!(v, vec![1.0, 2.5, -3.0]);
        assert!(parse_numbers::<i32>("1 x", 2, "row").is_err());
        assert!(parse_numbers::<i32>("1", 2, "row").is_err());
    }

    #[test]
    fn test_integer_fields() {
        assert_eq!(integer::<usize>(25.0, "vehicle number").expect("whole"), 25);
        assert_eq!(integer::<i32>(-10.0, "demand").expect("whole"), -10);
        assert!(integer::<usize>(-1.0, "vehicle number").is_err());
        assert!(integer::<i32>(2.5, "capacity").is_err());
        assert!(integer::<i32>(1.0e12, "capacity").is_err());
        assert!(integer::<i64>(f64::NAN, "column").is_err());
    }

    #[test]
    fn test_header_value_forms() {
        let mut t = Tokens::new("DIMENSION : 5 CAPACITY: 100");
        t.expect("DIMENSION").expect("keyword");
        assert_eq!(t.header_value("DIMENSION").expect("value"), "5");
        assert_eq!(t.next_token("key").expect("key"), "CAPACITY:");
        assert_eq!(t.header_value("CAPACITY").expect("value"), "100");
    }
}
