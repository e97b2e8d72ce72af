//! A reader for line-oriented, tab-separated genomic tables.
//!
//! Chromosome-length tables, alignability tracks, enzyme lists and target
//! lists are all simple text formats with one record per line. This reader
//! strips line endings, skips blank lines, comments and UCSC `track`/`browser`
//! header lines, and parses every remaining line through [`FromStr`].

use std::io::BufRead;
use std::io::{self};
use std::marker::PhantomData;
use std::str::FromStr;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// Line prefixes that never carry a record.
const SKIPPED_PREFIXES: &[&str] = &["#", "track ", "browser "];

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error<E> {
    /// An I/O error.
    Io(io::Error),

    /// A line could not be parsed into a record.
    Parse {
        /// The 1-based line number.
        line_number: usize,

        /// The underlying parse error.
        err: E,

        /// The offending line.
        line: String,
    },
}

impl<E> std::fmt::Display for Error<E>
where
    E: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Parse {
                line_number,
                err,
                line,
            } => write!(f, "parse error on line {line_number}: {err}\n\nline: {line}"),
        }
    }
}

impl<E> std::error::Error for Error<E> where E: std::fmt::Debug + std::fmt::Display {}

/// A tabular record reader.
#[derive(Clone, Debug)]
pub struct Reader<T>(T)
where
    T: BufRead;

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a tabular record reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"chr1\t1000\nchr2\t500\n";
    /// let reader = vpdesign::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Gets a reference to the inner reader.
    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Gets a mutable reference to the inner reader.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.0
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"chr1\t1000\r\nchr2\t500";
    /// let mut reader = vpdesign::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 11);
    /// assert_eq!(buffer, "chr1\t1000");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 8);
    /// assert_eq!(buffer, "chr2\t500");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        read_line(self.inner_mut(), buffer)
    }

    /// Returns an iterator over the parsed records in the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpdesign::alignability::record::ChromosomeLength;
    ///
    /// let data = b"# sizes\nchr1\t1000\n\nchr2\t500\n";
    /// let mut reader = vpdesign::Reader::new(&data[..]);
    ///
    /// let records = reader
    ///     .records::<ChromosomeLength>()
    ///     .collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(records.len(), 2);
    /// assert_eq!(records[1].name(), "chr2");
    /// assert_eq!(records[1].length(), 500);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn records<R>(&mut self) -> Records<'_, T, R>
    where
        R: FromStr,
    {
        Records {
            reader: self,
            buffer: String::new(),
            line_number: 0,
            record: PhantomData,
        }
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

/// An iterator over the records of a [`Reader`].
#[derive(Debug)]
pub struct Records<'a, T, R>
where
    T: BufRead,
{
    /// The underlying reader.
    reader: &'a mut Reader<T>,

    /// The line buffer.
    buffer: String,

    /// The number of lines read so far.
    line_number: usize,

    /// The record type.
    record: PhantomData<R>,
}

impl<T, R> Iterator for Records<'_, T, R>
where
    T: BufRead,
    R: FromStr,
{
    type Item = Result<R, Error<R::Err>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_line_raw(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;

                    if self.buffer.trim().is_empty()
                        || SKIPPED_PREFIXES
                            .iter()
                            .any(|prefix| self.buffer.starts_with(prefix))
                    {
                        continue;
                    }

                    return Some(self.buffer.parse::<R>().map_err(|err| Error::Parse {
                        line_number: self.line_number,
                        err,
                        line: self.buffer.clone(),
                    }));
                }
                Err(err) => return Some(Err(Error::Io(err))),
            }
        }
    }
}

/// Reads a line from a buffered reader, removing the line ending.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::num::ParseIntError;

    use super::*;

    #[test]
    fn test_read_line() {
        let data = b"hello\r\nworld!";
        let mut cursor = io::Cursor::new(data);

        let mut buffer = String::new();
        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "hello");
        assert_eq!(len, 7);

        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "world!");
        assert_eq!(len, 6);
    }

    #[test]
    fn test_records_skip_headers_and_blank_lines() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"track type=bedGraph\n# a comment\n1\n\n2\r\n3";
        let mut reader = Reader::new(&data[..]);

        let values = reader
            .records::<u64>()
            .collect::<Result<Vec<_>, Error<ParseIntError>>>()?;
        assert_eq!(values, vec![1, 2, 3]);

        Ok(())
    }

    #[test]
    fn test_records_report_line_numbers() {
        let data = b"1\n\nx\n";
        let mut reader = Reader::new(&data[..]);

        let mut records = reader.records::<u64>();
        assert_eq!(records.next().unwrap().unwrap(), 1);

        let err = records.next().unwrap().unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error on line 3: invalid digit found in string\n\nline: x"
        );
        assert!(records.next().is_none());
    }
}
