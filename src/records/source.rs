// CSV record source for gateway exports
use std::io::Read;
use std::path::Path;

use crate::error::{ErrlensError, Result};
use crate::records::{LogRecord, RecordSet};

/// Reads a gateway CSV export into a [`RecordSet`]
///
/// Header detection, quoting and string extraction are delegated to the
/// `csv` crate. Every value is kept as a string.
pub struct CsvSource {
    delimiter: u8,
}

impl Default for CsvSource {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl CsvSource {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read only the header row of a file
    pub fn read_headers(&self, path: &Path) -> Result<Vec<String>> {
        let mut reader = self.builder().from_reader(Self::open(path)?);
        Ok(decode_headers(reader.byte_headers()?))
    }

    /// Count the non-blank data rows of a file without decoding them
    pub fn count_rows(&self, path: &Path) -> Result<usize> {
        let mut reader = self.builder().from_reader(Self::open(path)?);
        let mut row = csv::ByteRecord::new();
        let mut rows = 0;
        while reader.read_byte_record(&mut row)? {
            if !is_blank(&row) {
                rows += 1;
            }
        }
        Ok(rows)
    }

    /// Read a whole export file
    pub fn read_path(&self, path: &Path) -> Result<RecordSet> {
        self.read(Self::open(path)?)
    }

    /// Read records from any reader
    ///
    /// Blank lines are skipped. Rows shorter than the header row are padded
    /// with empty cells. Bytes that are not UTF-8 become U+FFFD.
    pub fn read<R: Read>(&self, input: R) -> Result<RecordSet> {
        let mut reader = self.builder().from_reader(input);
        let headers = decode_headers(reader.byte_headers()?);

        let mut records = Vec::new();
        let mut row = csv::ByteRecord::new();
        while reader.read_byte_record(&mut row)? {
            if is_blank(&row) {
                continue;
            }
            records.push(LogRecord::from_pairs(
                headers
                    .iter()
                    .zip(row.iter().map(|cell| String::from_utf8_lossy(cell).into_owned())),
            ));
        }

        tracing::debug!(
            columns = headers.len(),
            rows = records.len(),
            "Read log export"
        );

        Ok(RecordSet::with_headers(headers, records))
    }

    fn open(path: &Path) -> Result<std::fs::File> {
        std::fs::File::open(path).map_err(|e| ErrlensError::Io {
            source: e,
            context: format!("Failed to open log export: {:?}", path),
        })
    }

    fn builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers);
        builder
    }
}

fn decode_headers(headers: &csv::ByteRecord) -> Vec<String> {
    headers
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect()
}

fn is_blank(row: &csv::ByteRecord) -> bool {
    row.iter().all(|cell| cell.iter().all(u8::is_ascii_whitespace))
}
