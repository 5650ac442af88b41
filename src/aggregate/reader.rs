// src/aggregate/reader.rs

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::csv::parse_line;

/// Reads snapshot rows while tracking the byte offset at which each record
/// starts, so a later `row_at(offset)` re-reads exactly that record.
///
/// A record-level CSV reader can't provide this: its buffered read-ahead
/// leaves the underlying stream position past the row it just yielded. The
/// cursor here is advanced only by the byte count each raw line consumed.
pub struct PositionReader {
    inner: BufReader<File>,
    cursor: u64,
    header: Vec<String>,
    by_name: HashMap<String, usize>,
    data_start: u64,
}

impl PositionReader {
    /// Open a snapshot and read its header row.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut r = Self {
            inner: BufReader::new(file),
            cursor: 0,
            header: Vec::new(),
            by_name: HashMap::new(),
            data_start: 0,
        };
        r.read_header()?;
        Ok(r)
    }

    /// (Re-)read the first row as column names; leaves the cursor on the
    /// first data row.
    pub fn read_header(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        let mut line = String::new();
        let n = self.inner.read_line(&mut line)?;
        self.cursor = n as u64;
        self.data_start = self.cursor;
        self.header = if n == 0 { Vec::new() } else { parse_line(&line, ',') };
        self.by_name = self
            .header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Ok(())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Reposition to the first data row.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(self.data_start))?;
        self.cursor = self.data_start;
        Ok(())
    }

    /// Next `(offset, fields)` pair. The offset is the position of the
    /// record's first byte, captured before consuming it. Blank lines are
    /// skipped (they can't carry a record).
    pub fn next_row(&mut self) -> io::Result<Option<(u64, Vec<String>)>> {
        loop {
            let at = self.cursor;
            let mut line = String::new();
            let n = self.inner.read_line(&mut line)?;
            if n == 0 {
                return Ok(None);
            }
            self.cursor += n as u64;
            if line.trim_end_matches(['\n', '\r']).is_empty() {
                continue;
            }
            return Ok(Some((at, parse_line(&line, ','))));
        }
    }

    /// Seek to `offset` and parse exactly one record from there.
    pub fn row_at(&mut self, offset: u64) -> io::Result<Option<Vec<String>>> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.cursor = offset;
        Ok(self.next_row()?.map(|(_, fields)| fields))
    }

    /// Field access by column name; `None` when the column is absent.
    pub fn field<'a>(&self, fields: &'a [String], name: &str) -> Option<&'a str> {
        self.by_name
            .get(name)
            .and_then(|&i| fields.get(i))
            .map(String::as_str)
    }
}
