//! Forward-only typed consumption of a source's line sequence.

use crate::ParseError;
use bhukamp_models::fields::{read_f64, read_int};

/// Sequential cursor over a source's lines.
///
/// Running past the end is always a fatal parse error; the input files are
/// static and a short read means the file or the grammar is wrong.
pub struct LineCursor<'a> {
    lines: &'a [String],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        LineCursor { lines, pos: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.pos < self.lines.len()
    }

    /// 1-based number of the last consumed line, for error context.
    pub fn line_number(&self) -> usize {
        self.pos
    }

    pub fn next(&mut self) -> Result<&'a str, ParseError> {
        let line = self
            .lines
            .get(self.pos)
            .ok_or(ParseError::UnexpectedEof { line: self.pos })?;
        self.pos += 1;
        Ok(line)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        if self.pos + n > self.lines.len() {
            return Err(ParseError::UnexpectedEof { line: self.pos });
        }
        self.pos += n;
        Ok(())
    }

    /// Peels off the next `n` lines as a sub-record.
    pub fn take(&mut self, n: usize) -> Result<&'a [String], ParseError> {
        if self.pos + n > self.lines.len() {
            return Err(ParseError::UnexpectedEof { line: self.pos });
        }
        let out = &self.lines[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Skips the site/grid block: a station count line (count > 0: that
    /// many station lines, else 2 lat-lon bounds lines) plus one site-data
    /// line.
    pub fn skip_site_header(&mut self) -> Result<(), ParseError> {
        let num_sta = read_int(self.next()?, 0)?;
        self.skip(if num_sta > 0 { num_sta as usize } else { 2 })?;
        self.skip(1) // site data
    }

    /// Skips the per-period attenuation configuration blocks, then the
    /// distance-sampling line. Each period block carries an epistemic-
    /// uncertainty flag (3 extra lines when set) and its own attenuation-
    /// relation count.
    pub fn skip_period_header(&mut self) -> Result<(), ParseError> {
        let n_periods = read_int(self.next()?, 0)?;
        for _ in 0..n_periods {
            let epi = read_f64(self.next()?, 1)?;
            if epi > 0.0 {
                self.skip(3)?;
            }
            self.skip(1)?; // output file
            self.skip(1)?; // ground motion count
            self.skip(1)?; // ground motion values
            let n_ar = read_int(self.next()?, 0)?;
            self.skip(n_ar.max(0) as usize)?;
        }
        self.skip(1) // distance sampling and dMove
    }
}
