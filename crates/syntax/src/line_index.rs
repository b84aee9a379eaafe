//! Line/column to byte-offset conversion.

use crate::node::Position;

/// Precomputed line-start table for a source text.
///
/// The YAML scanner reports 1-based lines and 0-based character columns;
/// text edits need byte offsets. This bridges the two.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Byte offset of the start of a 1-based line.
    #[must_use]
    pub fn line_start(&self, line: usize) -> usize {
        let idx = line.saturating_sub(1);
        self.line_starts
            .get(idx)
            .copied()
            .unwrap_or(self.len)
    }

    /// Number of lines in the text (a trailing newline does not open a line).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a (1-based line, 0-based char column) pair to a [`Position`].
    ///
    /// Positions past the end of the text clamp to the text length.
    #[must_use]
    pub fn position(&self, text: &str, line: usize, column: usize) -> Position {
        let start = self.line_start(line);
        let end = text[start..].find('\n').map_or(self.len, |nl| start + nl);
        for (count, (byte_idx, _)) in text[start..end].char_indices().enumerate() {
            if count == column {
                return Position {
                    line,
                    column,
                    offset: start + byte_idx,
                };
            }
        }
        // Column is at or past end of line content; clamp to the line end.
        Position {
            line,
            column,
            offset: end,
        }
    }

    /// Convert a byte offset back to a [`Position`].
    #[must_use]
    pub fn position_at(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.line_starts[line_idx];
        let column = text[start..offset].chars().count();
        Position {
            line: line_idx + 1,
            column,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_starts_and_positions() {
        let text = "abc\ndef\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_start(1), 0);
        assert_eq!(index.line_start(2), 4);
        assert_eq!(index.position(text, 2, 1).offset, 5);
        assert_eq!(index.position_at(text, 5).line, 2);
        assert_eq!(index.position_at(text, 5).column, 1);
    }

    #[test]
    fn multibyte_columns() {
        let text = "k: héllo\n";
        let index = LineIndex::new(text);
        // 'h' is column 3; 'é' occupies two bytes.
        let pos = index.position(text, 1, 5);
        assert_eq!(pos.offset, 6);
        let back = index.position_at(text, 6);
        assert_eq!(back.column, 5);
    }

    #[test]
    fn column_past_line_end_clamps() {
        let text = "ab\ncd";
        let index = LineIndex::new(text);
        assert_eq!(index.position(text, 1, 99).offset, 2);
        assert_eq!(index.position(text, 2, 99).offset, 5);
    }
}
