use text_size::TextSize;

use super::Position;

/// Maps between `Position` (line + UTF-16 column) and byte offsets into a
/// document. Rebuilt whenever the document text changes.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(i as u32 + 1));
            }
        }
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of a position. Columns are interpreted as UTF-16 code
    /// units, the convention LSP clients use. Out-of-bounds positions clamp
    /// to the end of the line/text.
    pub fn offset(&self, position: Position, text: &str) -> TextSize {
        let line = (position.line as usize).min(self.line_starts.len() - 1);
        let line_start = u32::from(self.line_starts[line]) as usize;
        let line_end = self
            .line_starts
            .get(line + 1)
            .map(|o| u32::from(*o) as usize)
            .unwrap_or(text.len());

        let mut utf16_col = 0u32;
        for (i, c) in text[line_start..line_end].char_indices() {
            if utf16_col >= position.character {
                return TextSize::new((line_start + i) as u32);
            }
            utf16_col += c.len_utf16() as u32;
        }
        TextSize::new(line_end as u32)
    }

    /// Position of a byte offset.
    pub fn position(&self, offset: TextSize, text: &str) -> Position {
        let offset = u32::from(offset) as usize;
        let line = self
            .line_starts
            .partition_point(|start| u32::from(*start) as usize <= offset)
            - 1;
        let line_start = u32::from(self.line_starts[line]) as usize;
        let character: usize = text[line_start..offset.min(text.len())]
            .chars()
            .map(|c| c.len_utf16())
            .sum();
        Position::new(line as u32, character as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_ascii_positions() {
        let text = "module app;\nint x = 1;\n";
        let index = LineIndex::new(text);
        let pos = Position::new(1, 4);
        let offset = index.offset(pos, text);
        assert_eq!(u32::from(offset), 16);
        assert_eq!(index.position(offset, text), pos);
    }

    #[test]
    fn clamps_past_line_end() {
        let text = "int x;\n";
        let index = LineIndex::new(text);
        let offset = index.offset(Position::new(0, 99), text);
        assert_eq!(u32::from(offset), 7);
    }

    #[test]
    fn counts_utf16_units() {
        // '𝕏' is two UTF-16 code units, four UTF-8 bytes.
        let text = "𝕏x";
        let index = LineIndex::new(text);
        let offset = index.offset(Position::new(0, 2), text);
        assert_eq!(u32::from(offset), 4);
        assert_eq!(index.position(offset, text), Position::new(0, 2));
    }
}
