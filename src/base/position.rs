/// Position tracking for symbols and queries.
///
/// Stores source locations (line/column) for LSP features like hover,
/// go-to-definition and completion. Lines and columns are 0-indexed;
/// columns count the same units the editor sends (UTF-16 code units) and
/// are treated as opaque, consistent values within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Step one column back, saturating at the line start.
    pub fn rewind(self) -> Self {
        Self {
            line: self.line,
            character: self.character.saturating_sub(1),
        }
    }
}

/// A half-open range in source code: `start` is inside, `end` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range from line/column coordinates.
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Check if a position falls within this range (end exclusive).
    pub fn contains(&self, position: Position) -> bool {
        position >= self.start && position < self.end
    }

    /// Check if `other` lies entirely within this range.
    pub fn encloses(&self, other: Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let range = Range::from_coords(1, 4, 1, 10);
        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(1, 9)));
        assert!(!range.contains(Position::new(1, 10)));
        assert!(!range.contains(Position::new(0, 5)));
    }

    #[test]
    fn contains_spans_lines() {
        let range = Range::from_coords(2, 0, 5, 1);
        assert!(range.contains(Position::new(3, 80)));
        assert!(range.contains(Position::new(5, 0)));
        assert!(!range.contains(Position::new(5, 1)));
    }

    #[test]
    fn encloses_nested_range() {
        let outer = Range::from_coords(0, 0, 10, 0);
        let inner = Range::from_coords(2, 1, 3, 5);
        assert!(outer.encloses(inner));
        assert!(!inner.encloses(outer));
    }
}
