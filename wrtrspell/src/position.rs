//! Conversions between byte offsets and row/column positions.
//!
//! Rows are separated by `\n` and columns count characters, which is what a
//! text area cursor expects.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(row: usize, column: usize) -> Position {
        Position { row, column }
    }
}

/// Position of byte `offset` in `text`. Offsets past the end map to the end of
/// the text and offsets inside a character map to that character.
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &text[..offset];
    let row = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);

    Position {
        row,
        column: before[line_start..].chars().count(),
    }
}

/// Byte offset of `position`. Rows and columns past the end clamp to the end
/// of the text or of the row.
pub fn position_to_offset(text: &str, position: Position) -> usize {
    let mut line_start = 0;
    for _ in 0..position.row {
        match text[line_start..].find('\n') {
            Some(i) => line_start += i + 1,
            None => return text.len(),
        }
    }

    let line = &text[line_start..];
    let line = &line[..line.find('\n').unwrap_or(line.len())];

    line_start
        + line
            .char_indices()
            .nth(position.column)
            .map_or(line.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns() {
        let text = "first line\nsecönd teh\n\nlast";

        assert_eq!(offset_to_position(text, 0), Position::new(0, 0));
        assert_eq!(offset_to_position(text, 6), Position::new(0, 6));
        assert_eq!(
            offset_to_position(text, text.find("teh").unwrap()),
            Position::new(1, 7)
        );
        assert_eq!(
            offset_to_position(text, text.find("last").unwrap()),
            Position::new(3, 0)
        );
        assert_eq!(offset_to_position(text, 1000), Position::new(3, 4));
    }

    #[test]
    fn inverse() {
        let text = "α β\nγδ teh\nend";

        for (offset, _) in text.char_indices() {
            let position = offset_to_position(text, offset);
            assert_eq!(position_to_offset(text, position), offset);
        }
    }

    #[test]
    fn clamping() {
        let text = "ab\ncd";

        assert_eq!(position_to_offset(text, Position::new(0, 9)), 2);
        assert_eq!(position_to_offset(text, Position::new(7, 0)), text.len());
        assert_eq!(offset_to_position("é", 1), Position::new(0, 0));
    }
}
