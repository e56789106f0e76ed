use serde::{Deserialize, Serialize};

use super::piece::Piece;

/// Occupancy grid with permanently occupied border padding.
///
/// The allocated grid is `(height + 2) × (width + 2)`: two fully occupied
/// floor rows below the playable area and one wall column on each side of it.
/// Collision detection reads border cells instead of performing range checks,
/// and locking only ever sets cells, so the border survives every operation.
///
/// # Board layout (width 4, height 3)
///
/// ```text
/// (. = empty, W = border)
///        0  1  2  3  4  5
///     0  W  .  .  .  .  W
///     1  W  .  .  .  .  W
///     2  W  .  .  .  .  W
///     3  W  W  W  W  W  W   <- floor
///     4  W  W  W  W  W  W   <- floor
/// ```
///
/// Pieces address the playable columns from 0, one column to the left of the
/// board's internal indexing; [`Piece::occupied_board_cells`] applies the
/// shift for both collision testing and locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: interior rows of '.'/'#' joined by '|' ("....|.##.|....")
        let mut encoded = String::with_capacity(self.height * (self.width + 1));
        for (i, row) in self.playable_rows().enumerate() {
            if i > 0 {
                encoded.push('|');
            }
            for &cell in row {
                encoded.push(if cell { '#' } else { '.' });
            }
        }
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let rows: Vec<&str> = s.split('|').collect();
        let width = rows[0].chars().count();
        if width == 0 {
            return Err(serde::de::Error::custom("board rows must not be empty"));
        }

        let mut board = Board::new(width, rows.len());
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(serde::de::Error::custom(format!(
                    "expected {width} cells at row {row}, got {}",
                    line.chars().count()
                )));
            }
            for (column, c) in line.chars().enumerate() {
                match c {
                    '#' => board.occupy(row, column + 1),
                    '.' => {}
                    _ => {
                        return Err(serde::de::Error::custom(format!(
                            "invalid cell '{c}' at row {row}"
                        )));
                    }
                }
            }
        }
        Ok(board)
    }
}

impl Board {
    /// Creates an empty board with the given playable dimensions.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0, "board width must be positive");
        assert!(height > 0, "board height must be positive");

        let total_width = width + 2;
        let total_height = height + 2;
        let mut cells = vec![false; total_width * total_height];

        // Floor rows below the playable area
        for index in height * total_width..total_height * total_width {
            cells[index] = true;
        }
        // Wall columns flanking the playable rows
        for row in 0..height {
            cells[row * total_width] = true;
            cells[row * total_width + width + 1] = true;
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// Playable width in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Playable height in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    const fn total_width(&self) -> usize {
        self.width + 2
    }

    const fn total_height(&self) -> usize {
        self.height + 2
    }

    /// Checks if a cell at the given board coordinates is occupied.
    ///
    /// Border cells always report occupied, and so do coordinates outside
    /// the allocated extent (only reachable by rotating a piece into the
    /// border).
    #[must_use]
    pub fn is_occupied(&self, row: usize, column: usize) -> bool {
        if row >= self.total_height() || column >= self.total_width() {
            return true;
        }
        self.cells[row * self.total_width() + column]
    }

    /// Checks if the piece overlaps occupied cells, the border included.
    #[must_use]
    pub fn is_colliding(&self, piece: Piece) -> bool {
        piece
            .occupied_board_cells()
            .any(|(row, column)| self.is_occupied(row, column))
    }

    /// Locks a piece onto the board by setting its occupied cells.
    ///
    /// This is called when a piece can no longer move down and should become
    /// part of the settled board state. Cells are only ever set, never
    /// cleared.
    pub fn fill_piece(&mut self, piece: Piece) {
        for (row, column) in piece.occupied_board_cells() {
            self.occupy(row, column);
        }
    }

    /// Sets a single cell. Writes outside the allocated extent are dropped;
    /// a piece only reaches them by rotating into the border.
    fn occupy(&mut self, row: usize, column: usize) {
        if row < self.total_height() && column < self.total_width() {
            let index = row * self.total_width() + column;
            self.cells[index] = true;
        }
    }

    /// Returns an iterator over the playable rows, borders excluded.
    pub fn playable_rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        (0..self.height).map(move |row| {
            let start = row * self.total_width() + 1;
            &self.cells[start..start + self.width]
        })
    }

    /// Creates a `Board` from ASCII art representation for testing.
    ///
    /// '#' represents an occupied cell, '.' an empty cell. The playable
    /// width is taken from the first row and every row must match it;
    /// rows are specified from top to bottom.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<Vec<char>> = art
            .lines()
            .map(|line| line.chars().filter(|c| *c == '#' || *c == '.').collect())
            .filter(|chars: &Vec<char>| !chars.is_empty())
            .collect();
        assert!(!lines.is_empty(), "board art must contain at least one row");

        let width = lines[0].len();
        let mut board = Self::new(width, lines.len());
        for (row, chars) in lines.iter().enumerate() {
            assert_eq!(
                chars.len(),
                width,
                "each row must have exactly {width} cells, got {} at row {row}",
                chars.len(),
            );
            for (column, &c) in chars.iter().enumerate() {
                if c == '#' {
                    board.occupy(row, column + 1);
                }
            }
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::PieceKind;

    #[test]
    fn test_new_board_borders_and_interior() {
        let board = Board::new(10, 20);

        for row in 0..22 {
            for column in 0..12 {
                let cell = board.is_occupied(row, column);
                if row >= 20 {
                    assert!(cell, "floor rows should be occupied at ({row}, {column})");
                    continue;
                }
                if column == 0 || column == 11 {
                    assert!(cell, "wall columns should be occupied at ({row}, {column})");
                    continue;
                }
                assert!(
                    !cell,
                    "playable area should not be occupied at ({row}, {column})"
                );
            }
        }
    }

    #[test]
    fn test_is_occupied_outside_extent() {
        let board = Board::new(10, 20);
        assert!(board.is_occupied(22, 5));
        assert!(board.is_occupied(5, 12));
        assert!(board.is_occupied(100, 100));
    }

    #[test]
    #[should_panic(expected = "board width must be positive")]
    fn test_new_rejects_zero_width() {
        let _ = Board::new(0, 20);
    }

    #[test]
    fn test_from_ascii() {
        let board = Board::from_ascii(
            r"
            ....
            .#..
            ..##
            ",
        );

        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 3);
        // Interior column c sits at board column c + 1
        assert!(board.is_occupied(1, 2));
        assert!(board.is_occupied(2, 3));
        assert!(board.is_occupied(2, 4));
        assert!(!board.is_occupied(0, 1));
        assert!(!board.is_occupied(1, 1));
    }

    #[test]
    fn test_playable_rows_exclude_borders() {
        let board = Board::from_ascii(
            r"
            ....
            .#..
            ..##
            ",
        );

        let rows: Vec<Vec<bool>> = board.playable_rows().map(<[bool]>::to_vec).collect();
        assert_eq!(
            rows,
            [
                [false, false, false, false],
                [false, true, false, false],
                [false, false, true, true],
            ]
        );
    }

    #[test]
    fn test_collision_with_walls_and_floor() {
        let board = Board::new(10, 20);
        let spawned = Piece::spawn(PieceKind::T, 10);
        assert!(!board.is_colliding(spawned));

        // One step right of the rightmost free column (7 for a T)
        let mut at_wall = spawned;
        for _ in 0..3 {
            at_wall = at_wall.right();
        }
        assert!(!board.is_colliding(at_wall));
        assert!(board.is_colliding(at_wall.right()));

        // One step below the lowest free row (18 for a T)
        let mut at_floor = spawned;
        for _ in 0..18 {
            at_floor = at_floor.down();
        }
        assert!(!board.is_colliding(at_floor));
        assert!(board.is_colliding(at_floor.down()));
    }

    #[test]
    fn test_collision_with_settled_cells() {
        let board = Board::from_ascii(
            r"
            ..........
            ..........
            ..........
            ....#.....
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ",
        );

        // T at column 3 covers interior columns 3..=5 on its bottom row, so
        // it rests one row above the settled cell
        let t = Piece::spawn(PieceKind::T, 10).left().unwrap().down();
        assert!(!board.is_colliding(t));
        assert!(board.is_colliding(t.down()));
    }

    #[test]
    fn test_fill_piece_is_monotonic() {
        let mut board = Board::from_ascii(
            r"
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ....##....
            ...####...
            ",
        );
        let occupied_before: Vec<(usize, usize)> = (0..22)
            .flat_map(|row| (0..12).map(move |column| (row, column)))
            .filter(|&(row, column)| board.is_occupied(row, column))
            .collect();

        let mut piece = Piece::spawn(PieceKind::O, 10);
        for _ in 0..16 {
            piece = piece.down();
        }
        assert!(!board.is_colliding(piece));
        board.fill_piece(piece);

        for (row, column) in occupied_before {
            assert!(board.is_occupied(row, column), "({row}, {column}) cleared");
        }
        let occupied_after = board.playable_rows().flatten().filter(|&&c| c).count();
        assert_eq!(occupied_after, 6 + 4);
    }

    #[test]
    fn test_lock_matches_collision_prediction() {
        let mut board = Board::new(10, 20);
        let mut piece = Piece::spawn(PieceKind::J, 10);
        while !board.is_colliding(piece.down()) {
            piece = piece.down();
        }

        board.fill_piece(piece);
        for (row, column) in piece.occupied_board_cells() {
            assert!(
                board.is_occupied(row, column),
                "locked cell ({row}, {column}) not occupied"
            );
        }
        let occupied = board.playable_rows().flatten().filter(|&&c| c).count();
        assert_eq!(occupied, 4);
    }

    #[test]
    fn test_fill_piece_drops_cells_outside_the_extent() {
        let mut board = Board::new(10, 20);

        // A vertical I at column 8 fits; rotating it back to horizontal
        // reaches board column 12, one past the allocated extent.
        let mut piece = Piece::spawn(PieceKind::I, 10).rotated_cw();
        for _ in 0..5 {
            piece = piece.right();
        }
        assert!(!board.is_colliding(piece));

        let overlapping = piece.rotated_cw();
        assert!(board.is_colliding(overlapping));

        board.fill_piece(overlapping);
        assert!(board.is_occupied(1, 9));
        assert!(board.is_occupied(1, 10));
        // The wall cell it overlapped stays occupied, and nothing panicked
        assert!(board.is_occupied(1, 11));
    }

    #[test]
    fn test_board_serialization_round_trip() {
        let board = Board::from_ascii(
            r"
            ....
            .#..
            ..##
            ",
        );

        let serialized = serde_json::to_string(&board).unwrap();
        assert_eq!(serialized, "\"....|.#..|..##\"");

        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);
    }

    #[test]
    fn test_board_deserialization_error_cases() {
        // Ragged rows
        assert!(serde_json::from_str::<Board>("\"....|..\"").is_err());
        // Invalid cell character
        assert!(serde_json::from_str::<Board>("\"..x.|....\"").is_err());
        // Empty encoding
        assert!(serde_json::from_str::<Board>("\"\"").is_err());
    }
}
