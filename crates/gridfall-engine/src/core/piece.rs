use serde::{Deserialize, Serialize};

use crate::{InvalidPieceKindError, InvalidRotationError};

/// A falling piece with kind, rotation state, and board position.
///
/// Pieces are immutable values - movement and rotation operations return new
/// `Piece` instances, and the session decides whether a candidate is kept.
///
/// # Coordinate System
///
/// - `column`/`row` locate the top-left cell of the piece's layout box in
///   playable coordinates: column 0 is the leftmost playable column, row 0
///   the top playable row
/// - Rotation counts quarter turns clockwise from the spawn orientation
/// - Each kind has a square layout box (side 3, or 4 for I and O) that
///   rotates in place
///
/// # Example
///
/// ```
/// use gridfall_engine::{Piece, PieceKind};
///
/// let piece = Piece::spawn(PieceKind::T, 10);
/// assert_eq!((piece.column(), piece.row()), (4, 0));
///
/// let rotated = piece.rotated_cw();
/// assert_eq!(rotated.rotation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@column,row" (e.g., "T#1@4,0")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.index(),
            self.position.column(),
            self.position.row()
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "expected format 'kind#rotation@column,row', got '{s}'"
            ))
        })?;
        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing '@' in format 'kind#rotation@column,row', got '{s}'"
            ))
        })?;
        let (column_str, row_str) = position_str.split_once(',').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing ',' in format 'kind#rotation@column,row', got '{s}'"
            ))
        })?;

        let mut kind_chars = kind_str.chars();
        let kind_char = kind_chars
            .next()
            .ok_or_else(|| serde::de::Error::custom("missing piece kind"))?;
        if kind_chars.next().is_some() {
            return Err(serde::de::Error::custom(format!(
                "piece kind must be a single character, got '{kind_str}'"
            )));
        }
        let kind = PieceKind::from_char(kind_char)
            .ok_or_else(|| serde::de::Error::custom(InvalidPieceKindError))?;

        let rotation_index = rotation_str.parse::<u8>().map_err(|e| {
            serde::de::Error::custom(format!("invalid rotation: {rotation_str} ({e})"))
        })?;
        let rotation = PieceRotation::from_index(rotation_index).map_err(serde::de::Error::custom)?;

        let column = column_str
            .parse::<usize>()
            .map_err(|e| serde::de::Error::custom(format!("invalid column: {column_str} ({e})")))?;
        let row = row_str
            .parse::<usize>()
            .map_err(|e| serde::de::Error::custom(format!("invalid row: {row_str} ({e})")))?;

        Ok(Piece {
            position: PiecePosition::new(column, row),
            rotation,
            kind,
        })
    }
}

impl Piece {
    /// Creates a piece at the top-center spawn position for a board of the
    /// given playable width, in spawn orientation.
    #[must_use]
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let column = (board_width / 2).saturating_sub(kind.base_width() / 2);
        Self {
            position: PiecePosition::new(column, 0),
            rotation: PieceRotation::default(),
            kind,
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.position.column()
    }

    #[must_use]
    pub fn row(&self) -> usize {
        self.position.row()
    }

    /// Width of the rotated bounding box in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        if self.rotation.index() % 2 == 0 {
            self.kind.base_width()
        } else {
            self.kind.base_height()
        }
    }

    /// Height of the rotated bounding box in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        if self.rotation.index() % 2 == 0 {
            self.kind.base_height()
        } else {
            self.kind.base_width()
        }
    }

    /// Returns an iterator of occupied `(dx, dy)` offsets within the layout
    /// box, under the current rotation.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> {
        self.kind.occupied_cells(self.rotation)
    }

    /// Returns an iterator of the absolute `(row, column)` board cells the
    /// piece covers.
    ///
    /// Piece columns address the playable area from 0 while board column 0
    /// is the left wall, hence the one-column shift. Collision testing and
    /// locking both consume this mapping, so they cannot disagree on it.
    pub fn occupied_board_cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (column, row) = (self.position.column(), self.position.row());
        self.occupied_cells()
            .map(move |(dx, dy)| (row + dy, column + dx + 1))
    }

    /// Returns the piece shifted one column left, or `None` when it is
    /// already at the leftmost playable column.
    #[must_use]
    pub fn left(&self) -> Option<Self> {
        let position = self.position.left()?;
        Some(Self { position, ..*self })
    }

    #[must_use]
    pub fn right(&self) -> Self {
        Self {
            position: self.position.right(),
            ..*self
        }
    }

    #[must_use]
    pub fn down(&self) -> Self {
        Self {
            position: self.position.down(),
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_cw(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_cw(),
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_ccw(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_ccw(),
            ..*self
        }
    }
}

/// Position of a piece's layout box in playable coordinates.
///
/// - (0, 0) is the top-left of the playable area
/// - Columns increase rightward, rows increase downward
/// - Only the left edge is bounded here; walls and floor stop movement in
///   the other directions through collision detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePosition {
    column: usize,
    row: usize,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    #[must_use]
    pub const fn column(self) -> usize {
        self.column
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row
    }

    /// `None` when already at the leftmost playable column.
    #[must_use]
    pub const fn left(self) -> Option<Self> {
        if self.column == 0 {
            None
        } else {
            Some(Self::new(self.column - 1, self.row))
        }
    }

    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.column + 1, self.row)
    }

    #[must_use]
    pub const fn down(self) -> Self {
        Self::new(self.column, self.row + 1)
    }
}

/// Rotation state of a piece.
///
/// Represents one of four rotation states:
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4, so in-engine arithmetic never
/// leaves this range; [`Self::from_index`] is the defensive entry point for
/// externally supplied values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub fn from_index(index: u8) -> Result<Self, InvalidRotationError> {
        if index < 4 {
            Ok(Self(index))
        } else {
            Err(InvalidRotationError)
        }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn rotated_cw(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_ccw(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the kind of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    /// All seven piece kinds in declaration order.
    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
        Self::T,
    ];

    /// Returns an iterator of occupied `(dx, dy)` offsets within the layout
    /// box for this kind in the given rotation.
    pub fn occupied_cells(self, rotation: PieceRotation) -> impl Iterator<Item = (usize, usize)> {
        PIECE_LAYOUTS[self as usize][self.effective_rotation(rotation)]
            .into_iter()
            .enumerate()
            .flat_map(|(dy, row)| {
                row.into_iter()
                    .enumerate()
                    .filter_map(move |(dx, cell)| cell.then_some((dx, dy)))
            })
    }

    /// Index into the precomputed rotation table.
    ///
    /// O keeps its spawn layout in every state. I alternates between the
    /// spawn layout and its transpose (the 270° table entry), so states 0/2
    /// and 1/3 share a footprint. Every other kind cycles through all four
    /// states.
    const fn effective_rotation(self, rotation: PieceRotation) -> usize {
        match self {
            PieceKind::O => 0,
            PieceKind::I => {
                if rotation.index() % 2 == 0 {
                    0
                } else {
                    3
                }
            }
            _ => rotation.as_usize(),
        }
    }

    /// Unrotated bounding box width of the occupied cells.
    const fn base_width(self) -> usize {
        match self {
            PieceKind::I => 4,
            PieceKind::O => 2,
            _ => 3,
        }
    }

    /// Unrotated bounding box height of the occupied cells.
    const fn base_height(self) -> usize {
        match self {
            PieceKind::I => 1,
            _ => 2,
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

impl TryFrom<char> for PieceKind {
    type Error = InvalidPieceKindError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or(InvalidPieceKindError)
    }
}

/// Piece layout represented as a 4×4 cell grid.
///
/// Side-3 kinds occupy the top-left 3×3 of the box; the padding row and
/// column stay `false` through every rotation.
type PieceCells = [[bool; 4]; 4];

/// Generates all 4 rotation states of a layout by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective side length of the layout (3 for most kinds, 4 for I
///   and O)
/// * `cells` - Layout at spawn orientation
const fn layout_rotations(size: usize, cells: PieceCells) -> [PieceCells; 4] {
    let mut rotations = [cells; 4];
    let mut i = 1;
    while i < 4 {
        let mut rotated = [[false; 4]; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                rotated[y][x] = rotations[i - 1][size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        rotations[i] = rotated;
        i += 1;
    }
    rotations
}

const PIECE_LAYOUTS: [[PieceCells; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];

    [
        // I-piece
        layout_rotations(4, [EEEE, [C, C, C, C], EEEE, EEEE]),
        // O-piece
        layout_rotations(4, [[E, C, C, E], [E, C, C, E], EEEE, EEEE]),
        // S-piece
        layout_rotations(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // Z-piece
        layout_rotations(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
        // J-piece
        layout_rotations(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // L-piece
        layout_rotations(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // T-piece
        layout_rotations(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
    ]
};
