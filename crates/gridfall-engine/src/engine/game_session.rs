use rand::Rng as _;

use crate::{
    core::{
        board::Board,
        piece::{Piece, PieceKind},
    },
    engine::piece_bag::{BagSeed, PieceBag},
};

/// A running game: one board, one falling piece, one bag sequencer.
///
/// Commands are synchronous and total. A blocked horizontal move is a silent
/// no-op, and a blocked downward step locks the piece and spawns the next
/// one before the call returns, so the session always holds exactly one
/// falling piece. There is no terminal state; the host decides when to stop
/// issuing commands.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    falling_piece: Piece,
    piece_bag: PieceBag,
}

impl GameSession {
    /// Creates a session with the given playable board dimensions and a
    /// random bag seed.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_seed(width, height, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a reproducible piece
    /// sequence.
    ///
    /// # Example
    ///
    /// ```
    /// use gridfall_engine::{BagSeed, GameSession};
    /// use rand::Rng as _;
    ///
    /// let seed: BagSeed = rand::rng().random();
    /// let first = GameSession::with_seed(10, 20, seed);
    /// let second = GameSession::with_seed(10, 20, seed);
    /// assert_eq!(first.falling_piece().kind(), second.falling_piece().kind());
    /// ```
    #[must_use]
    pub fn with_seed(width: usize, height: usize, seed: BagSeed) -> Self {
        let board = Board::new(width, height);
        let mut piece_bag = PieceBag::with_seed(seed);
        let falling_piece = Piece::spawn(piece_bag.pop_next(), width);
        Self {
            board,
            falling_piece,
            piece_bag,
        }
    }

    /// Moves the falling piece one column left.
    ///
    /// A no-op when the piece is already at the leftmost playable column or
    /// the destination collides.
    pub fn move_left(&mut self) {
        let Some(candidate) = self.falling_piece.left() else {
            return;
        };
        self.commit_if_free(candidate);
    }

    /// Moves the falling piece one column right, keeping the move only when
    /// the destination is collision-free.
    pub fn move_right(&mut self) {
        self.commit_if_free(self.falling_piece.right());
    }

    /// Rotates the falling piece a quarter turn clockwise.
    ///
    /// Rotation is deliberately not collision-checked: rotating into the
    /// walls or the settled stack leaves the piece overlapping until the
    /// next blocked downward step locks it as-is.
    pub fn rotate_cw(&mut self) {
        self.falling_piece = self.falling_piece.rotated_cw();
    }

    /// Rotates the falling piece a quarter turn counterclockwise. Not
    /// collision-checked, like [`Self::rotate_cw`].
    pub fn rotate_ccw(&mut self) {
        self.falling_piece = self.falling_piece.rotated_ccw();
    }

    /// Moves the falling piece one row down; when the step is blocked the
    /// piece locks and the next piece spawns at top-center instead.
    pub fn soft_drop_step(&mut self) {
        self.step_down();
    }

    /// Drops the falling piece until it locks and the next piece has
    /// spawned. The floor guarantees a lock within `height` steps.
    pub fn hard_drop(&mut self) {
        while !self.step_down() {}
    }

    /// Returns a copy of the falling piece for rendering.
    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Interior occupancy grid, `height` rows by `width` columns, borders
    /// excluded. Rendering hosts consume this together with
    /// [`Self::falling_piece`].
    #[must_use]
    pub fn board_snapshot(&self) -> Vec<Vec<bool>> {
        self.board.playable_rows().map(<[bool]>::to_vec).collect()
    }

    fn commit_if_free(&mut self, candidate: Piece) {
        if !self.board.is_colliding(candidate) {
            self.falling_piece = candidate;
        }
    }

    /// Returns `true` when the step was blocked and the piece locked.
    fn step_down(&mut self) -> bool {
        let candidate = self.falling_piece.down();
        if self.board.is_colliding(candidate) {
            self.lock_and_spawn();
            return true;
        }
        self.falling_piece = candidate;
        false
    }

    fn lock_and_spawn(&mut self) {
        self.board.fill_piece(self.falling_piece);
        self.falling_piece = Piece::spawn(self.piece_bag.pop_next(), self.board.width());
    }
}
