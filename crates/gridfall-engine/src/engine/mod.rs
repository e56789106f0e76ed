//! Session logic orchestrating the core data structures.
//!
//! - [`GameSession`] - A running game: board, falling piece, bag sequencer,
//!   and the command interface the host drives
//! - [`PieceBag`] - 7-bag piece sequencing
//! - [`BagSeed`] - Seed for deterministic bag shuffling
//!
//! # Command Flow
//!
//! The host owns the clock and the input mapping; the session only reacts to
//! synchronous commands:
//!
//! 1. Create a [`GameSession`] with the playable board dimensions
//! 2. Map input to `move_left`/`move_right`/`rotate_cw`/`rotate_ccw`
//! 3. Call [`GameSession::soft_drop_step`] on every gravity tick
//! 4. When a downward step is blocked the piece locks and the next piece
//!    spawns before the call returns
//! 5. Render from [`GameSession::falling_piece`] and
//!    [`GameSession::board_snapshot`]
//!
//! # Example
//!
//! ```
//! use gridfall_engine::GameSession;
//!
//! let mut session = GameSession::new(10, 20);
//!
//! session.move_left();
//! session.rotate_cw();
//! session.soft_drop_step();
//!
//! let piece = session.falling_piece();
//! let grid = session.board_snapshot();
//! assert_eq!(grid.len(), 20);
//! assert_eq!(grid[0].len(), 10);
//! # let _ = piece;
//! ```

pub use self::{game_session::*, piece_bag::*};

mod game_session;
mod piece_bag;
