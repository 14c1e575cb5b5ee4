//! Mid-game board generator.
//!
//! Produces a board that *looks* like a game in progress: some cells
//! uncovered with small neighbor counts, some hidden mines, a few flags.
//! No adjacency consistency is computed between cells, so the result is
//! not a solvable Minesweeper position. Spectators only ever see it
//! rendered, and a stable visual texture is all the simulation needs.
//!
//! Draw order per cell (row-major):
//!
//! 1. revealed iff roll > 0.6
//! 2. hidden cells only: mine iff roll > 0.9
//! 3. hidden cells only: flagged iff roll > 0.8
//! 4. revealed cells only: neighbor count uniform in `0..=3`

use sweeper_types::{Board, Cell};

use crate::entropy::Entropy;

/// A cell is revealed when its roll exceeds this.
const REVEAL_THRESHOLD: f64 = 0.6;

/// A hidden cell is a mine when its roll exceeds this.
const MINE_THRESHOLD: f64 = 0.9;

/// A hidden cell is flagged when its roll exceeds this.
const FLAG_THRESHOLD: f64 = 0.8;

/// Upper bound of the neighbor count shown on revealed cells.
const MAX_SHOWN_NEIGHBORS: u32 = 3;

/// Generate a `rows` x `cols` board from `entropy`.
pub fn generate(rows: usize, cols: usize, entropy: &mut dyn Entropy) -> Board {
    Board::from_fn(rows, cols, |_, _| generate_cell(entropy))
}

fn generate_cell(entropy: &mut dyn Entropy) -> Cell {
    let is_revealed = entropy.roll() > REVEAL_THRESHOLD;
    let is_mine = !is_revealed && entropy.roll() > MINE_THRESHOLD;
    let is_flagged = !is_revealed && entropy.roll() > FLAG_THRESHOLD;
    let neighbor_mines = if is_revealed {
        u8::try_from(entropy.pick(0, MAX_SHOWN_NEIGHBORS)).unwrap_or(0)
    } else {
        0
    };
    Cell {
        is_mine,
        is_revealed,
        is_flagged,
        neighbor_mines,
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::entropy::{FixedEntropy, SeededEntropy};

    #[test]
    fn board_has_requested_shape() {
        let board = generate(9, 9, &mut SeededEntropy::from_seed(1));
        assert_eq!(board.rows(), 9);
        assert_eq!(board.cols(), 9);
        assert_eq!(board.cells().count(), 81);

        let wide = generate(3, 16, &mut SeededEntropy::from_seed(1));
        assert_eq!(wide.rows(), 3);
        assert_eq!(wide.cols(), 16);
    }

    #[test]
    fn revealed_cells_are_never_mines_or_flags() {
        let mut entropy = SeededEntropy::from_seed(2024);
        for _ in 0..50 {
            let board = generate(9, 9, &mut entropy);
            for cell in board.cells() {
                if cell.is_revealed {
                    assert!(!cell.is_mine);
                    assert!(!cell.is_flagged);
                    assert!(cell.neighbor_mines <= 3);
                } else {
                    assert_eq!(cell.neighbor_mines, 0);
                }
            }
        }
    }

    #[test]
    fn low_rolls_hide_everything() {
        let board = generate(4, 4, &mut FixedEntropy::new(0.0));
        assert!(board.cells().all(|c| !c.is_revealed && !c.is_mine && !c.is_flagged));
    }

    #[test]
    fn high_rolls_reveal_everything() {
        let board = generate(4, 4, &mut FixedEntropy::new(0.95));
        assert!(board.cells().all(|c| c.is_revealed && c.neighbor_mines == 3));
    }

    /// Replays a fixed list of rolls in order.
    struct Scripted(std::vec::IntoIter<f64>);

    impl Entropy for Scripted {
        fn roll(&mut self) -> f64 {
            self.0.next().unwrap_or(0.0)
        }

        fn pick(&mut self, low: u32, _high: u32) -> u32 {
            low
        }
    }

    #[test]
    fn hidden_cells_draw_mine_then_flag() {
        // cell 0: hidden (0.1), mine (0.95), flagged (0.85)
        // cell 1: hidden (0.2), no mine (0.3), flagged (0.81)
        // cell 2: revealed (0.7), no further rolls
        // cell 3: hidden (0.0), no mine (0.0), not flagged (0.0)
        let rolls = vec![0.1, 0.95, 0.85, 0.2, 0.3, 0.81, 0.7, 0.0, 0.0, 0.0];
        let board = generate(2, 2, &mut Scripted(rolls.into_iter()));
        let cells: Vec<&Cell> = board.cells().collect();

        assert!(cells[0].is_mine && cells[0].is_flagged && !cells[0].is_revealed);
        assert!(!cells[1].is_mine && cells[1].is_flagged);
        assert!(cells[2].is_revealed && !cells[2].is_flagged);
        assert!(!cells[3].is_mine && !cells[3].is_flagged && !cells[3].is_revealed);
    }

    #[test]
    fn proportions_follow_thresholds() {
        let mut entropy = SeededEntropy::from_seed(7);
        let mut revealed = 0_u32;
        let mut total = 0_u32;
        for _ in 0..200 {
            for cell in generate(9, 9, &mut entropy).cells() {
                total += 1;
                if cell.is_revealed {
                    revealed += 1;
                }
            }
        }
        let share = f64::from(revealed) / f64::from(total);
        assert!((0.35..0.45).contains(&share), "revealed share {share}");
    }

    #[test]
    fn same_seed_same_board() {
        let a = generate(9, 9, &mut SeededEntropy::from_seed(11));
        let b = generate(9, 9, &mut SeededEntropy::from_seed(11));
        assert_eq!(a, b);
    }
}
