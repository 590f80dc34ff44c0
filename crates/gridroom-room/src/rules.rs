//! Pure win and draw evaluation over the 3×3 board.

use gridroom_protocol::{Board, Mark};

/// The 8 winning triples: 3 rows, 3 columns, 2 diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the mark occupying all three cells of a completed line, if any.
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(m) if board[b] == Some(m) && board[c] == Some(m) => Some(m),
        _ => None,
    })
}

/// Returns `true` when every cell is occupied.
pub fn is_full(board: &Board) -> bool {
    board.iter().all(|cell| cell.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridroom_protocol::EMPTY_BOARD;

    #[test]
    fn test_empty_board_has_no_winner() {
        assert_eq!(winner(&EMPTY_BOARD), None);
    }

    #[test]
    fn test_partial_board_has_no_winner() {
        let mut board = EMPTY_BOARD;
        board[0] = Some(Mark::X);
        board[4] = Some(Mark::O);
        board[8] = Some(Mark::X);
        assert_eq!(winner(&board), None);
    }

    #[test]
    fn test_every_line_wins_for_both_marks() {
        for line in LINES {
            for mark in [Mark::X, Mark::O] {
                let mut board = EMPTY_BOARD;
                for cell in line {
                    board[cell] = Some(mark);
                }
                assert_eq!(winner(&board), Some(mark), "line {line:?}");
            }
        }
    }

    #[test]
    fn test_mixed_line_does_not_win() {
        let mut board = EMPTY_BOARD;
        board[0] = Some(Mark::X);
        board[1] = Some(Mark::O);
        board[2] = Some(Mark::X);
        assert_eq!(winner(&board), None);
    }

    #[test]
    fn test_full_board_without_line_is_a_draw() {
        // X O X
        // X O O
        // O X X
        let board: Board = [
            Some(Mark::X),
            Some(Mark::O),
            Some(Mark::X),
            Some(Mark::X),
            Some(Mark::O),
            Some(Mark::O),
            Some(Mark::O),
            Some(Mark::X),
            Some(Mark::X),
        ];
        assert_eq!(winner(&board), None);
        assert!(is_full(&board));
    }

    #[test]
    fn test_is_full_on_partial_board() {
        let mut board = EMPTY_BOARD;
        assert!(!is_full(&board));
        board[3] = Some(Mark::X);
        assert!(!is_full(&board));
    }
}
