//! ファノロナのルールとターン進行の実装モジュール
//! 合法手の生成と分類（接近取り・離脱取り）、取り連鎖の解決、連続取りの継続判定を担当する。

use super::board::Board;
use super::state::{GameState, Turn};
use super::types::{Direction, Move, MoveKind, Player, Position};
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// 合法手生成の結果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveSet {
    pub moves: Vec<Move>,
    /// 取りのある手が1つでも含まれるか
    pub has_capture: bool,
}

/// 確定した1手の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// 実際に適用された手（分類は合法手生成の結果）
    pub applied: Move,
    /// 取られた石の座標（連鎖順）
    pub captured: Vec<Position>,
    /// 同じプレイヤーが連続取りを続けるか
    pub continues: bool,
    /// 次に手番を持つプレイヤー
    pub next_player: Player,
}

/// ファノロナのルールを実装する構造体
/// スタティックメソッドのみを提供する
pub struct FanoronaRules;

impl FanoronaRules {
    /// 指定プレイヤーの合法手を全て列挙し、取りの有無を判定する
    ///
    /// 訪問済みマスと同じ行・列にある空きマスは移動先から除外する。
    /// 取りがある場合でも通常移動（パイカ）は合法手に残る。
    pub fn generate_moves(board: &Board, player: Player, visited: &[Position]) -> MoveSet {
        let mut moves = Vec::new();

        let destinations = board
            .cells()
            .filter(|cell| cell.is_empty())
            .filter(|cell| !visited.iter().any(|v| v.shares_line_with(cell.position)));

        for destination in destinations {
            for &origin in destination.neighbors() {
                if board.occupant(origin) != Some(player) {
                    continue;
                }
                let kind = Self::classify(board, origin, destination.position, player);
                moves.push(Move::new(origin, destination.position, kind));
            }
        }

        let has_capture = moves.iter().any(Move::is_capture);
        MoveSet { moves, has_capture }
    }

    /// 1手を分類する。接近取りを先に判定するため、両方成立する場合は接近取りになる
    fn classify(board: &Board, from: Position, to: Position, player: Player) -> MoveKind {
        let direction = from.direction_to(to);
        let opponent = player.opposite();

        let first_opponent = |at: Position, offset: Direction| {
            board.get_cell(at).and_then(|cell| {
                cell.neighbors_at(offset)
                    .find(|&n| board.occupant(n) == Some(opponent))
            })
        };

        if let Some(head) = first_opponent(to, direction) {
            MoveKind::Approach { head }
        } else if let Some(head) = first_opponent(from, direction.reverse()) {
            MoveKind::Withdrawal { head }
        } else {
            MoveKind::Paika
        }
    }

    /// 連鎖の先頭から指定方向に相手の石が続く限り辿り、取られる石を順に返す
    ///
    /// その方向の隣接マスがちょうど1つで、かつ相手の石がある場合だけ連鎖が続く。
    /// 空き・自分の石・盤外・該当が複数の場合は終端とする。
    pub fn resolve_chain(board: &Board, start: Position, direction: Direction, player: Player) -> Vec<Position> {
        let opponent = player.opposite();
        let mut chain = Vec::new();

        if board.occupant(start) != Some(opponent) {
            return chain;
        }
        chain.push(start);

        let mut current = start;
        while let Some(cell) = board.get_cell(current) {
            let mut candidates = cell.neighbors_at(direction);
            let next = match (candidates.next(), candidates.next()) {
                (Some(next), None) => next,
                _ => break,
            };
            if board.occupant(next) != Some(opponent) {
                break;
            }
            chain.push(next);
            current = next;
        }

        chain
    }

    /// 合法手を生成してターン情報を組み立てる
    pub fn start_turn(board: &Board, player: Player, visited: Vec<Position>) -> Turn {
        let MoveSet { moves, has_capture } = Self::generate_moves(board, player, &visited);
        Turn {
            has_capture,
            moves,
            visited,
        }
    }

    /// 要求された手を検証し、合法手リスト中の対応する手を返す
    /// 分類は呼び出し側の指定ではなく生成結果を採用する
    pub fn validate_move(state: &GameState, requested: &Move) -> Result<Move> {
        let board = &state.board;
        let player = state.current_player;
        let (from, to) = (requested.from, requested.to);

        if !board.contains(from) || !board.contains(to) {
            return Err(GameError::illegal(format!("move {} -> {} leaves the board", from, to)));
        }

        if board.occupant(from) != Some(player) {
            return Err(GameError::illegal(format!("{} does not hold a chip of player {}", from, player)));
        }

        if !board.is_empty(to) {
            return Err(GameError::illegal(format!("destination {} is occupied", to)));
        }

        if state.turn.is_restricted(to) {
            return Err(GameError::illegal(format!(
                "destination {} reuses a row or column visited this turn",
                to
            )));
        }

        state
            .turn
            .find(from, to)
            .copied()
            .ok_or_else(|| GameError::illegal(format!("{} -> {} is not a legal move", from, to)))
    }

    /// 手を適用して新しいゲーム状態を返す。元の状態は変更しない
    ///
    /// 取りのある手で、かつ訪問済みマスを加えた条件で再び取りが可能なら同じプレイヤーが続行する。
    /// それ以外は相手に手番を渡し、訪問済みマスを空にして合法手を生成し直す。
    #[instrument(level = "debug", skip(state), fields(player = %state.current_player))]
    pub fn apply_move(state: &GameState, requested: &Move) -> Result<(GameState, MoveOutcome)> {
        let applied = Self::validate_move(state, requested)?;
        let player = state.current_player;

        let mut board = state.board.clone();
        board.set_occupant(applied.to, Some(player))?;
        board.set_occupant(applied.from, None)?;

        let captured = match (applied.capture_head(), applied.chain_direction()) {
            (Some(head), Some(direction)) => Self::resolve_chain(&board, head, direction, player),
            _ => Vec::new(),
        };
        for &position in &captured {
            board.set_occupant(position, None)?;
        }

        let score = state.score.with_captures(player, captured.len() as u32);

        let continuation = if applied.is_capture() {
            let mut visited = state.turn.visited.clone();
            for position in [applied.from, applied.to] {
                if !visited.contains(&position) {
                    visited.push(position);
                }
            }
            Some(Self::start_turn(&board, player, visited)).filter(|turn| turn.has_capture)
        } else {
            None
        };

        let continues = continuation.is_some();
        let (next_player, turn) = match continuation {
            Some(turn) => (player, turn),
            None => {
                let opponent = player.opposite();
                (opponent, Self::start_turn(&board, opponent, Vec::new()))
            }
        };

        debug!(
            captured = captured.len(),
            continues,
            next_player = %next_player,
            "move committed"
        );

        let next_state = GameState {
            board_size: state.board_size,
            board,
            current_player: next_player,
            turn,
            score,
        };
        let outcome = MoveOutcome {
            applied,
            captured,
            continues,
            next_player,
        };

        Ok((next_state, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::BoardSize;

    fn large(rows: &[&str]) -> Board {
        let board = Board::from_rows(rows).unwrap();
        assert_eq!(board.dimensions(), BoardSize::Large.dimensions());
        board
    }

    #[test]
    fn test_opening_moves_for_a() {
        let board = Board::for_size(BoardSize::Large);
        let set = FanoronaRules::generate_moves(&board, Player::A, &[]);

        // 中央の穴に隣接するAの石は5個
        assert_eq!(set.moves.len(), 5);
        assert!(set.moves.iter().all(|m| m.to == Position::new(2, 4)));
        // 初期配置では穴に入る手は全て接近取りか離脱取りになる
        // 例: (3,4)->(2,4) は (1,4) のBに接近する
        assert!(set.has_capture);
        assert!(set.moves.iter().all(Move::is_capture));

        let vertical = set
            .moves
            .iter()
            .find(|m| m.from == Position::new(3, 4))
            .unwrap();
        assert_eq!(vertical.kind, MoveKind::Approach { head: Position::new(1, 4) });

        let sideways = set
            .moves
            .iter()
            .find(|m| m.from == Position::new(2, 3))
            .unwrap();
        assert_eq!(sideways.kind, MoveKind::Withdrawal { head: Position::new(2, 2) });
    }

    #[test]
    fn test_opening_moves_for_b() {
        let board = Board::for_size(BoardSize::Large);
        let set = FanoronaRules::generate_moves(&board, Player::B, &[]);
        assert_eq!(set.moves.len(), 3);
    }

    #[test]
    fn test_full_board_has_no_moves() {
        let board = Board::from_rows(&["AB", "BA"]).unwrap();
        let set = FanoronaRules::generate_moves(&board, Player::A, &[]);
        assert!(set.moves.is_empty());
        assert!(!set.has_capture);
    }

    #[test]
    fn test_paika_only_position() {
        let board = large(&[
            ".........",
            ".........",
            "....A....",
            ".........",
            "........B",
        ]);
        let set = FanoronaRules::generate_moves(&board, Player::A, &[]);
        assert_eq!(set.moves.len(), 8);
        assert!(!set.has_capture);
        assert!(set.moves.iter().all(|m| m.kind == MoveKind::Paika));
    }

    #[test]
    fn test_approach_takes_precedence_over_withdrawal() {
        let board = large(&[
            ".........",
            ".........",
            "BA.B.....",
            ".........",
            ".........",
        ]);
        let set = FanoronaRules::generate_moves(&board, Player::A, &[]);
        let mv = set
            .moves
            .iter()
            .find(|m| m.from == Position::new(2, 1) && m.to == Position::new(2, 2))
            .unwrap();
        assert_eq!(mv.kind, MoveKind::Approach { head: Position::new(2, 3) });
    }

    #[test]
    fn test_withdrawal_classification() {
        let board = large(&[
            ".........",
            ".........",
            "BBA......",
            ".........",
            ".........",
        ]);
        let set = FanoronaRules::generate_moves(&board, Player::A, &[]);
        let mv = set
            .moves
            .iter()
            .find(|m| m.to == Position::new(2, 3))
            .unwrap();
        assert_eq!(mv.kind, MoveKind::Withdrawal { head: Position::new(2, 1) });
        assert_eq!(mv.direction, Direction::new(0, 1));
    }

    #[test]
    fn test_diagonal_move_only_between_junctions() {
        let board = large(&[
            ".........",
            ".........",
            "...A.....",
            ".........",
            ".........",
        ]);
        // (2,3) は奇数交点なので斜めには動けない
        let set = FanoronaRules::generate_moves(&board, Player::A, &[]);
        assert_eq!(set.moves.len(), 4);
        assert!(set.moves.iter().all(|m| !m.direction.is_diagonal()));
    }

    #[test]
    fn test_visited_restriction_excludes_rows_and_columns() {
        let board = large(&[
            ".........",
            ".........",
            "..A......",
            ".........",
            ".........",
        ]);
        let visited = [Position::new(2, 1), Position::new(2, 2)];
        let set = FanoronaRules::generate_moves(&board, Player::A, &visited);

        let destinations: Vec<Position> = set.moves.iter().map(|m| m.to).collect();
        assert_eq!(destinations, vec![Position::new(1, 3), Position::new(3, 3)]);
    }

    #[test]
    fn test_resolve_chain_stops_at_gap_and_edge() {
        let board = large(&[
            ".........",
            ".........",
            "A.BB.B...",
            ".........",
            ".........",
        ]);
        let chain = FanoronaRules::resolve_chain(&board, Position::new(2, 2), Direction::new(0, 1), Player::A);
        assert_eq!(chain, vec![Position::new(2, 2), Position::new(2, 3)]);

        let board = large(&[
            ".........",
            ".........",
            "A.....BBB",
            ".........",
            ".........",
        ]);
        let chain = FanoronaRules::resolve_chain(&board, Position::new(2, 6), Direction::new(0, 1), Player::A);
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_resolve_chain_stops_at_own_chip() {
        let board = large(&[
            ".........",
            ".........",
            "..BAB....",
            ".........",
            ".........",
        ]);
        let chain = FanoronaRules::resolve_chain(&board, Position::new(2, 2), Direction::new(0, 1), Player::A);
        assert_eq!(chain, vec![Position::new(2, 2)]);
    }

    #[test]
    fn test_resolve_chain_diagonal_stops_at_non_junction() {
        let board = large(&[
            "B........",
            ".B.......",
            "..B......",
            "...B.....",
            "....B....",
        ]);
        // 偶数交点のみが斜めに繋がるので対角線上は最後まで辿れる
        let chain = FanoronaRules::resolve_chain(&board, Position::new(0, 0), Direction::new(1, 1), Player::A);
        assert_eq!(chain.len(), 5);

        // 奇数交点から始めた斜めの連鎖は先頭だけ
        let board = large(&[
            ".B.......",
            "..B......",
            ".........",
            ".........",
            ".........",
        ]);
        let chain = FanoronaRules::resolve_chain(&board, Position::new(0, 1), Direction::new(1, 1), Player::A);
        assert_eq!(chain, vec![Position::new(0, 1)]);
    }

    #[test]
    fn test_resolve_chain_requires_opponent_at_start() {
        let board = Board::for_size(BoardSize::Large);
        let chain = FanoronaRules::resolve_chain(&board, Position::new(2, 4), Direction::new(-1, 0), Player::A);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_apply_move_leaves_original_state_untouched() {
        let state = GameState::new(BoardSize::Large, Player::A);
        let before = state.clone();
        let requested = Move::between(Position::new(3, 4), Position::new(2, 4));

        let (next, outcome) = FanoronaRules::apply_move(&state, &requested).unwrap();

        assert_eq!(state, before);
        assert_eq!(outcome.captured, vec![Position::new(1, 4), Position::new(0, 4)]);
        assert_eq!(next.score.a, 2);
        assert_eq!(next.board.occupant(Position::new(2, 4)), Some(Player::A));
        assert_eq!(next.board.occupant(Position::new(3, 4)), None);
    }

    #[test]
    fn test_validate_move_errors() {
        let state = GameState::new(BoardSize::Large, Player::A);

        let cases = [
            Move::between(Position::new(3, 4), Position::new(9, 9)),
            Move::between(Position::new(1, 4), Position::new(2, 4)),
            Move::between(Position::new(4, 4), Position::new(3, 4)),
            Move::between(Position::new(4, 4), Position::new(2, 4)),
        ];
        for requested in cases {
            assert!(matches!(
                FanoronaRules::validate_move(&state, &requested),
                Err(GameError::IllegalMove { .. })
            ));
        }
    }

    #[test]
    fn test_validate_move_uses_generated_classification() {
        let state = GameState::new(BoardSize::Large, Player::A);
        let requested = Move::between(Position::new(2, 3), Position::new(2, 4));
        let validated = FanoronaRules::validate_move(&state, &requested).unwrap();
        assert_eq!(validated.kind, MoveKind::Withdrawal { head: Position::new(2, 2) });
    }
}
