//! ゲーム状態管理モジュール
//! 盤面サイズ、盤面、手番、ターン内情報、得点をまとめた不変スナップショットを定義する。

use super::board::Board;
use super::rules::FanoronaRules;
use super::types::{BoardSize, Move, Player, Position};
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};

/// 現在手番のプレイヤーのターン内情報
/// 連続取りの間は同じプレイヤーのまま訪問済みマスが蓄積される
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Turn {
    /// 取りのある合法手が1つ以上あるか
    pub has_capture: bool,
    /// 現在の合法手
    pub moves: Vec<Move>,
    /// このターン中に移動元・移動先として使われたマス
    pub visited: Vec<Position>,
}

impl Turn {
    /// 座標の組で合法手を探す
    pub fn find(&self, from: Position, to: Position) -> Option<&Move> {
        self.moves.iter().find(|m| m.from == from && m.to == to)
    }

    /// 訪問済みマスと同じ行・列にあるマスは移動先にできない
    pub fn is_restricted(&self, position: Position) -> bool {
        self.visited.iter().any(|v| v.shares_line_with(position))
    }

    /// 取りのある合法手だけを返す
    pub fn capture_moves(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter().filter(|m| m.is_capture())
    }
}

/// プレイヤーごとの取った石の数
/// ゲーム中は減少しない。リセット時のみ0に戻る
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub a: u32,
    pub b: u32,
}

impl Score {
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::A => self.a,
            Player::B => self.b,
        }
    }

    /// 取った数を加算した新しいスコアを返す
    pub fn with_captures(self, player: Player, captured: u32) -> Self {
        let mut next = self;
        match player {
            Player::A => next.a += captured,
            Player::B => next.b += captured,
        }
        next
    }
}

/// 外部から観測されるゲーム全体のスナップショット
/// 変更のたびに新しい値が作られ、公開済みの値は変更されない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board_size: BoardSize,
    pub board: Board,
    pub current_player: Player,
    pub turn: Turn,
    pub score: Score,
}

impl GameState {
    /// 指定サイズの初期配置で新しいゲームを始める
    pub fn new(board_size: BoardSize, starting_player: Player) -> Self {
        let board = Board::for_size(board_size);
        let turn = FanoronaRules::start_turn(&board, starting_player, Vec::new());
        Self {
            board_size,
            board,
            current_player: starting_player,
            turn,
            score: Score::default(),
        }
    }

    /// 任意の局面からゲーム状態を作る
    /// 盤面の寸法がプリセットと一致しない場合はInvalidBoardSize
    pub fn from_position(board_size: BoardSize, board: Board, current_player: Player) -> Result<Self> {
        if board.dimensions() != board_size.dimensions() {
            return Err(GameError::InvalidBoardSize {
                reason: format!("board is {}x{}, preset is {}", board.width(), board.height(), board_size),
            });
        }

        let turn = FanoronaRules::start_turn(&board, current_player, Vec::new());
        Ok(Self {
            board_size,
            board,
            current_player,
            turn,
            score: Score::default(),
        })
    }

    /// 手番のプレイヤーに合法手がない
    /// 勝敗の宣言は呼び出し側の責務
    pub fn is_blocked(&self) -> bool {
        self.turn.moves.is_empty()
    }

    /// 盤上に残っている石の数: (A, B)
    pub fn chip_counts(&self) -> (usize, usize) {
        self.board.count_pieces()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(BoardSize::default(), Player::A)
    }
}
