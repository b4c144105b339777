//! エンジン全体のエラー定義モジュール
//! 盤面サイズ、着手の合法性、セッション管理のエラーを統一管理。

use thiserror::Error;
use uuid::Uuid;

/// ゲームロジックに関連するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// 盤面サイズが不正（0以下の寸法、または未知のプリセット名）
    #[error("Invalid board size: {reason}")]
    InvalidBoardSize { reason: String },

    /// 着手がルール上許可されない
    #[error("Illegal move: {reason}")]
    IllegalMove { reason: String },

    /// 盤面外の座標参照。正しく構築された盤面では発生しない内部不整合
    #[error("Position ({row}, {col}) is out of bounds")]
    OutOfBoundsPosition { row: usize, col: usize },

    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: Uuid },

    #[error("Session limit exceeded (max {max})")]
    SessionLimitExceeded { max: usize },
}

impl GameError {
    /// IllegalMoveを簡潔に生成するヘルパー
    pub(crate) fn illegal(reason: impl Into<String>) -> Self {
        GameError::IllegalMove { reason: reason.into() }
    }

    /// 呼び出し側で回復可能なエラーかどうか
    /// OutOfBoundsPositionはプログラム上の欠陥として扱う
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, GameError::OutOfBoundsPosition { .. })
    }
}

/// ゲームエラーをベースとした結果型
pub type Result<T> = std::result::Result<T, GameError>;
