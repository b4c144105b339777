//! ゲームの基本型定義モジュール
//! ファノロナで使用されるプレイヤー、座標、方向、盤面サイズ、着手の型を定義する。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// ゲームのプレイヤーを表すenum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    /// 相手プレイヤーを返す
    pub fn opposite(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// 盤面表示用の記号
    pub fn symbol(self) -> char {
        match self {
            Player::A => 'A',
            Player::B => 'B',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Player {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Player::A),
            "b" => Ok(Player::B),
            other => Err(format!("unknown player: {}", other)),
        }
    }
}

/// 盤面上の座標 (行, 列)。0始まり
/// 範囲チェックは盤面側（Board）が行う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// 指定方向へ1歩進んだ座標を返す
    /// 負の座標になる場合はNone
    pub fn offset(self, direction: Direction) -> Option<Position> {
        let row = self.row.checked_add_signed(direction.d_row)?;
        let col = self.col.checked_add_signed(direction.d_col)?;
        Some(Position { row, col })
    }

    /// selfからtargetへの相対ベクトル (target - self)
    pub fn direction_to(self, target: Position) -> Direction {
        Direction {
            d_row: target.row as isize - self.row as isize,
            d_col: target.col as isize - self.col as isize,
        }
    }

    /// 行と列の和が偶数のマスは斜め線の交点になる
    pub fn is_junction(self) -> bool {
        (self.row + self.col) % 2 == 0
    }

    /// 同じ行または同じ列に属するか
    pub fn shares_line_with(self, other: Position) -> bool {
        self.row == other.row || self.col == other.col
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// 移動方向ベクトル (行の差分, 列の差分)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub d_row: isize,
    pub d_col: isize,
}

impl Direction {
    pub const fn new(d_row: isize, d_col: isize) -> Self {
        Direction { d_row, d_col }
    }

    /// 逆向きのベクトル
    pub fn reverse(self) -> Direction {
        Direction {
            d_row: -self.d_row,
            d_col: -self.d_col,
        }
    }

    pub fn is_diagonal(self) -> bool {
        self.d_row != 0 && self.d_col != 0
    }
}

/// 検証済みの盤面寸法（幅・高さともに1以上）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    width: usize,
    height: usize,
}

impl Dimensions {
    /// 幅または高さが0の場合はInvalidBoardSizeを返す
    pub fn new(width: usize, height: usize) -> Result<Self, GameError> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidBoardSize {
                reason: format!("dimensions must be positive, got {}x{}", width, height),
            });
        }
        Ok(Dimensions { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.height && position.col < self.width
    }
}

/// UIに公開する盤面サイズのプリセット
/// 名称と寸法は外部との互換性のため固定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoardSize {
    /// 3x3 (Fanoron-Telo)
    Small,
    /// 5x5 (Fanoron-Dimy)
    Medium,
    /// 9x5 (Fanoron-Sivy)
    #[default]
    Large,
}

impl BoardSize {
    pub const ALL: [BoardSize; 3] = [BoardSize::Small, BoardSize::Medium, BoardSize::Large];

    /// (幅, 高さ)
    pub fn dimensions(self) -> Dimensions {
        let (width, height) = match self {
            BoardSize::Small => (3, 3),
            BoardSize::Medium => (5, 5),
            BoardSize::Large => (9, 5),
        };
        Dimensions { width, height }
    }

    /// マダガスカルでの伝統的な呼び名
    pub fn traditional_name(self) -> &'static str {
        match self {
            BoardSize::Small => "Fanoron-Telo",
            BoardSize::Medium => "Fanoron-Dimy",
            BoardSize::Large => "Fanoron-Sivy",
        }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims = self.dimensions();
        write!(f, "{:?}({}x{})", self, dims.width, dims.height)
    }
}

impl FromStr for BoardSize {
    type Err = GameError;

    /// プリセット名と伝統名のどちらも受け付ける（大文字小文字は区別しない）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        BoardSize::ALL
            .into_iter()
            .find(|size| {
                format!("{:?}", size).to_ascii_lowercase() == name
                    || size.traditional_name().to_ascii_lowercase() == name
            })
            .ok_or_else(|| GameError::InvalidBoardSize {
                reason: format!("unknown preset: {}", s),
            })
    }
}

/// 着手の分類
/// 取りがある場合は最初に取られる石の座標（連鎖の先頭）を保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// 取りのない通常移動
    Paika,
    /// 接近取り：移動先のさらに先にある相手の石を取る
    Approach { head: Position },
    /// 離脱取り：移動元の背後にある相手の石を取る
    Withdrawal { head: Position },
}

/// 1手の提案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub direction: Direction,
    pub kind: MoveKind,
}

impl Move {
    /// 方向ベクトルは from → to から自動計算される
    pub fn new(from: Position, to: Position, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            direction: from.direction_to(to),
            kind,
        }
    }

    /// UIが座標だけで着手を指定するための分類なしの手
    /// 実際の分類は合法手生成の結果が優先される
    pub fn between(from: Position, to: Position) -> Self {
        Self::new(from, to, MoveKind::Paika)
    }

    pub fn is_capture(&self) -> bool {
        !matches!(self.kind, MoveKind::Paika)
    }

    pub fn capture_head(&self) -> Option<Position> {
        match self.kind {
            MoveKind::Paika => None,
            MoveKind::Approach { head } | MoveKind::Withdrawal { head } => Some(head),
        }
    }

    /// 連鎖を辿る方向。接近取りは移動方向、離脱取りは逆方向
    pub fn chain_direction(&self) -> Option<Direction> {
        match self.kind {
            MoveKind::Paika => None,
            MoveKind::Approach { .. } => Some(self.direction),
            MoveKind::Withdrawal { .. } => Some(self.direction.reverse()),
        }
    }
}
