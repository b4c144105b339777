//! ファノロナの盤面と隣接構造を管理するモジュール
//! 任意サイズのグリッドを構築し、各交点の接続（縦横＋交互の斜め）と石の配置を担当する。

use super::types::{BoardSize, Dimensions, Direction, Player, Position};
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};

/// 縦横4方向
const ORTHOGONAL: [Direction; 4] = [
    Direction::new(-1, 0),
    Direction::new(0, -1),
    Direction::new(0, 1),
    Direction::new(1, 0),
];

/// 斜め4方向。行+列が偶数の交点のみが持つ
const DIAGONAL: [Direction; 4] = [
    Direction::new(-1, -1),
    Direction::new(-1, 1),
    Direction::new(1, -1),
    Direction::new(1, 1),
];

/// 盤面上の1交点
/// 隣接リストは同じ盤面内の座標で保持し、他のセルを所有しない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Position,
    pub occupant: Option<Player>,
    neighbors: Vec<Position>,
}

impl Cell {
    pub fn neighbors(&self) -> &[Position] {
        &self.neighbors
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// このセルから見て指定オフセットにある隣接座標を全て返す
    /// 正しい盤面では高々1個だが、呼び出し側は複数件も考慮する
    pub fn neighbors_at(&self, direction: Direction) -> impl Iterator<Item = Position> + '_ {
        let position = self.position;
        self.neighbors
            .iter()
            .copied()
            .filter(move |&n| position.direction_to(n) == direction)
    }
}

/// 可変サイズのファノロナ盤面
/// セルは行優先のフラットなVecで保持する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    dimensions: Dimensions,
    cells: Vec<Cell>,
}

impl Board {
    /// 石のない盤面を作成し、全交点の隣接関係を計算する
    /// 縦横は常に接続、斜めは行+列が偶数の交点のみ接続（市松模様）
    pub fn new(dimensions: Dimensions) -> Self {
        let mut cells = Vec::with_capacity(dimensions.cell_count());

        for row in 0..dimensions.height() {
            for col in 0..dimensions.width() {
                let position = Position::new(row, col);
                let diagonals: &[Direction] = if position.is_junction() { &DIAGONAL } else { &[] };

                let neighbors = ORTHOGONAL
                    .iter()
                    .chain(diagonals)
                    .filter_map(|&dir| position.offset(dir))
                    .filter(|&n| dimensions.contains(n))
                    .collect();

                cells.push(Cell {
                    position,
                    occupant: None,
                    neighbors,
                });
            }
        }

        Board { dimensions, cells }
    }

    /// 寸法を検証してから空の盤面を作る
    pub fn with_size(width: usize, height: usize) -> Result<Self> {
        Ok(Self::new(Dimensions::new(width, height)?))
    }

    /// 初期配置の盤面を作成する
    /// 中央行より上はB、下はA。中央行は列の偶奇で交互に並べ、中央の交点だけ空ける
    pub fn initial(dimensions: Dimensions) -> Self {
        let mut board = Self::new(dimensions);
        let center_row = dimensions.height() / 2;
        let center_col = dimensions.width() / 2;

        for cell in &mut board.cells {
            let Position { row, col } = cell.position;
            cell.occupant = if row < center_row {
                Some(Player::B)
            } else if row > center_row {
                Some(Player::A)
            } else if col == center_col {
                None
            } else if col % 2 == 0 {
                Some(Player::B)
            } else {
                Some(Player::A)
            };
        }

        board
    }

    /// プリセットサイズの初期盤面
    pub fn for_size(size: BoardSize) -> Self {
        Self::initial(size.dimensions())
    }

    /// 文字列の行から盤面を組み立てる
    /// 'A' / 'B' が石、'.' が空。空白は無視する
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let parsed: Vec<Vec<char>> = rows
            .iter()
            .map(|row| row.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();

        let height = parsed.len();
        let width = parsed.first().map_or(0, Vec::len);
        if let Some(ragged) = parsed.iter().position(|row| row.len() != width) {
            return Err(GameError::InvalidBoardSize {
                reason: format!("row {} has {} cells, expected {}", ragged, parsed[ragged].len(), width),
            });
        }

        let mut board = Self::with_size(width, height)?;
        for (row, symbols) in parsed.iter().enumerate() {
            for (col, &symbol) in symbols.iter().enumerate() {
                let occupant = match symbol {
                    'A' | 'a' => Some(Player::A),
                    'B' | 'b' => Some(Player::B),
                    '.' => None,
                    other => {
                        return Err(GameError::InvalidBoardSize {
                            reason: format!("unknown symbol '{}' at ({}, {})", other, row, col),
                        })
                    }
                };
                board.set_occupant(Position::new(row, col), occupant)?;
            }
        }

        Ok(board)
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> usize {
        self.dimensions.width()
    }

    pub fn height(&self) -> usize {
        self.dimensions.height()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.dimensions.contains(position)
    }

    fn index_of(&self, position: Position) -> Result<usize> {
        if self.contains(position) {
            Ok(position.row * self.width() + position.col)
        } else {
            Err(GameError::OutOfBoundsPosition {
                row: position.row,
                col: position.col,
            })
        }
    }

    /// 指定した位置のセルを取得する
    /// 範囲外はOutOfBoundsPosition
    pub fn cell(&self, position: Position) -> Result<&Cell> {
        let index = self.index_of(position)?;
        Ok(&self.cells[index])
    }

    /// 範囲外の場合はNoneを返す版
    pub fn get_cell(&self, position: Position) -> Option<&Cell> {
        self.cell(position).ok()
    }

    /// 指定位置の占有者。範囲外も空として扱う
    pub fn occupant(&self, position: Position) -> Option<Player> {
        self.get_cell(position).and_then(|cell| cell.occupant)
    }

    /// 指定した位置が盤面内かつ空かチェックする
    pub fn is_empty(&self, position: Position) -> bool {
        self.get_cell(position).is_some_and(Cell::is_empty)
    }

    pub fn set_occupant(&mut self, position: Position, occupant: Option<Player>) -> Result<()> {
        let index = self.index_of(position)?;
        self.cells[index].occupant = occupant;
        Ok(())
    }

    pub fn neighbors(&self, position: Position) -> Result<&[Position]> {
        Ok(self.cell(position)?.neighbors())
    }

    /// 行優先順の全セル
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// 行優先順の空きマス
    pub fn empty_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().filter(|c| c.is_empty()).map(|c| c.position)
    }

    /// 指定プレイヤーの石の数
    pub fn count_chips(&self, player: Player) -> usize {
        self.cells.iter().filter(|c| c.occupant == Some(player)).count()
    }

    /// 戻り値: (Aの石数, Bの石数)
    pub fn count_pieces(&self) -> (usize, usize) {
        (self.count_chips(Player::A), self.count_chips(Player::B))
    }

    /// 隣接関係が対称で、全て盤面内を指しているか検証する
    pub fn is_adjacency_symmetric(&self) -> bool {
        self.cells.iter().all(|cell| {
            cell.neighbors.iter().all(|&n| {
                self.get_cell(n)
                    .is_some_and(|other| other.neighbors.contains(&cell.position))
            })
        })
    }

    /// デバッグ用の盤面表示文字列を生成する
    pub fn display(&self) -> String {
        let mut result = String::from("  ");
        for col in 0..self.width() {
            result.push_str(&format!("{} ", col));
        }
        result.push('\n');

        for row in 0..self.height() {
            result.push_str(&format!("{} ", row));
            for col in 0..self.width() {
                let symbol = self.occupant(Position::new(row, col)).map_or('.', Player::symbol);
                result.push_str(&format!("{} ", symbol));
            }
            result.push('\n');
        }

        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::for_size(BoardSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency_symmetric_for_presets() {
        for size in BoardSize::ALL {
            let board = Board::for_size(size);
            assert!(board.is_adjacency_symmetric(), "{} not symmetric", size);
        }
    }

    #[test]
    fn test_neighbor_counts_follow_parity() {
        let board = Board::new(BoardSize::Large.dimensions());

        // 中央の偶数交点は8方向、奇数交点は4方向
        assert_eq!(board.neighbors(Position::new(2, 4)).unwrap().len(), 8);
        assert_eq!(board.neighbors(Position::new(2, 3)).unwrap().len(), 4);
        // 角
        assert_eq!(board.neighbors(Position::new(0, 0)).unwrap().len(), 3);
        assert_eq!(board.neighbors(Position::new(0, 1)).unwrap().len(), 3);
        assert_eq!(board.neighbors(Position::new(4, 8)).unwrap().len(), 3);
    }

    #[test]
    fn test_odd_junction_has_no_diagonals() {
        let board = Board::new(BoardSize::Medium.dimensions());
        let neighbors = board.neighbors(Position::new(1, 2)).unwrap();
        assert!(neighbors
            .iter()
            .all(|&n| !Position::new(1, 2).direction_to(n).is_diagonal()));
    }

    #[test]
    fn test_with_size_rejects_zero() {
        assert!(matches!(
            Board::with_size(0, 3),
            Err(GameError::InvalidBoardSize { .. })
        ));
        assert!(Board::with_size(1, 1).is_ok());
    }

    #[test]
    fn test_initial_large_layout() {
        let board = Board::for_size(BoardSize::Large);

        let empties: Vec<Position> = board.empty_positions().collect();
        assert_eq!(empties, vec![Position::new(2, 4)]);

        for col in 0..9 {
            assert_eq!(board.occupant(Position::new(0, col)), Some(Player::B));
            assert_eq!(board.occupant(Position::new(1, col)), Some(Player::B));
            assert_eq!(board.occupant(Position::new(3, col)), Some(Player::A));
            assert_eq!(board.occupant(Position::new(4, col)), Some(Player::A));
        }

        assert_eq!(board.occupant(Position::new(2, 0)), Some(Player::B));
        assert_eq!(board.occupant(Position::new(2, 1)), Some(Player::A));
        assert_eq!(board.occupant(Position::new(2, 3)), Some(Player::A));
        assert_eq!(board.occupant(Position::new(2, 5)), Some(Player::A));
        assert_eq!(board.occupant(Position::new(2, 8)), Some(Player::B));

        assert_eq!(board.count_pieces(), (22, 22));
    }

    #[test]
    fn test_initial_is_deterministic() {
        assert_eq!(Board::for_size(BoardSize::Medium), Board::for_size(BoardSize::Medium));
    }

    #[test]
    fn test_initial_small_has_single_hole() {
        let board = Board::for_size(BoardSize::Small);
        assert_eq!(board.empty_positions().collect::<Vec<_>>(), vec![Position::new(1, 1)]);
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let board = Board::for_size(BoardSize::Small);
        assert_eq!(
            board.cell(Position::new(3, 0)),
            Err(GameError::OutOfBoundsPosition { row: 3, col: 0 })
        );
        assert_eq!(board.occupant(Position::new(0, 9)), None);
        assert!(!board.is_empty(Position::new(9, 9)));
    }

    #[test]
    fn test_from_rows() {
        let board = Board::from_rows(&["A . B", ". . .", "B B A"]).unwrap();
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 3);
        assert_eq!(board.occupant(Position::new(0, 0)), Some(Player::A));
        assert_eq!(board.occupant(Position::new(0, 2)), Some(Player::B));
        assert_eq!(board.count_pieces(), (2, 3));
        assert!(board.is_adjacency_symmetric());
    }

    #[test]
    fn test_from_rows_rejects_ragged_and_unknown() {
        assert!(Board::from_rows(&["A..", ".."]).is_err());
        assert!(Board::from_rows(&["A.X"]).is_err());
        assert!(Board::from_rows(&[]).is_err());
    }

    #[test]
    fn test_neighbors_at_offset() {
        let board = Board::new(BoardSize::Large.dimensions());
        let cell = board.cell(Position::new(2, 4)).unwrap();
        let found: Vec<Position> = cell.neighbors_at(Direction::new(1, 1)).collect();
        assert_eq!(found, vec![Position::new(3, 5)]);

        let odd = board.cell(Position::new(2, 3)).unwrap();
        assert_eq!(odd.neighbors_at(Direction::new(1, 1)).count(), 0);
    }

    #[test]
    fn test_board_display() {
        let display = Board::for_size(BoardSize::Small).display();
        assert!(display.contains("0 1 2"));
        assert!(display.contains("A"));
        assert!(display.contains("B"));
        assert!(display.contains("."));
    }
}
