//! ゲーム状態コンテナモジュール
//! 現在のスナップショットを保持し、UIなどの購読者へ変更を同期的に通知する。
//! ルールは持たず、状態遷移はFanoronaRulesに委譲する。

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::rules::{FanoronaRules, MoveOutcome};
use super::state::GameState;
use super::types::{BoardSize, Move, Player};
use crate::config::GameConfig;
use crate::error::Result;

/// 購読解除に使う識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

/// 状態変更の通知を受け取るコールバック
pub type Observer = Box<dyn Fn(&Arc<GameState>) + Send + Sync>;

/// ゲーム状態のコンテナ
/// 変更は全て&mut selfを通り、1操作につき1つのスナップショットを公開する
pub struct GameStore {
    state: Arc<GameState>,
    starting_player: Player,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl GameStore {
    /// 指定サイズと先手で新しいゲームを作成する
    pub fn new(board_size: BoardSize, starting_player: Player) -> Self {
        Self {
            state: Arc::new(GameState::new(board_size, starting_player)),
            starting_player,
            observers: Vec::new(),
        }
    }

    /// 設定の既定サイズと先手で作成する
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.default_board_size, config.starting_player)
    }

    /// 任意の局面から始める
    /// starting_playerはreset/set_board_size後の先手で、局面の手番とは独立
    pub fn from_state(state: GameState, starting_player: Player) -> Self {
        Self {
            starting_player,
            state: Arc::new(state),
            observers: Vec::new(),
        }
    }

    /// 現在のスナップショット
    pub fn state(&self) -> Arc<GameState> {
        Arc::clone(&self.state)
    }

    pub fn starting_player(&self) -> Player {
        self.starting_player
    }

    /// 購読者を登録する。登録直後に現在の状態を一度通知する
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&Arc<GameState>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        observer(&self.state);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// 購読を解除する。登録されていなかった場合はfalse
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// 手を適用する。不正な手の場合は状態を変えずにエラーを返し、通知もしない
    #[instrument(level = "debug", skip(self))]
    pub fn move_chip(&mut self, requested: &Move) -> Result<MoveOutcome> {
        let (next, outcome) = FanoronaRules::apply_move(&self.state, requested).map_err(|e| {
            if !e.is_recoverable() {
                warn!(error = %e, "move aborted by internal invariant violation");
            }
            e
        })?;
        self.publish(next);
        Ok(outcome)
    }

    /// 盤面サイズを変更してゲームを最初からやり直す
    pub fn set_board_size(&mut self, board_size: BoardSize) {
        info!(%board_size, "board size changed");
        self.publish(GameState::new(board_size, self.starting_player));
    }

    /// 同じサイズでゲームを最初からやり直す
    pub fn reset(&mut self) {
        let board_size = self.state.board_size;
        info!(%board_size, "game reset");
        self.publish(GameState::new(board_size, self.starting_player));
    }

    fn publish(&mut self, next: GameState) {
        self.state = Arc::new(next);
        for (_, observer) in &self.observers {
            observer(&self.state);
        }
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl fmt::Debug for GameStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameStore")
            .field("state", &self.state)
            .field("starting_player", &self.starting_player)
            .field("observers", &self.observers.len())
            .finish()
    }
}
