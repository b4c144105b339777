//! ゲームセッション管理モジュール
//! 複数のゲームを同時に保持し、セッション数制限、タイムアウト処理、クリーンアップを担当する。
//! 各ゲームへの変更はDashMapのエントリ単位の排他で直列化される。

use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use chrono::{DateTime, Utc, Duration};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{Config, SessionConfig};
use crate::error::{GameError, Result};
use crate::game::{BoardSize, GameState, GameStore, Move, MoveOutcome, Player, SubscriptionId};

/// 1ゲーム分のセッション
#[derive(Debug)]
pub struct GameSession {
    pub id: Uuid,
    pub store: GameStore,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl GameSession {
    fn new(store: GameStore) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            store,
            created_at: now,
            last_activity: now,
        }
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// ゲームセッションの管理を行うメイン構造体
/// スレッドセーフなDashMapで同時アクセスを処理する
#[derive(Debug, Clone)]
pub struct GameSessionManager {
    /// アクティブセッションのコレクション
    sessions: Arc<DashMap<Uuid, GameSession>>,
    /// 同時存在可能な最大セッション数
    max_sessions: usize,
    /// セッションのタイムアウト時間（分）
    session_timeout_minutes: i64,
    /// 新規ゲームの先手
    starting_player: Player,
    /// セッション作成時に期限切れセッションを掃除するか
    enable_session_cleanup: bool,
    /// 上限チェックと登録をまとめて行うためのロック
    creation_lock: Arc<Mutex<()>>,
}

impl GameSessionManager {
    /// デフォルトタイムアウト（30分）でセッションマネージャーを作成
    pub fn new(max_sessions: usize) -> Self {
        Self::with_timeout(max_sessions, 30)
    }

    /// カスタムタイムアウトでセッションマネージャーを作成
    pub fn with_timeout(max_sessions: usize, timeout_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions,
            session_timeout_minutes: timeout_minutes,
            starting_player: Player::A,
            enable_session_cleanup: true,
            creation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// セッション作成時の自動クリーンアップを切り替える
    pub fn with_session_cleanup(mut self, enabled: bool) -> Self {
        self.enable_session_cleanup = enabled;
        self
    }

    /// 設定から作成する
    pub fn from_config(config: &Config) -> Self {
        let session: &SessionConfig = &config.session;
        Self {
            starting_player: config.game.starting_player,
            ..Self::with_timeout(session.max_sessions, session.session_timeout_minutes)
                .with_session_cleanup(session.enable_session_cleanup)
        }
    }

    /// 新しいゲームセッションを作成する
    /// クリーンアップが有効なら先に期限切れセッションを削除する。
    /// 上限チェックと登録は作成用ロックの中で行うため、同時に呼ばれても上限を超えない。
    /// 最大セッション数に達している場合はエラーを返す
    pub fn create_session(&self, board_size: BoardSize) -> Result<Uuid> {
        let _guard = self
            .creation_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.enable_session_cleanup {
            self.cleanup_inactive_sessions();
        }

        if self.sessions.len() >= self.max_sessions {
            return Err(GameError::SessionLimitExceeded { max: self.max_sessions });
        }

        let session = GameSession::new(GameStore::new(board_size, self.starting_player));
        let session_id = session.id;
        self.sessions.insert(session_id, session);

        info!(%session_id, %board_size, "session created");
        Ok(session_id)
    }

    /// セッションを排他的に取得して操作する
    /// 購読者への通知（subscribe直後の初回通知を含む）はDashMapのシャード書き込みロック保持中に行われる。
    /// 同じシャードに属する別セッションへのアクセスでもデッドロックするため、
    /// 購読者からこのマネージャーのセッションを操作・参照してはならない
    fn with_session<T>(&self, session_id: &Uuid, f: impl FnOnce(&mut GameSession) -> Result<T>) -> Result<T> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or(GameError::GameNotFound { game_id: *session_id })?;
        let result = f(&mut session)?;
        session.touch();
        Ok(result)
    }

    /// 指定したセッションの現在のスナップショット
    pub fn state(&self, session_id: &Uuid) -> Result<Arc<GameState>> {
        self.sessions
            .get(session_id)
            .map(|session| session.store.state())
            .ok_or(GameError::GameNotFound { game_id: *session_id })
    }

    pub fn move_chip(&self, session_id: &Uuid, requested: &Move) -> Result<MoveOutcome> {
        self.with_session(session_id, |session| session.store.move_chip(requested))
    }

    pub fn set_board_size(&self, session_id: &Uuid, board_size: BoardSize) -> Result<()> {
        self.with_session(session_id, |session| {
            session.store.set_board_size(board_size);
            Ok(())
        })
    }

    pub fn reset(&self, session_id: &Uuid) -> Result<()> {
        self.with_session(session_id, |session| {
            session.store.reset();
            Ok(())
        })
    }

    pub fn subscribe<F>(&self, session_id: &Uuid, observer: F) -> Result<SubscriptionId>
    where
        F: Fn(&Arc<GameState>) + Send + Sync + 'static,
    {
        self.with_session(session_id, |session| Ok(session.store.subscribe(observer)))
    }

    pub fn unsubscribe(&self, session_id: &Uuid, subscription: SubscriptionId) -> Result<bool> {
        self.with_session(session_id, |session| Ok(session.store.unsubscribe(subscription)))
    }

    pub fn remove_session(&self, session_id: &Uuid) -> Result<GameSession> {
        match self.sessions.remove(session_id) {
            Some((_, session)) => Ok(session),
            None => Err(GameError::GameNotFound { game_id: *session_id }),
        }
    }

    pub fn list_sessions(&self) -> Vec<Uuid> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_exists(&self, session_id: &Uuid) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// 一定時間操作のないセッションを削除する
    /// 戻り値は削除した件数
    pub fn cleanup_inactive_sessions(&self) -> usize {
        self.cleanup_sessions_idle_since(Utc::now() - Duration::minutes(self.session_timeout_minutes))
    }

    /// 指定時刻より前から操作のないセッションを削除する
    pub fn cleanup_sessions_idle_since(&self, cutoff_time: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.last_activity >= cutoff_time);
        let removed_count = before.saturating_sub(self.sessions.len());

        if removed_count > 0 {
            debug!(removed_count, "inactive sessions removed");
        }
        removed_count
    }
}
