//! アプリケーション設定管理モジュール
//! 既定の盤面サイズ、先手、セッション数制限、ログ出力などの設定を
//! 設定ファイルと環境変数から読み込んで管理する。

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, str::FromStr};

use crate::game::{BoardSize, Player};

/// 設定ファイルの探索順
const CONFIG_SEARCH_PATHS: [&str; 3] = [
    "config.json",
    "config/fanorona.json",
    "/etc/fanorona/config.json",
];

/// ゲーム開始時の既定値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// 新規ゲームの盤面サイズ
    pub default_board_size: BoardSize,
    /// リセット時にも使われる固定の先手
    pub starting_player: Player,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_board_size: BoardSize::Large,
            starting_player: Player::A,
        }
    }
}

/// 複数ゲームを保持するセッション管理の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub max_sessions: usize,
    pub session_timeout_minutes: i64,
    pub enable_session_cleanup: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 100,
            session_timeout_minutes: 30,
            enable_session_cleanup: true,
        }
    }
}

/// ログ出力の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub enable_logging: bool,
    /// trace / debug / info / warn / error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// レベル文字列をtracingのレベルに変換する
    pub fn tracing_level(&self) -> Result<tracing::Level, ConfigError> {
        tracing::Level::from_str(&self.level).map_err(|_| ConfigError::InvalidValue {
            field: "logging.level".to_string(),
            value: self.level.clone(),
        })
    }
}

/// アプリケーションの全設定を統合するメイン設定構造体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// 設定関連のエラーを表すenum
/// ファイル読み込み、パース、検証エラーなどを含む
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("設定ファイル読み込みエラー: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("設定ファイル解析エラー: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("環境変数エラー: {name} = {value}")]
    EnvVarError { name: String, value: String },

    #[error("設定値が無効です: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

/// 環境変数が設定されていればパースして返す
fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarError {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// 指定したファイルパスから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 環境変数から設定を読み込む
    /// デフォルト値をベースに環境変数で上書きする
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::default().with_env_overrides()
    }

    /// 設定済みの値に環境変数の値を重ねる
    /// 設定されていない環境変数は既存の値を保持する
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(size) = parse_env::<BoardSize>("FANORONA_BOARD_SIZE")? {
            self.game.default_board_size = size;
        }

        if let Some(player) = parse_env::<Player>("FANORONA_STARTING_PLAYER")? {
            self.game.starting_player = player;
        }

        if let Some(max_sessions) = parse_env("FANORONA_MAX_SESSIONS")? {
            self.session.max_sessions = max_sessions;
        }

        if let Some(timeout) = parse_env("FANORONA_SESSION_TIMEOUT_MINUTES")? {
            self.session.session_timeout_minutes = timeout;
        }

        if let Some(enable) = parse_env("FANORONA_ENABLE_LOGGING")? {
            self.logging.enable_logging = enable;
        }

        if let Ok(level) = env::var("FANORONA_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// 設定ファイルと環境変数を結合して設定を読み込む
    /// 設定ファイルがなくてもデフォルト値で動作する
    pub fn load() -> Result<Self, ConfigError> {
        let base = CONFIG_SEARCH_PATHS
            .iter()
            .find_map(|path| Self::from_file(path).ok())
            .unwrap_or_default();

        base.with_env_overrides()
    }

    /// 現在の設定を指定したファイルに保存する
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 設定値の妥当性をチェックする
    /// 不正な値がある場合はConfigErrorを返す
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_sessions".to_string(),
                value: self.session.max_sessions.to_string(),
            });
        }

        if self.session.session_timeout_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.session_timeout_minutes".to_string(),
                value: self.session.session_timeout_minutes.to_string(),
            });
        }

        self.logging.tracing_level()?;

        Ok(())
    }
}
