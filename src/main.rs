//! ファノロナエンジンのプレビュー用エントリポイント
//! 設定読み込み、ログ初期化を行い、設定された盤面サイズの初期局面と合法手を表示する。

use std::env;

use Fanorona::{
    config::Config,
    game::{GameStore, MoveKind},
};

/// 既定の設定ファイルを書き出す先
const GENERATED_CONFIG_PATH: &str = "config.json";

/// メイン関数 - 設定の検証と初期局面の表示を担当
fn main() {
    if env::args().any(|arg| arg == "--generate-config") {
        match Config::default().save_to_file(GENERATED_CONFIG_PATH) {
            Ok(()) => println!("デフォルト設定を書き出しました: {}", GENERATED_CONFIG_PATH),
            Err(e) => {
                eprintln!("設定ファイル書き出し失敗: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // 設定ファイルと環境変数から統合設定を読み込み
    let config = match Config::load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("設定エラー: {}", e);
            eprintln!("デフォルト設定を生成: cargo run -- --generate-config");
            std::process::exit(1);
        }
    };

    if config.logging.enable_logging {
        if let Ok(level) = config.logging.tracing_level() {
            tracing_subscriber::fmt().with_max_level(level).init();
        }
    }

    tracing::info!(
        board_size = %config.game.default_board_size,
        starting_player = %config.game.starting_player,
        "configuration loaded"
    );

    let store = GameStore::from_config(&config.game);
    let state = store.state();

    println!("{} ({})", state.board_size, state.board_size.traditional_name());
    println!("{}", state.board.display());
    println!("手番: {}", state.current_player);
    println!(
        "合法手 ({}件, うち取り {}件):",
        state.turn.moves.len(),
        state.turn.capture_moves().count()
    );

    for mv in &state.turn.moves {
        let label = match mv.kind {
            MoveKind::Paika => "paika".to_string(),
            MoveKind::Approach { head } => format!("approach {}", head),
            MoveKind::Withdrawal { head } => format!("withdrawal {}", head),
        };
        println!("  {} -> {}  {}", mv.from, mv.to, label);
    }
}
