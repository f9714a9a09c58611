pub mod features;
pub mod shared;

use features::subscriptions::{JsonFileStore, SubscriptionManager, SubscriptionShell};
use log::{error, info};
use shared::{
    initialize_application, initialize_logging_system, load_environment_variables,
    log_initialization_complete, AppResult, EnvironmentConfig, SystemClock,
};
use std::io;

/// アプリケーションを起動し、対話メニューが終了するまで実行する
///
/// # 処理内容
/// 1. 環境変数とログシステムの初期化
/// 2. データファイルの場所を決定
/// 3. 顧客データの読み込み（壊れている場合は起動を中止）
/// 4. 対話メニューの実行
pub fn run() -> AppResult<()> {
    // LOG_LEVELを.envから読めるよう、ログ初期化より先に読み込む
    load_environment_variables();

    let env_config = EnvironmentConfig::from_env();
    initialize_logging_system(&env_config);

    info!("アプリケーション初期化を開始します...");

    let timezone = env_config.parsed_timezone()?;
    let init_result = initialize_application(&env_config)?;
    log_initialization_complete(&init_result);

    let store = JsonFileStore::new(&init_result.data_path);
    let mut manager = SubscriptionManager::open(store, SystemClock::new(timezone)).map_err(|e| {
        error!("顧客データの読み込みに失敗しました: {}", e.details());
        e
    })?;

    info!(
        "アプリケーション初期化が完了しました: 顧客 {} 件, 月額合計 {:.2}",
        manager.len(),
        manager.monthly_total()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = SubscriptionShell::new(stdin.lock(), stdout.lock());
    shell.run(&mut manager)
}
