use super::environment::{get_data_filename, Environment, EnvironmentConfig};
use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// データディレクトリ配下に作るアプリケーション用ディレクトリ名
pub const APP_DIR_NAME: &str = "subscription-manager";

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// データファイルのパス
    pub data_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 引数
/// * `config` - 環境設定
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. データファイルのパスを決定
/// 2. 保存先ディレクトリの作成
/// 3. 初回起動の判定（データファイルの有無）
pub fn initialize_application(config: &EnvironmentConfig) -> AppResult<InitializationResult> {
    let environment = config.environment_kind();
    let data_path = resolve_data_path(config, dirs::data_dir());

    if let Some(parent) = data_path.parent() {
        ensure_directory(parent)?;
    }

    let is_first_run = !data_path.exists();
    if is_first_run {
        log_first_run_initialization(&environment, &data_path);
    }

    Ok(InitializationResult {
        is_first_run,
        data_path,
        environment,
    })
}

/// データファイルのパスを決定する
///
/// # 引数
/// * `config` - 環境設定
/// * `data_dir` - OSのデータディレクトリ（取得できない場合はNone）
///
/// # 戻り値
/// データファイルのパス
///
/// # 優先順位
/// 1. 明示指定されたパス
/// 2. `<data_dir>/subscription-manager/<環境別ファイル名>`
/// 3. カレントディレクトリの環境別ファイル名
pub fn resolve_data_path(config: &EnvironmentConfig, data_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = &config.data_file {
        return path.clone();
    }

    let filename = get_data_filename(config.environment_kind());
    match data_dir {
        Some(dir) => dir.join(APP_DIR_NAME).join(filename),
        None => {
            log::warn!("データディレクトリを取得できないため、カレントディレクトリを使用します");
            PathBuf::from(filename)
        }
    }
}

/// ディレクトリを確実に作成する
fn ensure_directory(dir: &Path) -> AppResult<()> {
    // 相対パスのファイル名だけの場合は親が空になる
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| AppError::storage(dir, e))?;
    log::info!("データディレクトリを作成しました: {}", dir.display());
    Ok(())
}

/// 初回起動時の初期化ログを出力する
fn log_first_run_initialization(environment: &Environment, data_path: &Path) {
    log::info!("=== アプリケーション初回起動 ===");
    log::info!("実行環境: {environment:?}");
    log::info!("データファイル: {}", data_path.display());
}

/// 初期化完了ログを出力する
///
/// # 引数
/// * `result` - 初期化結果
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        log::info!("初回起動の初期化が正常に完了しました");
    } else {
        log::info!("アプリケーション起動完了（既存データファイルを使用）");
    }
    log::info!("環境: {:?}", result.environment);
    log::info!("データファイル: {}", result.data_path.display());
}
