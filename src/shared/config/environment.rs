use crate::shared::errors::{AppError, AppResult};
use chrono_tz::Tz;
use std::path::PathBuf;

/// データファイルの保存先を上書きする環境変数
pub const DATA_FILE_ENV: &str = "SUBSCRIPTION_DATA_FILE";

/// 日付計算に使うタイムゾーンを指定する環境変数
pub const TIMEZONE_ENV: &str = "SUBSCRIPTION_TIMEZONE";

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// ログレベル
    pub log_level: String,
    /// データファイルのパス（明示指定された場合のみ）
    pub data_file: Option<PathBuf>,
    /// タイムゾーン名（IANA形式、未指定ならシステムのローカル時刻）
    pub timezone: Option<String>,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # 戻り値
    /// 環境設定
    pub fn from_env() -> Self {
        Self::from_lookup(get_environment(), |key| std::env::var(key).ok())
    }

    /// 任意の値取得関数から設定を組み立てる
    ///
    /// # 引数
    /// * `environment` - 実行環境
    /// * `lookup` - 変数名から値を返す関数
    ///
    /// # 戻り値
    /// 環境設定
    pub fn from_lookup<F>(environment: Environment, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| match environment {
            Environment::Development => "debug".to_string(),
            Environment::Production => "warn".to_string(),
        });

        // 空文字列は未指定として扱う
        let data_file = lookup(DATA_FILE_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let timezone = lookup(TIMEZONE_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            log_level,
            data_file,
            timezone,
        }
    }

    /// プロダクション環境かどうかを判定
    ///
    /// # 戻り値
    /// プロダクション環境の場合はtrue
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 実行環境を列挙型で取得
    pub fn environment_kind(&self) -> Environment {
        if self.is_production() {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// 設定されたタイムゾーンを解析する
    ///
    /// # 戻り値
    /// タイムゾーン（未指定の場合はNone）、または名前が不正な場合はエラー
    pub fn parsed_timezone(&self) -> AppResult<Option<Tz>> {
        match &self.timezone {
            None => Ok(None),
            Some(name) => name.parse::<Tz>().map(Some).map_err(|_| {
                AppError::configuration(format!(
                    "{TIMEZONE_ENV} のタイムゾーン名が不正です: {name}"
                ))
            }),
        }
    }

    /// ログレベル文字列をフィルタに変換する
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 戻り値
/// 現在の実行環境（Development または Production）
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = parse_environment(&env_var);
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境名の文字列を列挙型に変換する
fn parse_environment(value: &str) -> Environment {
    match value.trim() {
        "production" => Environment::Production,
        _ => Environment::Development,
    }
}

/// 環境に応じたデータファイル名を取得する
///
/// # 引数
/// * `env` - 実行環境
///
/// # 戻り値
/// データファイル名
///
/// # ファイル名の規則
/// - 開発環境: "dev_customers.json"
/// - プロダクション環境: "customers.json"
pub fn get_data_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_customers.json",
        Environment::Production => "customers.json",
    }
}

/// 環境に応じた.envファイルを読み込む
///
/// # 処理内容
/// 1. 環境に応じた.envファイルを読み込み
/// 2. 見つからない場合はデフォルトの.envにフォールバック
pub fn load_environment_variables() {
    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match environment.as_str() {
        "production" => ".env.production",
        _ => ".env",
    };

    log::info!("環境: {environment}, 読み込み対象: {env_file}");

    match dotenv::from_filename(env_file) {
        Ok(_) => {
            log::info!("{env_file}ファイルを読み込みました");
        }
        Err(_) => {
            // 環境固有のファイルがない場合は、デフォルトの.envを試行
            if env_file != ".env" && dotenv::dotenv().is_ok() {
                log::warn!("{env_file}が見つからないため、デフォルトの.envファイルを読み込みました");
            } else {
                log::debug!("環境変数ファイルが見つかりません。直接設定された環境変数を使用します。");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. 環境設定を取得
/// 2. ログレベルを設定
/// 3. env_loggerを初期化（出力先は標準エラー）
pub fn initialize_logging_system(env_config: &EnvironmentConfig) {
    // 二重初期化はテストなどで起こりうるため結果は無視する
    let _ = env_logger::Builder::from_default_env()
        .filter_level(env_config.log_level_filter())
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .target(env_logger::Target::Stderr)
        .try_init();

    log::info!(
        "ログシステムを初期化しました: level={}, environment={}",
        env_config.log_level,
        env_config.environment
    );
}
