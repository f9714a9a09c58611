/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// 日付を提供する時計
pub mod clock;

// 便利な再エクスポート
pub use clock::{Clock, SystemClock};
pub use config::{
    get_data_filename, get_environment, initialize_application, initialize_logging_system,
    load_environment_variables, log_initialization_complete, Environment, EnvironmentConfig,
    InitializationResult,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
