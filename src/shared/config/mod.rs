/// 環境設定とログ初期化
pub mod environment;

/// 起動時の初期化処理
pub mod initialization;

pub use environment::{
    get_data_filename, get_environment, initialize_logging_system, load_environment_variables,
    Environment, EnvironmentConfig,
};
pub use initialization::{
    initialize_application, log_initialization_complete, resolve_data_path, InitializationResult,
};
