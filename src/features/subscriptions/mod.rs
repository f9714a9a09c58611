/// サブスクリプション機能モジュール
///
/// このモジュールは、顧客サブスクリプション管理に関連するすべての機能を提供します：
/// - 顧客の追加、状態の照会、解約、料金の変更
/// - 料金入力・顧客名のバリデーション
/// - JSONファイルへの永続化
/// - 対話式メニュー
pub mod commands;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;


// 公開インターフェース
pub use commands::{MenuChoice, SubscriptionShell};

pub use models::{
    CancelOutcome, CustomerCollection, CustomerSubscription, Price, SubscriptionReport,
    SubscriptionStatus, SUBSCRIPTION_PERIOD_DAYS,
};

pub use repository::{JsonFileStore, SubscriptionStore};

pub use service::SubscriptionManager;

pub use validation::{is_back_command, is_confirmation, normalize_name, parse_price};
