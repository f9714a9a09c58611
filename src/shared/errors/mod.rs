use std::path::PathBuf;
use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー（再入力で回復可能）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 同じ顧客名が既に登録されている場合のエラー
    #[error("顧客が既に存在します: {0}")]
    DuplicateCustomer(String),

    /// 顧客が見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 保存ファイルの読み書きでのエラー
    #[error("ストレージエラー ({path}): {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 入出力（コンソール）関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    /// 保存データが壊れている場合のエラー
    #[error("保存データが不正です ({path}): {message}")]
    CorruptData { path: PathBuf, message: String },

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（一時的なファイル操作エラーなど）
    Medium,
    /// 高重要度（設定エラーなど）
    High,
    /// 最重要（データ破損など）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::DuplicateCustomer(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Storage { .. } => "ファイル操作でエラーが発生しました",
            AppError::Io(_) => "入出力でエラーが発生しました",
            AppError::Json(_) => "データ形式の解析でエラーが発生しました",
            AppError::CorruptData { .. } => "保存データが壊れているため読み込めません",
            AppError::Configuration(_) => "設定エラーが発生しました",
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::DuplicateCustomer(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Storage { .. } => ErrorSeverity::Medium,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
            AppError::CorruptData { .. } => ErrorSeverity::Critical,
            AppError::Configuration(_) => ErrorSeverity::High,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - バリデーションエラーメッセージ
    ///
    /// # 戻り値
    /// バリデーションエラー
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// 顧客重複エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `name` - 重複した顧客名（正規化済み）
    ///
    /// # 戻り値
    /// 顧客重複エラー
    pub fn duplicate_customer<S: Into<String>>(name: S) -> Self {
        AppError::DuplicateCustomer(format!("顧客 '{}' は既に登録されています", name.into()))
    }

    /// 顧客未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `name` - 見つからなかった顧客名（正規化済み）
    ///
    /// # 戻り値
    /// リソース未発見エラー
    pub fn customer_not_found<S: Into<String>>(name: S) -> Self {
        AppError::NotFound(format!("顧客 '{}' が見つかりません", name.into()))
    }

    /// パス付きのストレージエラーを作成するヘルパー関数
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Storage {
            path: path.into(),
            source,
        }
    }

    /// データ破損エラーを作成するヘルパー関数
    pub fn corrupt_data(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::CorruptData {
            path: path.into(),
            message: message.into(),
        }
    }

    /// 設定エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 設定エラーメッセージ
    ///
    /// # 戻り値
    /// 設定エラー
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// 再入力で回復できるエラーかどうか
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        // 各エラータイプの重要度をテスト
        assert_eq!(
            AppError::validation("テスト").severity(),
            ErrorSeverity::Low
        );
        assert_eq!(
            AppError::customer_not_found("alice").severity(),
            ErrorSeverity::Low
        );
        assert_eq!(
            AppError::duplicate_customer("alice").severity(),
            ErrorSeverity::Low
        );
        assert_eq!(
            AppError::corrupt_data("customers.json", "壊れています").severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            AppError::configuration("設定ファイル不正").severity(),
            ErrorSeverity::High
        );
    }

    #[test]
    fn test_user_message() {
        let validation_error = AppError::validation("金額が不正です");
        assert_eq!(validation_error.user_message(), "金額が不正です");

        let not_found_error = AppError::customer_not_found("bob");
        assert_eq!(not_found_error.user_message(), "顧客 'bob' が見つかりません");

        let storage_error = AppError::storage(
            "customers.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            storage_error.user_message(),
            "ファイル操作でエラーが発生しました"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(AppError::validation("金額").is_retryable());
        assert!(!AppError::duplicate_customer("alice").is_retryable());
        assert!(!AppError::customer_not_found("alice").is_retryable());
    }

    #[test]
    fn test_error_details() {
        let error = AppError::corrupt_data("/tmp/customers.json", "詳細テスト");
        let details = error.details();
        assert!(details.contains("詳細テスト"));
        assert!(details.contains("/tmp/customers.json"));
    }
}
