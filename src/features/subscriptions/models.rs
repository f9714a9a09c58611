use crate::shared::errors::{AppError, AppResult};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// サブスクリプションの契約期間（日数）。月額プランのみを扱う。
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// 料金の上限（10桁以内）
pub const MAX_PRICE: f64 = 9_999_999_999.0;

/// 顧客名の最大文字数
pub const MAX_NAME_LENGTH: usize = 100;

/// 正の金額
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// 金額を検証して作成する
    ///
    /// # 引数
    /// * `value` - 金額
    ///
    /// # 戻り値
    /// 金額、または0以下・上限超過・非有限値の場合はバリデーションエラー
    pub fn new(value: f64) -> AppResult<Self> {
        if !value.is_finite() {
            return Err(AppError::validation("金額は数値で入力してください"));
        }
        if value <= 0.0 {
            return Err(AppError::validation("金額は正の数値である必要があります"));
        }
        if value > MAX_PRICE {
            return Err(AppError::validation("金額は10桁以内で入力してください"));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// 顧客サブスクリプションのデータモデル
///
/// 顧客名はコレクションのキーとして保持するため、ここには含めない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSubscription {
    pub start_date: NaiveDate, // YYYY-MM-DD形式
    pub end_date: NaiveDate,   // 常に start_date + 30日
    pub price: Price,
}

impl CustomerSubscription {
    /// 指定日に開始する30日間のサブスクリプションを作成する
    pub fn starting_on(start_date: NaiveDate, price: Price) -> Self {
        Self {
            start_date,
            end_date: start_date + Duration::days(SUBSCRIPTION_PERIOD_DAYS),
            price,
        }
    }

    /// 指定日時点での状態を計算する
    ///
    /// # 引数
    /// * `today` - 判定基準日
    ///
    /// # 戻り値
    /// 終了日当日までは有効、翌日以降は期限切れ
    pub fn status_on(&self, today: NaiveDate) -> SubscriptionStatus {
        if today <= self.end_date {
            SubscriptionStatus::Active {
                days_remaining: (self.end_date - today).num_days(),
            }
        } else {
            SubscriptionStatus::Expired {
                days_since_expiration: (today - self.end_date).num_days(),
            }
        }
    }

    /// 契約期間が規定どおり（30日）かどうか
    pub fn has_standard_period(&self) -> bool {
        self.end_date - self.start_date == Duration::days(SUBSCRIPTION_PERIOD_DAYS)
    }
}

/// 正規化済み顧客名をキーとする顧客コレクション
pub type CustomerCollection = BTreeMap<String, CustomerSubscription>;

/// サブスクリプションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// 有効（終了日まで残り日数）
    Active { days_remaining: i64 },
    /// 期限切れ（終了日からの経過日数）
    Expired { days_since_expiration: i64 },
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active { .. })
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active { days_remaining } => {
                write!(f, "有効（残り {days_remaining} 日）")
            }
            SubscriptionStatus::Expired {
                days_since_expiration,
            } => write!(f, "期限切れ（期限切れから {days_since_expiration} 日）"),
        }
    }
}

/// 照会結果
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionReport {
    pub name: String,
    pub status: SubscriptionStatus,
    pub price: Price,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SubscriptionReport {
    /// 表示用の顧客名（先頭のみ大文字）
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// 解約操作の結果
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    /// 解約して削除した
    Cancelled(CustomerSubscription),
    /// 確認が得られなかったため何もしなかった
    Aborted,
}
