//! 「今日」の日付を提供する時計
//!
//! 日付計算はすべて暦日単位で行うため、時計は時刻ではなく日付だけを返す。

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;

/// 今日の日付を返す時計
pub trait Clock {
    /// 現在の暦日を取得する
    fn today(&self) -> NaiveDate;
}

/// システム時刻に基づく時計
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Option<Tz>,
}

impl SystemClock {
    /// 時計を作成する
    ///
    /// # 引数
    /// * `timezone` - 日付の判定に使うタイムゾーン（Noneならローカル時刻）
    pub fn new(timezone: Option<Tz>) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
            None => Local::now().date_naive(),
        }
    }
}

#[cfg(test)]
pub use fixed::FixedClock;
