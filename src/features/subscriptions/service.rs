use super::models::{
    CancelOutcome, CustomerCollection, CustomerSubscription, SubscriptionReport,
};
use super::repository::SubscriptionStore;
use super::validation::{normalize_name, parse_price};
use crate::shared::clock::Clock;
use crate::shared::errors::{AppError, AppResult};

/// サブスクリプション管理サービス
///
/// 顧客コレクションをメモリ上に保持し、変更のたびに保存先へ書き出す。
/// 各操作は「変更と保存の両方に成功する」か「何も変えない」かのどちらかになる。
pub struct SubscriptionManager<S, C> {
    store: S,
    clock: C,
    customers: CustomerCollection,
}

impl<S: SubscriptionStore, C: Clock> SubscriptionManager<S, C> {
    /// 保存先からコレクションを読み込んでサービスを作成する
    ///
    /// # 引数
    /// * `store` - 保存先
    /// * `clock` - 日付の取得元
    ///
    /// # 戻り値
    /// サービス、または保存データが読めない場合はエラー
    pub fn open(store: S, clock: C) -> AppResult<Self> {
        let customers = store.load()?;
        log::info!("顧客データを読み込みました: {} 件", customers.len());
        Ok(Self {
            store,
            clock,
            customers,
        })
    }

    /// 現在のコレクション
    pub fn customers(&self) -> &CustomerCollection {
        &self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// 新規登録できる顧客名かどうかを確認する
    ///
    /// # 戻り値
    /// 正規化済みの顧客名、または既に存在する場合は重複エラー
    pub fn ensure_new_customer(&self, name: &str) -> AppResult<String> {
        let name = normalize_name(name)?;
        if self.customers.contains_key(&name) {
            return Err(AppError::duplicate_customer(name));
        }
        Ok(name)
    }

    /// 登録済みの顧客名かどうかを確認する
    ///
    /// # 戻り値
    /// 正規化済みの顧客名、または存在しない場合は未発見エラー
    pub fn ensure_existing_customer(&self, name: &str) -> AppResult<String> {
        let name = normalize_name(name)?;
        if !self.customers.contains_key(&name) {
            return Err(AppError::customer_not_found(name));
        }
        Ok(name)
    }

    /// 顧客を追加する
    ///
    /// # 引数
    /// * `name` - 顧客名（正規化前でもよい）
    /// * `price_input` - 料金の入力文字列
    ///
    /// # 戻り値
    /// 作成したサブスクリプション、または失敗時はエラー
    /// （料金のバリデーションエラーは再入力の合図）
    pub fn add(&mut self, name: &str, price_input: &str) -> AppResult<CustomerSubscription> {
        let name = self.ensure_new_customer(name)?;
        let price = parse_price(price_input)?;

        let subscription = CustomerSubscription::starting_on(self.clock.today(), price);
        self.customers.insert(name.clone(), subscription.clone());

        if let Err(e) = self.persist() {
            self.customers.remove(&name);
            return Err(e);
        }

        log::info!(
            "顧客を追加しました: name={name}, price={price}, end_date={}",
            subscription.end_date
        );
        Ok(subscription)
    }

    /// 顧客のサブスクリプション状態を照会する
    ///
    /// # 引数
    /// * `name` - 顧客名（正規化前でもよい）
    ///
    /// # 戻り値
    /// 照会結果、または顧客が存在しない場合はエラー
    pub fn inspect(&self, name: &str) -> AppResult<SubscriptionReport> {
        let name = normalize_name(name)?;
        let subscription = self
            .customers
            .get(&name)
            .ok_or_else(|| AppError::customer_not_found(&name))?;

        Ok(self.report(name, subscription))
    }

    /// 顧客のサブスクリプションを解約（削除）する
    ///
    /// # 引数
    /// * `name` - 顧客名（正規化前でもよい）
    /// * `confirmed` - ユーザーが解約を確認したかどうか
    ///
    /// # 戻り値
    /// 解約結果（未確認なら何もせず`Aborted`）、または顧客が存在しない場合はエラー
    pub fn cancel(&mut self, name: &str, confirmed: bool) -> AppResult<CancelOutcome> {
        let name = self.ensure_existing_customer(name)?;

        if !confirmed {
            log::debug!("解約は確認されませんでした: name={name}");
            return Ok(CancelOutcome::Aborted);
        }

        let Some(removed) = self.customers.remove(&name) else {
            return Err(AppError::customer_not_found(name));
        };

        if let Err(e) = self.persist() {
            self.customers.insert(name, removed);
            return Err(e);
        }

        log::info!("顧客を解約しました: name={name}");
        Ok(CancelOutcome::Cancelled(removed))
    }

    /// 顧客の料金を変更する（開始日・終了日は変更しない）
    ///
    /// # 引数
    /// * `name` - 顧客名（正規化前でもよい）
    /// * `price_input` - 新しい料金の入力文字列
    ///
    /// # 戻り値
    /// 更新後のサブスクリプション、または失敗時はエラー
    pub fn edit(&mut self, name: &str, price_input: &str) -> AppResult<CustomerSubscription> {
        let name = self.ensure_existing_customer(name)?;
        let price = parse_price(price_input)?;

        let previous = match self.customers.get_mut(&name) {
            Some(subscription) => std::mem::replace(&mut subscription.price, price),
            None => return Err(AppError::customer_not_found(name)),
        };

        if let Err(e) = self.persist() {
            if let Some(subscription) = self.customers.get_mut(&name) {
                subscription.price = previous;
            }
            return Err(e);
        }

        log::info!("料金を変更しました: name={name}, {previous} -> {price}");
        self.customers
            .get(&name)
            .cloned()
            .ok_or_else(|| AppError::customer_not_found(name))
    }

    /// 全顧客の照会結果（顧客名順）
    pub fn summaries(&self) -> Vec<SubscriptionReport> {
        self.customers
            .iter()
            .map(|(name, subscription)| self.report(name.clone(), subscription))
            .collect()
    }

    /// 有効なサブスクリプションの月額合計
    pub fn monthly_total(&self) -> f64 {
        let today = self.clock.today();
        self.customers
            .values()
            .filter(|subscription| subscription.status_on(today).is_active())
            .fold(0.0, |acc, subscription| acc + subscription.price.value())
    }

    fn report(&self, name: String, subscription: &CustomerSubscription) -> SubscriptionReport {
        SubscriptionReport {
            name,
            status: subscription.status_on(self.clock.today()),
            price: subscription.price,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
        }
    }

    fn persist(&self) -> AppResult<()> {
        self.store.save(&self.customers).map_err(|e| {
            log::error!("顧客データの保存に失敗しました: {}", e.details());
            e
        })
    }
}
