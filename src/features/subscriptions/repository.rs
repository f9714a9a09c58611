use super::models::{CustomerCollection, Price};
use super::validation::normalize_name;
use crate::shared::errors::{AppError, AppResult};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// 顧客コレクションの保存先
///
/// 読み込みは起動時に一度だけ、保存は変更のたびにコレクション全体を書き直す。
pub trait SubscriptionStore {
    /// 保存済みのコレクションを読み込む（未保存なら空のコレクション）
    fn load(&self) -> AppResult<CustomerCollection>;

    /// コレクション全体を保存する
    fn save(&self, customers: &CustomerCollection) -> AppResult<()>;
}

/// JSONファイルによる保存先
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// 保存先を作成する
    ///
    /// # 引数
    /// * `path` - JSONファイルのパス（存在しなくてもよい）
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 書き込み途中のデータを置く一時ファイルのパス
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("customers.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// 4スペースでインデントしたJSONを生成する
    fn serialize(customers: &CustomerCollection) -> AppResult<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        customers.serialize(&mut serializer)?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// 一時ファイルに書き込んでからリネームで置き換える
    fn write_atomically(&self, content: &[u8]) -> AppResult<()> {
        let temp_path = self.temp_path();

        let result = fs::File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(content)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&temp_path, &self.path));

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(AppError::storage(&self.path, e));
        }
        Ok(())
    }
}

impl SubscriptionStore for JsonFileStore {
    fn load(&self) -> AppResult<CustomerCollection> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "データファイルがないため空の状態で開始します: {}",
                    self.path.display()
                );
                return Ok(CustomerCollection::new());
            }
            Err(e) => return Err(AppError::storage(&self.path, e)),
        };

        let customers: CustomerCollection = serde_json::from_str(&content)
            .map_err(|e| AppError::corrupt_data(&self.path, e.to_string()))?;
        verify_collection(&self.path, &customers)?;

        log::debug!(
            "{} 件の顧客を読み込みました: {}",
            customers.len(),
            self.path.display()
        );
        Ok(customers)
    }

    fn save(&self, customers: &CustomerCollection) -> AppResult<()> {
        let content = Self::serialize(customers)?;
        self.write_atomically(&content)?;

        log::debug!(
            "{} 件の顧客を保存しました: {}",
            customers.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// 読み込んだデータが不変条件を満たしているか検証する
///
/// # 検証内容
/// - キーが正規化済み（空でなく、前後の空白なし、小文字）
/// - 料金が正の数値
/// - 終了日が開始日の30日後
fn verify_collection(path: &Path, customers: &CustomerCollection) -> AppResult<()> {
    for (name, subscription) in customers {
        match normalize_name(name) {
            Ok(normalized) if &normalized == name => {}
            _ => {
                return Err(AppError::corrupt_data(
                    path,
                    format!("顧客名が正規化されていません: '{name}'"),
                ))
            }
        }

        if Price::new(subscription.price.value()).is_err() {
            return Err(AppError::corrupt_data(
                path,
                format!("顧客 '{name}' の料金が不正です: {}", subscription.price.value()),
            ));
        }

        if !subscription.has_standard_period() {
            return Err(AppError::corrupt_data(
                path,
                format!(
                    "顧客 '{name}' の契約期間が30日ではありません: {} - {}",
                    subscription.start_date, subscription.end_date
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
pub use memory::MemoryStore;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::models::CustomerSubscription;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_collection() -> CustomerCollection {
        let mut customers = CustomerCollection::new();
        customers.insert(
            "alice".to_string(),
            CustomerSubscription::starting_on(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                Price::new(29.99).unwrap(),
            ),
        );
        customers.insert(
            "bob".to_string(),
            CustomerSubscription::starting_on(
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                Price::new(10.0).unwrap(),
            ),
        );
        customers
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("customers.json"));

        let customers = store.load().unwrap();
        assert!(customers.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("customers.json"));
        let customers = sample_collection();

        store.save(&customers).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, customers);
        // 一時ファイルは残らない
        assert!(!temp_dir.path().join("customers.json.tmp").exists());
    }

    #[test]
    fn test_saved_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("customers.json");
        let store = JsonFileStore::new(&path);

        let mut customers = CustomerCollection::new();
        customers.insert(
            "alice".to_string(),
            CustomerSubscription::starting_on(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                Price::new(29.99).unwrap(),
            ),
        );
        store.save(&customers).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let expected = "{\n    \"alice\": {\n        \"start_date\": \"2024-01-01\",\n        \"end_date\": \"2024-01-31\",\n        \"price\": 29.99\n    }\n}\n";
        assert_eq!(content, expected);
    }

    #[test]
    fn test_load_accepts_integer_price() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("customers.json");
        fs::write(
            &path,
            r#"{"bob": {"start_date": "2024-01-01", "end_date": "2024-01-31", "price": 10}}"#,
        )
        .unwrap();

        let customers = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(customers["bob"].price.value(), 10.0);
    }

    #[test]
    fn test_load_malformed_json_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("customers.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFileStore::new(&path).load();
        assert!(matches!(result, Err(AppError::CorruptData { .. })));
        // 壊れたファイルは上書きしない
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_load_rejects_invariant_violations() {
        let temp_dir = TempDir::new().unwrap();
        let cases = [
            r#"{"Alice": {"start_date": "2024-01-01", "end_date": "2024-01-31", "price": 1}}"#,
            r#"{"alice": {"start_date": "2024-01-01", "end_date": "2024-01-31", "price": 0}}"#,
            r#"{"alice": {"start_date": "2024-01-01", "end_date": "2024-02-15", "price": 1}}"#,
            r#"{"alice": {"start_date": "01/01/2024", "end_date": "2024-01-31", "price": 1}}"#,
        ];

        for (i, case) in cases.iter().enumerate() {
            let path = temp_dir.path().join(format!("case_{i}.json"));
            fs::write(&path, case).unwrap();
            let result = JsonFileStore::new(&path).load();
            assert!(
                matches!(result, Err(AppError::CorruptData { .. })),
                "case {i} should be rejected"
            );
        }
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("missing").join("customers.json"));

        let result = store.save(&sample_collection());
        assert!(matches!(result, Err(AppError::Storage { .. })));
    }

    #[test]
    fn test_memory_store_shares_state_between_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.save(&sample_collection()).unwrap();
        assert_eq!(handle.snapshot().len(), 2);
        assert_eq!(handle.save_count(), 1);

        handle.set_fail_writes(true);
        assert!(store.save(&CustomerCollection::new()).is_err());
        assert_eq!(store.load().unwrap().len(), 2);
    }
}
