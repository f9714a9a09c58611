use super::models::{CancelOutcome, SubscriptionReport};
use super::repository::SubscriptionStore;
use super::service::SubscriptionManager;
use super::validation::{is_back_command, is_confirmation};
use crate::shared::clock::Clock;
use crate::shared::errors::{AppError, AppResult, ErrorSeverity};
use std::io::{BufRead, Write};

/// メニューの選択肢
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    Check,
    Cancel,
    Edit,
    Exit,
}

impl MenuChoice {
    /// 入力された番号を選択肢に変換する
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" => Some(MenuChoice::Add),
            "2" => Some(MenuChoice::Check),
            "3" => Some(MenuChoice::Cancel),
            "4" => Some(MenuChoice::Edit),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// 対話式メニュー
///
/// 入力の読み取り・再入力のループ・結果の表示だけを担当し、
/// 業務ロジックは`SubscriptionManager`に委ねる。
pub struct SubscriptionShell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> SubscriptionShell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// 出力先を取り出す
    pub fn into_output(self) -> W {
        self.output
    }

    /// 終了が選ばれるか入力が尽きるまでメニューを繰り返す
    ///
    /// # 引数
    /// * `manager` - サブスクリプション管理サービス
    ///
    /// # 戻り値
    /// 正常終了時はOk(())、コンソール入出力に失敗した場合はエラー
    pub fn run<S: SubscriptionStore, C: Clock>(
        &mut self,
        manager: &mut SubscriptionManager<S, C>,
    ) -> AppResult<()> {
        self.print_banner(manager)?;

        loop {
            self.print_menu()?;
            let Some(choice) = self.read_line("メニュー番号を選択してください: ")? else {
                writeln!(self.output)?;
                writeln!(self.output, "入力が終了したため、プログラムを終了します。")?;
                break;
            };

            match MenuChoice::parse(&choice) {
                Some(MenuChoice::Add) => self.add_customer(manager)?,
                Some(MenuChoice::Check) => self.check_subscription(manager)?,
                Some(MenuChoice::Cancel) => self.cancel_subscription(manager)?,
                Some(MenuChoice::Edit) => self.edit_subscription(manager)?,
                Some(MenuChoice::Exit) => {
                    writeln!(self.output, "プログラムを終了します。")?;
                    break;
                }
                None => {
                    writeln!(self.output, "無効な選択です。1から5の番号を入力してください。")?;
                }
            }
        }

        self.output.flush()?;
        log::info!("対話メニューを終了しました");
        Ok(())
    }

    fn print_banner<S: SubscriptionStore, C: Clock>(
        &mut self,
        manager: &SubscriptionManager<S, C>,
    ) -> AppResult<()> {
        let summaries = manager.summaries();
        let active = summaries.iter().filter(|r| r.status.is_active()).count();
        writeln!(
            self.output,
            "登録顧客: {} 件（有効 {} 件）、月額合計: {:.2}",
            summaries.len(),
            active,
            manager.monthly_total()
        )?;
        Ok(())
    }

    fn print_menu(&mut self) -> AppResult<()> {
        writeln!(self.output)?;
        writeln!(self.output, "サブスクリプション管理システム")?;
        writeln!(self.output, "1. 新規顧客の追加")?;
        writeln!(self.output, "2. サブスクリプションの確認")?;
        writeln!(self.output, "3. サブスクリプションの解約")?;
        writeln!(self.output, "4. サブスクリプションの編集")?;
        writeln!(self.output, "5. 終了")?;
        Ok(())
    }

    fn add_customer<S: SubscriptionStore, C: Clock>(
        &mut self,
        manager: &mut SubscriptionManager<S, C>,
    ) -> AppResult<()> {
        writeln!(self.output, "\n-- 新規顧客の追加 --")?;
        let Some(raw_name) = self.prompt("顧客名を入力してください（'back' で戻る）: ")? else {
            return Ok(());
        };

        // 料金を聞く前に重複を知らせる
        let name = match manager.ensure_new_customer(&raw_name) {
            Ok(name) => name,
            Err(e) => return self.report_error(&e),
        };

        loop {
            let Some(price_input) = self.prompt("料金を入力してください（'back' で戻る）: ")?
            else {
                return Ok(());
            };

            match manager.add(&name, &price_input) {
                Ok(subscription) => {
                    writeln!(
                        self.output,
                        "顧客 '{name}' を追加しました。終了日: {}",
                        subscription.end_date.format("%Y-%m-%d")
                    )?;
                    return Ok(());
                }
                Err(e) if e.is_retryable() => self.print_invalid_price(&e)?,
                Err(e) => return self.report_error(&e),
            }
        }
    }

    fn check_subscription<S: SubscriptionStore, C: Clock>(
        &mut self,
        manager: &SubscriptionManager<S, C>,
    ) -> AppResult<()> {
        writeln!(self.output, "\n-- サブスクリプションの確認 --")?;
        let Some(raw_name) = self.prompt("確認する顧客名を入力してください（'back' で戻る）: ")?
        else {
            return Ok(());
        };

        match manager.inspect(&raw_name) {
            Ok(report) => self.print_report(&report),
            Err(e) => self.report_error(&e),
        }
    }

    fn cancel_subscription<S: SubscriptionStore, C: Clock>(
        &mut self,
        manager: &mut SubscriptionManager<S, C>,
    ) -> AppResult<()> {
        writeln!(self.output, "\n-- サブスクリプションの解約 --")?;
        let Some(raw_name) = self.prompt("解約する顧客名を入力してください（'back' で戻る）: ")?
        else {
            return Ok(());
        };

        let name = match manager.ensure_existing_customer(&raw_name) {
            Ok(name) => name,
            Err(e) => return self.report_error(&e),
        };

        let question = format!("本当に '{name}' のサブスクリプションを解約しますか？ (yes/no): ");
        let confirmed = self
            .prompt(&question)?
            .map(|answer| is_confirmation(&answer))
            .unwrap_or(false);

        match manager.cancel(&name, confirmed) {
            Ok(CancelOutcome::Cancelled(_)) => {
                writeln!(self.output, "顧客 '{name}' のサブスクリプションを解約しました。")?;
                Ok(())
            }
            Ok(CancelOutcome::Aborted) => {
                writeln!(self.output, "解約を中止しました。")?;
                Ok(())
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn edit_subscription<S: SubscriptionStore, C: Clock>(
        &mut self,
        manager: &mut SubscriptionManager<S, C>,
    ) -> AppResult<()> {
        writeln!(self.output, "\n-- サブスクリプションの編集 --")?;
        let Some(raw_name) = self.prompt("編集する顧客名を入力してください（'back' で戻る）: ")?
        else {
            return Ok(());
        };

        let name = match manager.ensure_existing_customer(&raw_name) {
            Ok(name) => name,
            Err(e) => return self.report_error(&e),
        };

        loop {
            let Some(price_input) =
                self.prompt("新しい料金を入力してください（'back' で戻る）: ")?
            else {
                return Ok(());
            };

            match manager.edit(&name, &price_input) {
                Ok(subscription) => {
                    writeln!(
                        self.output,
                        "顧客 '{name}' の料金を {} に変更しました。",
                        subscription.price
                    )?;
                    return Ok(());
                }
                Err(e) if e.is_retryable() => self.print_invalid_price(&e)?,
                Err(e) => return self.report_error(&e),
            }
        }
    }

    fn print_report(&mut self, report: &SubscriptionReport) -> AppResult<()> {
        writeln!(self.output)?;
        writeln!(self.output, "顧客名: {}", report.display_name())?;
        writeln!(self.output, "ステータス: {}", report.status)?;
        writeln!(self.output, "料金: {}", report.price)?;
        writeln!(
            self.output,
            "開始日: {}",
            report.start_date.format("%Y-%m-%d")
        )?;
        writeln!(self.output, "終了日: {}", report.end_date.format("%Y-%m-%d"))?;
        Ok(())
    }

    fn print_invalid_price(&mut self, error: &AppError) -> AppResult<()> {
        writeln!(
            self.output,
            "無効な料金です（{}）。正の数値を入力してください。",
            error.user_message()
        )?;
        Ok(())
    }

    /// 操作を中断したエラーを表示する（プロセスは継続する）
    fn report_error(&mut self, error: &AppError) -> AppResult<()> {
        match error.severity() {
            ErrorSeverity::Low => log::debug!("操作を中断しました: {}", error.details()),
            _ => log::error!("操作に失敗しました: {}", error.details()),
        }
        writeln!(self.output, "{}", error.user_message())?;
        Ok(())
    }

    /// プロンプトを表示して1行読む。入力終了または'back'ならNone。
    fn prompt(&mut self, message: &str) -> AppResult<Option<String>> {
        Ok(self
            .read_line(message)?
            .filter(|line| !is_back_command(line)))
    }

    /// プロンプトを表示して1行読む。UTF-8として読めない行は読み直す。
    fn read_line(&mut self, message: &str) -> AppResult<Option<String>> {
        loop {
            write!(self.output, "{message}")?;
            self.output.flush()?;

            let mut buffer = Vec::new();
            if self.input.read_until(b'\n', &mut buffer)? == 0 {
                return Ok(None);
            }

            match String::from_utf8(buffer) {
                Ok(line) => return Ok(Some(line.trim().to_string())),
                Err(e) => {
                    log::debug!("UTF-8ではない入力を破棄しました: {e}");
                    writeln!(
                        self.output,
                        "入力を文字として読み取れませんでした。もう一度入力してください。"
                    )?;
                }
            }
        }
    }
}
