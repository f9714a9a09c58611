use super::models::{Price, MAX_NAME_LENGTH};
use crate::shared::errors::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// 入力を中断して前の画面へ戻るための予約語
pub const BACK_COMMAND: &str = "back";

/// 入力を拒否するマイナス記号（ASCII・数学記号・小字形・全角）
const MINUS_SIGNS: [char; 4] = ['-', '\u{2212}', '\u{FE63}', '\u{FF0D}'];

/// 小数点以下の最大桁数
const MAX_FRACTION_DIGITS: usize = 2;

/// 数字と小数点以外の文字
static NON_PRICE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.]").expect("金額用の正規表現が不正です"));

/// 料金入力を解析する
///
/// 通貨記号・空白・桁区切りなど数字と小数点以外の文字は取り除いてから解析する。
/// マイナス記号は取り除くと正の値に化けてしまうため、除去前に拒否する。
/// 表示と保存値が食い違わないよう、小数点以下は2桁までとする。
///
/// # 引数
/// * `raw` - ユーザーが入力した文字列
///
/// # 戻り値
/// 正の金額、または解析できない・0以下の場合はバリデーションエラー
pub fn parse_price(raw: &str) -> AppResult<Price> {
    if raw.contains(&MINUS_SIGNS[..]) {
        return Err(AppError::validation("負の金額は入力できません"));
    }

    let cleaned = NON_PRICE_CHARS.replace_all(raw, "");
    if cleaned.is_empty() {
        return Err(AppError::validation("金額を数値で入力してください"));
    }

    if let Some((_, fraction)) = cleaned.split_once('.') {
        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(AppError::validation(format!(
                "小数点以下は{MAX_FRACTION_DIGITS}桁までで入力してください"
            )));
        }
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| AppError::validation(format!("金額として解釈できません: {raw}")))?;

    Price::new(value)
}

/// 顧客名を正規化する（前後の空白を除去して小文字化）
///
/// # 引数
/// * `raw` - ユーザーが入力した顧客名
///
/// # 戻り値
/// 正規化済みの顧客名、または空・長すぎる場合はバリデーションエラー
pub fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim().to_lowercase();

    if name.is_empty() {
        return Err(AppError::validation("顧客名を入力してください"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "顧客名は{MAX_NAME_LENGTH}文字以内で入力してください"
        )));
    }

    Ok(name)
}

/// 中断の予約語かどうか（大文字小文字は区別しない）
pub fn is_back_command(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case(BACK_COMMAND)
}

/// 確認プロンプトへの回答が「yes」かどうか
pub fn is_confirmation(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_parse_price_strips_currency_symbols() {
        assert_eq!(parse_price("$12.50").unwrap().value(), 12.5);
        assert_eq!(parse_price(" 1,200 ").unwrap().value(), 1200.0);
        assert_eq!(parse_price("¥980").unwrap().value(), 980.0);
        assert_eq!(parse_price("29.99 USD").unwrap().value(), 29.99);
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(matches!(parse_price("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price(""), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("."), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("1.2.3"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_price_rejects_non_positive() {
        assert!(matches!(parse_price("0"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("0.00"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_price_rejects_negative_sign() {
        // 記号の除去で正の値に変わらないこと
        assert!(matches!(parse_price("-5"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("$-12.50"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("\u{2212}5"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("\u{FE63}5"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("\u{FF0D}5"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_price_rejects_more_than_two_decimals() {
        assert_eq!(parse_price("0.5").unwrap().value(), 0.5);
        assert_eq!(parse_price("29.99").unwrap().value(), 29.99);
        assert!(matches!(parse_price("0.001"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("29.999"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_price_rejects_too_large() {
        assert!(parse_price("9999999999").is_ok());
        assert!(matches!(
            parse_price("10000000000"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Alice ").unwrap(), "alice");
        assert_eq!(normalize_name("BOB").unwrap(), "bob");
        assert!(matches!(normalize_name("   "), Err(AppError::Validation(_))));
        assert!(matches!(
            normalize_name(&"a".repeat(MAX_NAME_LENGTH + 1)),
            Err(AppError::Validation(_))
        ));
        assert!(normalize_name(&"a".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_back_command_and_confirmation() {
        assert!(is_back_command("back"));
        assert!(is_back_command("  BACK "));
        assert!(!is_back_command("backup"));

        assert!(is_confirmation("yes"));
        assert!(is_confirmation("YES "));
        assert!(!is_confirmation("y"));
        assert!(!is_confirmation("no"));
    }

    #[quickcheck]
    fn prop_normalize_name_is_idempotent(raw: String) -> TestResult {
        if !raw.is_ascii() {
            return TestResult::discard();
        }
        match normalize_name(&raw) {
            Ok(name) => TestResult::from_bool(normalize_name(&name).ok() == Some(name)),
            Err(_) => TestResult::discard(),
        }
    }

    #[quickcheck]
    fn prop_parse_price_accepts_positive_integers_with_symbols(value: u32) -> TestResult {
        if value == 0 {
            return TestResult::discard();
        }
        let parsed = parse_price(&format!("${value}"));
        TestResult::from_bool(parsed.map(Price::value).ok() == Some(f64::from(value)))
    }

    #[quickcheck]
    fn prop_parse_price_never_accepts_minus(raw: String, sign: usize, at_end: bool) -> bool {
        let minus = MINUS_SIGNS[sign % MINUS_SIGNS.len()];
        let input = if at_end {
            format!("{raw}{minus}")
        } else {
            format!("{minus}{raw}")
        };
        parse_price(&input).is_err()
    }
}
