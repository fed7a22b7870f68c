use super::models::{derive_logo, CreateSubscriptionDto, Frequency, Subscription};
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// 名前未入力時のサービス名
pub const PLACEHOLDER_NAME: &str = "Custom Service";

static LAST_ISSUED_ID: AtomicI64 = AtomicI64::new(0);

/// 作成時刻（ミリ秒）からIDを発行する
///
/// 同一ミリ秒に複数発行された場合は値を1ずつ進めて一意性を保つ。
pub fn generate_subscription_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ISSUED_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_ISSUED_ID.compare_exchange(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

/// 金額入力を寛容に解釈する
///
/// 先頭の数値部分だけを読み取り（"12.5/mo" → 12.5）、解釈できない値や負の値は0とする。
pub fn parse_amount_lenient(input: &str) -> f64 {
    let trimmed = input.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return 0.0;
    }

    match trimmed[..end].trim_end_matches('.').parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

/// 追加フォームの入力を正規化してサブスクリプションを作る
///
/// # 引数
/// * `dto` - フォーム入力
/// * `id` - 発行済みID
///
/// # 戻り値
/// 正規化済みのサブスクリプション（入力不備は既定値で補う）
pub fn normalize_create_dto(dto: CreateSubscriptionDto, id: String) -> Subscription {
    let name = if dto.name.trim().is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        dto.name.trim().to_string()
    };
    let amount = parse_amount_lenient(&dto.amount);
    if amount == 0.0 && !dto.amount.trim().is_empty() {
        log::debug!("金額 '{}' を0として扱います", dto.amount);
    }

    Subscription {
        id,
        logo: derive_logo(&name),
        name,
        amount,
        frequency: dto.frequency.unwrap_or(Frequency::Monthly),
        next_billing: dto.next_billing,
        selected: true,
        category: dto
            .category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty()),
    }
}

/// ストアに登録する前の最終バリデーション
///
/// # 戻り値
/// バリデーション成功時はOk(())、失敗時はバリデーションエラー
pub fn validate_subscription(subscription: &Subscription) -> AppResult<()> {
    if subscription.id.trim().is_empty() {
        return Err(AppError::validation("IDが空です"));
    }

    if subscription.name.trim().is_empty() {
        return Err(AppError::validation("サービス名を入力してください"));
    }

    if !subscription.amount.is_finite() || subscription.amount < 0.0 {
        return Err(AppError::validation("金額は0以上の数値である必要があります"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_subscription_id_is_unique() {
        let ids: Vec<String> = (0..100).map(|_| generate_subscription_id()).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(ids.len(), deduped.len());
        assert!(ids.iter().all(|id| id.parse::<i64>().is_ok()));
    }

    #[test]
    fn test_parse_amount_lenient() {
        assert_eq!(parse_amount_lenient("15.99"), 15.99);
        assert_eq!(parse_amount_lenient(" 12.5/mo"), 12.5);
        assert_eq!(parse_amount_lenient("7."), 7.0);
        assert_eq!(parse_amount_lenient("abc"), 0.0);
        assert_eq!(parse_amount_lenient(""), 0.0);
        assert_eq!(parse_amount_lenient("-4"), 0.0);
        assert_eq!(parse_amount_lenient("."), 0.0);
    }

    #[test]
    fn test_normalize_create_dto_defaults() {
        let dto = CreateSubscriptionDto {
            name: "  ".to_string(),
            amount: "n/a".to_string(),
            frequency: None,
            next_billing: "Jan 1, 2025".to_string(),
            category: Some("  ".to_string()),
        };

        let sub = normalize_create_dto(dto, "42".to_string());

        assert_eq!(sub.name, PLACEHOLDER_NAME);
        assert_eq!(sub.logo, "C");
        assert_eq!(sub.amount, 0.0);
        assert_eq!(sub.frequency, Frequency::Monthly);
        assert!(sub.category.is_none());
        assert!(sub.selected);
        assert!(validate_subscription(&sub).is_ok());
    }

    #[test]
    fn test_normalize_create_dto_keeps_input() {
        let dto = CreateSubscriptionDto {
            name: "notion".to_string(),
            amount: "8".to_string(),
            frequency: Some(Frequency::Yearly),
            next_billing: "Feb 2".to_string(),
            category: Some("Utilities".to_string()),
        };

        let sub = normalize_create_dto(dto, "1".to_string());

        assert_eq!(sub.name, "notion");
        assert_eq!(sub.logo, "N");
        assert_eq!(sub.amount, 8.0);
        assert_eq!(sub.category.as_deref(), Some("utilities"));
    }

    #[test]
    fn test_validate_subscription() {
        let ok = Subscription::new("1", "Netflix", 15.99, Frequency::Monthly, "Dec 20");
        assert!(validate_subscription(&ok).is_ok());

        let mut blank = ok.clone();
        blank.name = " ".to_string();
        assert!(matches!(
            validate_subscription(&blank),
            Err(AppError::Validation(_))
        ));

        let mut negative = ok.clone();
        negative.amount = -1.0;
        assert!(validate_subscription(&negative).is_err());

        let mut nan = ok;
        nan.amount = f64::NAN;
        assert!(validate_subscription(&nan).is_err());
    }
}
