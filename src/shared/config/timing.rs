use crate::shared::errors::{AppError, AppResult};
use std::time::Duration;

/// 擬似的な外部処理の待ち時間をまとめた設定
///
/// すべての値はミリ秒の環境変数で上書きできる（例: `SCAN_BANK_DURATION_MS=1500`）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingConfig {
    /// 銀行スキャン全体の所要時間
    pub bank_scan_duration: Duration,
    /// SMSスキャン全体の所要時間
    pub sms_scan_duration: Duration,
    /// 100%到達から結果通知までの待ち時間
    pub scan_reveal_delay: Duration,
    /// 銀行ログイン情報送信の待ち時間
    pub credentials_delay: Duration,
    /// 二段階認証の待ち時間
    pub two_factor_delay: Duration,
    /// SMS権限許可の待ち時間
    pub sms_permission_delay: Duration,
    /// 完了画面から自動遷移するまでの時間
    pub success_auto_advance: Duration,
    /// 削除を取り消せる猶予時間
    pub undo_window: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            bank_scan_duration: Duration::from_millis(3000),
            sms_scan_duration: Duration::from_millis(2000),
            scan_reveal_delay: Duration::from_millis(800),
            credentials_delay: Duration::from_millis(1500),
            two_factor_delay: Duration::from_millis(1000),
            sms_permission_delay: Duration::from_millis(500),
            success_auto_advance: Duration::from_millis(3000),
            undo_window: Duration::from_millis(5000),
        }
    }
}

impl TimingConfig {
    /// 環境変数から設定を読み込む（未設定・不正値は既定値）
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bank_scan_duration: duration_from_env(
                "SCAN_BANK_DURATION_MS",
                defaults.bank_scan_duration,
            ),
            sms_scan_duration: duration_from_env("SCAN_SMS_DURATION_MS", defaults.sms_scan_duration),
            scan_reveal_delay: duration_from_env("SCAN_REVEAL_DELAY_MS", defaults.scan_reveal_delay),
            credentials_delay: duration_from_env(
                "BANK_CREDENTIALS_DELAY_MS",
                defaults.credentials_delay,
            ),
            two_factor_delay: duration_from_env("BANK_2FA_DELAY_MS", defaults.two_factor_delay),
            sms_permission_delay: duration_from_env(
                "SMS_PERMISSION_DELAY_MS",
                defaults.sms_permission_delay,
            ),
            success_auto_advance: duration_from_env(
                "SUCCESS_AUTO_ADVANCE_MS",
                defaults.success_auto_advance,
            ),
            undo_window: duration_from_env("UNDO_WINDOW_MS", defaults.undo_window),
        }
    }

    /// 設定値の妥当性を検証する
    ///
    /// # 戻り値
    /// 妥当な場合はOk(())、スキャン時間や取り消し猶予が0の場合は設定エラー
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("SCAN_BANK_DURATION_MS", self.bank_scan_duration),
            ("SCAN_SMS_DURATION_MS", self.sms_scan_duration),
            ("UNDO_WINDOW_MS", self.undo_window),
        ];
        for (key, value) in required {
            if value.is_zero() {
                return Err(AppError::configuration(format!(
                    "{key} には1ms以上を指定してください"
                )));
            }
        }
        Ok(())
    }
}

fn duration_from_env(key: &str, default: Duration) -> Duration {
    parse_duration_ms(key, std::env::var(key).ok(), default)
}

/// ミリ秒文字列をDurationに変換する
///
/// # 引数
/// * `key` - ログ出力用の設定名
/// * `raw` - 環境変数の値（未設定ならNone）
/// * `default` - 既定値
///
/// # 戻り値
/// 解析できた値、または既定値
pub fn parse_duration_ms(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<u64>() {
        Ok(ms) => {
            log::debug!("タイミング設定を上書きします: {key}={ms}ms");
            Duration::from_millis(ms)
        }
        Err(e) => {
            log::warn!(
                "{key} の値 '{raw}' を解析できません（{e}）。既定値 {}ms を使用します",
                default.as_millis()
            );
            default
        }
    }
}
