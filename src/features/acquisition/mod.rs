/// データ取得（擬似）機能モジュール
///
/// 銀行連携・SMS権限・口座選択の各ステップと、時間経過で進む擬似スキャンを提供します。
/// 外部サービスとは一切通信せず、すべての処理は固定の待ち時間のあと必ず成功します。
pub mod account_selection;
pub mod bank_auth;
pub mod mock_data;
pub mod models;
pub mod simulator;
pub mod sms_permission;

pub use account_selection::AccountSelection;
pub use bank_auth::{BankAuthBack, BankAuthFlow, BankAuthStep};
pub use mock_data::{demo_notification_subscription, detected_subscriptions};
pub use models::{ScanMethod, ScanProgress, PROGRESS_STEP, PROGRESS_TICKS};
pub use simulator::{run_scan, ScanOutcome};
pub use sms_permission::SmsPermission;
