/// 設定機能モジュール
///
/// 通知・リマインダー・表示に関するセッション中の設定を扱います。
pub mod models;

pub use models::{Settings, Theme, UpdateSettingsDto, REMINDER_DAY_OPTIONS};
