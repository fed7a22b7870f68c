use crate::shared::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 選択できるリマインダーの日数
pub const REMINDER_DAY_OPTIONS: [u8; 3] = [1, 3, 7];

/// 表示テーマ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// セッション中の設定（永続化しない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub notifications: bool,
    pub reminder_days: u8,
    pub day_of_reminder: bool,
    pub monthly_summary: bool,
    pub local_only: bool,
    pub currency: String,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            reminder_days: 3,
            day_of_reminder: false,
            monthly_summary: false,
            local_only: true,
            currency: "USD".to_string(),
            theme: Theme::System,
        }
    }
}

/// 設定の更新内容
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsDto {
    pub notifications: Option<bool>,
    pub reminder_days: Option<u8>,
    pub day_of_reminder: Option<bool>,
    pub monthly_summary: Option<bool>,
    pub local_only: Option<bool>,
    pub currency: Option<String>,
    pub theme: Option<Theme>,
}

impl Settings {
    /// 更新内容を適用する
    ///
    /// # 引数
    /// * `dto` - 更新内容（Noneの項目は変更しない）
    ///
    /// # 戻り値
    /// 成功時はOk(())、リマインダー日数や通貨コードが不正な場合はエラー（設定は変更されない）
    pub fn apply(&mut self, dto: &UpdateSettingsDto) -> AppResult<()> {
        if let Some(days) = dto.reminder_days {
            if !REMINDER_DAY_OPTIONS.contains(&days) {
                return Err(AppError::validation(format!(
                    "リマインダーの日数は1・3・7日のいずれかです: {days}"
                )));
            }
        }
        if let Some(currency) = &dto.currency {
            let valid = currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic());
            if !valid {
                return Err(AppError::validation(format!(
                    "通貨コードが不正です: {currency}"
                )));
            }
        }

        if let Some(value) = dto.notifications {
            self.notifications = value;
        }
        if let Some(value) = dto.reminder_days {
            self.reminder_days = value;
        }
        if let Some(value) = dto.day_of_reminder {
            self.day_of_reminder = value;
        }
        if let Some(value) = dto.monthly_summary {
            self.monthly_summary = value;
        }
        if let Some(value) = dto.local_only {
            self.local_only = value;
        }
        if let Some(value) = &dto.currency {
            self.currency = value.to_uppercase();
        }
        if let Some(value) = dto.theme {
            self.theme = value;
        }

        log::info!("設定を更新しました: {self:?}");
        Ok(())
    }
}
