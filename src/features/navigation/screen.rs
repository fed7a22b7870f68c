use serde::{Deserialize, Serialize};
use std::fmt;

/// プロトタイプの画面（閉じた集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Welcome,
    DataSource,
    BankAuth,
    AccountSelection,
    SmsPermission,
    Scanning,
    Review,
    Success,
    Dashboard,
    AddSubscription,
    SubscriptionDetail,
    Cancellation,
    Settings,
    NotificationLanding,
}

impl Screen {
    pub const ALL: [Screen; 14] = [
        Screen::Welcome,
        Screen::DataSource,
        Screen::BankAuth,
        Screen::AccountSelection,
        Screen::SmsPermission,
        Screen::Scanning,
        Screen::Review,
        Screen::Success,
        Screen::Dashboard,
        Screen::AddSubscription,
        Screen::SubscriptionDetail,
        Screen::Cancellation,
        Screen::Settings,
        Screen::NotificationLanding,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Welcome => "welcome",
            Screen::DataSource => "data-source",
            Screen::BankAuth => "bank-auth",
            Screen::AccountSelection => "account-selection",
            Screen::SmsPermission => "sms-permission",
            Screen::Scanning => "scanning",
            Screen::Review => "review",
            Screen::Success => "success",
            Screen::Dashboard => "dashboard",
            Screen::AddSubscription => "add-subscription",
            Screen::SubscriptionDetail => "subscription-detail",
            Screen::Cancellation => "cancellation",
            Screen::Settings => "settings",
            Screen::NotificationLanding => "notification-landing",
        }
    }

    /// 選択中のサブスクリプションがないと表示できない画面か
    pub fn requires_current_subscription(self) -> bool {
        matches!(self, Screen::SubscriptionDetail | Screen::Cancellation)
    }
}

impl Default for Screen {
    fn default() -> Self {
        Screen::Welcome
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
