use super::screen::Screen;
use crate::features::acquisition::ScanMethod;
use crate::shared::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

/// 画面遷移のきっかけとなる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    Continue,
    Back,
    SelectMethod(ScanMethod),
    Complete,
    ScanComplete,
    Commit,
    ReviewLater,
    AddSubscription,
    ViewDetail,
    OpenSettings,
    OpenNotification,
    Save,
    Close,
    Delete,
    StartCancellation,
    ConfirmCancelled,
    View,
    Dismiss,
}

impl Trigger {
    pub const ALL: [Trigger; 20] = [
        Trigger::Continue,
        Trigger::Back,
        Trigger::SelectMethod(ScanMethod::Bank),
        Trigger::SelectMethod(ScanMethod::Sms),
        Trigger::SelectMethod(ScanMethod::Manual),
        Trigger::Complete,
        Trigger::ScanComplete,
        Trigger::Commit,
        Trigger::ReviewLater,
        Trigger::AddSubscription,
        Trigger::ViewDetail,
        Trigger::OpenSettings,
        Trigger::OpenNotification,
        Trigger::Save,
        Trigger::Close,
        Trigger::Delete,
        Trigger::StartCancellation,
        Trigger::ConfirmCancelled,
        Trigger::View,
        Trigger::Dismiss,
    ];
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::SelectMethod(method) => write!(f, "SelectMethod({method})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// 遷移表。戻る操作も画面ごとの固定の遷移先で表す（履歴スタックは持たない）
///
/// # 戻り値
/// 遷移先の画面。その画面で受け付けない操作ならNone
pub fn next_screen(from: Screen, trigger: Trigger) -> Option<Screen> {
    use Screen::*;

    let to = match (from, trigger) {
        (Welcome, Trigger::Continue) => DataSource,

        (DataSource, Trigger::SelectMethod(ScanMethod::Bank)) => BankAuth,
        (DataSource, Trigger::SelectMethod(ScanMethod::Sms)) => SmsPermission,
        (DataSource, Trigger::SelectMethod(ScanMethod::Manual)) => Dashboard,
        (DataSource, Trigger::Back) => Welcome,

        (BankAuth, Trigger::Complete) => AccountSelection,
        (BankAuth, Trigger::Back) => DataSource,

        (AccountSelection, Trigger::Complete) => Scanning,
        (AccountSelection, Trigger::Back) => BankAuth,

        (SmsPermission, Trigger::Complete) => Scanning,
        (SmsPermission, Trigger::Back) => DataSource,

        (Scanning, Trigger::ScanComplete) => Review,

        (Review, Trigger::Commit) => Success,
        (Review, Trigger::ReviewLater) => Dashboard,

        (Success, Trigger::Continue) => Dashboard,

        (Dashboard, Trigger::AddSubscription) => AddSubscription,
        (Dashboard, Trigger::ViewDetail) => SubscriptionDetail,
        (Dashboard, Trigger::OpenSettings) => Settings,
        (Dashboard, Trigger::OpenNotification) => NotificationLanding,

        (AddSubscription, Trigger::Save | Trigger::Close) => Dashboard,

        (SubscriptionDetail, Trigger::Save | Trigger::Delete | Trigger::Back) => Dashboard,
        (SubscriptionDetail, Trigger::StartCancellation) => Cancellation,

        (Cancellation, Trigger::Back) => SubscriptionDetail,
        (Cancellation, Trigger::ConfirmCancelled) => Dashboard,

        (Settings, Trigger::Back) => Dashboard,

        (NotificationLanding, Trigger::View) => SubscriptionDetail,
        (NotificationLanding, Trigger::Dismiss) => Dashboard,

        _ => return None,
    };
    Some(to)
}

/// 画面で受け付ける操作の一覧
pub fn available_triggers(screen: Screen) -> Vec<Trigger> {
    Trigger::ALL
        .into_iter()
        .filter(|trigger| next_screen(screen, *trigger).is_some())
        .collect()
}

/// 遷移の前提条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionGuard {
    /// 選択中のサブスクリプションがあるか
    pub has_current_subscription: bool,
}

/// 画面の有限状態機械
#[derive(Debug, Clone, Default)]
pub struct Router {
    current: Screen,
    /// 遷移のたびに増える番号（タイマーが古い画面に作用しないよう照合する）
    visit: u64,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn visit(&self) -> u64 {
        self.visit
    }

    /// 操作を適用して画面を遷移する
    ///
    /// # 引数
    /// * `trigger` - 操作
    /// * `guard` - 遷移の前提条件
    ///
    /// # 戻り値
    /// 遷移後の画面。受け付けない操作なら状態を変えずにエラー
    pub fn dispatch(&mut self, trigger: Trigger, guard: TransitionGuard) -> AppResult<Screen> {
        let from = self.current;
        let to = next_screen(from, trigger).ok_or_else(|| {
            log::warn!("無効な画面遷移を拒否しました: {from} + {trigger}");
            AppError::invalid_transition(from.to_string(), trigger.to_string())
        })?;

        if to.requires_current_subscription() && !guard.has_current_subscription {
            log::warn!("選択中のサブスクリプションがないため {to} に遷移できません");
            return Err(AppError::invalid_transition(
                from.to_string(),
                format!("{trigger}（選択中のサブスクリプションなし）"),
            ));
        }

        self.current = to;
        self.visit += 1;
        log::info!("画面遷移: {from} -> {to} ({trigger})");
        Ok(to)
    }
}
