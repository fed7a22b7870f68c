use crate::shared::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 請求サイクル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// 月額換算した金額を返す（年額は÷12、週額は×4）
    pub fn monthly_amount(self, amount: f64) -> f64 {
        match self {
            Frequency::Weekly => amount * 4.0,
            Frequency::Monthly => amount,
            Frequency::Yearly => amount / 12.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(AppError::validation(format!(
                "支払いサイクルは'weekly'、'monthly'、'yearly'のいずれかである必要があります: {other}"
            ))),
        }
    }
}

/// サブスクリプションデータモデル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    /// アバター表示用の1文字
    pub logo: String,
    pub amount: f64,
    pub frequency: Frequency,
    /// 次回請求日の表示ラベル（日付型ではない）
    pub next_billing: String,
    /// 検出結果レビューで登録対象かどうか
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Subscription {
    /// 新しいサブスクリプションを作成する（ロゴは名前の先頭文字から導出）
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        frequency: Frequency,
        next_billing: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            logo: derive_logo(&name),
            name,
            amount,
            frequency,
            next_billing: next_billing.into(),
            selected: true,
            category: None,
        }
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = logo.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// 月額換算の金額
    pub fn monthly_equivalent(&self) -> f64 {
        self.frequency.monthly_amount(self.amount)
    }

    /// 解約済み（"ended" を含む）かどうか
    pub fn is_inactive(&self) -> bool {
        self.next_billing.to_lowercase().contains("ended")
    }

    /// 今期の支払いが済んでいる（"paid" を含む）かどうか
    pub fn is_paid(&self) -> bool {
        self.next_billing.to_lowercase().contains("paid")
    }

    /// 更新内容をマージする
    ///
    /// 空の名前や負の金額は無視する（UIを壊さない方針）。
    pub fn apply_patch(&mut self, patch: &UpdateSubscriptionDto) {
        if let Some(ref name) = patch.name {
            if name.trim().is_empty() {
                log::warn!("空のサービス名は無視します: id={}", self.id);
            } else {
                self.name = name.trim().to_string();
            }
        }
        if let Some(ref logo) = patch.logo {
            self.logo = logo.clone();
        }
        if let Some(amount) = patch.amount {
            if amount.is_finite() && amount >= 0.0 {
                self.amount = amount;
            } else {
                log::warn!("不正な金額は無視します: id={}, amount={amount}", self.id);
            }
        }
        if let Some(frequency) = patch.frequency {
            self.frequency = frequency;
        }
        if let Some(ref next_billing) = patch.next_billing {
            self.next_billing = next_billing.clone();
        }
        if let Some(ref category) = patch.category {
            self.category = category.clone();
        }
        if let Some(selected) = patch.selected {
            self.selected = selected;
        }
    }
}

/// 名前の先頭文字を大文字にしてロゴにする
pub fn derive_logo(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// サブスクリプション作成用DTO（フォーム入力そのまま）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubscriptionDto {
    pub name: String,
    /// 入力欄の文字列。数値として解釈できなければ0になる
    pub amount: String,
    pub frequency: Option<Frequency>,
    pub next_billing: String,
    pub category: Option<String>,
}

/// サブスクリプション更新用DTO
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionDto {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
    pub next_billing: Option<String>,
    /// `Some(None)` でカテゴリを外す
    pub category: Option<Option<String>>,
    pub selected: Option<bool>,
}
