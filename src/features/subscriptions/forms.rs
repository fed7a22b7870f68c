use super::commands::{generate_subscription_id, normalize_create_dto, parse_amount_lenient};
use super::models::{CreateSubscriptionDto, Frequency, Subscription, UpdateSubscriptionDto};
use crate::features::catalog::{find_popular_services, PopularService};
use serde::Serialize;

/// 追加シートのタブ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddSheetTab {
    #[default]
    Popular,
    Custom,
}

/// 追加シートの入力状態
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSubscriptionForm {
    pub tab: AddSheetTab,
    pub search: String,
    pub selected_service: Option<String>,
    pub name: String,
    pub amount: String,
    pub frequency: Frequency,
    pub next_billing: String,
    pub reminder: bool,
}

impl Default for AddSubscriptionForm {
    fn default() -> Self {
        Self {
            tab: AddSheetTab::Popular,
            search: String::new(),
            selected_service: None,
            name: String::new(),
            amount: String::new(),
            frequency: Frequency::Monthly,
            next_billing: "Jan 1, 2025".to_string(),
            reminder: true,
        }
    }
}

impl AddSubscriptionForm {
    /// 検索語に一致する人気サービス
    pub fn suggestions(&self) -> Vec<&'static PopularService> {
        find_popular_services(&self.search)
    }

    /// 人気サービスを選んで名前と金額を埋める
    pub fn choose_service(&mut self, service: &PopularService) {
        self.selected_service = Some(service.name.to_string());
        self.name = service.name.to_string();
        self.amount = service.price.to_string();
    }

    /// 入力フォームを表示するか（サービス選択済みかカスタムタブ）
    pub fn shows_form(&self) -> bool {
        self.selected_service.is_some() || self.tab == AddSheetTab::Custom
    }

    /// 送信ボタンを押せるか
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.amount.is_empty()
    }

    /// 入力内容からサブスクリプションを組み立てる
    pub fn build(&self) -> Subscription {
        let dto = CreateSubscriptionDto {
            name: self.name.clone(),
            amount: self.amount.clone(),
            frequency: Some(self.frequency),
            next_billing: self.next_billing.clone(),
            category: None,
        };
        normalize_create_dto(dto, generate_subscription_id())
    }
}

/// 詳細画面の編集フォーム
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailForm {
    pub id: String,
    pub name: String,
    pub amount: String,
    pub frequency: Frequency,
    pub next_billing: String,
    pub show_delete_confirm: bool,
    original: Subscription,
}

impl DetailForm {
    /// 選択中のサブスクリプションで初期化する
    pub fn from_subscription(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id.clone(),
            name: subscription.name.clone(),
            amount: subscription.amount.to_string(),
            frequency: subscription.frequency,
            next_billing: subscription.next_billing.clone(),
            show_delete_confirm: false,
            original: subscription.clone(),
        }
    }

    /// 元の値から変更があるか（保存ボタンの有効化条件）
    pub fn has_changes(&self) -> bool {
        self.name != self.original.name
            || self.amount != self.original.amount.to_string()
            || self.frequency != self.original.frequency
            || self.next_billing != self.original.next_billing
    }

    /// 保存用の更新内容
    pub fn to_patch(&self) -> UpdateSubscriptionDto {
        UpdateSubscriptionDto {
            name: Some(self.name.clone()),
            amount: Some(parse_amount_lenient(&self.amount)),
            frequency: Some(self.frequency),
            next_billing: Some(self.next_billing.clone()),
            ..Default::default()
        }
    }
}
