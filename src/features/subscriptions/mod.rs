/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - セッション中のストア（追加、更新、取り消し可能な削除、選択）
/// - 検出結果のレビュー候補
/// - 月額合計・並べ替え・絞り込み・カレンダー割り当てなどの表示計算
/// - 入力フォームの正規化
pub mod commands;
pub mod forms;
pub mod models;
pub mod store;
pub mod views;

// 公開インターフェース
pub use commands::{
    generate_subscription_id, normalize_create_dto, parse_amount_lenient, validate_subscription,
    PLACEHOLDER_NAME,
};
pub use forms::{AddSheetTab, AddSubscriptionForm, DetailForm};
pub use models::{CreateSubscriptionDto, Frequency, Subscription, UpdateSubscriptionDto};
pub use store::{PendingDeletion, SubscriptionStore};
pub use views::{
    billing_status, bucket_by_calendar_day, budget_progress, day_total, filter_by_category,
    monthly_equivalent, partition_active_inactive, sort_by, top_n, BillingStatus,
    CategoryFilter, DashboardSnapshot, DashboardTab, DashboardView, SortKey, StatusFilter,
};
