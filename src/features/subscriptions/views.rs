//! ストアから計算される表示用の値
//!
//! すべて副作用のない関数で、読み出しのたびに再計算する。

use super::models::Subscription;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// カレンダーの擬似的な周期（日）
pub const CALENDAR_CYCLE_DAYS: usize = 28;

/// インサイト画面に表示する上位件数
pub const INSIGHTS_TOP_COUNT: usize = 5;

/// ホームタブに表示する件数
pub const HOME_PREVIEW_COUNT: usize = 4;

/// 予算バーの基準額
pub const MONTHLY_BUDGET: f64 = 200.0;

/// 月額換算の合計
pub fn monthly_equivalent(items: &[Subscription]) -> f64 {
    items.iter().map(Subscription::monthly_equivalent).sum()
}

/// 並び順のキー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// 日付順（日付型がないため元の順序のまま）
    #[default]
    Date,
    /// 金額の高い順
    Cost,
    /// 名前順（大文字小文字を区別しない）
    Name,
}

impl SortKey {
    /// 並び替えボタンの切り替え（日付 ↔ 金額）
    pub fn toggled(self) -> Self {
        match self {
            SortKey::Date => SortKey::Cost,
            SortKey::Cost | SortKey::Name => SortKey::Date,
        }
    }
}

/// 指定キーで並べ替えたリストを返す（安定ソート）
pub fn sort_by(items: &[Subscription], key: SortKey) -> Vec<Subscription> {
    let mut sorted = items.to_vec();
    match key {
        SortKey::Cost => sorted.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
        SortKey::Name => sorted.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortKey::Date => {}
    }
    sorted
}

/// カテゴリフィルタ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Entertainment,
    Utilities,
}

impl CategoryFilter {
    /// 照合に使うカテゴリ名（Allは照合しない）
    pub fn tag(self) -> Option<&'static str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Entertainment => Some("entertainment"),
            CategoryFilter::Utilities => Some("utilities"),
        }
    }

    /// カテゴリボタンの巡回（all → entertainment → utilities → all）
    pub fn cycled(self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Entertainment,
            CategoryFilter::Entertainment => CategoryFilter::Utilities,
            CategoryFilter::Utilities => CategoryFilter::All,
        }
    }
}

/// カテゴリで絞り込む（カテゴリ未設定の要素はAll以外では除外）
pub fn filter_by_category(items: &[Subscription], filter: CategoryFilter) -> Vec<Subscription> {
    match filter.tag() {
        None => items.to_vec(),
        Some(tag) => items
            .iter()
            .filter(|s| s.category.as_deref() == Some(tag))
            .cloned()
            .collect(),
    }
}

/// 有効・解約済みに分ける
///
/// # 戻り値
/// (有効なもの, 解約済みのもの)
pub fn partition_active_inactive(items: &[Subscription]) -> (Vec<Subscription>, Vec<Subscription>) {
    items.iter().cloned().partition(|s| !s.is_inactive())
}

/// 28日周期の擬似カレンダーに割り当てる（`(index * 7) % 28 + 1` 日目）
pub fn bucket_by_calendar_day(items: &[Subscription]) -> BTreeMap<u32, Vec<Subscription>> {
    let mut buckets: BTreeMap<u32, Vec<Subscription>> = BTreeMap::new();
    for (index, item) in items.iter().enumerate() {
        let day = ((index * 7) % CALENDAR_CYCLE_DAYS + 1) as u32;
        buckets.entry(day).or_default().push(item.clone());
    }
    buckets
}

/// 指定日に割り当てられた金額の合計（換算なし）
pub fn day_total(buckets: &BTreeMap<u32, Vec<Subscription>>, day: u32) -> f64 {
    buckets
        .get(&day)
        .map(|subs| subs.iter().map(|s| s.amount).sum())
        .unwrap_or(0.0)
}

/// 金額の高い順に上位n件
pub fn top_n(items: &[Subscription], n: usize) -> Vec<Subscription> {
    let mut ranked = sort_by(items, SortKey::Cost);
    ranked.truncate(n);
    ranked
}

/// 予算に対する割合（0〜100%）
pub fn budget_progress(total: f64, budget: f64) -> f64 {
    if budget <= 0.0 {
        return 100.0;
    }
    ((total / budget) * 100.0).clamp(0.0, 100.0)
}

/// 請求ラベルから読み取った支払い状況
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingStatus {
    pub label: String,
    pub is_paid: bool,
}

/// 次回請求ラベルから支払い状況を判定する
pub fn billing_status(next_billing: &str) -> BillingStatus {
    let lower = next_billing.to_lowercase();
    if lower.contains("tomorrow") || lower.contains("1 day") {
        return BillingStatus {
            label: "Due Tomorrow".to_string(),
            is_paid: false,
        };
    }

    let is_paid = lower.contains("paid") || lower.contains("oct") || lower.contains("nov");
    BillingStatus {
        label: next_billing.to_string(),
        is_paid,
    }
}

/// ダッシュボードのタブ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    Dashboard,
    #[default]
    Subs,
    Insights,
    Settings,
}

/// 有効/すべての表示切り替え
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    All,
}

impl StatusFilter {
    pub fn toggled(self) -> Self {
        match self {
            StatusFilter::Active => StatusFilter::All,
            StatusFilter::All => StatusFilter::Active,
        }
    }
}

/// ダッシュボードの表示状態（不変値として受け渡す）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub tab: DashboardTab,
    pub sort: SortKey,
    pub category: CategoryFilter,
    pub status: StatusFilter,
    pub show_calendar: bool,
    pub selected_day: Option<u32>,
}

impl DashboardView {
    /// タブを切り替える（カレンダー表示は常に閉じる）
    pub fn with_tab(self, tab: DashboardTab) -> Self {
        Self {
            tab,
            show_calendar: false,
            ..self
        }
    }

    pub fn with_sort(self, sort: SortKey) -> Self {
        Self { sort, ..self }
    }

    pub fn with_category(self, category: CategoryFilter) -> Self {
        Self { category, ..self }
    }

    pub fn with_status(self, status: StatusFilter) -> Self {
        Self { status, ..self }
    }

    pub fn toggle_sort(self) -> Self {
        self.with_sort(self.sort.toggled())
    }

    pub fn cycle_category(self) -> Self {
        self.with_category(self.category.cycled())
    }

    pub fn toggle_status(self) -> Self {
        self.with_status(self.status.toggled())
    }

    pub fn toggle_calendar(self) -> Self {
        Self {
            show_calendar: !self.show_calendar,
            ..self
        }
    }

    pub fn with_selected_day(self, day: Option<u32>) -> Self {
        Self {
            selected_day: day,
            ..self
        }
    }

    /// 並べ替え → 絞り込み → 有効/解約済みの分割を行い表示内容を組み立てる
    ///
    /// # 引数
    /// * `items` - 表示対象のサブスクリプション（削除待ちを除いたもの）
    pub fn render(&self, items: &[Subscription]) -> DashboardSnapshot {
        let sorted = sort_by(items, self.sort);
        let filtered = filter_by_category(&sorted, self.category);
        let (active, inactive) = partition_active_inactive(&filtered);
        let monthly_total = monthly_equivalent(items);

        let calendar = bucket_by_calendar_day(&filtered);
        let selected_day_total = self.selected_day.map(|day| day_total(&calendar, day));

        DashboardSnapshot {
            view: *self,
            is_empty: items.is_empty(),
            monthly_total,
            budget_progress: budget_progress(monthly_total, MONTHLY_BUDGET),
            home_preview: active.iter().take(HOME_PREVIEW_COUNT).cloned().collect(),
            inactive: match self.status {
                StatusFilter::All => inactive,
                StatusFilter::Active => Vec::new(),
            },
            active,
            top: top_n(&filtered, INSIGHTS_TOP_COUNT),
            insights_total: monthly_equivalent(&filtered),
            calendar,
            selected_day_total,
        }
    }
}

/// ダッシュボードの描画用スナップショット
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub view: DashboardView,
    /// 登録が1件もない場合の空状態
    pub is_empty: bool,
    pub monthly_total: f64,
    pub budget_progress: f64,
    pub active: Vec<Subscription>,
    /// 状態フィルタが「すべて」の場合のみ
    pub inactive: Vec<Subscription>,
    pub home_preview: Vec<Subscription>,
    pub top: Vec<Subscription>,
    pub insights_total: f64,
    pub calendar: BTreeMap<u32, Vec<Subscription>>,
    pub selected_day_total: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::models::Frequency;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    fn sub(id: &str, name: &str, amount: f64, frequency: Frequency) -> Subscription {
        Subscription::new(id, name, amount, frequency, "Dec 20")
    }

    fn samples() -> Vec<Subscription> {
        vec![
            sub("1", "Netflix", 15.99, Frequency::Monthly).with_category("entertainment"),
            sub("2", "Spotify", 9.99, Frequency::Monthly).with_category("entertainment"),
            sub("3", "Adobe CC", 54.99, Frequency::Monthly),
            sub("4", "iCloud", 2.99, Frequency::Monthly).with_category("utilities"),
            sub("5", "Figma", 144.0, Frequency::Yearly),
            Subscription::new("6", "Hulu", 7.99, Frequency::Monthly, "Ended Oct 3")
                .with_category("entertainment"),
        ]
    }

    #[derive(Debug, Clone)]
    struct ArbitraryItems(Vec<Subscription>);

    impl Arbitrary for ArbitraryItems {
        fn arbitrary(g: &mut Gen) -> Self {
            let len = usize::arbitrary(g) % 12;
            let items = (0..len)
                .map(|i| {
                    let cents = u32::arbitrary(g) % 100_000;
                    let frequency = *g
                        .choose(&[Frequency::Weekly, Frequency::Monthly, Frequency::Yearly])
                        .unwrap();
                    sub(&i.to_string(), "Service", cents as f64 / 100.0, frequency)
                })
                .collect();
            ArbitraryItems(items)
        }
    }

    #[test]
    fn test_monthly_equivalent_examples() {
        assert_eq!(monthly_equivalent(&[]), 0.0);
        assert_eq!(
            monthly_equivalent(&[sub("1", "A", 120.0, Frequency::Yearly)]),
            10.0
        );
        assert_eq!(
            monthly_equivalent(&[sub("1", "A", 10.0, Frequency::Weekly)]),
            40.0
        );
    }

    #[quickcheck]
    fn prop_monthly_equivalent_order_independent(items: ArbitraryItems, seed: usize) -> bool {
        let mut shuffled = items.0.clone();
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left(seed % len);
            shuffled.reverse();
        }
        (monthly_equivalent(&items.0) - monthly_equivalent(&shuffled)).abs() < 1e-6
    }

    #[quickcheck]
    fn prop_sort_by_cost_is_non_increasing(items: ArbitraryItems) -> bool {
        let sorted = sort_by(&items.0, SortKey::Cost);
        sorted.len() == items.0.len() && sorted.windows(2).all(|w| w[0].amount >= w[1].amount)
    }

    #[test]
    fn test_sort_by_name_and_date() {
        let items = samples();
        let by_name: Vec<String> = sort_by(&items, SortKey::Name)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(
            by_name,
            vec!["Adobe CC", "Figma", "Hulu", "iCloud", "Netflix", "Spotify"]
        );

        // 日付順は元の順序のまま
        assert_eq!(sort_by(&items, SortKey::Date), items);
    }

    #[test]
    fn test_filter_by_category() {
        let items = samples();
        assert_eq!(filter_by_category(&items, CategoryFilter::All).len(), 6);

        let entertainment = filter_by_category(&items, CategoryFilter::Entertainment);
        assert_eq!(entertainment.len(), 3);

        let utilities = filter_by_category(&items, CategoryFilter::Utilities);
        assert_eq!(utilities.len(), 1);
        assert_eq!(utilities[0].name, "iCloud");
    }

    #[test]
    fn test_partition_active_inactive() {
        let (active, inactive) = partition_active_inactive(&samples());
        assert_eq!(active.len(), 5);
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].name, "Hulu");
    }

    #[test]
    fn test_bucket_by_calendar_day() {
        let items = samples();
        let buckets = bucket_by_calendar_day(&items);

        // 0→1日, 1→8日, 2→15日, 3→22日, 4→1日, 5→8日
        assert_eq!(buckets.keys().copied().collect::<Vec<_>>(), vec![1, 8, 15, 22]);
        assert_eq!(buckets[&1].len(), 2);
        assert_eq!(buckets[&8].len(), 2);
        assert!((day_total(&buckets, 1) - (15.99 + 144.0)).abs() < 1e-9);
        assert_eq!(day_total(&buckets, 2), 0.0);
    }

    #[test]
    fn test_top_n() {
        let top = top_n(&samples(), 3);
        let names: Vec<&str> = top.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Figma", "Adobe CC", "Netflix"]);
        assert!(top_n(&[], 5).is_empty());
    }

    #[test]
    fn test_billing_status() {
        assert_eq!(billing_status("Tomorrow").label, "Due Tomorrow");
        assert!(!billing_status("in 1 day").is_paid);
        assert!(billing_status("Paid Dec 1").is_paid);
        assert!(billing_status("Nov 30").is_paid);
        assert!(!billing_status("Dec 20").is_paid);
    }

    #[test]
    fn test_budget_progress() {
        assert_eq!(budget_progress(100.0, 200.0), 50.0);
        assert_eq!(budget_progress(500.0, 200.0), 100.0);
        assert_eq!(budget_progress(10.0, 0.0), 100.0);
    }

    #[test]
    fn test_dashboard_view_transitions() {
        let view = DashboardView::default().toggle_calendar();
        assert!(view.show_calendar);

        let switched = view.with_tab(DashboardTab::Insights);
        assert!(!switched.show_calendar);
        assert_eq!(switched.tab, DashboardTab::Insights);

        let view = DashboardView::default();
        assert_eq!(view.toggle_sort().sort, SortKey::Cost);
        assert_eq!(view.toggle_sort().toggle_sort().sort, SortKey::Date);
        assert_eq!(
            view.cycle_category().cycle_category().cycle_category().category,
            CategoryFilter::All
        );
        assert_eq!(view.toggle_status().status, StatusFilter::All);
    }

    #[test]
    fn test_render_pipeline() {
        let items = samples();
        let snapshot = DashboardView::default()
            .with_sort(SortKey::Cost)
            .with_category(CategoryFilter::Entertainment)
            .render(&items);

        let active: Vec<&str> = snapshot.active.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(active, vec!["Netflix", "Spotify"]);
        // 状態フィルタが有効のみの場合、解約済みは表示しない
        assert!(snapshot.inactive.is_empty());
        assert!((snapshot.monthly_total - monthly_equivalent(&items)).abs() < 1e-9);
        assert!(!snapshot.is_empty);

        let all = DashboardView::default()
            .with_status(StatusFilter::All)
            .render(&items);
        assert_eq!(all.inactive.len(), 1);
        assert_eq!(all.home_preview.len(), HOME_PREVIEW_COUNT);
    }

    #[test]
    fn test_render_selected_day_total() {
        let snapshot = DashboardView::default()
            .with_selected_day(Some(8))
            .render(&samples());
        assert!((snapshot.selected_day_total.unwrap() - (9.99 + 7.99)).abs() < 1e-9);
    }
}
