use crate::features::acquisition::{
    demo_notification_subscription, AccountSelection, BankAuthBack, BankAuthFlow, ScanMethod,
    ScanProgress, SmsPermission,
};
use crate::features::catalog::{cancellation_guide_for, CancellationGuide};
use crate::features::navigation::{next_screen, Router, Screen, TransitionGuard, Trigger};
use crate::features::settings::{Settings, UpdateSettingsDto};
use crate::features::subscriptions::{
    monthly_equivalent, AddSubscriptionForm, DashboardSnapshot, DashboardView, DetailForm,
    Subscription, SubscriptionStore, UpdateSubscriptionDto,
};
use crate::shared::config::TimingConfig;
use crate::shared::errors::{AppError, AppResult};
use serde::Serialize;
use tokio::time::Instant;

/// 登録完了画面に表示する内容
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub count: usize,
    pub monthly_total: f64,
}

/// 画面表示用のスナップショット
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub screen: Screen,
    pub visit: u64,
    pub scan_method: Option<ScanMethod>,
    pub scan_progress: Option<ScanProgress>,
    pub bank_auth: BankAuthFlow,
    pub accounts: AccountSelection,
    pub sms_permission: SmsPermission,
    pub candidates: Vec<Subscription>,
    pub last_commit: Option<CommitSummary>,
    pub current: Option<Subscription>,
    pub pending_deletions: Vec<String>,
    pub dashboard: DashboardSnapshot,
    pub settings: Settings,
}

/// プロトタイプ全体の状態
///
/// 画面ごとのコールバックに対応する操作メソッドを持ち、複合的な遷移
/// （手動入力でのストア初期化、スキャン結果の候補設定など）を1回の呼び出しで行う。
/// 時間経過を伴う処理は `AppRuntime` が担当する。
#[derive(Debug)]
pub struct PrototypeApp {
    router: Router,
    store: SubscriptionStore,
    timing: TimingConfig,
    scan_method: Option<ScanMethod>,
    scan_progress: Option<ScanProgress>,
    dashboard: DashboardView,
    bank_auth: BankAuthFlow,
    accounts: AccountSelection,
    sms: SmsPermission,
    add_form: AddSubscriptionForm,
    detail_form: Option<DetailForm>,
    last_commit: Option<CommitSummary>,
    settings: Settings,
}

impl Default for PrototypeApp {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

impl PrototypeApp {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            router: Router::new(),
            store: SubscriptionStore::new(),
            timing,
            scan_method: None,
            scan_progress: None,
            dashboard: DashboardView::default(),
            bank_auth: BankAuthFlow::new(),
            accounts: AccountSelection::default(),
            sms: SmsPermission::default(),
            add_form: AddSubscriptionForm::default(),
            detail_form: None,
            last_commit: None,
            settings: Settings::default(),
        }
    }

    // ---- 参照 ----

    pub fn screen(&self) -> Screen {
        self.router.current()
    }

    pub fn visit(&self) -> u64 {
        self.router.visit()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn store(&self) -> &SubscriptionStore {
        &self.store
    }

    pub fn scan_method(&self) -> Option<ScanMethod> {
        self.scan_method
    }

    pub fn scan_progress(&self) -> Option<&ScanProgress> {
        self.scan_progress.as_ref()
    }

    pub fn bank_auth(&self) -> &BankAuthFlow {
        &self.bank_auth
    }

    pub fn accounts(&self) -> &AccountSelection {
        &self.accounts
    }

    pub fn sms_permission(&self) -> &SmsPermission {
        &self.sms
    }

    pub fn add_form(&self) -> &AddSubscriptionForm {
        &self.add_form
    }

    pub fn add_form_mut(&mut self) -> &mut AddSubscriptionForm {
        &mut self.add_form
    }

    pub fn detail_form(&self) -> Option<&DetailForm> {
        self.detail_form.as_ref()
    }

    pub fn detail_form_mut(&mut self) -> Option<&mut DetailForm> {
        self.detail_form.as_mut()
    }

    pub fn last_commit(&self) -> Option<&CommitSummary> {
        self.last_commit.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dashboard_view(&self) -> DashboardView {
        self.dashboard
    }

    /// 現在のビュー状態でダッシュボードを計算する
    pub fn dashboard_snapshot(&self) -> DashboardSnapshot {
        self.dashboard.render(&self.store.visible())
    }

    /// 選択中サブスクリプションの解約手順
    pub fn cancellation_guide(&self) -> Option<&'static CancellationGuide> {
        self.store
            .current()
            .map(|s| cancellation_guide_for(&s.name))
    }

    /// 通知画面でプレビューするサブスクリプション（空ならデモ用のNetflix）
    pub fn notification_preview(&self) -> Subscription {
        self.store
            .visible()
            .into_iter()
            .next()
            .unwrap_or_else(demo_notification_subscription)
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            screen: self.screen(),
            visit: self.visit(),
            scan_method: self.scan_method,
            scan_progress: self.scan_progress.clone(),
            bank_auth: self.bank_auth.clone(),
            accounts: self.accounts.clone(),
            sms_permission: self.sms,
            candidates: self.store.candidates().to_vec(),
            last_commit: self.last_commit.clone(),
            current: self.store.current().cloned(),
            pending_deletions: self.store.pending().iter().map(|p| p.id.clone()).collect(),
            dashboard: self.dashboard_snapshot(),
            settings: self.settings.clone(),
        }
    }

    // ---- 遷移 ----

    /// 現在の画面がその操作を受け付けるか確認する（状態は変えない）
    fn ensure_accepts(&self, trigger: Trigger) -> AppResult<()> {
        let screen = self.screen();
        match next_screen(screen, trigger) {
            Some(_) => Ok(()),
            None => Err(AppError::invalid_transition(
                screen.to_string(),
                trigger.to_string(),
            )),
        }
    }

    /// ルーターで遷移し、遷移先の画面ローカル状態を初期化する
    fn transition(&mut self, trigger: Trigger) -> AppResult<Screen> {
        let guard = TransitionGuard {
            has_current_subscription: self.store.current().is_some(),
        };
        let from = self.screen();
        let to = self.router.dispatch(trigger, guard)?;

        if from == Screen::Dashboard && to != Screen::Dashboard {
            let finalized = self.store.finalize_all();
            if !finalized.is_empty() {
                log::info!(
                    "ダッシュボードを離れたため保留中の削除を確定しました: {}件",
                    finalized.len()
                );
            }
        }

        match to {
            Screen::BankAuth => self.bank_auth = BankAuthFlow::new(),
            Screen::AccountSelection => self.accounts = AccountSelection::default(),
            Screen::SmsPermission => self.sms = SmsPermission::default(),
            Screen::Scanning => {
                self.scan_progress = self.scan_method.map(ScanProgress::start);
            }
            Screen::AddSubscription => self.add_form = AddSubscriptionForm::default(),
            Screen::SubscriptionDetail => {
                self.detail_form = self.store.current().map(DetailForm::from_subscription);
            }
            Screen::Dashboard => self.detail_form = None,
            _ => {}
        }
        Ok(to)
    }

    // ---- オンボーディング ----

    /// ウェルカム画面から進む
    pub fn continue_onboarding(&mut self) -> AppResult<Screen> {
        self.transition(Trigger::Continue)
    }

    /// データの取得方法を選ぶ
    ///
    /// 手動入力を選んだ場合はストアを空にしてダッシュボードへ進む。
    pub fn select_method(&mut self, method: ScanMethod) -> AppResult<Screen> {
        let to = self.transition(Trigger::SelectMethod(method))?;
        self.scan_method = Some(method);
        if method == ScanMethod::Manual {
            self.store.clear();
        }
        Ok(to)
    }

    /// 戻る
    ///
    /// 銀行連携画面では画面内のステップを先に戻り、検索ステップからのみ画面を離れる。
    pub fn go_back(&mut self) -> AppResult<Screen> {
        if self.screen() == Screen::BankAuth {
            if let BankAuthBack::Step(step) = self.bank_auth.back() {
                log::debug!("銀行連携のステップを戻りました: {step:?}");
                return Ok(Screen::BankAuth);
            }
        }
        self.transition(Trigger::Back)
    }

    // ---- 銀行連携 ----

    pub fn search_banks(&mut self, query: &str) {
        self.bank_auth.search = query.to_string();
    }

    pub fn select_bank(&mut self, bank_id: &str) -> bool {
        self.screen() == Screen::BankAuth && self.bank_auth.select_bank(bank_id)
    }

    /// ログイン情報の送信を開始する
    ///
    /// # 戻り値
    /// 待ちを開始した場合はその送信番号
    pub fn submit_credentials(&mut self) -> Option<u64> {
        if self.screen() != Screen::BankAuth {
            return None;
        }
        self.bank_auth.submit_credentials()
    }

    /// ログイン情報送信の待ちが終わった
    ///
    /// # 引数
    /// * `request_id` - `submit_credentials` が返した送信番号
    pub fn finish_credentials(&mut self, request_id: u64) -> bool {
        self.screen() == Screen::BankAuth && self.bank_auth.finish_credentials(request_id)
    }

    /// 認証コードの送信を開始する
    pub fn submit_two_factor(&mut self) -> Option<u64> {
        if self.screen() != Screen::BankAuth {
            return None;
        }
        self.bank_auth.submit_two_factor()
    }

    /// 認証コードの確認が終わり、口座選択へ進む
    pub fn complete_bank_auth(&mut self, request_id: u64) -> AppResult<Screen> {
        self.ensure_accepts(Trigger::Complete)?;
        if self.screen() != Screen::BankAuth || !self.bank_auth.finish_two_factor(request_id) {
            return Err(AppError::invalid_transition(
                self.screen().to_string(),
                "Complete（認証コード未確認）".to_string(),
            ));
        }
        self.transition(Trigger::Complete)
    }

    // ---- 口座選択 ----

    pub fn toggle_account(&mut self, account_id: &str) -> bool {
        self.screen() == Screen::AccountSelection && self.accounts.toggle(account_id)
    }

    /// 選択した口座のスキャンを開始する
    pub fn continue_to_scan(&mut self) -> AppResult<Screen> {
        self.ensure_accepts(Trigger::Complete)?;
        if self.screen() != Screen::AccountSelection {
            return Err(AppError::invalid_transition(
                self.screen().to_string(),
                "Complete（口座選択画面以外）".to_string(),
            ));
        }
        if !self.accounts.can_continue() {
            return Err(AppError::validation("スキャンする口座を1つ以上選択してください"));
        }
        self.transition(Trigger::Complete)
    }

    // ---- SMS権限 ----

    pub fn request_sms_permission(&mut self) {
        if self.screen() == Screen::SmsPermission {
            self.sms.request();
        }
    }

    pub fn deny_sms_permission(&mut self) {
        self.sms.deny();
    }

    /// 権限を許可する
    ///
    /// # 戻り値
    /// 待ちを開始した場合はその番号
    pub fn allow_sms_permission(&mut self) -> Option<u64> {
        if self.screen() != Screen::SmsPermission {
            return None;
        }
        self.sms.allow()
    }

    /// 権限許可の待ちが終わり、スキャンへ進む
    pub fn complete_sms_permission(&mut self, request_id: u64) -> AppResult<Screen> {
        self.ensure_accepts(Trigger::Complete)?;
        if self.screen() != Screen::SmsPermission || !self.sms.finish(request_id) {
            return Err(AppError::invalid_transition(
                self.screen().to_string(),
                "Complete（権限未許可）".to_string(),
            ));
        }
        self.transition(Trigger::Complete)
    }

    // ---- スキャン・レビュー ----

    /// スキャン中の進捗を反映する（スキャン画面以外では無視）
    pub fn record_scan_progress(&mut self, progress: ScanProgress) {
        if self.screen() == Screen::Scanning {
            self.scan_progress = Some(progress);
        }
    }

    /// スキャン結果を候補に設定してレビューへ進む
    pub fn complete_scan(&mut self, detected: Vec<Subscription>) -> AppResult<Screen> {
        let to = self.transition(Trigger::ScanComplete)?;
        self.store.set_candidates(detected);
        Ok(to)
    }

    pub fn toggle_candidate(&mut self, id: &str) -> bool {
        self.store.toggle_candidate(id)
    }

    pub fn update_candidate(&mut self, id: &str, patch: &UpdateSubscriptionDto) -> bool {
        self.store.update_candidate(id, patch)
    }

    /// 選択した候補を登録して完了画面へ進む
    ///
    /// # 戻り値
    /// 登録件数と月額合計。選択が0件の場合はバリデーションエラー
    pub fn commit_review(&mut self) -> AppResult<CommitSummary> {
        self.ensure_accepts(Trigger::Commit)?;
        let selected = self.store.selected_candidates();
        if selected.is_empty() {
            return Err(AppError::validation("登録するサブスクリプションを選択してください"));
        }

        self.transition(Trigger::Commit)?;
        let count = self.store.commit_candidates();
        let summary = CommitSummary {
            count,
            monthly_total: monthly_equivalent(&selected),
        };
        self.last_commit = Some(summary.clone());
        Ok(summary)
    }

    /// 後でレビューする（候補は破棄し、ストアは変更しない）
    pub fn review_later(&mut self) -> AppResult<Screen> {
        let to = self.transition(Trigger::ReviewLater)?;
        self.store.discard_candidates();
        Ok(to)
    }

    /// 完了画面からダッシュボードへ進む
    pub fn continue_from_success(&mut self) -> AppResult<Screen> {
        self.transition(Trigger::Continue)
    }

    // ---- ダッシュボード ----

    pub fn set_dashboard_view(&mut self, view: DashboardView) {
        self.dashboard = view;
    }

    pub fn toggle_sort(&mut self) {
        self.dashboard = self.dashboard.toggle_sort();
    }

    pub fn cycle_category(&mut self) {
        self.dashboard = self.dashboard.cycle_category();
    }

    pub fn toggle_status(&mut self) {
        self.dashboard = self.dashboard.toggle_status();
    }

    pub fn toggle_calendar(&mut self) {
        self.dashboard = self.dashboard.toggle_calendar();
    }

    pub fn toggle_selected(&mut self, id: &str) -> bool {
        self.store.toggle_selected(id)
    }

    /// 取り消し可能な削除を開始する
    ///
    /// 保留中の削除はダッシュボードを離れた時点で確定する。
    ///
    /// # 戻り値
    /// 削除が確定する時刻。ダッシュボード以外、または対象が存在しない場合はNone
    pub fn delete_with_undo(&mut self, id: &str, now: Instant) -> Option<Instant> {
        if self.screen() != Screen::Dashboard {
            log::debug!("ダッシュボード以外では取り消し可能な削除を行いません: id={id}");
            return None;
        }
        self.store.remove(id, now, self.timing.undo_window)
    }

    /// 保留中の削除を取り消す（タイマーの解除は `AppRuntime::undo_delete` が行う）
    pub(crate) fn undo_delete(&mut self, id: &str) -> bool {
        self.store.undo(id)
    }

    /// 猶予時間を過ぎた削除を確定する
    pub fn finalize_deletion(&mut self, id: &str, now: Instant) -> Option<Subscription> {
        self.store.finalize_if_due(id, now)
    }

    pub fn finalize_due_deletions(&mut self, now: Instant) -> Vec<Subscription> {
        self.store.finalize_due(now)
    }

    // ---- 追加シート ----

    pub fn open_add_subscription(&mut self) -> AppResult<Screen> {
        self.transition(Trigger::AddSubscription)
    }

    /// 入力内容を登録してダッシュボードへ戻る
    pub fn save_new_subscription(&mut self) -> AppResult<Subscription> {
        self.ensure_accepts(Trigger::Save)?;
        if !self.add_form.is_valid() {
            return Err(AppError::validation("サービス名と金額を入力してください"));
        }

        let subscription = self.add_form.build();
        self.store.add(subscription.clone())?;
        self.transition(Trigger::Save)?;
        Ok(subscription)
    }

    pub fn close_add_subscription(&mut self) -> AppResult<Screen> {
        self.transition(Trigger::Close)
    }

    // ---- 詳細・解約 ----

    /// 詳細画面を開く
    pub fn view_detail(&mut self, id: &str) -> AppResult<Screen> {
        self.ensure_accepts(Trigger::ViewDetail)?;
        if !self.store.set_current(id) {
            return Err(AppError::not_found(format!("ID {id} のサブスクリプション")));
        }
        self.transition(Trigger::ViewDetail)
    }

    /// 編集内容を保存してダッシュボードへ戻る（変更がなければ保存しない）
    pub fn save_detail(&mut self) -> AppResult<Screen> {
        self.ensure_accepts(Trigger::Save)?;
        if let Some(form) = self.detail_form.as_ref().filter(|f| f.has_changes()) {
            let patch = form.to_patch();
            let id = form.id.clone();
            self.store.update(&id, &patch);
        }
        self.transition(Trigger::Save)
    }

    pub fn request_delete_detail(&mut self) {
        if let Some(form) = self.detail_form.as_mut() {
            form.show_delete_confirm = true;
        }
    }

    pub fn cancel_delete_detail(&mut self) {
        if let Some(form) = self.detail_form.as_mut() {
            form.show_delete_confirm = false;
        }
    }

    /// 確認済みの削除を実行してダッシュボードへ戻る
    pub fn confirm_delete_detail(&mut self) -> AppResult<Screen> {
        self.ensure_accepts(Trigger::Delete)?;
        let confirmed = self
            .detail_form
            .as_ref()
            .is_some_and(|f| f.show_delete_confirm);
        if !confirmed {
            return Err(AppError::validation("削除の確認が必要です"));
        }
        if let Some(id) = self.store.current().map(|s| s.id.clone()) {
            self.store.remove_now(&id);
        }
        self.transition(Trigger::Delete)
    }

    pub fn start_cancellation(&mut self) -> AppResult<Screen> {
        self.transition(Trigger::StartCancellation)
    }

    /// 解約済みとして記録し、ダッシュボードへ戻る
    pub fn confirm_cancelled(&mut self) -> AppResult<Screen> {
        self.ensure_accepts(Trigger::ConfirmCancelled)?;
        if let Some(id) = self.store.current().map(|s| s.id.clone()) {
            self.store.remove_now(&id);
        }
        self.transition(Trigger::ConfirmCancelled)
    }

    // ---- 設定・通知 ----

    pub fn open_settings(&mut self) -> AppResult<Screen> {
        self.transition(Trigger::OpenSettings)
    }

    pub fn update_settings(&mut self, dto: &UpdateSettingsDto) -> AppResult<()> {
        self.settings.apply(dto)
    }

    pub fn open_notification(&mut self) -> AppResult<Screen> {
        self.transition(Trigger::OpenNotification)
    }

    /// 通知から先頭のサブスクリプションの詳細を開く（ストアが空なら何もしない）
    pub fn view_notification(&mut self) -> AppResult<Screen> {
        self.ensure_accepts(Trigger::View)?;
        let first_id = match self.store.visible().first() {
            Some(first) => first.id.clone(),
            None => {
                log::debug!("表示するサブスクリプションがないため通知の表示を無視します");
                return Ok(self.screen());
            }
        };
        self.store.set_current(&first_id);
        self.transition(Trigger::View)
    }

    pub fn dismiss_notification(&mut self) -> AppResult<Screen> {
        self.transition(Trigger::Dismiss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::acquisition::detected_subscriptions;
    use crate::features::catalog::POPULAR_SERVICES;

    /// スキャン結果を登録済みのダッシュボード状態
    fn dashboard_with_detected() -> PrototypeApp {
        let mut app = PrototypeApp::default();
        app.continue_onboarding().unwrap();
        app.select_method(ScanMethod::Sms).unwrap();
        app.request_sms_permission();
        let request = app.allow_sms_permission().unwrap();
        app.complete_sms_permission(request).unwrap();
        app.complete_scan(detected_subscriptions()).unwrap();
        app.commit_review().unwrap();
        app.continue_from_success().unwrap();
        app
    }

    #[test]
    fn test_welcome_only_accepts_continue() {
        let mut app = PrototypeApp::default();
        assert!(app.open_settings().is_err());
        assert!(app.go_back().is_err());
        assert_eq!(app.screen(), Screen::Welcome);

        assert_eq!(app.continue_onboarding().unwrap(), Screen::DataSource);
    }

    #[test]
    fn test_manual_method_clears_store() {
        let mut app = PrototypeApp::default();
        app.store.add(detected_subscriptions().remove(0)).unwrap();
        app.continue_onboarding().unwrap();

        assert_eq!(app.select_method(ScanMethod::Manual).unwrap(), Screen::Dashboard);
        assert!(app.store().is_empty());
        assert!(app.dashboard_snapshot().is_empty);
    }

    #[test]
    fn test_bank_flow_requires_two_factor() {
        let mut app = PrototypeApp::default();
        app.continue_onboarding().unwrap();
        app.select_method(ScanMethod::Bank).unwrap();

        assert!(app.complete_bank_auth(0).is_err());
        assert_eq!(app.screen(), Screen::BankAuth);

        assert!(app.select_bank("chase"));
        let request = app.submit_credentials().unwrap();
        assert!(app.finish_credentials(request));
        let request = app.submit_two_factor().unwrap();
        assert_eq!(
            app.complete_bank_auth(request).unwrap(),
            Screen::AccountSelection
        );
    }

    #[test]
    fn test_bank_back_walks_sub_steps() {
        let mut app = PrototypeApp::default();
        app.continue_onboarding().unwrap();
        app.select_method(ScanMethod::Bank).unwrap();
        app.select_bank("bofa");

        assert_eq!(app.go_back().unwrap(), Screen::BankAuth);
        assert_eq!(app.go_back().unwrap(), Screen::DataSource);
    }

    #[test]
    fn test_account_selection_requires_one_account() {
        let mut app = PrototypeApp::default();
        app.continue_onboarding().unwrap();
        app.select_method(ScanMethod::Bank).unwrap();
        app.select_bank("chase");
        let request = app.submit_credentials().unwrap();
        app.finish_credentials(request);
        let request = app.submit_two_factor().unwrap();
        app.complete_bank_auth(request).unwrap();

        app.toggle_account("checking");
        app.toggle_account("credit1");
        assert!(app.continue_to_scan().is_err());
        assert_eq!(app.screen(), Screen::AccountSelection);

        app.toggle_account("savings");
        assert_eq!(app.continue_to_scan().unwrap(), Screen::Scanning);
        assert_eq!(app.scan_progress().unwrap().percent, 0);
    }

    #[test]
    fn test_commit_requires_selection() {
        let mut app = PrototypeApp::default();
        app.continue_onboarding().unwrap();
        app.select_method(ScanMethod::Sms).unwrap();
        app.request_sms_permission();
        let request = app.allow_sms_permission().unwrap();
        app.complete_sms_permission(request).unwrap();
        app.complete_scan(detected_subscriptions()).unwrap();

        for candidate in detected_subscriptions() {
            app.toggle_candidate(&candidate.id);
        }
        assert!(app.commit_review().is_err());
        assert_eq!(app.screen(), Screen::Review);

        app.toggle_candidate("1");
        let summary = app.commit_review().unwrap();
        assert_eq!(summary.count, 1);
        assert!((summary.monthly_total - 15.99).abs() < 1e-9);
        assert_eq!(app.screen(), Screen::Success);
    }

    #[test]
    fn test_review_later_leaves_store_untouched() {
        let mut app = PrototypeApp::default();
        app.continue_onboarding().unwrap();
        app.select_method(ScanMethod::Sms).unwrap();
        app.request_sms_permission();
        let request = app.allow_sms_permission().unwrap();
        app.complete_sms_permission(request).unwrap();
        app.complete_scan(detected_subscriptions()).unwrap();

        assert_eq!(app.review_later().unwrap(), Screen::Dashboard);
        assert!(app.store().is_empty());
        assert!(app.store().candidates().is_empty());
    }

    #[test]
    fn test_detail_edit_and_cancellation() {
        let mut app = dashboard_with_detected();

        // 選択なしでは詳細に入れない
        assert!(app.view_detail("missing").is_err());
        assert_eq!(app.screen(), Screen::Dashboard);

        app.view_detail("3").unwrap();
        let form = app.detail_form_mut().unwrap();
        form.amount = "49.99".to_string();
        app.save_detail().unwrap();
        assert_eq!(app.store().get("3").unwrap().amount, 49.99);

        app.view_detail("2").unwrap();
        app.start_cancellation().unwrap();
        assert_eq!(app.cancellation_guide().unwrap().steps.len(), 4);
        assert_eq!(app.confirm_cancelled().unwrap(), Screen::Dashboard);
        assert!(app.store().get("2").is_none());
        assert_eq!(app.store().len(), 7);
    }

    #[test]
    fn test_detail_delete_requires_confirmation() {
        let mut app = dashboard_with_detected();
        app.view_detail("5").unwrap();

        assert!(app.confirm_delete_detail().is_err());
        app.request_delete_detail();
        app.confirm_delete_detail().unwrap();

        assert!(app.store().get("5").is_none());
        assert!(app.store().current().is_none());
    }

    #[test]
    fn test_add_subscription_from_popular() {
        let mut app = PrototypeApp::default();
        app.continue_onboarding().unwrap();
        app.select_method(ScanMethod::Manual).unwrap();
        app.open_add_subscription().unwrap();

        assert!(app.save_new_subscription().is_err());

        let spotify = POPULAR_SERVICES[1];
        app.add_form_mut().choose_service(&spotify);
        let added = app.save_new_subscription().unwrap();

        assert_eq!(added.name, "Spotify");
        assert_eq!(app.screen(), Screen::Dashboard);
        assert_eq!(app.store().len(), 1);
    }

    #[test]
    fn test_notification_view_on_empty_store_is_noop() {
        let mut app = PrototypeApp::default();
        app.continue_onboarding().unwrap();
        app.select_method(ScanMethod::Manual).unwrap();
        app.open_notification().unwrap();

        assert_eq!(app.notification_preview().id, "demo");
        assert_eq!(app.view_notification().unwrap(), Screen::NotificationLanding);
        assert_eq!(app.dismiss_notification().unwrap(), Screen::Dashboard);
    }

    #[test]
    fn test_notification_view_opens_first_item() {
        let mut app = dashboard_with_detected();
        app.open_notification().unwrap();

        assert_eq!(app.view_notification().unwrap(), Screen::SubscriptionDetail);
        assert_eq!(app.store().current().unwrap().id, "1");
        assert_eq!(app.detail_form().unwrap().name, "Netflix");
    }

    #[test]
    fn test_staged_delete_and_undo() {
        let mut app = dashboard_with_detected();
        let now = Instant::now();
        let before = app.dashboard_snapshot();

        let deadline = app.delete_with_undo("4", now).unwrap();
        assert_eq!(deadline, now + app.timing().undo_window);
        assert_eq!(app.dashboard_snapshot().active.len(), 7);

        assert!(app.undo_delete("4"));
        assert_eq!(app.dashboard_snapshot().active, before.active);

        app.delete_with_undo("4", now);
        assert!(app.finalize_deletion("4", now).is_none());
        assert!(app.finalize_deletion("4", deadline).is_some());
        assert_eq!(app.store().all().len(), 7);
    }

    #[test]
    fn test_leaving_dashboard_finalizes_pending_deletions() {
        let mut app = dashboard_with_detected();
        let now = Instant::now();
        app.delete_with_undo("4", now).unwrap();
        app.delete_with_undo("5", now).unwrap();

        app.open_settings().unwrap();

        assert!(app.store().pending().is_empty());
        assert_eq!(app.store().all().len(), 6);
        assert!(!app.undo_delete("4"));
        // ダッシュボード以外では保留削除を開始しない
        assert!(app.delete_with_undo("1", now).is_none());
        assert_eq!(app.go_back().unwrap(), Screen::Dashboard);
        assert_eq!(app.store().all().len(), 6);
    }

    #[test]
    fn test_snapshot_serializes() {
        let app = dashboard_with_detected();
        let json = serde_json::to_value(app.snapshot()).unwrap();

        assert_eq!(json["screen"], "dashboard");
        assert_eq!(json["lastCommit"]["count"], 8);
        assert_eq!(json["settings"]["currency"], "USD");
    }
}
