use super::runtime::AppRuntime;
use crate::features::acquisition::ScanMethod;
use crate::features::navigation::Screen;
use crate::features::subscriptions::{DashboardTab, DashboardView, StatusFilter};
use crate::shared::config::TimingConfig;
use crate::shared::errors::AppResult;
use std::time::Duration;

/// 画面遷移を待つ上限
const SCREEN_WAIT_LIMIT: Duration = Duration::from_secs(30);

/// 現在の状態をJSONでログ出力する
fn log_snapshot(runtime: &AppRuntime, label: &str) -> AppResult<()> {
    let snapshot = runtime.read(|app| app.snapshot())?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    log::info!("[{label}] {json}");
    Ok(())
}

/// 銀行連携からダッシュボードまでの一連の操作を実行する
///
/// # 処理内容
/// 1. ウェルカム → データ取得方法（銀行）
/// 2. 銀行選択 → ログイン → 二段階認証 → 口座選択
/// 3. スキャン → レビュー → 登録 → 完了画面の自動遷移
/// 4. ダッシュボードでの削除と取り消し
pub async fn run_walkthrough(timing: TimingConfig) -> AppResult<()> {
    let runtime = AppRuntime::new(timing.clone());

    runtime.update(|app| app.continue_onboarding())?;
    runtime.update(|app| app.select_method(ScanMethod::Bank))?;
    runtime.update(|app| {
        app.search_banks("chase");
        app.select_bank("chase");
        Ok(())
    })?;
    log_snapshot(&runtime, "bank-auth")?;

    runtime.submit_credentials()?;
    tokio::time::sleep(timing.credentials_delay + Duration::from_millis(50)).await;
    runtime.submit_two_factor()?;
    runtime
        .wait_for_screen(Screen::AccountSelection, SCREEN_WAIT_LIMIT)
        .await?;

    runtime.update(|app| app.continue_to_scan())?;
    runtime.wait_for_screen(Screen::Review, SCREEN_WAIT_LIMIT).await?;
    log_snapshot(&runtime, "review")?;

    let summary = runtime.update(|app| app.commit_review())?;
    log::info!(
        "{}件のサブスクリプションを登録しました（月額 ${:.2}）",
        summary.count,
        summary.monthly_total
    );
    runtime.wait_for_screen(Screen::Dashboard, SCREEN_WAIT_LIMIT).await?;

    runtime.update(|app| {
        app.set_dashboard_view(
            DashboardView::default()
                .with_tab(DashboardTab::Subs)
                .with_status(StatusFilter::All),
        );
        app.toggle_sort();
        Ok(())
    })?;
    log_snapshot(&runtime, "dashboard")?;

    runtime.delete_with_undo("7")?;
    runtime.delete_with_undo("4")?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    runtime.undo_delete("7")?;
    tokio::time::sleep(timing.undo_window + Duration::from_millis(100)).await;
    log_snapshot(&runtime, "after-delete")?;

    Ok(())
}
