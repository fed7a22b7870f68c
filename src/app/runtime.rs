use super::state::PrototypeApp;
use crate::features::acquisition::{run_scan, ScanMethod, ScanOutcome};
use crate::features::navigation::Screen;
use crate::shared::config::TimingConfig;
use crate::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 画面に入った直後の情報（ロック解放後にタイマーを起動するため）
struct ScreenEntry {
    screen: Screen,
    visit: u64,
    scan_method: Option<ScanMethod>,
}

/// アプリ状態と時間経過で進む処理を束ねるランタイム
///
/// 画面ごとのタイマーは現在の画面のトークンの子トークンを持ち、画面が変わるたびに
/// まとめてキャンセルされる。取り消し可能な削除のタイマーも削除ごとに子トークンを持ち、
/// ダッシュボードを離れると保留中の削除は確定済みになる。
#[derive(Clone)]
pub struct AppRuntime {
    state: Arc<Mutex<PrototypeApp>>,
    timing: TimingConfig,
    screen_token: Arc<Mutex<CancellationToken>>,
    undo_tokens: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

impl AppRuntime {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(PrototypeApp::new(timing.clone()))),
            timing,
            screen_token: Arc::new(Mutex::new(CancellationToken::new())),
            undo_tokens: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, PrototypeApp>> {
        self.state
            .lock()
            .map_err(|e| AppError::concurrency(format!("アプリ状態のロックエラー: {e}")))
    }

    /// 状態を読み取る
    pub fn read<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&PrototypeApp) -> T,
    {
        let app = self.lock()?;
        Ok(f(&*app))
    }

    /// 状態を更新する
    ///
    /// 更新で画面が変わった場合は、前の画面のタイマーをキャンセルし、
    /// 遷移先の画面が必要とするタイマー（スキャン、完了画面の自動遷移）を起動する。
    ///
    /// # 引数
    /// * `f` - `PrototypeApp` の操作
    ///
    /// # 戻り値
    /// 操作の結果
    pub fn update<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut PrototypeApp) -> AppResult<T>,
    {
        let (result, entry) = {
            let mut app = self.lock()?;
            let before = app.visit();
            let result = f(&mut *app);
            let entry = (app.visit() != before).then(|| ScreenEntry {
                screen: app.screen(),
                visit: app.visit(),
                scan_method: app.scan_method(),
            });
            (result, entry)
        };

        if let Some(entry) = entry {
            self.enter_screen(entry)?;
        }
        result
    }

    fn enter_screen(&self, entry: ScreenEntry) -> AppResult<()> {
        {
            let mut token = self
                .screen_token
                .lock()
                .map_err(|e| AppError::concurrency(format!("画面トークンのロックエラー: {e}")))?;
            token.cancel();
            *token = CancellationToken::new();
        }
        self.undo_tokens()?.clear();

        match entry.screen {
            Screen::Scanning => {
                let method = entry.scan_method.unwrap_or(ScanMethod::Bank);
                self.spawn_scan(method, entry.visit)?;
            }
            Screen::Success => {
                self.spawn_screen_timer(self.timing.success_auto_advance, |app| {
                    app.continue_from_success().map(|_| ())
                })?;
            }
            _ => {}
        }
        Ok(())
    }

    fn current_screen_token(&self) -> AppResult<CancellationToken> {
        let token = self
            .screen_token
            .lock()
            .map_err(|e| AppError::concurrency(format!("画面トークンのロックエラー: {e}")))?;
        Ok(token.child_token())
    }

    /// 現在の画面にいる間だけ有効なタイマーを起動する
    ///
    /// 待ち時間の経過時に画面が変わっていれば何もしない。
    fn spawn_screen_timer<F>(&self, delay: Duration, apply: F) -> AppResult<JoinHandle<()>>
    where
        F: FnOnce(&mut PrototypeApp) -> AppResult<()> + Send + 'static,
    {
        let token = self.current_screen_token()?;
        let visit = self.read(|app| app.visit())?;
        let runtime = self.clone();

        Ok(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("画面を離れたためタイマーを破棄しました");
                }
                _ = tokio::time::sleep(delay) => {
                    let result = runtime.update(|app| {
                        if app.visit() != visit {
                            log::debug!("画面が変わっているためタイマーを無視します");
                            return Ok(());
                        }
                        apply(app)
                    });
                    if let Err(e) = result {
                        log::warn!("タイマー処理に失敗しました: {e}");
                    }
                }
            }
        }))
    }

    fn spawn_scan(&self, method: ScanMethod, visit: u64) -> AppResult<JoinHandle<()>> {
        let token = self.current_screen_token()?;
        let runtime = self.clone();

        Ok(tokio::spawn(async move {
            let (tx, mut rx) = mpsc::unbounded_channel();

            let forwarder = {
                let runtime = runtime.clone();
                tokio::spawn(async move {
                    while let Some(progress) = rx.recv().await {
                        let result = runtime.update(|app| {
                            if app.visit() == visit {
                                app.record_scan_progress(progress);
                            }
                            Ok(())
                        });
                        if let Err(e) = result {
                            log::warn!("スキャン進捗の反映に失敗しました: {e}");
                        }
                    }
                })
            };

            let outcome = run_scan(method, &runtime.timing, Some(tx), token).await;
            if let Err(e) = forwarder.await {
                log::warn!("スキャン進捗の転送タスクが異常終了しました: {e}");
            }

            match outcome {
                ScanOutcome::Completed(detected) => {
                    let result = runtime.update(|app| {
                        if app.visit() != visit {
                            return Ok(());
                        }
                        app.complete_scan(detected).map(|_| ())
                    });
                    if let Err(e) = result {
                        log::warn!("スキャン結果の反映に失敗しました: {e}");
                    }
                }
                ScanOutcome::Cancelled => {
                    log::debug!("スキャン結果は破棄されました");
                }
            }
        }))
    }

    /// ログイン情報を送信し、待ち時間のあとに認証コード入力へ進む
    ///
    /// 待ちの間にステップを戻った場合、その送信の待ちは再送信後も完了しない。
    pub fn submit_credentials(&self) -> AppResult<bool> {
        let Some(request) = self.update(|app| Ok(app.submit_credentials()))? else {
            return Ok(false);
        };
        self.spawn_screen_timer(self.timing.credentials_delay, move |app| {
            app.finish_credentials(request);
            Ok(())
        })?;
        Ok(true)
    }

    /// 認証コードを送信し、待ち時間のあとに口座選択へ進む
    pub fn submit_two_factor(&self) -> AppResult<bool> {
        let Some(request) = self.update(|app| Ok(app.submit_two_factor()))? else {
            return Ok(false);
        };
        self.spawn_screen_timer(self.timing.two_factor_delay, move |app| {
            if app.bank_auth().is_awaiting(request) {
                app.complete_bank_auth(request)?;
            }
            Ok(())
        })?;
        Ok(true)
    }

    /// SMS権限を許可し、待ち時間のあとにスキャンへ進む
    pub fn allow_sms_permission(&self) -> AppResult<bool> {
        let Some(request) = self.update(|app| Ok(app.allow_sms_permission()))? else {
            return Ok(false);
        };
        self.spawn_screen_timer(self.timing.sms_permission_delay, move |app| {
            if app.sms_permission().is_awaiting(request) {
                app.complete_sms_permission(request)?;
            }
            Ok(())
        })?;
        Ok(true)
    }

    /// 取り消し可能な削除を開始する
    ///
    /// 猶予時間が過ぎると削除が確定する。同じIDを削除待ちの間に再度削除しても
    /// 期限は延長されない。タイマーはダッシュボードにいる間だけ有効。
    ///
    /// # 戻り値
    /// 削除が確定する時刻。ダッシュボード以外、または対象が存在しない場合はNone
    pub fn delete_with_undo(&self, id: &str) -> AppResult<Option<Instant>> {
        let now = Instant::now();
        let staged = self.update(|app| {
            let was_pending = app.store().is_pending(id);
            Ok(app
                .delete_with_undo(id, now)
                .map(|deadline| (deadline, !was_pending)))
        })?;
        let (deadline, newly_staged) = match staged {
            Some(staged) => staged,
            None => return Ok(None),
        };
        if !newly_staged {
            return Ok(Some(deadline));
        }

        // 同じIDに残っていたタイマーは止める
        let token = self.current_screen_token()?;
        if let Some(stale) = self.undo_tokens()?.insert(id.to_string(), token.clone()) {
            stale.cancel();
        }

        let runtime = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("削除の確定タイマーを停止しました: id={id}");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    let result = runtime.update(|app| {
                        Ok(app.finalize_deletion(&id, Instant::now()))
                    });
                    if let Err(e) = result {
                        log::warn!("削除の確定に失敗しました: id={id}, {e}");
                    }
                    if let Ok(mut tokens) = runtime.undo_tokens() {
                        // 差し替え済みの場合は新しいタイマーのトークンを残す
                        if !token.is_cancelled() {
                            tokens.remove(&id);
                        }
                    }
                }
            }
        });

        Ok(Some(deadline))
    }

    /// 削除を取り消す
    pub fn undo_delete(&self, id: &str) -> AppResult<bool> {
        if let Some(token) = self.undo_tokens()?.remove(id) {
            token.cancel();
        }
        self.update(|app| Ok(app.undo_delete(id)))
    }

    fn undo_tokens(&self) -> AppResult<MutexGuard<'_, HashMap<String, CancellationToken>>> {
        self.undo_tokens
            .lock()
            .map_err(|e| AppError::concurrency(format!("取り消しトークンのロックエラー: {e}")))
    }

    /// 指定の画面に遷移するまで待つ
    ///
    /// # 戻り値
    /// 遷移した場合はOk(())、制限時間を過ぎた場合はエラー
    pub async fn wait_for_screen(&self, screen: Screen, limit: Duration) -> AppResult<()> {
        let wait = async {
            loop {
                if self.read(|app| app.screen())? == screen {
                    return Ok::<(), AppError>(());
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };

        tokio::time::timeout(limit, wait).await.map_err(|_| {
            AppError::cancelled(format!("{screen} への遷移を待機中にタイムアウトしました"))
        })?
    }
}
