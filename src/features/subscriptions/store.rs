use super::commands::validate_subscription;
use super::models::{Subscription, UpdateSubscriptionDto};
use crate::shared::errors::{AppError, AppResult};
use std::time::Duration;
use tokio::time::Instant;

/// 取り消し待ちの削除
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    pub id: String,
    /// この時刻を過ぎると削除が確定する
    pub deadline: Instant,
}

/// セッション中のサブスクリプションを保持するインメモリストア
///
/// 削除待ちの要素は `all()` には残るが、`visible()` からは即座に除外される。
#[derive(Debug, Default)]
pub struct SubscriptionStore {
    items: Vec<Subscription>,
    /// 詳細画面・解約画面で扱う選択中のID
    current: Option<String>,
    /// スキャン結果（レビュー中の未確定リスト）
    candidates: Vec<Subscription>,
    /// IDをキーにした削除待ちの順序付き集合
    pending: Vec<PendingDeletion>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のリストからストアを作成する
    ///
    /// # 戻り値
    /// 作成されたストア、またはIDの重複・不正な要素がある場合はエラー
    pub fn with_items(items: Vec<Subscription>) -> AppResult<Self> {
        let mut store = Self::new();
        for item in items {
            store.add(item)?;
        }
        Ok(store)
    }

    /// サブスクリプションを1件追加する
    ///
    /// # 引数
    /// * `item` - 正規化済みのサブスクリプション
    ///
    /// # 戻り値
    /// 成功時はOk(())、名前が空・金額が負・IDが重複する場合はバリデーションエラー
    pub fn add(&mut self, item: Subscription) -> AppResult<()> {
        validate_subscription(&item)?;

        if self.items.iter().any(|s| s.id == item.id) {
            return Err(AppError::validation(format!(
                "ID {} のサブスクリプションは既に存在します",
                item.id
            )));
        }

        log::info!(
            "サブスクリプションを追加しました: id={}, name={}",
            item.id,
            item.name
        );
        self.items.push(item);
        Ok(())
    }

    /// 指定IDの要素に更新内容をマージする
    ///
    /// # 戻り値
    /// 更新した場合はtrue。IDが見つからない場合は何もせずfalse
    pub fn update(&mut self, id: &str, patch: &UpdateSubscriptionDto) -> bool {
        match self.items.iter_mut().find(|s| s.id == id) {
            Some(item) => {
                item.apply_patch(patch);
                log::info!("サブスクリプションを更新しました: id={id}");
                true
            }
            None => {
                log::debug!("更新対象が見つからないため無視します: id={id}");
                false
            }
        }
    }

    /// 削除を仮実行する（取り消し猶予つき）
    ///
    /// # 引数
    /// * `id` - 削除対象のID
    /// * `now` - 現在時刻
    /// * `window` - 取り消し猶予時間
    ///
    /// # 戻り値
    /// 削除が確定する時刻。対象が存在しない場合はNone
    pub fn remove(&mut self, id: &str, now: Instant, window: Duration) -> Option<Instant> {
        if !self.items.iter().any(|s| s.id == id) {
            log::debug!("削除対象が見つからないため無視します: id={id}");
            return None;
        }

        if let Some(existing) = self.pending.iter().find(|p| p.id == id) {
            return Some(existing.deadline);
        }

        let deadline = now + window;
        self.pending.push(PendingDeletion {
            id: id.to_string(),
            deadline,
        });
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }

        log::info!(
            "削除を保留しました: id={id}, 猶予={}ms",
            window.as_millis()
        );
        Some(deadline)
    }

    /// 保留中の削除を取り消す
    ///
    /// # 戻り値
    /// 取り消した場合はtrue
    pub fn undo(&mut self, id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        let restored = self.pending.len() != before;

        if restored {
            log::info!("削除を取り消しました: id={id}");
        } else {
            log::debug!("取り消し対象の削除がありません: id={id}");
        }
        restored
    }

    /// 期限を過ぎた保留中の削除を確定する
    ///
    /// # 戻り値
    /// 確定して取り除いた要素
    pub fn finalize_due(&mut self, now: Instant) -> Vec<Subscription> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|p| p.deadline <= now)
            .map(|p| p.id.clone())
            .collect();

        due.iter()
            .filter_map(|id| self.finalize_if_due(id, now))
            .collect()
    }

    /// 指定IDの削除が期限切れなら確定する
    ///
    /// 取り消し後に再度削除された場合など、期限がまだ来ていなければ何もしない。
    pub fn finalize_if_due(&mut self, id: &str, now: Instant) -> Option<Subscription> {
        let position = self
            .pending
            .iter()
            .position(|p| p.id == id && p.deadline <= now)?;
        self.pending.remove(position);

        let removed = self.take_item(id);
        if let Some(ref item) = removed {
            log::info!("削除を確定しました: id={}, name={}", item.id, item.name);
        }
        removed
    }

    /// 保留中の削除を期限を待たずにすべて確定する
    pub fn finalize_all(&mut self) -> Vec<Subscription> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .iter()
            .filter_map(|p| self.take_item(&p.id))
            .inspect(|item| log::info!("削除を確定しました: id={}, name={}", item.id, item.name))
            .collect()
    }

    /// 猶予なしで即座に削除する
    pub fn remove_now(&mut self, id: &str) -> Option<Subscription> {
        self.pending.retain(|p| p.id != id);
        let removed = self.take_item(id);
        match removed {
            Some(ref item) => log::info!("サブスクリプションを削除しました: id={}", item.id),
            None => log::debug!("削除対象が見つからないため無視します: id={id}"),
        }
        removed
    }

    fn take_item(&mut self, id: &str) -> Option<Subscription> {
        let position = self.items.iter().position(|s| s.id == id)?;
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        Some(self.items.remove(position))
    }

    /// 選択フラグを立てる
    pub fn select(&mut self, id: &str) -> bool {
        self.set_selected(id, true)
    }

    /// 選択フラグを外す
    pub fn deselect(&mut self, id: &str) -> bool {
        self.set_selected(id, false)
    }

    /// 選択フラグを反転する
    pub fn toggle_selected(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|s| s.id == id) {
            Some(item) => {
                item.selected = !item.selected;
                true
            }
            None => {
                log::debug!("選択対象が見つからないため無視します: id={id}");
                false
            }
        }
    }

    fn set_selected(&mut self, id: &str, selected: bool) -> bool {
        match self.items.iter_mut().find(|s| s.id == id) {
            Some(item) => {
                item.selected = selected;
                true
            }
            None => false,
        }
    }

    /// ストアを空にする（手動入力で開始する場合）
    pub fn clear(&mut self) {
        self.items.clear();
        self.pending.clear();
        self.candidates.clear();
        self.current = None;
        log::info!("ストアを初期化しました");
    }

    /// 削除待ちを除いた表示対象の要素
    pub fn visible(&self) -> Vec<Subscription> {
        self.items
            .iter()
            .filter(|s| !self.is_pending(&s.id))
            .cloned()
            .collect()
    }

    /// 削除待ちを含むすべての要素
    pub fn all(&self) -> &[Subscription] {
        &self.items
    }

    /// 表示対象の要素をIDで取得する
    pub fn get(&self, id: &str) -> Option<&Subscription> {
        if self.is_pending(id) {
            return None;
        }
        self.items.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len() - self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn pending(&self) -> &[PendingDeletion] {
        &self.pending
    }

    /// 選択中のサブスクリプションを設定する
    ///
    /// # 戻り値
    /// 表示対象に存在すればtrue
    pub fn set_current(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.current = Some(id.to_string());
            true
        } else {
            log::debug!("選択対象が見つからないため無視します: id={id}");
            false
        }
    }

    /// 選択中のサブスクリプション
    pub fn current(&self) -> Option<&Subscription> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    /// スキャン結果をレビュー用の候補として設定する
    pub fn set_candidates(&mut self, candidates: Vec<Subscription>) {
        log::info!("検出結果を候補に設定しました: {}件", candidates.len());
        self.candidates = candidates;
    }

    pub fn candidates(&self) -> &[Subscription] {
        &self.candidates
    }

    /// 登録対象として選択されている候補
    pub fn selected_candidates(&self) -> Vec<Subscription> {
        self.candidates
            .iter()
            .filter(|c| c.selected)
            .cloned()
            .collect()
    }

    /// 候補の選択状態を反転する
    pub fn toggle_candidate(&mut self, id: &str) -> bool {
        match self.candidates.iter_mut().find(|c| c.id == id) {
            Some(candidate) => {
                candidate.selected = !candidate.selected;
                true
            }
            None => false,
        }
    }

    /// 候補の内容を編集する
    pub fn update_candidate(&mut self, id: &str, patch: &UpdateSubscriptionDto) -> bool {
        match self.candidates.iter_mut().find(|c| c.id == id) {
            Some(candidate) => {
                candidate.apply_patch(patch);
                true
            }
            None => false,
        }
    }

    /// 選択された候補をストアに取り込む
    ///
    /// 同じIDの要素が既にあれば置き換える。
    ///
    /// # 戻り値
    /// 取り込んだ件数
    pub fn commit_candidates(&mut self) -> usize {
        let selected = self.selected_candidates();
        let count = selected.len();

        for candidate in selected {
            if let Err(e) = validate_subscription(&candidate) {
                log::warn!("候補を登録できません: id={}, {}", candidate.id, e);
                continue;
            }
            self.pending.retain(|p| p.id != candidate.id);
            match self.items.iter_mut().find(|s| s.id == candidate.id) {
                Some(existing) => *existing = candidate,
                None => self.items.push(candidate),
            }
        }

        self.candidates.clear();
        log::info!("検出結果を登録しました: {count}件");
        count
    }

    /// 候補を破棄する（後でレビューする場合）
    pub fn discard_candidates(&mut self) {
        self.candidates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::models::Frequency;
    use crate::features::subscriptions::views::partition_active_inactive;

    const WINDOW: Duration = Duration::from_secs(5);

    fn sample_store() -> SubscriptionStore {
        SubscriptionStore::with_items(vec![
            Subscription::new("1", "Netflix", 15.99, Frequency::Monthly, "Dec 20"),
            Subscription::new("2", "Spotify", 9.99, Frequency::Monthly, "Dec 22"),
            Subscription::new("3", "Hulu", 7.99, Frequency::Monthly, "Ended Oct 3"),
        ])
        .unwrap()
    }

    #[test]
    fn test_add_rejects_invalid_items() {
        let mut store = SubscriptionStore::new();

        let blank = Subscription::new("1", "", 1.0, Frequency::Monthly, "");
        assert!(matches!(store.add(blank), Err(AppError::Validation(_))));

        let negative = Subscription::new("2", "Netflix", -1.0, Frequency::Monthly, "");
        assert!(store.add(negative).is_err());

        let ok = Subscription::new("3", "Netflix", 0.0, Frequency::Monthly, "");
        assert!(store.add(ok.clone()).is_ok());
        // ID重複は拒否
        assert!(store.add(ok).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = sample_store();
        let patch = UpdateSubscriptionDto {
            amount: Some(1.0),
            ..Default::default()
        };

        assert!(!store.update("missing", &patch));
        assert!(store.update("1", &patch));
        assert_eq!(store.get("1").unwrap().amount, 1.0);
        assert_eq!(store.get("2").unwrap().amount, 9.99);
    }

    #[test]
    fn test_remove_then_undo_restores_partition() {
        let mut store = sample_store();
        let before = partition_active_inactive(&store.visible());
        let now = Instant::now();

        assert!(store.remove("2", now, WINDOW).is_some());
        assert!(store.get("2").is_none());
        assert_eq!(store.visible().len(), 2);

        assert!(store.undo("2"));
        assert_eq!(partition_active_inactive(&store.visible()), before);

        // 期限が過ぎても何も確定しない
        assert!(store.finalize_due(now + WINDOW * 2).is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_remove_finalizes_after_window() {
        let mut store = sample_store();
        let now = Instant::now();

        store.remove("1", now, WINDOW);
        assert!(store.finalize_due(now + Duration::from_secs(4)).is_empty());

        let removed = store.finalize_due(now + WINDOW);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, "1");
        assert!(store.all().iter().all(|s| s.id != "1"));
        assert!(!store.undo("1"));
    }

    #[test]
    fn test_independent_pending_deletions() {
        let mut store = sample_store();
        let now = Instant::now();

        store.remove("1", now, WINDOW);
        store.remove("2", now + Duration::from_secs(2), WINDOW);
        assert_eq!(store.pending().len(), 2);

        // 2件目の削除で1件目の取り消しが失われない
        assert!(store.undo("1"));

        let removed = store.finalize_due(now + Duration::from_secs(7));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, "2");
        assert!(store.get("1").is_some());
    }

    #[test]
    fn test_finalize_if_due_respects_restaged_deadline() {
        let mut store = sample_store();
        let now = Instant::now();

        store.remove("1", now, WINDOW);
        store.undo("1");
        store.remove("1", now + Duration::from_secs(3), WINDOW);

        // 最初のタイマーの時刻ではまだ確定しない
        assert!(store.finalize_if_due("1", now + WINDOW).is_none());
        assert!(store
            .finalize_if_due("1", now + Duration::from_secs(8))
            .is_some());
    }

    #[test]
    fn test_finalize_all_ignores_deadlines() {
        let mut store = sample_store();
        let now = Instant::now();

        store.remove("1", now, WINDOW);
        store.remove("3", now, WINDOW);

        let removed = store.finalize_all();
        assert_eq!(removed.len(), 2);
        assert!(store.pending().is_empty());
        assert_eq!(store.all().len(), 1);
        assert!(!store.undo("1"));
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut store = sample_store();
        assert!(store.remove("missing", Instant::now(), WINDOW).is_none());
        assert!(store.remove_now("missing").is_none());
    }

    #[test]
    fn test_current_pointer() {
        let mut store = sample_store();
        assert!(store.current().is_none());
        assert!(!store.set_current("missing"));

        assert!(store.set_current("2"));
        assert_eq!(store.current().unwrap().name, "Spotify");

        store.remove_now("2");
        assert!(store.current().is_none());
    }

    #[test]
    fn test_select_and_deselect() {
        let mut store = sample_store();
        assert!(store.deselect("1"));
        assert!(!store.get("1").unwrap().selected);
        assert!(store.select("1"));
        assert!(store.get("1").unwrap().selected);
        assert!(!store.select("missing"));
    }

    #[test]
    fn test_commit_candidates_merges_selected() {
        let mut store = sample_store();
        store.set_candidates(vec![
            Subscription::new("1", "Netflix", 17.99, Frequency::Monthly, "Dec 20"),
            Subscription::new("8", "GitHub Pro", 4.0, Frequency::Monthly, "Jan 5"),
            Subscription::new("9", "Figma", 144.0, Frequency::Yearly, "Mar 15"),
        ]);
        assert!(store.toggle_candidate("9"));

        let committed = store.commit_candidates();

        assert_eq!(committed, 2);
        assert_eq!(store.len(), 4);
        assert_eq!(store.get("1").unwrap().amount, 17.99);
        assert!(store.get("9").is_none());
        assert!(store.candidates().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = sample_store();
        store.set_current("1");
        store.remove("2", Instant::now(), WINDOW);
        store.clear();

        assert!(store.is_empty());
        assert!(store.pending().is_empty());
        assert!(store.current().is_none());
    }
}
