use serde::Serialize;

/// SMS読み取り権限のリクエスト状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsPermission {
    pub show_system_dialog: bool,
    pub loading: bool,
    /// 許可ごとに増える番号
    #[serde(skip)]
    request_id: u64,
}

impl SmsPermission {
    /// システムダイアログを表示する
    pub fn request(&mut self) {
        self.show_system_dialog = true;
    }

    /// 許可しない（ダイアログを閉じ、待ち中の許可も破棄する）
    pub fn deny(&mut self) {
        self.show_system_dialog = false;
        self.loading = false;
        self.request_id += 1;
    }

    /// 許可する（擬似的な待ちを開始）
    ///
    /// # 戻り値
    /// 待ちを開始した場合はその番号
    pub fn allow(&mut self) -> Option<u64> {
        if !self.show_system_dialog || self.loading {
            return None;
        }
        self.loading = true;
        self.request_id += 1;
        Some(self.request_id)
    }

    /// 指定の許可がまだ待ち中か
    pub fn is_awaiting(&self, request_id: u64) -> bool {
        self.loading && self.request_id == request_id
    }

    /// 待ちが終わった。trueならスキャンへ進む
    pub fn finish(&mut self, request_id: u64) -> bool {
        if !self.is_awaiting(request_id) {
            return false;
        }
        self.loading = false;
        self.show_system_dialog = false;
        true
    }
}
