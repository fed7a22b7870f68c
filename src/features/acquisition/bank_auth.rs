use crate::features::catalog::{find_banks, Bank, BANKS};
use serde::Serialize;

/// 銀行連携画面内のステップ（ルーターの画面には含めない）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BankAuthStep {
    #[default]
    Search,
    Credentials,
    #[serde(rename = "2fa")]
    TwoFactor,
}

/// 戻るボタンの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankAuthBack {
    /// 画面内のステップを戻った
    Step(BankAuthStep),
    /// 検索ステップから戻ったので画面を離れる
    Exit,
}

/// 銀行連携フローの状態
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAuthFlow {
    pub step: BankAuthStep,
    pub search: String,
    pub selected_bank: Option<&'static Bank>,
    /// 擬似的な通信中（送信ボタン無効）
    pub loading: bool,
    /// 送信ごとに増える番号（戻ったあとに古い待ちが完了しないよう照合する）
    #[serde(skip)]
    request_id: u64,
}

impl BankAuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 検索語に一致する銀行
    pub fn filtered_banks(&self) -> Vec<&'static Bank> {
        find_banks(&self.search)
    }

    /// 銀行を選んでログイン情報入力へ進む
    ///
    /// # 戻り値
    /// 検索ステップで存在する銀行を選んだ場合はtrue
    pub fn select_bank(&mut self, bank_id: &str) -> bool {
        if self.step != BankAuthStep::Search {
            return false;
        }
        match BANKS.iter().find(|b| b.id == bank_id) {
            Some(bank) => {
                self.selected_bank = Some(bank);
                self.step = BankAuthStep::Credentials;
                true
            }
            None => {
                log::debug!("不明な銀行IDです: {bank_id}");
                false
            }
        }
    }

    fn start_request(&mut self, step: BankAuthStep) -> Option<u64> {
        if self.step != step || self.loading {
            return None;
        }
        self.loading = true;
        self.request_id += 1;
        Some(self.request_id)
    }

    /// 指定の送信がまだ待ち中か
    pub fn is_awaiting(&self, request_id: u64) -> bool {
        self.loading && self.request_id == request_id
    }

    /// ログイン情報を送信する（通信待ちを開始）
    ///
    /// # 戻り値
    /// 待ちを開始した場合はその送信番号。通信中の再送信は無視してNone
    pub fn submit_credentials(&mut self) -> Option<u64> {
        self.start_request(BankAuthStep::Credentials)
    }

    /// ログイン情報送信の待ちが終わった
    ///
    /// # 引数
    /// * `request_id` - `submit_credentials` が返した送信番号
    pub fn finish_credentials(&mut self, request_id: u64) -> bool {
        if self.step != BankAuthStep::Credentials || !self.is_awaiting(request_id) {
            return false;
        }
        self.loading = false;
        self.step = BankAuthStep::TwoFactor;
        true
    }

    /// 認証コードを送信する（通信待ちを開始）
    pub fn submit_two_factor(&mut self) -> Option<u64> {
        self.start_request(BankAuthStep::TwoFactor)
    }

    /// 認証コードの待ちが終わった
    ///
    /// # 戻り値
    /// trueの場合、銀行連携は完了（口座選択へ遷移する）
    pub fn finish_two_factor(&mut self, request_id: u64) -> bool {
        if self.step != BankAuthStep::TwoFactor || !self.is_awaiting(request_id) {
            return false;
        }
        self.loading = false;
        true
    }

    /// 戻る（2fa → credentials → search → 画面離脱）
    ///
    /// 通信中の待ちは破棄する。
    pub fn back(&mut self) -> BankAuthBack {
        self.loading = false;
        self.request_id += 1;
        match self.step {
            BankAuthStep::Search => BankAuthBack::Exit,
            BankAuthStep::Credentials => {
                self.step = BankAuthStep::Search;
                BankAuthBack::Step(self.step)
            }
            BankAuthStep::TwoFactor => {
                self.step = BankAuthStep::Credentials;
                BankAuthBack::Step(self.step)
            }
        }
    }
}
