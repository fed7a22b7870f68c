use crate::shared::config::TimingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 1回の進捗で進む割合（%）
pub const PROGRESS_STEP: u8 = 2;

/// 進捗更新の回数（100% / 2%）
pub const PROGRESS_TICKS: u32 = 50;

/// データの取得方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMethod {
    Bank,
    Sms,
    Manual,
}

impl ScanMethod {
    /// スキャン全体の所要時間（銀行以外はSMSと同じ）
    pub fn scan_duration(self, timing: &TimingConfig) -> Duration {
        match self {
            ScanMethod::Bank => timing.bank_scan_duration,
            ScanMethod::Sms | ScanMethod::Manual => timing.sms_scan_duration,
        }
    }

    /// 進捗更新の間隔
    pub fn tick_interval(self, timing: &TimingConfig) -> Duration {
        self.scan_duration(timing) / PROGRESS_TICKS
    }
}

impl fmt::Display for ScanMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMethod::Bank => f.write_str("bank"),
            ScanMethod::Sms => f.write_str("sms"),
            ScanMethod::Manual => f.write_str("manual"),
        }
    }
}

/// スキャン進捗の表示状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub method: ScanMethod,
    pub percent: u8,
    pub status: String,
    /// 途中経過として表示する検出件数
    pub found_count: usize,
}

impl ScanProgress {
    pub fn start(method: ScanMethod) -> Self {
        Self {
            method,
            percent: 0,
            status: "Connecting...".to_string(),
            found_count: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100
    }

    /// 2%進めて表示文言を更新する
    ///
    /// # 引数
    /// * `total_found` - 完了時に表示する検出件数
    ///
    /// # 戻り値
    /// 100%に到達した場合はtrue
    pub fn advance(&mut self, total_found: usize) -> bool {
        if self.is_complete() {
            return true;
        }

        let next = self.percent.saturating_add(PROGRESS_STEP).min(100);
        if next < 20 {
            self.status = match self.method {
                ScanMethod::Bank => "Connecting to bank...".to_string(),
                ScanMethod::Sms | ScanMethod::Manual => "Scanning messages...".to_string(),
            };
        } else if next < 80 {
            self.status = "Analyzing transactions...".to_string();
            self.found_count = usize::from((next - 20) / 10);
        } else if next >= 100 {
            self.status = format!("Found {total_found} subscriptions");
            self.found_count = total_found;
        }

        self.percent = next;
        self.is_complete()
    }
}
