use crate::features::catalog::ACCOUNTS;
use serde::Serialize;

/// スキャン対象口座の選択状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSelection {
    pub selected: Vec<String>,
}

impl Default for AccountSelection {
    fn default() -> Self {
        Self {
            selected: vec!["checking".to_string(), "credit1".to_string()],
        }
    }
}

impl AccountSelection {
    /// 口座の選択を切り替える
    pub fn toggle(&mut self, account_id: &str) -> bool {
        if !ACCOUNTS.iter().any(|a| a.id == account_id) {
            return false;
        }
        if let Some(position) = self.selected.iter().position(|id| id == account_id) {
            self.selected.remove(position);
        } else {
            self.selected.push(account_id.to_string());
        }
        true
    }

    pub fn is_selected(&self, account_id: &str) -> bool {
        self.selected.iter().any(|id| id == account_id)
    }

    /// 1口座以上選ばれていればスキャンできる
    pub fn can_continue(&self) -> bool {
        !self.selected.is_empty()
    }

    /// スキャンボタンの文言
    pub fn scan_label(&self) -> String {
        let count = self.selected.len();
        let plural = if count == 1 { "" } else { "s" };
        format!("Scan {count} Account{plural}")
    }
}
