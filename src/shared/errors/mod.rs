use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 現在の画面で受け付けられない操作
    #[error("無効な画面遷移: {0}")]
    InvalidTransition(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// 並行処理関連のエラー
    #[error("並行処理エラー: {0}")]
    Concurrency(String),

    /// タイマー処理がキャンセルされた
    #[error("処理がキャンセルされました: {0}")]
    Cancelled(String),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（キャンセルや形式エラーなど）
    Medium,
    /// 高重要度（設定エラーなど）
    High,
    /// 最重要（状態の整合性が崩れた場合）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::InvalidTransition(_) => "この画面ではその操作を実行できません",
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Concurrency(_) => "並行処理でエラーが発生しました",
            AppError::Cancelled(_) => "処理がキャンセルされました",
            AppError::Json(_) => "データ形式の解析でエラーが発生しました",
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::InvalidTransition(_) => ErrorSeverity::Low,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Concurrency(_) => ErrorSeverity::Critical,
            AppError::Cancelled(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - バリデーションエラーメッセージ
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 無効な画面遷移エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `screen` - 現在の画面名
    /// * `trigger` - 受け付けられなかった操作名
    pub fn invalid_transition<S: Into<String>>(screen: S, trigger: S) -> Self {
        AppError::InvalidTransition(format!(
            "{} では {} を受け付けません",
            screen.into(),
            trigger.into()
        ))
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// 並行処理エラーを作成するヘルパー関数
    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        AppError::Concurrency(message.into())
    }

    /// キャンセルエラーを作成するヘルパー関数
    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        AppError::Cancelled(message.into())
    }
}

/// AppErrorからStringへの変換（画面コールバックでの使用のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
