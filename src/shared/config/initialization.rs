use super::environment::{load_environment_variables, EnvironmentConfig};
use super::timing::TimingConfig;

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug, Clone)]
pub struct InitializationResult {
    /// 環境設定
    pub environment: EnvironmentConfig,
    /// タイミング設定
    pub timing: TimingConfig,
}

/// アプリケーションの初期化を実行する
///
/// # 処理内容
/// 1. .envファイルの読み込み
/// 2. ログシステムの初期化
/// 3. タイミング設定の読み込み
pub fn initialize_application() -> InitializationResult {
    load_environment_variables();
    let environment = initialize_logging_system();
    let timing = validated_timing(TimingConfig::from_env());

    log::debug!("タイミング設定: {timing:?}");

    InitializationResult {
        environment,
        timing,
    }
}

/// 検証済みのタイミング設定を返す（不正なら既定値）
fn validated_timing(timing: TimingConfig) -> TimingConfig {
    match timing.validate() {
        Ok(()) => timing,
        Err(e) => {
            log::error!("タイミング設定が不正です。既定値を使用します: {}", e.details());
            TimingConfig::default()
        }
    }
}

/// ログシステムを初期化する
///
/// # 戻り値
/// 初期化に使用した環境設定
pub fn initialize_logging_system() -> EnvironmentConfig {
    let env_config = EnvironmentConfig::from_env();

    // 二重初期化は無視する
    let initialized = env_logger::Builder::from_default_env()
        .filter_level(env_config.level_filter())
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if initialized.is_ok() {
        log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            env_config.log_level,
            env_config.environment
        );
    }

    env_config
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    log::info!(
        "アプリケーション起動完了: environment={}, debug_mode={}",
        result.environment.environment,
        result.environment.debug_mode
    );
}
