/// 環境設定関連のモジュール
pub mod environment;
pub mod initialization;
pub mod timing;

// 便利な再エクスポート
pub use environment::{get_environment, load_environment_variables, Environment, EnvironmentConfig};
pub use initialization::{
    initialize_application, initialize_logging_system, log_initialization_complete,
    InitializationResult,
};
pub use timing::TimingConfig;
