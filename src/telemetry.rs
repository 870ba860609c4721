//! ログ出力の初期化
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` に従う fmt サブスクライバを登録する（二重登録はエラー出力のみ）
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}
