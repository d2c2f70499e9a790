// src/start.rs
use std::{net::SocketAddr, sync::Arc, time::Duration};

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tokio::signal;

use crate::{
    core::{config::Config, log},
    repositories::{refresh_tokens::RedisRefreshTokenStore, users::SeaOrmUserRepository},
    routes,
    services::token::TokenService,
    state::AppState,
    utils::cache::ResponseCache,
};

/// 启动并运行应用程序。
///
/// 1. 加载配置（令牌密钥/有效期缺失时直接退出）
/// 2. 初始化日志
/// 3. 连接 Postgres 并执行迁移
/// 4. 连接 Redis
/// 5. 组装状态：用户仓库、Refresh Token 存储、令牌服务、响应缓存
/// 6. 启动 HTTP 服务器并支持优雅关闭
pub async fn run() {
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let _guard = log::init(&config.rust_log, &config.log_dir);
    tracing::info!("🔍 Config loaded successfully.");

    let mut opt = ConnectOptions::new(config.database_url.expose_secret());
    opt.max_connections(50)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("❌ Failed to connect to Database");
    Migrator::up(&db, None)
        .await
        .expect("❌ Failed to run migrations");
    tracing::info!("✅ Database connected and migrated.");

    let client = redis::Client::open(config.redis_url.expose_secret())
        .expect("❌ Invalid Redis URL");
    let redis_manager = client.get_connection_manager()
        .await
        .expect("❌ Failed to connect to Redis");
    tracing::info!("✅ Redis connected.");

    let state = AppState::new(
        Arc::new(SeaOrmUserRepository::new(db)),
        Arc::new(RedisRefreshTokenStore::new(redis_manager, config.refresh_token_expires_in)),
        TokenService::new(&config),
        ResponseCache::new(Duration::from_millis(config.cache_duration_ms)),
    );

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .expect("❌ Invalid address configuration");

    let listener = TcpListener::bind(addr)
        .await
        .expect("❌ Failed to bind address");
    tracing::info!("🚀 Server listening on http://{}", addr);

    let app = routes::create_router(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("❌ Server error");

    state.cache.clear();
    tracing::info!("👋 Server stopped.");
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Signal received, starting graceful shutdown...");
}
