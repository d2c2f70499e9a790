use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter,
};

/// 初始化日志：控制台 + 按天滚动的文件（`{log_dir}/dhyey.log.YYYY-MM-DD`）。
/// 返回的 guard 必须在 main 中持有，drop 时才会把缓冲区刷到文件。
pub fn init(log_level: &str, log_dir: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "dhyey.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // 文件层不带颜色
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true);

    // RUST_LOG 写错时退回 info，而不是让启动失败
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
