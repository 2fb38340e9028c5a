use anyhow::Context;
use pos_engine::{BackgroundTasks, PosEngine, TaskKind, setup_environment};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志) 并加载配置
    let config = setup_environment();
    tracing::info!(work_dir = %config.work_dir, "POS engine starting...");

    // 2. 初始化引擎 (本地镜像 + 远端)
    let engine = PosEngine::initialize(config).context("Failed to initialize engine")?;
    if engine.is_offline() {
        tracing::warn!("Running without remote store, all data stays in the local mirror");
    }
    engine.seed_remote_defaults().await;

    match engine.restore_session() {
        Some(user) => tracing::info!(user_id = %user.id, "Resumed stored session"),
        None => tracing::info!("No stored session, waiting for login"),
    }

    // 3. 后台任务
    let mut tasks = BackgroundTasks::new();

    let shutdown = tasks.shutdown_token();
    tasks.spawn("reconciler", TaskKind::Worker, engine.reconciler().run(shutdown));

    let shutdown = tasks.shutdown_token();
    let mut notices = engine.subscribe_notices();
    tasks.spawn("notice_log", TaskKind::Listener, async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                result = notices.recv() => match result {
                    Ok(notice) => tracing::info!(target: "notice", level = ?notice.level, "{}", notice.message),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Notice log lagged {n} messages");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    });

    tracing::info!(tasks = tasks.len(), "POS engine running, press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    let failed = tasks.check_health();
    if failed > 0 {
        tracing::warn!(failed, "Some background tasks stopped before shutdown");
    }
    tasks.shutdown().await;
    tracing::info!("POS engine stopped");
    Ok(())
}
