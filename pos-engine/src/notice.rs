//! 用户提示广播
//!
//! 引擎把面向用户的短消息 (保存成功、离线模式、会员升级…) 发布到
//! broadcast 通道，前端订阅后自行展示。没有订阅者时消息直接丢弃。

use shared::{AppError, Notice, NoticeLevel};
use tokio::sync::broadcast;

const NOTICE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct NoticeBus {
    tx: broadcast::Sender<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "Notice"),
            _ => tracing::debug!(message = %notice.message, "Notice"),
        }
        let _ = self.tx.send(notice);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(Notice::success(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(Notice::info(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(Notice::error(message));
    }

    /// 校验失败：提示后原样返回错误，便于 `return Err(notices.reject(e))`
    pub fn reject(&self, err: AppError) -> AppError {
        self.publish(Notice::from(&err));
        err
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}
