use std::path::PathBuf;
use std::time::Duration;

/// 引擎配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (本地镜像、日志) |
/// | REMOTE_URL | - | 远端 REST 地址，未设置则离线运行 |
/// | REMOTE_API_KEY | - | 远端 API key，未设置则离线运行 |
/// | REQUEST_TIMEOUT_MS | 15000 | HTTP 请求超时(毫秒) |
/// | RECONCILE_INTERVAL_SECS | 300 | 定期全量拉取间隔(秒) |
/// | RECONCILE_DEBOUNCE_MS | 300 | 变更通知合并窗口(毫秒) |
/// | DEFAULT_SITE_ID | sede-principal | 启动时的门店上下文 |
/// | SUPPORT_USERNAME | - | 技术支持账号 |
/// | SUPPORT_PASSWORD_HASH | - | 技术支持密码 (argon2 PHC) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 设置后写入按天滚动的日志文件 |
///
/// # 示例
///
/// ```ignore
/// REMOTE_URL=https://xyz.example.co REMOTE_API_KEY=... cargo run -p pos-engine
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// 远端 REST 基础地址
    pub remote_url: Option<String>,
    /// 远端 API key
    pub remote_api_key: Option<String>,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 定期全量拉取间隔 (秒)
    pub reconcile_interval_secs: u64,
    /// 变更通知合并窗口 (毫秒)
    pub reconcile_debounce_ms: u64,
    /// 默认门店
    pub default_site_id: String,
    /// 技术支持登录；两项都设置才启用
    pub support_username: Option<String>,
    pub support_password_hash: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

/// 已验证的远端连接参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub url: String,
    pub api_key: String,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: env_opt("WORK_DIR").unwrap_or_else(|| "./data".into()),
            remote_url: env_opt("REMOTE_URL"),
            remote_api_key: env_opt("REMOTE_API_KEY"),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 15000),
            reconcile_interval_secs: env_parse("RECONCILE_INTERVAL_SECS", 300),
            reconcile_debounce_ms: env_parse("RECONCILE_DEBOUNCE_MS", 300),
            default_site_id: env_opt("DEFAULT_SITE_ID").unwrap_or_else(|| "sede-principal".into()),
            support_username: env_opt("SUPPORT_USERNAME"),
            support_password_hash: env_opt("SUPPORT_PASSWORD_HASH"),
            log_level: env_opt("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: env_opt("LOG_DIR"),
        }
    }

    /// 离线配置，不读取环境变量
    ///
    /// 常用于测试场景
    pub fn offline(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            remote_url: None,
            remote_api_key: None,
            request_timeout_ms: 15000,
            reconcile_interval_secs: 300,
            reconcile_debounce_ms: 300,
            default_site_id: "sede-principal".into(),
            support_username: None,
            support_password_hash: None,
            log_level: "info".into(),
            log_dir: None,
        }
    }

    /// 远端连接参数
    ///
    /// URL 必须以 http:// 或 https:// 开头且 key 非空，否则返回 None (离线模式)
    pub fn remote(&self) -> Option<RemoteSettings> {
        let url = self.remote_url.as_deref()?;
        let api_key = self.remote_api_key.as_deref()?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            tracing::warn!(url, "REMOTE_URL is not an http(s) URL, running offline");
            return None;
        }
        if api_key.is_empty() {
            return None;
        }
        Some(RemoteSettings {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs.max(1))
    }

    pub fn reconcile_debounce(&self) -> Duration {
        Duration::from_millis(self.reconcile_debounce_ms)
    }

    /// 本地镜像数据库路径
    pub fn mirror_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("pos-mirror.redb")
    }

    /// 技术支持凭据 (用户名, argon2 哈希)
    pub fn support_credentials(&self) -> Option<(&str, &str)> {
        Some((
            self.support_username.as_deref()?,
            self.support_password_hash.as_deref()?,
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
