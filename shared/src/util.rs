use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 当前 UTC 时间
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// 生成带前缀的资源 ID (`ord-…`, `sale-…`, `cust-…`)
///
/// 前缀便于在远端 `data` 列和日志中辨认实体类型；
/// 后缀是 UUID v4，多台收银机同时离线建单也不会冲突。
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// 订单行实例 ID：同一菜品多次加入时区分不同行
pub fn generate_instance_id(menu_item_id: &str) -> String {
    generate_id(menu_item_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_prefix_and_uniqueness() {
        let a = generate_id("ord");
        let b = generate_id("ord");
        assert!(a.starts_with("ord-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_instance_id_keeps_menu_id() {
        let id = generate_instance_id("menu-burger");
        assert!(id.starts_with("menu-burger-"));
    }
}
