//! 配置块的保存

use serde_json::Value;
use shared::models::{LOYALTY_SETTINGS_KEY, LoyaltySettings, SETTING_KEYS};
use shared::{AppError, AppResult};

use crate::core::PosEngine;

impl PosEngine {
    /// 保存一个配置块 (key → JSON)
    ///
    /// 本地先解析生效，解析失败时拒绝且不写远端。
    pub async fn save_setting(&self, key: &str, value: Value) -> AppResult<()> {
        self.require_admin()?;
        if !SETTING_KEYS.contains(&key) {
            return Err(self
                .notices()
                .reject(AppError::validation(format!("Configuración desconocida: {key}"))));
        }
        if !self.state().write().settings.apply_value(key, value.clone()) {
            return Err(self
                .notices()
                .reject(AppError::validation("Configuración inválida")));
        }
        self.gateway().save_setting(key, &value).await;
        tracing::info!(key, "Setting saved");
        self.notices().success("Configuración guardada");
        Ok(())
    }

    pub async fn save_loyalty_settings(&self, loyalty: &LoyaltySettings) -> AppResult<()> {
        let value = serde_json::to_value(loyalty)
            .map_err(|e| AppError::internal(format!("Serializing loyalty settings failed: {e}")))?;
        self.save_setting(LOYALTY_SETTINGS_KEY, value).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::offline_engine;
    use serde_json::json;
    use shared::ErrorCode;
    use shared::models::{EXPENSE_CATEGORIES_KEY, LoyaltySettings};

    #[tokio::test]
    async fn test_save_setting_applies_and_mirrors() {
        let engine = offline_engine();
        engine
            .save_setting(EXPENSE_CATEGORIES_KEY, json!(["Gas", "Agua"]))
            .await
            .unwrap();
        assert_eq!(engine.state().settings().expense_categories.len(), 2);
        assert_eq!(
            engine
                .gateway()
                .mirror()
                .read_setting(EXPENSE_CATEGORIES_KEY)
                .unwrap(),
            Some(json!(["Gas", "Agua"]))
        );
    }

    #[tokio::test]
    async fn test_malformed_setting_rejected() {
        let engine = offline_engine();
        let err = engine
            .save_setting(EXPENSE_CATEGORIES_KEY, json!({ "not": "a list" }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(engine.save_setting("whatsapp", json!(true)).await.is_err());
    }

    #[tokio::test]
    async fn test_save_loyalty_settings() {
        let engine = offline_engine();
        let loyalty = LoyaltySettings {
            enabled: false,
            ..Default::default()
        };
        engine.save_loyalty_settings(&loyalty).await.unwrap();
        assert!(!engine.state().settings().loyalty_settings.enabled);
    }
}
