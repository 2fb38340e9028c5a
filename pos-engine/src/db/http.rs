//! HttpRemoteStore — PostgREST-style REST adapter
//!
//! | Operation | Request |
//! |-----------|---------|
//! | select_all | `GET /rest/v1/{table}?select=id,data` |
//! | select_one | `GET /rest/v1/{table}?select=id,data&id=eq.{id}` |
//! | insert | `POST /rest/v1/{table}` |
//! | upsert | `POST /rest/v1/{table}` + `Prefer: resolution=merge-duplicates` |
//! | delete | `DELETE /rest/v1/{table}?id=eq.{id}` |
//! | settings | `GET/POST /rest/v1/settings` (`{ key, value }` rows) |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::RowChange;
use tokio::sync::broadcast;

use super::remote::{RemoteRow, RemoteStore, SettingRow, TransportError, TransportResult};
use super::tables;
use crate::core::config::RemoteSettings;

const REST_PREFIX: &str = "rest/v1";
const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// REST client for the remote store
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpRemoteStore {
    pub fn new(settings: &RemoteSettings, timeout: std::time::Duration) -> TransportResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> TransportResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn select_all(&self, table: &str) -> TransportResult<Vec<RemoteRow>> {
        let request = self
            .client
            .get(self.endpoint(table))
            .query(&[("select", "id,data")]);
        let response = Self::check(self.authorized(request).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn select_one(&self, table: &str, id: &str) -> TransportResult<Option<RemoteRow>> {
        let filter = format!("eq.{id}");
        let request = self
            .client
            .get(self.endpoint(table))
            .query(&[("select", "id,data"), ("id", filter.as_str())]);
        let response = Self::check(self.authorized(request).send().await?).await?;
        let mut rows: Vec<RemoteRow> = response.json().await?;
        Ok(rows.pop())
    }

    async fn insert(&self, table: &str, row: RemoteRow) -> TransportResult<()> {
        let request = self
            .client
            .post(self.endpoint(table))
            .header("Prefer", PREFER_MINIMAL)
            .json(&[row]);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn upsert(&self, table: &str, rows: Vec<RemoteRow>) -> TransportResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .post(self.endpoint(table))
            .header("Prefer", PREFER_UPSERT)
            .json(&rows);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> TransportResult<()> {
        let filter = format!("eq.{id}");
        let request = self
            .client
            .delete(self.endpoint(table))
            .query(&[("id", filter.as_str())]);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn select_settings(&self) -> TransportResult<Vec<SettingRow>> {
        let request = self
            .client
            .get(self.endpoint(tables::SETTINGS))
            .query(&[("select", "key,value")]);
        let response = Self::check(self.authorized(request).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn upsert_setting(&self, row: SettingRow) -> TransportResult<()> {
        let request = self
            .client
            .post(self.endpoint(tables::SETTINGS))
            .query(&[("on_conflict", "key")])
            .header("Prefer", PREFER_UPSERT)
            .json(&[row]);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    /// REST 接口没有推送通道，依赖定期全量拉取
    fn changes(&self) -> Option<broadcast::Receiver<RowChange>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let store = HttpRemoteStore::new(
            &RemoteSettings {
                url: "https://pos.example.co/".into(),
                api_key: "anon".into(),
            },
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            store.endpoint(tables::ORDERS),
            "https://pos.example.co/rest/v1/orders"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let store = HttpRemoteStore::new(
            &RemoteSettings {
                url: "http://127.0.0.1:9".into(),
                api_key: "anon".into(),
            },
            std::time::Duration::from_millis(500),
        )
        .unwrap();
        assert!(store.select_all(tables::USERS).await.is_err());
    }
}
