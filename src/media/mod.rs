//! External image host integration. Catalog records only store URLs; the
//! assets themselves live on a separate media host. Deletion is best-effort
//! everywhere: the database row is the authoritative outcome and a failed
//! remote deletion is logged, never propagated.

use async_trait::async_trait;

use crate::config::MediaConfig;

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn delete(&self, url: &str) -> anyhow::Result<()>;
}

pub struct HttpImageStore {
    client: reqwest::Client,
    config: MediaConfig,
}

impl HttpImageStore {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        let endpoint = format!("{}/v1/assets", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .delete(&endpoint)
            .bearer_auth(&self.config.api_key)
            .query(&[("url", url)])
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("media host returned {}", response.status());
        }
        Ok(())
    }
}

/// Deletes each URL, logging failures and carrying on.
pub async fn purge(store: &dyn ImageStore, urls: &[String]) {
    for url in urls {
        if let Err(err) = store.delete(url).await {
            log::warn!("failed to delete remote image {url}: {err}");
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records deletion attempts; can be told to fail for specific URLs.
    #[derive(Default)]
    pub struct RecordingStore {
        pub deleted: Mutex<Vec<String>>,
        pub fail_on: Vec<String>,
    }

    #[async_trait]
    impl ImageStore for RecordingStore {
        async fn delete(&self, url: &str) -> anyhow::Result<()> {
            if self.fail_on.iter().any(|u| u == url) {
                anyhow::bail!("simulated media host failure");
            }
            self.deleted.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingStore;
    use super::*;

    #[tokio::test]
    async fn purge_continues_past_failures() {
        let store = RecordingStore {
            fail_on: vec!["https://img/b.jpg".to_string()],
            ..Default::default()
        };
        let urls = vec![
            "https://img/a.jpg".to_string(),
            "https://img/b.jpg".to_string(),
            "https://img/c.jpg".to_string(),
        ];
        purge(&store, &urls).await;
        let deleted = store.deleted.lock().unwrap();
        assert_eq!(*deleted, vec!["https://img/a.jpg", "https://img/c.jpg"]);
    }
}
