use anyhow::Context;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub media: MediaConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    /// Base URL of the external image host; deletions are issued against it.
    pub base_url: String,
    pub api_key: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("SERVER_PORT is not a valid port number")?;

        let media = MediaConfig {
            base_url: std::env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "https://media.localhost".to_string()),
            api_key: std::env::var("MEDIA_API_KEY").unwrap_or_default(),
        };

        Ok(Self {
            server: ServerConfig { host, port },
            media,
        })
    }
}
