use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::app::Result;
use crate::fetcher::{Fetcher, FetcherConfig};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let start = Instant::now();

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        let body = response.bytes().await?.to_vec();

        info!(
            "Fetched '{}' in {:.2} seconds ({} bytes)",
            url,
            start.elapsed().as_secs_f64(),
            body.len()
        );

        Ok(body)
    }
}
