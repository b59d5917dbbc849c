use crate::core::sampling::sample_without_replacement;
use crate::domain::model::{Category, CategoryId, Clue};
use crate::domain::ports::{CategorySource, ConfigProvider};
use crate::utils::error::{Result, TriviaError};
use crate::utils::text::clean_clue_text;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://jservice.io/api/";

/// The listing endpoint refuses to return more than this many categories.
pub const MAX_POOL_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct CategorySummary {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawClue {
    question: Option<String>,
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryInfo {
    title: Option<String>,
}

/// `CategorySource` backed by a jService-compatible REST API.
pub struct JServiceSource {
    client: Client,
    base_url: Url,
    pool_size: usize,
    rng: Mutex<StdRng>,
}

impl JServiceSource {
    pub fn new(base_url: &str, pool_size: usize, timeout: Duration) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| TriviaError::InvalidConfigValueError {
            field: "source.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TriviaError::ConfigValidationError {
                field: "source.timeout_seconds".to_string(),
                message: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            pool_size: pool_size.min(MAX_POOL_SIZE),
            rng: Mutex::new(StdRng::from_os_rng()),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.base_url(), config.pool_size(), config.request_timeout())
    }

    /// Reproducible draws, for replaying a game.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| TriviaError::SourceUnavailable {
                endpoint: endpoint.to_string(),
                message: format!("cannot build request URL: {}", e),
            })?;

        tracing::debug!("Making API request to: {} {:?}", url, query);
        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(TriviaError::SourceUnavailable {
                endpoint: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CategorySource for JServiceSource {
    async fn fetch_random_category_ids(&self, count: usize) -> Result<Vec<CategoryId>> {
        let listing: Vec<CategorySummary> = self
            .get_json("categories", &[("count", self.pool_size.to_string())])
            .await?;

        let mut seen = HashSet::new();
        let pool: Vec<CategoryId> = listing
            .into_iter()
            .map(|c| CategoryId(c.id))
            .filter(|id| seen.insert(*id))
            .collect();
        tracing::debug!("Category pool holds {} ids", pool.len());

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        sample_without_replacement(&mut *rng, &pool, count).map_err(|e| {
            TriviaError::InsufficientPool {
                requested: e.requested,
                available: e.available,
            }
        })
    }

    async fn fetch_category(&self, id: CategoryId, clue_count: usize) -> Result<Category> {
        let clue_query = [("category", id.to_string())];
        let title_query = [("id", id.to_string())];
        let (raw_clues, info) = tokio::try_join!(
            self.get_json::<Vec<RawClue>>("clues", &clue_query),
            self.get_json::<CategoryInfo>("category", &title_query),
        )?;

        let usable: Vec<Clue> = raw_clues
            .into_iter()
            .filter_map(|raw| {
                let question = clean_clue_text(raw.question.as_deref().unwrap_or_default());
                let answer = clean_clue_text(raw.answer.as_deref().unwrap_or_default());
                (!question.is_empty() && !answer.is_empty()).then(|| Clue::new(question, answer))
            })
            .collect();

        let clues = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            sample_without_replacement(&mut *rng, &usable, clue_count).map_err(|e| {
                TriviaError::InsufficientClues {
                    category: id.0,
                    requested: e.requested,
                    available: e.available,
                }
            })?
        };

        let title = clean_clue_text(info.title.as_deref().unwrap_or_default());
        let title = if title.is_empty() {
            format!("Category {}", id)
        } else {
            title
        };

        tracing::debug!("Fetched category {} '{}' with {} clues", id, title, clues.len());
        Ok(Category::new(title, clues))
    }
}
