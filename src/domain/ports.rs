use crate::domain::model::{Category, CategoryId, RenderEvent};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait CategorySource: Send + Sync {
    /// `count` distinct ids drawn uniformly from the upstream pool.
    async fn fetch_random_category_ids(&self, count: usize) -> Result<Vec<CategoryId>>;

    /// Title plus exactly `clue_count` sampled clues, all `Hidden`.
    async fn fetch_category(&self, id: CategoryId, clue_count: usize) -> Result<Category>;
}

pub trait Renderer: Send + Sync {
    fn render(&self, event: &RenderEvent);
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn pool_size(&self) -> usize;
    fn category_count(&self) -> usize;
    fn clue_count(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
}
