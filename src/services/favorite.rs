use crate::{
    error::Result,
    models::favorite::{Favorite, FavoriteCheck, FavoriteCount},
    services::api::{ApiClient, AuthScope},
    utils::validation::validate_path_segment,
};
use reqwest::Method;
use tracing::debug;

#[derive(Clone)]
pub struct FavoriteService {
    api: ApiClient,
}

impl FavoriteService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn add(&self, story_id: &str) -> Result<()> {
        validate_path_segment("story id", story_id)?;
        debug!("Adding story {} to favorites", story_id);

        self.api
            .execute(Method::POST, &format!("/favorites/{}", story_id), AuthScope::User)
            .await
    }

    pub async fn remove(&self, story_id: &str) -> Result<()> {
        validate_path_segment("story id", story_id)?;
        debug!("Removing story {} from favorites", story_id);

        self.api
            .execute(Method::DELETE, &format!("/favorites/{}", story_id), AuthScope::User)
            .await
    }

    pub async fn list(&self) -> Result<Vec<Favorite>> {
        self.api.get("/favorites", AuthScope::User).await
    }

    pub async fn check(&self, story_id: &str) -> Result<bool> {
        validate_path_segment("story id", story_id)?;

        let check: FavoriteCheck = self
            .api
            .get(&format!("/favorites/check/{}", story_id), AuthScope::User)
            .await?;
        Ok(check.is_favorite)
    }

    /// 收藏人数，匿名可查
    pub async fn count(&self, story_id: &str) -> Result<u64> {
        validate_path_segment("story id", story_id)?;

        let count: FavoriteCount = self
            .api
            .get(&format!("/favorites/count/{}", story_id), AuthScope::Anonymous)
            .await?;
        Ok(count.count)
    }

    /// 切换收藏状态，返回切换后的状态
    pub async fn toggle(&self, story_id: &str, currently_favorite: bool) -> Result<bool> {
        if currently_favorite {
            self.remove(story_id).await?;
        } else {
            self.add(story_id).await?;
        }
        Ok(!currently_favorite)
    }
}
