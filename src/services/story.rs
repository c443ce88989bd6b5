use crate::{
    error::Result,
    models::story::{Chapter, Story, StoryQuery, StorySummary},
    services::api::{ApiClient, AuthScope},
    utils::validation::validate_path_segment,
};
use tracing::debug;

#[derive(Clone)]
pub struct StoryService {
    api: ApiClient,
}

impl StoryService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &StoryQuery) -> Result<Vec<StorySummary>> {
        debug!("Listing stories: {:?}", query);
        let limit = query.limit.map(|l| l.clamp(1, 100));
        let query = StoryQuery {
            page: query.page.map(|p| p.max(1)),
            limit,
            search: query.search.clone().filter(|s| !s.trim().is_empty()),
        };
        self.api
            .get_with_query("/stories", &query, AuthScope::Anonymous)
            .await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Story> {
        validate_path_segment("slug", slug)?;
        self.api
            .get(&format!("/stories/{}", slug), AuthScope::Anonymous)
            .await
    }

    pub async fn get_chapter(&self, slug: &str, number: u32) -> Result<Chapter> {
        validate_path_segment("slug", slug)?;
        self.api
            .get(
                &format!("/stories/{}/chapters/{}", slug, number),
                AuthScope::Anonymous,
            )
            .await
    }
}
