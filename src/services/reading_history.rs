use crate::{
    error::{AppError, Result},
    models::reading_history::{ReadingHistoryEntry, SaveProgressRequest, RECENT_HISTORY_LIMIT},
    services::api::{ApiClient, AuthScope},
    utils::validation::validate_path_segment,
};
use reqwest::Method;
use tracing::{debug, error};

/// 阅读记录接口
#[derive(Clone)]
pub struct ReadingHistoryService {
    api: ApiClient,
}

impl ReadingHistoryService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// 保存阅读进度
    pub async fn save(
        &self,
        story_id: &str,
        chapter_number: u32,
        scroll_position: f64,
    ) -> Result<ReadingHistoryEntry> {
        validate_path_segment("story id", story_id)?;
        if chapter_number == 0 {
            return Err(AppError::validation("Chapter number starts at 1"));
        }

        let scroll_position = if scroll_position.is_finite() {
            scroll_position.max(0.0)
        } else {
            0.0
        };

        let request = SaveProgressRequest {
            story_id: story_id.to_string(),
            chapter_number,
            scroll_position,
        };

        debug!("Saving progress: story {} chapter {}", story_id, chapter_number);
        self.api.post("/reading-history", &request, AuthScope::User).await
    }

    /// 最近的阅读记录
    pub async fn list(&self) -> Result<Vec<ReadingHistoryEntry>> {
        self.api.get("/reading-history", AuthScope::User).await
    }

    pub async fn all(&self) -> Result<Vec<ReadingHistoryEntry>> {
        self.api.get("/reading-history/all", AuthScope::User).await
    }

    /// 某个故事的阅读进度，没有记录时返回 None
    pub async fn get(&self, story_id: &str) -> Result<Option<ReadingHistoryEntry>> {
        validate_path_segment("story id", story_id)?;
        self.api
            .get_optional(&format!("/reading-history/{}", story_id), AuthScope::User)
            .await
    }

    pub async fn delete(&self, story_id: &str) -> Result<()> {
        validate_path_segment("story id", story_id)?;
        self.api
            .execute(
                Method::DELETE,
                &format!("/reading-history/{}", story_id),
                AuthScope::User,
            )
            .await
    }

    pub async fn clear(&self) -> Result<()> {
        self.api
            .execute(Method::DELETE, "/reading-history", AuthScope::User)
            .await
    }
}

/// "最近阅读"视图最多展示的条目
pub fn recent_slice(entries: &[ReadingHistoryEntry]) -> &[ReadingHistoryEntry] {
    &entries[..entries.len().min(RECENT_HISTORY_LIMIT)]
}

/// 本地阅读记录镜像
///
/// 服务端负责"只保留最近5条"；客户端只镜像服务端的返回，
/// 删除/清空在请求之后直接过滤本地列表，重新加载时以服务端为准。
pub struct ReadingHistoryView {
    service: ReadingHistoryService,
    entries: Vec<ReadingHistoryEntry>,
}

impl ReadingHistoryView {
    pub fn new(service: ReadingHistoryService) -> Self {
        Self {
            service,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[ReadingHistoryEntry] {
        &self.entries
    }

    pub fn recent(&self) -> &[ReadingHistoryEntry] {
        recent_slice(&self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn reload_recent(&mut self) {
        match self.service.list().await {
            Ok(entries) => self.entries = entries,
            Err(e) => {
                error!("Failed to load reading history: {}", e);
                self.entries.clear();
            }
        }
    }

    pub async fn reload_all(&mut self) {
        match self.service.all().await {
            Ok(entries) => self.entries = entries,
            Err(e) => {
                error!("Failed to load full reading history: {}", e);
                self.entries.clear();
            }
        }
    }

    pub async fn remove(&mut self, story_id: &str) {
        if let Err(e) = self.service.delete(story_id).await {
            error!("Failed to delete reading history for {}: {}", story_id, e);
        }
        self.entries.retain(|entry| entry.story_id != story_id);
    }

    pub async fn clear(&mut self) {
        if let Err(e) = self.service.clear().await {
            error!("Failed to clear reading history: {}", e);
        }
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn entry(i: usize) -> ReadingHistoryEntry {
        ReadingHistoryEntry {
            story_id: format!("s{}", i),
            story_title: None,
            story_slug: None,
            story_cover: None,
            chapter_number: 1,
            scroll_position: 0.0,
            updated_at: Utc.timestamp_opt(1_700_000_000 - i as i64, 0).unwrap(),
        }
    }

    proptest! {
        #[test]
        fn recent_never_exceeds_limit(len in 0usize..40) {
            let entries: Vec<_> = (0..len).map(entry).collect();
            let recent = recent_slice(&entries);
            prop_assert_eq!(recent.len(), len.min(RECENT_HISTORY_LIMIT));
            prop_assert_eq!(recent, &entries[..recent.len()]);
        }
    }
}
