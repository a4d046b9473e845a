/// In-memory stores
///
/// Keeps tags and articles in ordered maps behind a single lock so that the
/// constraints PostgreSQL enforces (unique tag names, article → tag foreign
/// key with `ON DELETE RESTRICT`) hold here too. Used by `store.backend =
/// "memory"` and throughout the test suites.

use super::{ArticleStore, StoreError, StoreResult, TagStore};
use crate::models::article::{Article, ArticleFilter, CreateArticle, UpdateArticle};
use crate::models::tag::{CreateTag, Tag, TagFilter, UpdateTag};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    tags: BTreeMap<i64, Tag>,
    /// Stored articles; the embedded tag is refreshed on every read
    articles: BTreeMap<i64, Article>,
    next_tag_id: i64,
    next_article_id: i64,
}

impl Tables {
    fn resolve(&self, stored: &Article) -> Option<Article> {
        let tag = self.tags.get(&stored.tag_id)?;
        let mut article = stored.clone();
        article.tag = tag.clone();
        Some(article)
    }

    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.tags
            .values()
            .any(|tag| tag.name == name && Some(tag.id) != except)
    }
}

/// Process-local implementation of [`TagStore`] and [`ArticleStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn skip_take<T>(items: impl Iterator<Item = T>, offset: i64, limit: i64) -> Vec<T> {
    items
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn tag_exists(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.read().await.tags.contains_key(&id))
    }

    async fn tag_name_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.tables.read().await.name_taken(name, None))
    }

    async fn count_tags(&self, filter: &TagFilter) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().filter(|t| filter.matches(t)).count() as i64)
    }

    async fn list_tags(
        &self,
        offset: i64,
        limit: i64,
        filter: &TagFilter,
    ) -> StoreResult<Vec<Tag>> {
        let tables = self.tables.read().await;
        let matching = tables.tags.values().filter(|t| filter.matches(t)).cloned();
        Ok(skip_take(matching, offset, limit))
    }

    async fn get_tag(&self, id: i64) -> StoreResult<Option<Tag>> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn create_tag(&self, data: CreateTag) -> StoreResult<Tag> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&data.name, None) {
            return Err(StoreError::Conflict(format!(
                "tag name '{}' already exists",
                data.name
            )));
        }

        tables.next_tag_id += 1;
        let tag = Tag {
            id: tables.next_tag_id,
            name: data.name,
            created_by: data.created_by,
            modified_by: String::new(),
            created_at: Utc::now(),
            modified_at: None,
            state: data.state,
        };
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn update_tag(&self, id: i64, data: UpdateTag) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &data.name {
            if tables.name_taken(name, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "tag name '{}' already exists",
                    name
                )));
            }
        }

        let Some(tag) = tables.tags.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(name) = data.name {
            tag.name = name;
        }
        if let Some(state) = data.state {
            tag.state = state;
        }
        tag.modified_by = data.modified_by;
        tag.modified_at = Some(Utc::now());
        Ok(true)
    }

    async fn delete_tag(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.articles.values().any(|r| r.tag_id == id) {
            return Err(StoreError::ForeignKey(format!(
                "tag {} is still referenced by articles",
                id
            )));
        }
        Ok(tables.tags.remove(&id).is_some())
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn article_exists(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.read().await.articles.contains_key(&id))
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .values()
            .filter(|r| filter.matches(r))
            .count() as i64)
    }

    async fn list_articles(
        &self,
        offset: i64,
        limit: i64,
        filter: &ArticleFilter,
    ) -> StoreResult<Vec<Article>> {
        let tables = self.tables.read().await;
        let matching = tables
            .articles
            .values()
            .filter(|r| filter.matches(r))
            .filter_map(|r| tables.resolve(r));
        Ok(skip_take(matching, offset, limit))
    }

    async fn get_article(&self, id: i64) -> StoreResult<Option<Article>> {
        let tables = self.tables.read().await;
        Ok(tables.articles.get(&id).and_then(|r| tables.resolve(r)))
    }

    async fn create_article(&self, data: CreateArticle) -> StoreResult<Article> {
        let mut tables = self.tables.write().await;
        let Some(tag) = tables.tags.get(&data.tag_id).cloned() else {
            return Err(StoreError::ForeignKey(format!(
                "tag {} does not exist",
                data.tag_id
            )));
        };

        tables.next_article_id += 1;
        let article = Article {
            id: tables.next_article_id,
            tag_id: data.tag_id,
            tag,
            title: data.title,
            desc: data.desc,
            content: data.content,
            created_by: data.created_by,
            modified_by: String::new(),
            created_at: Utc::now(),
            modified_at: None,
            state: data.state,
        };
        tables.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update_article(&self, id: i64, data: UpdateArticle) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if let Some(tag_id) = data.tag_id {
            if !tables.tags.contains_key(&tag_id) {
                return Err(StoreError::ForeignKey(format!(
                    "tag {} does not exist",
                    tag_id
                )));
            }
        }

        let Some(article) = tables.articles.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(tag_id) = data.tag_id {
            article.tag_id = tag_id;
        }
        if let Some(title) = data.title {
            article.title = title;
        }
        if let Some(desc) = data.desc {
            article.desc = desc;
        }
        if let Some(content) = data.content {
            article.content = content;
        }
        if let Some(state) = data.state {
            article.state = state;
        }
        article.modified_by = data.modified_by;
        article.modified_at = Some(Utc::now());
        Ok(true)
    }

    async fn delete_article(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.articles.remove(&id).is_some())
    }

    async fn article_ids_by_tag(&self, tag_id: i64) -> StoreResult<Vec<i64>> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .values()
            .filter(|r| r.tag_id == tag_id)
            .map(|r| r.id)
            .collect())
    }
}
