/// Article model and database operations
///
/// Every article belongs to exactly one tag. Reads always JOIN `blog_tag` so
/// the returned [`Article`] carries its tag eagerly.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE blog_article (
///     id BIGSERIAL PRIMARY KEY,
///     tag_id BIGINT NOT NULL REFERENCES blog_tag(id) ON DELETE RESTRICT,
///     title VARCHAR(100) NOT NULL,
///     description VARCHAR(255) NOT NULL,
///     content TEXT NOT NULL,
///     created_by VARCHAR(100) NOT NULL DEFAULT '',
///     modified_by VARCHAR(100) NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     modified_at TIMESTAMPTZ,
///     state SMALLINT NOT NULL DEFAULT 0
/// );
/// ```

use super::tag::Tag;
use super::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

const ARTICLE_SELECT: &str = "SELECT a.id, a.tag_id, a.title, a.description, a.content, \
     a.created_by, a.modified_by, a.created_at, a.modified_at, a.state, \
     t.name AS tag_name, t.created_by AS tag_created_by, t.modified_by AS tag_modified_by, \
     t.created_at AS tag_created_at, t.modified_at AS tag_modified_at, t.state AS tag_state";

/// Article with its tag resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub tag_id: i64,
    pub tag: Tag,
    pub title: String,
    pub desc: String,
    pub content: String,
    pub created_by: String,
    pub modified_by: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub state: State,
}

/// Flat JOIN row, folded into [`Article`]
#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    tag_id: i64,
    title: String,
    description: String,
    content: String,
    created_by: String,
    modified_by: String,
    created_at: DateTime<Utc>,
    modified_at: Option<DateTime<Utc>>,
    state: State,
    tag_name: String,
    tag_created_by: String,
    tag_modified_by: String,
    tag_created_at: DateTime<Utc>,
    tag_modified_at: Option<DateTime<Utc>>,
    tag_state: State,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            tag_id: row.tag_id,
            tag: Tag {
                id: row.tag_id,
                name: row.tag_name,
                created_by: row.tag_created_by,
                modified_by: row.tag_modified_by,
                created_at: row.tag_created_at,
                modified_at: row.tag_modified_at,
                state: row.tag_state,
            },
            title: row.title,
            desc: row.description,
            content: row.content,
            created_by: row.created_by,
            modified_by: row.modified_by,
            created_at: row.created_at,
            modified_at: row.modified_at,
            state: row.state,
        }
    }
}

/// Input for creating a new article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticle {
    pub tag_id: i64,
    pub title: String,
    pub desc: String,
    pub content: String,
    pub created_by: String,
    #[serde(default)]
    pub state: State,
}

/// Partial update for an existing article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticle {
    pub tag_id: Option<i64>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub content: Option<String>,
    pub state: Option<State>,
    pub modified_by: String,
}

/// Equality filters accepted by article list/count queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFilter {
    pub state: Option<State>,
    pub tag_id: Option<i64>,
}

impl ArticleFilter {
    /// Returns true if `article` satisfies every set constraint
    pub fn matches(&self, article: &Article) -> bool {
        self.state.map_or(true, |state| article.state == state)
            && self.tag_id.map_or(true, |tag_id| article.tag_id == tag_id)
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let mut keyword = " WHERE ";
        if let Some(state) = self.state {
            builder.push(keyword).push("a.state = ").push_bind(state);
            keyword = " AND ";
        }
        if let Some(tag_id) = self.tag_id {
            builder.push(keyword).push("a.tag_id = ").push_bind(tag_id);
        }
    }
}

impl Article {
    /// Inserts a new article and returns it with its tag
    ///
    /// The caller is expected to have checked that `data.tag_id` exists;
    /// otherwise the foreign key rejects the insert.
    pub async fn create(pool: &PgPool, data: CreateArticle) -> Result<Self, sqlx::Error> {
        let query = format!(
            "WITH a AS (\
                INSERT INTO blog_article (tag_id, title, description, content, created_by, state) \
                VALUES ($1, $2, $3, $4, $5, $6) RETURNING *\
             ) {} FROM a JOIN blog_tag t ON t.id = a.tag_id",
            ARTICLE_SELECT
        );

        let row = sqlx::query_as::<_, ArticleRow>(&query)
            .bind(data.tag_id)
            .bind(data.title)
            .bind(data.desc)
            .bind(data.content)
            .bind(data.created_by)
            .bind(data.state)
            .fetch_one(pool)
            .await?;

        Ok(row.into())
    }

    /// Finds an article by ID, resolving its tag
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "{} FROM blog_article a JOIN blog_tag t ON t.id = a.tag_id WHERE a.id = $1",
            ARTICLE_SELECT
        );

        let row = sqlx::query_as::<_, ArticleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Checks whether an article with this ID exists
    pub async fn exists_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blog_article WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Counts articles matching `filter`
    pub async fn count(pool: &PgPool, filter: &ArticleFilter) -> Result<i64, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blog_article a");
        filter.push_where(&mut builder);

        let (count,): (i64,) = builder.build_query_as().fetch_one(pool).await?;
        Ok(count)
    }

    /// Lists one page of articles matching `filter`, ordered by ID
    pub async fn list(
        pool: &PgPool,
        offset: i64,
        limit: i64,
        filter: &ArticleFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "{} FROM blog_article a JOIN blog_tag t ON t.id = a.tag_id",
            ARTICLE_SELECT
        ));
        filter.push_where(&mut builder);
        builder
            .push(" ORDER BY a.id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder.build_query_as::<ArticleRow>().fetch_all(pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// IDs of every article filed under `tag_id`
    pub async fn ids_by_tag(pool: &PgPool, tag_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM blog_article WHERE tag_id = $1 ORDER BY id")
            .bind(tag_id)
            .fetch_all(pool)
            .await
    }

    /// Applies a partial update and stamps `modified_at`
    pub async fn update(pool: &PgPool, id: i64, data: UpdateArticle) -> Result<bool, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "UPDATE blog_article SET modified_at = NOW(), modified_by = ",
        );
        builder.push_bind(data.modified_by);

        if let Some(tag_id) = data.tag_id {
            builder.push(", tag_id = ").push_bind(tag_id);
        }
        if let Some(title) = data.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(desc) = data.desc {
            builder.push(", description = ").push_bind(desc);
        }
        if let Some(content) = data.content {
            builder.push(", content = ").push_bind(content);
        }
        if let Some(state) = data.state {
            builder.push(", state = ").push_bind(state);
        }

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes an article
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_article WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
