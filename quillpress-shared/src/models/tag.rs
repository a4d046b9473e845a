/// Tag model and database operations
///
/// Tags group articles. Names are unique across the whole blog.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE blog_tag (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     created_by VARCHAR(100) NOT NULL DEFAULT '',
///     modified_by VARCHAR(100) NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     modified_at TIMESTAMPTZ,
///     state SMALLINT NOT NULL DEFAULT 0,
///     CONSTRAINT blog_tag_name_key UNIQUE (name)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use quillpress_shared::models::tag::{Tag, TagFilter};
/// use quillpress_shared::models::State;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let filter = TagFilter {
///     state: Some(State::Enabled),
///     ..Default::default()
/// };
///
/// let total = Tag::count(&pool, &filter).await?;
/// let first_page = Tag::list(&pool, 0, 10, &filter).await?;
/// println!("{} of {} tags", first_page.len(), total);
/// # Ok(())
/// # }
/// ```

use super::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

const TAG_COLUMNS: &str = "id, name, created_by, modified_by, created_at, modified_at, state";

/// Tag row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Tag ID
    pub id: i64,

    /// Unique display name
    pub name: String,

    /// Who created the tag
    pub created_by: String,

    /// Who last modified the tag (empty until the first edit)
    pub modified_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: Option<DateTime<Utc>>,

    /// Publication state
    pub state: State,
}

/// Input for creating a new tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub created_by: String,
    #[serde(default)]
    pub state: State,
}

/// Partial update for an existing tag
///
/// `None` fields are left untouched. `modified_by` is always written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub state: Option<State>,
    pub modified_by: String,
}

/// Equality filters accepted by tag list/count queries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    /// Exact name match
    pub name: Option<String>,

    /// Exact state match
    pub state: Option<State>,
}

impl TagFilter {
    /// Returns true if `tag` satisfies every set constraint
    pub fn matches(&self, tag: &Tag) -> bool {
        self.name.as_ref().map_or(true, |name| &tag.name == name)
            && self.state.map_or(true, |state| tag.state == state)
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let mut keyword = " WHERE ";
        if let Some(name) = &self.name {
            builder.push(keyword).push("name = ").push_bind(name.clone());
            keyword = " AND ";
        }
        if let Some(state) = self.state {
            builder.push(keyword).push("state = ").push_bind(state);
        }
    }
}

impl Tag {
    /// Inserts a new tag and returns the stored row
    ///
    /// # Errors
    ///
    /// Returns a database error carrying the `blog_tag_name_key` constraint
    /// when the name is already taken.
    pub async fn create(pool: &PgPool, data: CreateTag) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO blog_tag (name, created_by, state) VALUES ($1, $2, $3) RETURNING {}",
            TAG_COLUMNS
        );

        sqlx::query_as::<_, Tag>(&query)
            .bind(data.name)
            .bind(data.created_by)
            .bind(data.state)
            .fetch_one(pool)
            .await
    }

    /// Finds a tag by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM blog_tag WHERE id = $1", TAG_COLUMNS);

        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Checks whether a tag with this ID exists
    pub async fn exists_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blog_tag WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Checks whether a tag with this exact name exists
    pub async fn exists_by_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blog_tag WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Counts tags matching `filter`
    pub async fn count(pool: &PgPool, filter: &TagFilter) -> Result<i64, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blog_tag");
        filter.push_where(&mut builder);

        let (count,): (i64,) = builder.build_query_as().fetch_one(pool).await?;
        Ok(count)
    }

    /// Lists one page of tags matching `filter`, ordered by ID
    pub async fn list(
        pool: &PgPool,
        offset: i64,
        limit: i64,
        filter: &TagFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM blog_tag", TAG_COLUMNS));
        filter.push_where(&mut builder);
        builder
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        builder.build_query_as::<Tag>().fetch_all(pool).await
    }

    /// Applies a partial update and stamps `modified_at`
    ///
    /// # Returns
    ///
    /// `true` if a row was updated, `false` if the tag doesn't exist
    pub async fn update(pool: &PgPool, id: i64, data: UpdateTag) -> Result<bool, sqlx::Error> {
        let mut builder =
            QueryBuilder::<Postgres>::new("UPDATE blog_tag SET modified_at = NOW(), modified_by = ");
        builder.push_bind(data.modified_by);

        if let Some(name) = data.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(state) = data.state {
            builder.push(", state = ").push_bind(state);
        }

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes a tag
    ///
    /// Fails with a foreign key violation while articles still reference it.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_tag WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
