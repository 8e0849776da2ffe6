use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use remark_core::domain::comments::{Comment, NewComment};
use remark_core::domain::posts::{NewPost, Post};
use remark_core::ids::generate_id;
use remark_core::types::PageRequest;

use super::{Storage, StorageError};

/// Storage backed by the `posts` and `comments` tables. Ties on `created_at`
/// are broken by the identity column `seq`, which follows insertion order.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Storage for PostgresStorage {
    async fn create_post(&self, post: NewPost) -> Result<Post, StorageError> {
        let id = post
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_id);
        let post = post.into_post(id, now());
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, author, comments_enabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.comments_enabled)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(post)
    }

    async fn get_posts(&self, page: PageRequest) -> Result<Vec<Post>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, author, comments_enabled, created_at
            FROM posts
            ORDER BY created_at DESC, seq DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(to_sql_count(page.limit))
        .bind(to_sql_count(page.offset))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_post).collect()
    }

    async fn get_post(&self, id: &str) -> Result<Post, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, author, comments_enabled, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => map_post(&row),
            None => Err(StorageError::post_not_found(id)),
        }
    }

    async fn update_post(&self, post: &Post) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, comments_enabled = $3
            WHERE id = $4
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.comments_enabled)
        .bind(&post.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::post_not_found(&post.id));
        }
        Ok(())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, StorageError> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query("SELECT 1 FROM posts WHERE id = $1")
            .bind(&comment.post_id)
            .fetch_optional(&mut *tx)
            .await?;
        if post.is_none() {
            return Err(StorageError::post_not_found(&comment.post_id));
        }

        if let Some(parent_id) = comment.parent_id.as_deref() {
            let parent = sqlx::query("SELECT post_id FROM comments WHERE id = $1")
                .bind(parent_id)
                .fetch_optional(&mut *tx)
                .await?;
            let parent_post_id: Option<String> =
                parent.map(|row| row.try_get::<String, _>("post_id")).transpose()?;
            if parent_post_id.as_deref() != Some(comment.post_id.as_str()) {
                return Err(StorageError::ParentNotFound(parent_id.to_string()));
            }
        }

        let comment = comment.into_comment(generate_id(), now());
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, parent_id, author, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.parent_id)
        .bind(&comment.author)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(comment)
    }

    async fn get_comment(&self, id: &str) -> Result<Comment, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, post_id, parent_id, author, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => map_comment(&row),
            None => Err(StorageError::comment_not_found(id)),
        }
    }

    async fn get_comments_by_post(
        &self,
        post_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, parent_id, author, content, created_at
            FROM comments
            WHERE post_id = $1 AND parent_id IS NULL
            ORDER BY created_at DESC, seq DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(to_sql_count(page.limit))
        .bind(to_sql_count(page.offset))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_comment).collect()
    }

    async fn count_comments_by_post(&self, post_id: &str) -> Result<usize, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM comments
            WHERE post_id = $1 AND parent_id IS NULL
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        let count: i64 = row.try_get("count")?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn get_comment_replies(&self, parent_id: &str) -> Result<Vec<Comment>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, parent_id, author, content, created_at
            FROM comments
            WHERE parent_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_comment).collect()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

// TIMESTAMPTZ keeps microseconds; truncating up front keeps the returned
// record equal to what a later read yields.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_post(row: &PgRow) -> Result<Post, StorageError> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        comments_enabled: row.try_get("comments_enabled")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_comment(row: &PgRow) -> Result<Comment, StorageError> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        parent_id: row.try_get("parent_id")?,
        author: row.try_get("author")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}
