use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use remark_core::domain::comments::{Comment, NewComment};
use remark_core::domain::posts::{NewPost, Post};
use remark_core::ids::generate_id;
use remark_core::types::PageRequest;

use super::{Storage, StorageError};

#[derive(Debug, Default)]
struct PostTable {
    records: HashMap<String, Post>,
    // insertion order, used to break creation-time ties
    order: Vec<String>,
}

#[derive(Debug, Default)]
struct CommentTable {
    records: HashMap<String, Comment>,
    roots_by_post: HashMap<String, Vec<String>>,
    replies_by_parent: HashMap<String, Vec<String>>,
}

impl CommentTable {
    fn collect(&self, ids: Option<&Vec<String>>) -> Vec<Comment> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.records.get(id).cloned())
                .collect()
        })
        .unwrap_or_default()
    }
}

/// Process-local storage. Posts and comments sit behind separate locks; a
/// comment and its index entry are written under one guard. When both locks
/// are needed the comment lock is taken first.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    posts: RwLock<PostTable>,
    comments: RwLock<CommentTable>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    async fn create_post(&self, post: NewPost) -> Result<Post, StorageError> {
        let id = post
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_id);
        let post = post.into_post(id, Utc::now());

        let mut posts = self.posts.write().await;
        if posts.records.insert(post.id.clone(), post.clone()).is_none() {
            posts.order.push(post.id.clone());
        }
        Ok(post)
    }

    async fn get_posts(&self, page: PageRequest) -> Result<Vec<Post>, StorageError> {
        let posts = self.posts.read().await;
        let mut items: Vec<Post> = posts
            .order
            .iter()
            .rev()
            .filter_map(|id| posts.records.get(id).cloned())
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.apply(items))
    }

    async fn get_post(&self, id: &str) -> Result<Post, StorageError> {
        let posts = self.posts.read().await;
        posts
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::post_not_found(id))
    }

    async fn update_post(&self, post: &Post) -> Result<(), StorageError> {
        let mut posts = self.posts.write().await;
        let stored = posts
            .records
            .get_mut(&post.id)
            .ok_or_else(|| StorageError::post_not_found(&post.id))?;
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.comments_enabled = post.comments_enabled;
        Ok(())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, StorageError> {
        let mut comments = self.comments.write().await;

        if !self.posts.read().await.records.contains_key(&comment.post_id) {
            return Err(StorageError::post_not_found(&comment.post_id));
        }
        if let Some(parent_id) = comment.parent_id.as_deref() {
            let same_post = comments
                .records
                .get(parent_id)
                .is_some_and(|parent| parent.post_id == comment.post_id);
            if !same_post {
                return Err(StorageError::ParentNotFound(parent_id.to_string()));
            }
        }

        let comment = comment.into_comment(generate_id(), Utc::now());
        match comment.parent_id.as_ref() {
            Some(parent_id) => comments
                .replies_by_parent
                .entry(parent_id.clone())
                .or_default()
                .push(comment.id.clone()),
            None => comments
                .roots_by_post
                .entry(comment.post_id.clone())
                .or_default()
                .push(comment.id.clone()),
        }
        comments.records.insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: &str) -> Result<Comment, StorageError> {
        let comments = self.comments.read().await;
        comments
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::comment_not_found(id))
    }

    async fn get_comments_by_post(
        &self,
        post_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StorageError> {
        let comments = self.comments.read().await;
        let mut roots = comments.collect(comments.roots_by_post.get(post_id));
        roots.reverse();
        roots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.apply(roots))
    }

    async fn count_comments_by_post(&self, post_id: &str) -> Result<usize, StorageError> {
        let comments = self.comments.read().await;
        Ok(comments.roots_by_post.get(post_id).map_or(0, Vec::len))
    }

    async fn get_comment_replies(&self, parent_id: &str) -> Result<Vec<Comment>, StorageError> {
        let comments = self.comments.read().await;
        let mut replies = comments.collect(comments.replies_by_parent.get(parent_id));
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(replies)
    }

    async fn close(&self) {}
}
