use tracing::info;

use super::{log_call, Service};
use crate::context::RequestContext;
use crate::error::Result;
use crate::http::{HttpMethod, ResponseEnvelope};
use crate::types::{CreatePost, PostPatch, UpdatePost};

/// Operations on `/posts`.
#[derive(Debug, Clone, Copy)]
pub struct PostService<'a> {
    context: &'a RequestContext,
}

impl<'a> Service<'a> for PostService<'a> {
    const RESOURCE: &'static str = "/posts";

    fn new(context: &'a RequestContext) -> Self {
        Self { context }
    }

    fn context(&self) -> &'a RequestContext {
        self.context
    }
}

impl<'a> PostService<'a> {
    pub async fn list(&self) -> Result<ResponseEnvelope> {
        let path = Self::RESOURCE;
        log_call(self.context, HttpMethod::Get, path);
        self.context.get(path).await
    }

    pub async fn get_by_id(&self, id: u32) -> Result<ResponseEnvelope> {
        let path = format!("{}/{id}", Self::RESOURCE);
        log_call(self.context, HttpMethod::Get, &path);
        self.context.get(&path).await
    }

    /// Posts written by one user (`?userId=`)
    pub async fn list_by_user(&self, user_id: u32) -> Result<ResponseEnvelope> {
        let path = format!("{}?userId={user_id}", Self::RESOURCE);
        log_call(self.context, HttpMethod::Get, &path);
        self.context.get(&path).await
    }

    pub async fn comments(&self, post_id: u32) -> Result<ResponseEnvelope> {
        let path = format!("{}/{post_id}/comments", Self::RESOURCE);
        log_call(self.context, HttpMethod::Get, &path);
        self.context.get(&path).await
    }

    pub async fn create(&self, post: &CreatePost) -> Result<ResponseEnvelope> {
        let path = Self::RESOURCE;
        self.context.logger().in_scope(|| {
            info!(title = %post.title, user_id = post.user_id, "POST {path}");
        });
        self.context.post(path, post).await
    }

    /// Full replacement (`PUT`)
    pub async fn replace(&self, id: u32, post: &UpdatePost) -> Result<ResponseEnvelope> {
        let path = format!("{}/{id}", Self::RESOURCE);
        log_call(self.context, HttpMethod::Put, &path);
        self.context.put(&path, post).await
    }

    /// Partial update (`PATCH`); only fields set on `patch` are sent.
    pub async fn patch(&self, id: u32, patch: &PostPatch) -> Result<ResponseEnvelope> {
        let path = format!("{}/{id}", Self::RESOURCE);
        log_call(self.context, HttpMethod::Patch, &path);
        self.context.patch(&path, patch).await
    }

    pub async fn delete(&self, id: u32) -> Result<ResponseEnvelope> {
        let path = format!("{}/{id}", Self::RESOURCE);
        log_call(self.context, HttpMethod::Delete, &path);
        self.context.delete(&path).await
    }
}
