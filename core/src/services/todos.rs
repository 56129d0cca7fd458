use super::{log_call, Service};
use crate::context::RequestContext;
use crate::error::Result;
use crate::http::{HttpMethod, ResponseEnvelope};

/// Read-only operations on `/todos`.
#[derive(Debug, Clone, Copy)]
pub struct TodoService<'a> {
    context: &'a RequestContext,
}

impl<'a> Service<'a> for TodoService<'a> {
    const RESOURCE: &'static str = "/todos";

    fn new(context: &'a RequestContext) -> Self {
        Self { context }
    }

    fn context(&self) -> &'a RequestContext {
        self.context
    }
}

impl<'a> TodoService<'a> {
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

    pub async fn list_by_user(&self, user_id: u32) -> Result<ResponseEnvelope> {
        let path = format!("{}?userId={user_id}", Self::RESOURCE);
        log_call(self.context, HttpMethod::Get, &path);
        self.context.get(&path).await
    }
}
