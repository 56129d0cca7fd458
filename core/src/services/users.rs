use super::{log_call, Service};
use crate::context::RequestContext;
use crate::error::Result;
use crate::http::{HttpMethod, ResponseEnvelope};

/// Read-only operations on `/users`.
#[derive(Debug, Clone, Copy)]
pub struct UserService<'a> {
    context: &'a RequestContext,
}

impl<'a> Service<'a> for UserService<'a> {
    const RESOURCE: &'static str = "/users";

    fn new(context: &'a RequestContext) -> Self {
        Self { context }
    }

    fn context(&self) -> &'a RequestContext {
        self.context
    }
}

impl<'a> UserService<'a> {
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
}
