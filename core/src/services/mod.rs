//! Resource-scoped service objects.
//!
//! A service borrows a [`RequestContext`] and exposes one method per
//! endpoint. Methods log the call and hand back the raw
//! [`ResponseEnvelope`](crate::http::ResponseEnvelope); status checks and
//! decoding are left to the test.

mod posts;
mod todos;
mod users;

pub use posts::PostService;
pub use todos::TodoService;
pub use users::UserService;

use tracing::info;

use crate::context::RequestContext;
use crate::http::HttpMethod;

/// A service bound to a borrowed request context.
pub trait Service<'a>: Sized {
    /// Collection path, e.g. `/posts`
    const RESOURCE: &'static str;

    fn new(context: &'a RequestContext) -> Self;

    fn context(&self) -> &'a RequestContext;
}

fn log_call(context: &RequestContext, method: HttpMethod, path: &str) {
    context.logger().in_scope(|| {
        info!(%method, path, "{method} {path}");
    });
}
