//! Harness for integration-testing a JSON REST API.
//!
//! # Overview
//! Configuration is resolved once from layered settings files, environment
//! variables and explicit overrides. A [`Suite`] then opens a log sink,
//! initializes a [`ClientFactory`] and hands out resource services
//! ([`PostService`], [`TodoService`], [`UserService`]) bound to the primary
//! [`RequestContext`]. Service calls return raw [`ResponseEnvelope`]s; tests
//! check them with [`ResponseAssertions`] and decode bodies with the
//! case-insensitive [`codec`].
//!
//! # Design
//! - Non-2xx statuses are data, never errors.
//! - Only configuration and header errors are fatal to a suite.
//! - No global logger: each suite owns its own dispatcher, see [`logging`].

pub mod assertions;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod headers;
pub mod http;
pub mod logging;
pub mod services;
pub mod suite;
pub mod testdata;
pub mod types;

pub use assertions::{expect_eq, expect_that, ResponseAssertions};
pub use config::{ConfigLoader, Configuration};
pub use context::RequestContext;
pub use error::{Error, Result};
pub use factory::{ClientFactory, FactoryState};
pub use headers::HeaderSet;
pub use http::{HttpMethod, ResponseEnvelope};
pub use logging::{LogSink, Logger};
pub use services::{PostService, Service, TodoService, UserService};
pub use suite::{Suite, SuiteReport, TestResult};
pub use types::{Address, Comment, Company, CreatePost, Geo, Post, PostPatch, Todo, UpdatePost, User};
