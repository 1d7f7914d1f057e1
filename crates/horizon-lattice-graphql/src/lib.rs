//! Typed GraphQL operations for Horizon Lattice.
//!
//! This crate sends GraphQL queries and mutations over HTTP and decodes the
//! `data` member of the response into plain Rust structs:
//!
//! - **Shaped requests**: the query document is generated from the target
//!   type's fields, declared with `#[derive(GraphQLObject)]`
//! - **Manual requests**: a hand-written document is sent verbatim and the
//!   response decoded into a separate result value
//! - **Partial success**: fields present in `data` are populated even when
//!   the server also reports errors; the errors are returned as the failure
//!
//! # Shaped Requests
//!
//! ```ignore
//! use horizon_lattice_graphql::{GraphQLClient, GraphQLObject, Request};
//!
//! #[derive(Debug, Default, GraphQLObject)]
//! struct RepositoryQuery {
//!     #[graphql("repository(owner: $owner, name: $name)")]
//!     repository: Option<Repository>,
//! }
//!
//! #[derive(Debug, Default, GraphQLObject)]
//! struct Repository {
//!     name_with_owner: String,
//!     stargazer_count: i64,
//! }
//!
//! let client = GraphQLClient::new("https://api.github.com/graphql")
//!     .bearer_auth(token)
//!     .build()?;
//!
//! let mut q = RepositoryQuery::default();
//! let request = Request::shaped(&mut q)
//!     .variable("owner", "rust-lang")?
//!     .variable("name", "rust")?;
//! client.named_query("Repository", request).await?;
//! ```
//!
//! # Manual Requests
//!
//! ```ignore
//! use horizon_lattice_graphql::{ManualRequest, Request};
//!
//! let mut result = Nodes::default();
//! let request = ManualRequest::new("{node1: node(id: 1){id} node2: node(id: 2){id}}")
//!     .result(&mut result);
//! client.query(Request::manual(request)).await?;
//! ```
//!
//! # Errors
//!
//! Every call returns a single [`GraphQLClientError`]. Errors reported by
//! the server arrive as [`GraphQLClientError::GraphQL`], which formats all
//! entries in order and keeps them available as [`ErrorEntry`] values.
//!
//! # Cancellation
//!
//! Each request can carry a timeout, a deadline and a [`CancellationToken`].
//! When any of them fires the in-flight HTTP request is dropped and the call
//! returns [`GraphQLClientError::Timeout`] or
//! [`GraphQLClientError::Cancelled`].

extern crate self as horizon_lattice_graphql;

mod cancel;
mod client;
mod config;
pub mod decode;
mod envelope;
mod error;
mod query;
mod request;
mod response;
mod transport;
mod variables;

pub use cancel::{CallOptions, CancellationToken};
pub use client::{GraphQLClient, GraphQLClientBuilder};
pub use config::ClientConfig;
pub use decode::{
    DecodeContext, DecodeError, FieldDescriptor, GraphQLObject, GraphQLType, Id, ObjectDescriptor,
    Shape,
};
pub use envelope::{RequestEnvelope, ResponseEnvelope, encode};
pub use error::{GraphQLClientError, Result};
pub use query::{DefaultQueryBuilder, OperationType, QueryBuilder};
pub use request::{ManualRequest, Request, RequestKind, Target};
pub use response::{ErrorEntry, GraphQLErrors, Location, PathSegment};
pub use transport::{
    ReqwestTransport, ReqwestTransportConfig, Transport, TransportRequest, TransportResponse,
};
pub use variables::{InputType, Variables};

/// Derive macro generating [`GraphQLObject`] and [`GraphQLType`] impls.
pub use horizon_lattice_graphql_macros::GraphQLObject;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}
