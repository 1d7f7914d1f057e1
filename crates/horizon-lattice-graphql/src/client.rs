//! GraphQL client implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;

use crate::cancel::run_cancellable;
use crate::config::ClientConfig;
use crate::decode::decode_data;
use crate::envelope::{self, ResponseEnvelope};
use crate::error::{GraphQLClientError, Result};
use crate::query::{DefaultQueryBuilder, OperationType, QueryBuilder};
use crate::request::{Request, RequestKind, Target};
use crate::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::variables::Variables;

/// Builder for creating a GraphQL client.
pub struct GraphQLClientBuilder {
    url: String,
    transport: Option<Arc<dyn Transport>>,
    query_builder: Option<Arc<dyn QueryBuilder>>,
    headers: HashMap<String, String>,
    strict: bool,
    request_timeout: Option<Duration>,
}

impl GraphQLClientBuilder {
    /// Create a new builder with the specified GraphQL endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transport: None,
            query_builder: None,
            headers: HashMap::new(),
            strict: false,
            request_timeout: None,
        }
    }

    /// Create a builder from loaded configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            url: config.url,
            transport: None,
            query_builder: None,
            headers: config.headers.into_iter().collect(),
            strict: config.strict,
            request_timeout: config.timeout_ms.map(Duration::from_millis),
        }
    }

    /// Send operations through `transport` instead of the default client.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Send operations through a shared transport.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use an existing `reqwest` client.
    pub fn http_client(self, client: reqwest::Client) -> Self {
        self.transport(ReqwestTransport::from_client(client))
    }

    /// Generate shaped documents with a custom builder.
    pub fn query_builder(mut self, builder: impl QueryBuilder + 'static) -> Self {
        self.query_builder = Some(Arc::new(builder));
        self
    }

    /// Add a header to all requests.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add multiple headers.
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set bearer token authentication.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.headers
            .insert("Authorization".into(), format!("Bearer {}", token.into()));
        self
    }

    /// Only match response members against primary field names.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the default timeout for operations that do not set their own.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the GraphQL client.
    pub fn build(self) -> Result<GraphQLClient> {
        url::Url::parse(&self.url)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        // Surface bad header names and values here rather than on first use.
        header_map(&self.headers)?;

        Ok(GraphQLClient {
            url: self.url,
            transport,
            query_builder: self
                .query_builder
                .unwrap_or_else(|| Arc::new(DefaultQueryBuilder)),
            headers: self.headers,
            strict: self.strict,
            request_timeout: self.request_timeout,
        })
    }
}

/// A GraphQL client for queries and mutations.
///
/// The client holds only configuration and can be shared across tasks; each
/// operation is independent. Header and strictness changes require `&mut`,
/// so they cannot race with calls in flight on the same instance.
///
/// # Example
///
/// ```ignore
/// use horizon_lattice_graphql::{GraphQLClient, GraphQLObject, Request};
///
/// #[derive(Debug, Default, GraphQLObject)]
/// struct ViewerQuery {
///     viewer: Viewer,
/// }
///
/// #[derive(Debug, Default, GraphQLObject)]
/// struct Viewer {
///     login: String,
/// }
///
/// let client = GraphQLClient::new("https://api.example.com/graphql")
///     .bearer_auth("my-token")
///     .build()?;
///
/// let mut q = ViewerQuery::default();
/// client.query(Request::shaped(&mut q)).await?;
/// println!("{}", q.viewer.login);
/// ```
#[derive(Clone)]
pub struct GraphQLClient {
    url: String,
    transport: Arc<dyn Transport>,
    query_builder: Arc<dyn QueryBuilder>,
    headers: HashMap<String, String>,
    strict: bool,
    request_timeout: Option<Duration>,
}

impl GraphQLClient {
    /// Create a new GraphQL client with the specified endpoint URL.
    pub fn new(url: impl Into<String>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(url)
    }

    /// Create a new builder for configuring a GraphQL client.
    pub fn builder(url: impl Into<String>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(url)
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether decoding ignores secondary field names.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Change decode strictness for subsequent operations.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Headers applied to every request.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to the headers applied to every request.
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Execute a query and decode `data` into the request's target.
    pub async fn query(&self, request: Request<'_>) -> Result<()> {
        self.run(OperationType::Query, None, request).await
    }

    /// Execute a query with an operation name.
    pub async fn named_query(&self, name: &str, request: Request<'_>) -> Result<()> {
        self.run(OperationType::Query, Some(name), request).await
    }

    /// Execute a mutation and decode `data` into the request's target.
    pub async fn mutate(&self, request: Request<'_>) -> Result<()> {
        self.run(OperationType::Mutation, None, request).await
    }

    /// Execute a mutation with an operation name.
    pub async fn named_mutate(&self, name: &str, request: Request<'_>) -> Result<()> {
        self.run(OperationType::Mutation, Some(name), request).await
    }

    /// Execute a query and return `data` undecoded.
    pub async fn query_raw(&self, request: Request<'_>) -> Result<Option<Value>> {
        self.run_raw(OperationType::Query, None, request).await
    }

    /// Execute a named query and return `data` undecoded.
    pub async fn named_query_raw(&self, name: &str, request: Request<'_>) -> Result<Option<Value>> {
        self.run_raw(OperationType::Query, Some(name), request).await
    }

    /// Execute a mutation and return `data` undecoded.
    pub async fn mutate_raw(&self, request: Request<'_>) -> Result<Option<Value>> {
        self.run_raw(OperationType::Mutation, None, request).await
    }

    /// Execute a named mutation and return `data` undecoded.
    pub async fn named_mutate_raw(
        &self,
        name: &str,
        request: Request<'_>,
    ) -> Result<Option<Value>> {
        self.run_raw(OperationType::Mutation, Some(name), request).await
    }

    async fn run(
        &self,
        operation: OperationType,
        name: Option<&str>,
        request: Request<'_>,
    ) -> Result<()> {
        let Request { kind, options } = request;
        let (query, variables, target) = self.prepare(operation, name, kind)?;

        let deadline = options.effective_deadline(Instant::now(), self.request_timeout);
        let envelope = run_cancellable(
            self.round_trip(&query, &variables),
            deadline,
            options.cancellation.as_ref(),
        )
        .await?;

        let (data, errors) = envelope.into_parts();

        if let (Some(data), Some(target)) = (data.as_ref(), target) {
            decode_data(data, target, self.strict)?;
            tracing::trace!(target: "horizon_lattice_graphql", "decoded response data");
        }

        match errors {
            Some(errors) => {
                tracing::debug!(
                    target: "horizon_lattice_graphql",
                    count = errors.len(),
                    "server reported errors"
                );
                Err(GraphQLClientError::GraphQL { errors, data })
            }
            None => Ok(()),
        }
    }

    async fn run_raw(
        &self,
        operation: OperationType,
        name: Option<&str>,
        request: Request<'_>,
    ) -> Result<Option<Value>> {
        let Request { kind, options } = request;
        let (query, variables, _) = self.prepare(operation, name, kind)?;

        let deadline = options.effective_deadline(Instant::now(), self.request_timeout);
        let envelope = run_cancellable(
            self.round_trip(&query, &variables),
            deadline,
            options.cancellation.as_ref(),
        )
        .await?;

        match envelope.into_parts() {
            (data, Some(errors)) => Err(GraphQLClientError::GraphQL { errors, data }),
            (data, None) => Ok(data),
        }
    }

    /// Resolve the document, variables and decode target of a request.
    ///
    /// Manual requests bypass the query builder entirely.
    fn prepare<'a>(
        &self,
        operation: OperationType,
        name: Option<&str>,
        kind: RequestKind<'a>,
    ) -> Result<(String, Variables, Option<Target<'a>>)> {
        match kind {
            RequestKind::Shaped {
                descriptor,
                target,
                variables,
            } => {
                let query = self
                    .query_builder
                    .build(operation, descriptor, &variables, name)?;
                tracing::debug!(
                    target: "horizon_lattice_graphql",
                    %operation,
                    shape = descriptor.type_name(),
                    "built query"
                );
                Ok((query, variables, target))
            }
            RequestKind::Manual(manual) => {
                tracing::debug!(target: "horizon_lattice_graphql", %operation, "using manual query");
                Ok((manual.query, manual.variables, manual.result))
            }
        }
    }

    /// Encode, send, and decode the envelope of one operation.
    async fn round_trip(&self, query: &str, variables: &Variables) -> Result<ResponseEnvelope> {
        let body = envelope::encode(query, variables)?;
        let request = TransportRequest {
            url: self.url.clone(),
            headers: header_map(&self.headers)?,
            body,
        };

        tracing::debug!(
            target: "horizon_lattice_graphql",
            url = %self.url,
            variables = variables.len(),
            "sending operation"
        );

        let response = self.transport.send(request).await?;

        if response.status != StatusCode::OK {
            tracing::debug!(
                target: "horizon_lattice_graphql",
                status = %response.status,
                "unexpected status"
            );
            return Err(GraphQLClientError::HttpStatus {
                status: response.status,
                body: response.text(),
            });
        }

        let envelope = ResponseEnvelope::decode(&response.body)?;
        tracing::trace!(
            target: "horizon_lattice_graphql",
            has_data = envelope.has_data(),
            errors = envelope.errors.len(),
            "decoded envelope"
        );
        Ok(envelope)
    }
}

/// Build the header map for an outgoing request.
///
/// JSON content headers come first; caller headers replace them.
fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len() + 2);
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    map.insert(ACCEPT, HeaderValue::from_static("application/json"));

    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        map.insert(name, value);
    }

    Ok(map)
}

impl fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("url", &self.url)
            .field("strict", &self.strict)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = GraphQLClient::new("https://api.example.com/graphql")
            .build()
            .unwrap();

        assert_eq!(client.url(), "https://api.example.com/graphql");
        assert!(!client.strict());
        assert!(client.headers().is_empty());
    }

    #[test]
    fn test_builder_auth() {
        let client = GraphQLClient::new("https://api.example.com/graphql")
            .bearer_auth("my-token")
            .build()
            .unwrap();

        assert_eq!(
            client.headers().get("Authorization").map(String::as_str),
            Some("Bearer my-token")
        );
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let err = GraphQLClient::new("not a url").build().unwrap_err();
        assert!(matches!(err, GraphQLClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_builder_rejects_bad_header() {
        let err = GraphQLClient::new("https://api.example.com/graphql")
            .header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphQLClientError::InvalidHeader(_)));
    }

    #[test]
    fn test_header_map_overrides_content_type() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/graphql+json".to_string());
        headers.insert("X-Trace".to_string(), "abc".to_string());

        let map = header_map(&headers).unwrap();
        assert_eq!(map[CONTENT_TYPE], "application/graphql+json");
        assert_eq!(map[ACCEPT], "application/json");
        assert_eq!(map["x-trace"], "abc");
    }

    #[test]
    fn test_mutable_configuration() {
        let mut client = GraphQLClient::new("https://api.example.com/graphql")
            .build()
            .unwrap();

        client.set_strict(true);
        client
            .headers_mut()
            .insert("X-Api-Key".into(), "secret".into());

        assert!(client.strict());
        assert_eq!(client.headers().len(), 1);
    }
}
