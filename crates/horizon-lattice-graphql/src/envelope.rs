//! Wire envelopes for requests and responses.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphQLClientError, Result};
use crate::response::{ErrorEntry, GraphQLErrors, null_as_empty};
use crate::variables::Variables;

/// The request body: `{"query": ..., "variables": {...}}`.
///
/// `variables` is left out entirely when there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// The query document.
    pub query: String,

    /// Variable values.
    #[serde(default, skip_serializing_if = "Variables::is_empty")]
    pub variables: Variables,
}

impl RequestEnvelope {
    /// Parse an encoded request body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(GraphQLClientError::EnvelopeDecode)
    }
}

/// Serialize a request body.
pub fn encode(query: &str, variables: &Variables) -> Result<Bytes> {
    #[derive(Serialize)]
    struct Outgoing<'a> {
        query: &'a str,
        #[serde(skip_serializing_if = "no_variables")]
        variables: &'a Variables,
    }

    fn no_variables(variables: &&Variables) -> bool {
        variables.is_empty()
    }

    serde_json::to_vec(&Outgoing { query, variables })
        .map(Bytes::from)
        .map_err(GraphQLClientError::Encode)
}

/// The response body: `{"data": ..., "errors": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// The `data` member; `None` when absent or `null`.
    #[serde(default)]
    pub data: Option<Value>,

    /// The `errors` member; empty when absent or `null`.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<ErrorEntry>,
}

impl ResponseEnvelope {
    /// Parse a response body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(GraphQLClientError::EnvelopeDecode)
    }

    /// Whether the `data` member should be handed to the decoder.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Split into data and the aggregated errors, if any.
    pub fn into_parts(self) -> (Option<Value>, Option<GraphQLErrors>) {
        (self.data, GraphQLErrors::from_entries(self.errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_variables_are_omitted() {
        let body = encode("{viewer{login}}", &Variables::new()).unwrap();
        assert_eq!(&body[..], br#"{"query":"{viewer{login}}"}"#);
    }

    #[test]
    fn test_variables_round_trip() {
        let variables = Variables::new()
            .with("login", "octocat")
            .unwrap()
            .with("first", 3)
            .unwrap()
            .with("labels", vec!["bug".to_string(), "ui".to_string()])
            .unwrap();

        let body = encode("query($login:String!){user(login: $login){id}}", &variables).unwrap();
        let decoded = RequestEnvelope::decode(&body).unwrap();

        assert_eq!(decoded.variables.to_json(), variables.to_json());
        assert_eq!(decoded.query, "query($login:String!){user(login: $login){id}}");
    }

    #[test]
    fn test_data_absent_null_and_present() {
        let absent = ResponseEnvelope::decode(br#"{"errors":[{"message":"boom"}]}"#).unwrap();
        assert!(!absent.has_data());
        assert_eq!(absent.errors.len(), 1);

        let null = ResponseEnvelope::decode(br#"{"data":null}"#).unwrap();
        assert!(!null.has_data());

        let present = ResponseEnvelope::decode(br#"{"data":{"a":1},"errors":null}"#).unwrap();
        assert_eq!(present.data, Some(json!({"a": 1})));
        assert!(present.errors.is_empty());
    }

    #[test]
    fn test_into_parts() {
        let envelope = ResponseEnvelope::decode(
            br#"{"data":{"user":null},"errors":[{"message":"denied","locations":[{"line":1,"column":2}]}]}"#,
        )
        .unwrap();

        let (data, errors) = envelope.into_parts();
        assert_eq!(data, Some(json!({"user": null})));
        assert_eq!(
            errors.unwrap().to_string(),
            "Message: denied, Locations: [{Line:1 Column:2}]"
        );
    }

    #[test]
    fn test_error_without_message_keeps_data() {
        let envelope = ResponseEnvelope::decode(
            br#"{"data":{"ok":true},"errors":[{"extensions":{"code":"X"}},{"message":"second"}]}"#,
        )
        .unwrap();

        let (data, errors) = envelope.into_parts();
        assert_eq!(data, Some(json!({"ok": true})));
        assert_eq!(
            errors.unwrap().to_string(),
            "Message: , Locations: []Message: second, Locations: []"
        );
    }

    #[test]
    fn test_malformed_body() {
        let err = ResponseEnvelope::decode(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, GraphQLClientError::EnvelopeDecode(_)));
    }
}
