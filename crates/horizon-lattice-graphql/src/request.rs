//! Operation requests.
//!
//! A request is either *shaped*, where the document is generated from the
//! target's descriptor, or *manual*, where the caller supplies the document
//! and a separate slot to decode into.
//!
//! ```ignore
//! // Shaped: the document is generated from `Query`.
//! let mut q = Query::default();
//! client.query(Request::shaped(&mut q).variable("login", "octocat")?).await?;
//!
//! // Manual: the document is sent verbatim, the result lands in `q`.
//! let mut q = Query::default();
//! let manual = ManualRequest::new("{ viewer { login } }").result(&mut q);
//! client.query(manual.into()).await?;
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use crate::cancel::{CallOptions, CancellationToken};
use crate::decode::{GraphQLObject, GraphQLType, ObjectDescriptor};
use crate::error::Result;
use crate::variables::{InputType, Variables};

/// A decode target borrowed for the duration of one call.
pub type Target<'a> = &'a mut (dyn GraphQLType + Send);

/// A caller-written document with its own result slot.
pub struct ManualRequest<'a> {
    /// The query or mutation document, sent verbatim.
    pub query: String,
    /// Variables sent with the document.
    pub variables: Variables,
    /// Where `data` is decoded; `None` leaves decoding to the caller.
    pub result: Option<Target<'a>>,
}

impl<'a> ManualRequest<'a> {
    /// Create a manual request without variables or result slot.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Variables::new(),
            result: None,
        }
    }

    /// Set the variables.
    pub fn variables(mut self, variables: impl Into<Variables>) -> Self {
        self.variables = variables.into();
        self
    }

    /// Set the slot `data` is decoded into.
    pub fn result<T: GraphQLType + Send>(mut self, result: &'a mut T) -> Self {
        self.result = Some(result);
        self
    }
}

impl fmt::Debug for ManualRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualRequest")
            .field("query", &self.query)
            .field("variables", &self.variables)
            .field("has_result", &self.result.is_some())
            .finish()
    }
}

/// The two request forms.
pub enum RequestKind<'a> {
    /// The document is generated from `descriptor`.
    Shaped {
        /// The descriptor the document is generated from.
        descriptor: &'static ObjectDescriptor,
        /// Where `data` is decoded; `None` for raw calls.
        target: Option<Target<'a>>,
        /// Variables sent with the document.
        variables: Variables,
    },
    /// The document is supplied by the caller.
    Manual(ManualRequest<'a>),
}

/// A request plus its per-call options.
pub struct Request<'a> {
    pub(crate) kind: RequestKind<'a>,
    pub(crate) options: CallOptions,
}

impl<'a> Request<'a> {
    /// A shaped request that decodes into `target`.
    pub fn shaped<T: GraphQLObject + Send>(target: &'a mut T) -> Self {
        Self::from_kind(RequestKind::Shaped {
            descriptor: T::descriptor(),
            target: Some(target),
            variables: Variables::new(),
        })
    }

    /// A shaped request with no target, for the raw entry points.
    pub fn shape_of<T: GraphQLObject>() -> Self {
        Self::from_kind(RequestKind::Shaped {
            descriptor: T::descriptor(),
            target: None,
            variables: Variables::new(),
        })
    }

    /// A manual request.
    pub fn manual(request: ManualRequest<'a>) -> Self {
        Self::from_kind(RequestKind::Manual(request))
    }

    fn from_kind(kind: RequestKind<'a>) -> Self {
        Self {
            kind,
            options: CallOptions::default(),
        }
    }

    /// Replace the variables.
    pub fn variables(mut self, variables: impl Into<Variables>) -> Self {
        *self.variables_mut() = variables.into();
        self
    }

    /// Add one variable, inferring its input type.
    pub fn variable<T: InputType>(mut self, name: impl Into<String>, value: T) -> Result<Self> {
        self.variables_mut().insert(name, value)?;
        Ok(self)
    }

    /// Limit the round trip to `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Abandon the call at `deadline`.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.options.deadline = Some(deadline);
        self
    }

    /// Abort the call when `token` is cancelled.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.options.cancellation = Some(token);
        self
    }

    /// Replace all per-call options.
    pub fn options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// The request form.
    pub fn kind(&self) -> &RequestKind<'a> {
        &self.kind
    }

    /// Whether the document is supplied by the caller.
    pub fn is_manual(&self) -> bool {
        matches!(self.kind, RequestKind::Manual(_))
    }

    /// The variables sent with the request.
    pub fn get_variables(&self) -> &Variables {
        match &self.kind {
            RequestKind::Shaped { variables, .. } => variables,
            RequestKind::Manual(manual) => &manual.variables,
        }
    }

    fn variables_mut(&mut self) -> &mut Variables {
        match &mut self.kind {
            RequestKind::Shaped { variables, .. } => variables,
            RequestKind::Manual(manual) => &mut manual.variables,
        }
    }
}

impl<'a> From<ManualRequest<'a>> for Request<'a> {
    fn from(request: ManualRequest<'a>) -> Self {
        Self::manual(request)
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Request");
        match &self.kind {
            RequestKind::Shaped { descriptor, .. } => {
                s.field("shape", &descriptor.type_name());
            }
            RequestKind::Manual(manual) => {
                s.field("query", &manual.query);
            }
        }
        s.field("variables", self.get_variables())
            .field("options", &self.options)
            .finish()
    }
}
