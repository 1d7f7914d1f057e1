//! Query document generation for shaped requests.

use std::fmt;

use crate::decode::ObjectDescriptor;
use crate::error::{GraphQLClientError, Result};
use crate::variables::Variables;

/// Selections nested deeper than this are rejected; a descriptor that
/// reaches it is almost certainly self-referential.
const MAX_SELECTION_DEPTH: usize = 64;

/// A GraphQL operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationType {
    /// A query operation (read-only).
    #[default]
    Query,
    /// A mutation operation (modifies data).
    Mutation,
}

impl OperationType {
    /// The keyword introducing the operation.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Produces the document for a shaped request.
pub trait QueryBuilder: Send + Sync {
    /// Render an operation selecting `descriptor`'s fields.
    fn build(
        &self,
        operation: OperationType,
        descriptor: &ObjectDescriptor,
        variables: &Variables,
        name: Option<&str>,
    ) -> Result<String>;
}

/// The built-in [`QueryBuilder`].
///
/// Output is compact: `query Name($id:ID!){node(id: $id){id,name}}`. An
/// unnamed query without variables is rendered as a bare selection set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQueryBuilder;

impl QueryBuilder for DefaultQueryBuilder {
    fn build(
        &self,
        operation: OperationType,
        descriptor: &ObjectDescriptor,
        variables: &Variables,
        name: Option<&str>,
    ) -> Result<String> {
        let mut out = String::new();

        let bare = operation == OperationType::Query && name.is_none() && variables.is_empty();
        if !bare {
            out.push_str(operation.keyword());
            if let Some(name) = name {
                out.push(' ');
                out.push_str(name);
            }
            if !variables.is_empty() {
                out.push('(');
                write_variable_definitions(&mut out, variables)?;
                out.push(')');
            }
        }

        write_selection(&mut out, descriptor, 0)?;
        Ok(out)
    }
}

/// Write `$name:Type` for every variable, sorted by name.
fn write_variable_definitions(out: &mut String, variables: &Variables) -> Result<()> {
    for (name, _, input_type) in variables.iter() {
        let input_type = input_type.ok_or_else(|| {
            GraphQLClientError::query_build(format!(
                "variable `{name}` has no declared input type"
            ))
        })?;
        out.push('$');
        out.push_str(name);
        out.push(':');
        out.push_str(input_type);
    }
    Ok(())
}

fn write_selection(out: &mut String, descriptor: &ObjectDescriptor, depth: usize) -> Result<()> {
    if depth >= MAX_SELECTION_DEPTH {
        return Err(GraphQLClientError::query_build(format!(
            "selection on `{}` nests deeper than {MAX_SELECTION_DEPTH} levels",
            descriptor.type_name()
        )));
    }

    out.push('{');
    for (i, field) in descriptor.fields().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(field.query());
        if let Some(nested) = field.shape().object() {
            write_selection(out, nested, depth + 1)?;
        }
    }
    out.push('}');
    Ok(())
}
