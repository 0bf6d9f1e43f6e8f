use std::borrow::Cow;

use serde_json::Value;

use crate::context::{get_attr, Context, Val};
use crate::errors::Result;

/// What a section pushes on the chain
#[derive(Clone, Copy, Debug)]
pub enum Scope<'a> {
    /// An element of plain data
    Value(&'a Value),
    /// A nested context, methods included
    Record(&'a Context),
}

impl<'a> From<Scope<'a>> for Val<'a> {
    fn from(scope: Scope<'a>) -> Self {
        match scope {
            Scope::Value(value) => Val::Json(Cow::Borrowed(value)),
            Scope::Record(record) => Val::Record(record),
        }
    }
}

/// The scopes a name is resolved against, innermost first.
///
/// Entering a section never modifies a chain: it creates a new frame
/// pointing at the enclosing one.
#[derive(Clone, Copy, Debug)]
pub enum Chain<'a> {
    /// The contexts given by the caller, innermost first
    Root(&'a [&'a Context]),
    /// A scope pushed by a section
    Frame {
        /// The current element of the section
        scope: Scope<'a>,
        /// The chain the section was rendered in
        outer: &'a Chain<'a>,
    },
}

impl<'a> Chain<'a> {
    /// A new chain with `scope` as its innermost scope
    pub fn push<'b>(&'b self, scope: Scope<'b>) -> Chain<'b> {
        Chain::Frame { scope, outer: self }
    }

    /// The scope pushed by the innermost section, if any
    pub fn innermost(&self) -> Option<Scope<'a>> {
        match *self {
            Chain::Frame { scope, .. } => Some(scope),
            Chain::Root(_) => None,
        }
    }

    /// Finds a single name, walking outward from the innermost scope.
    /// On each context, methods are tried before fields; on values, object
    /// keys and array indices.
    pub fn find(&self, name: &str) -> Result<Option<Val<'a>>> {
        let mut current = self;

        loop {
            match *current {
                Chain::Frame { scope: Scope::Value(value), outer } => {
                    if let Some(found) = get_attr(value, name) {
                        return Ok(Some(Val::Json(Cow::Borrowed(found))));
                    }
                    current = outer;
                }
                Chain::Frame { scope: Scope::Record(record), outer } => {
                    if let Some(found) = record.resolve(name)? {
                        return Ok(Some(found));
                    }
                    current = outer;
                }
                Chain::Root(contexts) => {
                    for context in contexts {
                        if let Some(found) = context.resolve(name)? {
                            return Ok(Some(found));
                        }
                    }
                    return Ok(None);
                }
            }
        }
    }
}

/// Resolves a dotted path. Only the first segment is looked up along the chain,
/// the following ones are looked up on the value found for the previous one.
/// An empty segment (`a.`, `.a`, `a..b`) never resolves.
pub fn lookup<'a>(path: &str, chain: &Chain<'a>) -> Result<Option<Val<'a>>> {
    if path == "." {
        return Ok(chain.innermost().map(Val::from));
    }

    let mut segments = path.split('.');
    let mut found = match segments.next() {
        Some(head) if !head.is_empty() => match chain.find(head)? {
            Some(found) => found,
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    for segment in segments {
        if segment.is_empty() {
            return Ok(None);
        }
        found = match found.get(segment)? {
            Some(next) => next,
            None => return Ok(None),
        };
    }

    Ok(Some(found))
}
