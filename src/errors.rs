use std::error::Error as StdError;
use std::fmt;

/// The kind of an error (non-exhaustive)
#[non_exhaustive]
#[derive(Debug)]
pub enum ErrorKind {
    /// Generic error
    Msg(String),
    /// A tag with nothing but whitespace in it, eg `{{ }}`
    EmptyTag {
        /// Line of the tag
        line: usize,
    },
    /// A `{{` that is never closed
    UnterminatedTag {
        /// Line where the input ended
        line: usize,
    },
    /// A section or block missing its closing tag
    UnterminatedContainer {
        /// Line where the input ended
        line: usize,
        /// Name of the section or block
        name: String,
    },
    /// A closing tag that doesn't match the section or block it is in
    MismatchedClosingTag {
        /// Line of the closing tag
        line: usize,
        /// Name found in the closing tag
        name: String,
    },
    /// A closing tag found outside of any section or block
    UnmatchedClosingTag {
        /// Line of the closing tag
        line: usize,
        /// Name found in the closing tag
        name: String,
    },
    /// A partial that ends up including itself
    CircularInclude {
        /// Name of the template with the loop
        tpl: String,
        /// All the partials currently being parsed, outermost first
        include_chain: Vec<String>,
    },
    /// A template that ends up extending itself
    CircularExtend {
        /// Name of the template with the loop
        tpl: String,
        /// All the parents found so far, most derived first
        inheritance_chain: Vec<String>,
    },
    /// A template was missing from the engine
    TemplateNotFound(String),
    /// A context method returned an error
    CallMethod(String),
    /// An error happened while serializing JSON
    Json(serde_json::Error),
    /// An IO error occurred
    Io(std::io::ErrorKind),
    /// UTF-8 conversion error
    ///
    /// This should not occur unless invalid UTF-8 chars are rendered
    Utf8Conversion {
        /// The context that indicates where the error occurs in the rendering process
        context: String,
    },
}

/// The Error type
#[derive(Debug)]
pub struct Error {
    /// Kind of error
    pub kind: ErrorKind,
    source: Option<Box<dyn StdError + Sync + Send>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Msg(ref message) => write!(f, "{}", message),
            ErrorKind::EmptyTag { line } => write!(f, "line {}: empty tag", line),
            ErrorKind::UnterminatedTag { line } => write!(f, "line {}: unterminated tag", line),
            ErrorKind::UnterminatedContainer { line, ref name } => write!(
                f,
                "line {}: unterminated container: missing closing tag for `{}`",
                line, name
            ),
            ErrorKind::MismatchedClosingTag { line, ref name } => {
                write!(f, "line {}: mismatched closing tag: `{}`", line, name)
            }
            ErrorKind::UnmatchedClosingTag { line, ref name } => {
                write!(f, "line {}: unmatched close tag: `{}`", line, name)
            }
            ErrorKind::CircularInclude { ref tpl, ref include_chain } => write!(
                f,
                "Circular include detected for template '{}'. Include chain: `{:?}`",
                tpl, include_chain
            ),
            ErrorKind::CircularExtend { ref tpl, ref inheritance_chain } => write!(
                f,
                "Circular extend detected for template '{}'. Inheritance chain: `{:?}`",
                tpl, inheritance_chain
            ),
            ErrorKind::TemplateNotFound(ref name) => write!(f, "Template '{}' not found", name),
            ErrorKind::CallMethod(ref name) => write!(f, "Method call '{}' failed", name),
            ErrorKind::Json(ref e) => write!(f, "{}", e),
            ErrorKind::Io(ref io_error) => write!(f, "Io error: {:?}", io_error),
            ErrorKind::Utf8Conversion { ref context } => {
                write!(f, "UTF-8 conversion error occured while rendering template: {}", context)
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|c| &**c as &(dyn StdError + 'static))
    }
}

impl Error {
    /// Creates generic error
    pub fn msg(value: impl ToString) -> Self {
        Self { kind: ErrorKind::Msg(value.to_string()), source: None }
    }

    /// Creates a parse error that happened on the given line
    pub(crate) fn parse(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Creates a circular include error
    pub fn circular_include(tpl: impl ToString, include_chain: Vec<String>) -> Self {
        Self {
            kind: ErrorKind::CircularInclude { tpl: tpl.to_string(), include_chain },
            source: None,
        }
    }

    /// Creates a circular extend error
    pub fn circular_extend(tpl: impl ToString, inheritance_chain: Vec<String>) -> Self {
        Self {
            kind: ErrorKind::CircularExtend { tpl: tpl.to_string(), inheritance_chain },
            source: None,
        }
    }

    /// Creates a template not found error
    pub fn template_not_found(tpl: impl ToString) -> Self {
        Self { kind: ErrorKind::TemplateNotFound(tpl.to_string()), source: None }
    }

    /// Creates an error wrapping a failing context method
    pub fn call_method(name: impl ToString, source: Error) -> Self {
        Self { kind: ErrorKind::CallMethod(name.to_string()), source: Some(Box::new(source)) }
    }

    /// Creates generic error with a source
    pub fn chain(value: impl ToString, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self { kind: ErrorKind::Msg(value.to_string()), source: Some(source.into()) }
    }

    /// Creates JSON error
    pub fn json(value: serde_json::Error) -> Self {
        Self { kind: ErrorKind::Json(value), source: None }
    }

    /// Creates an IO error, keeping the original one as source
    pub fn io_error(error: std::io::Error) -> Self {
        Self { kind: ErrorKind::Io(error.kind()), source: Some(Box::new(error)) }
    }

    /// Creates an utf-8 conversion error
    /// This should not occur unless invalid UTF-8 chars are rendered
    pub fn utf8_conversion_error(error: std::string::FromUtf8Error, context: String) -> Self {
        Self { kind: ErrorKind::Utf8Conversion { context }, source: Some(Box::new(error)) }
    }

    /// The line the error happened on, for errors raised while parsing
    pub fn line(&self) -> Option<usize> {
        match self.kind {
            ErrorKind::EmptyTag { line }
            | ErrorKind::UnterminatedTag { line }
            | ErrorKind::UnterminatedContainer { line, .. }
            | ErrorKind::MismatchedClosingTag { line, .. }
            | ErrorKind::UnmatchedClosingTag { line, .. } => Some(line),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::io_error(error)
    }
}
impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Self::msg(e)
    }
}
impl From<String> for Error {
    fn from(e: String) -> Self {
        Self::msg(e)
    }
}
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::json(e)
    }
}
/// Convenient wrapper around std::Result.
pub type Result<T> = ::std::result::Result<T, Error>;
