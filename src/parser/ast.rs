use std::fmt;

use crate::template::Template;

/// A `{{ name }}` or `{{{ name }}}` tag
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// Dotted path to look up, or `.` for the current context
    pub name: String,
    /// `true` for `{{{ name }}}`, which skips escaping
    pub raw: bool,
}

/// A `{{# name }}...{{/ name }}` or `{{^ name }}...{{/ name }}` section
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    /// Dotted path to look up
    pub name: String,
    /// `true` when opened with `^`
    pub inverted: bool,
    /// What's between the opening and closing tags
    pub body: Vec<Node>,
}

/// A `{{* name }}...{{/ name }}` block, which templates inheriting from this one can override
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Name of the block
    pub name: String,
    /// What's between the opening and closing tags
    pub body: Vec<Node>,
}

/// All the nodes a template can be made of
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Text copied verbatim
    Text(Vec<u8>),
    /// A variable to look up and print
    Variable(Variable),
    /// A section rendered zero, one or many times
    Section(Section),
    /// An overridable block
    Block(Block),
    /// A `{{> name }}` partial, parsed when the including template was
    Partial(Box<Template>),
}

impl Node {
    /// The kind of the node, mostly for debugging and tests
    pub fn kind(&self) -> NodeKind {
        match *self {
            Node::Text(_) => NodeKind::Text,
            Node::Variable(_) => NodeKind::Variable,
            Node::Section(_) => NodeKind::Section,
            Node::Block(_) => NodeKind::Block,
            Node::Partial(_) => NodeKind::Partial,
        }
    }
}

/// The node kinds, without their content
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// See [`Node::Text`]
    Text,
    /// See [`Node::Variable`]
    Variable,
    /// See [`Node::Section`]
    Section,
    /// See [`Node::Block`]
    Block,
    /// See [`Node::Partial`]
    Partial,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                NodeKind::Text => "text",
                NodeKind::Variable => "variable",
                NodeKind::Section => "section",
                NodeKind::Block => "block",
                NodeKind::Partial => "partial",
            }
        )
    }
}
