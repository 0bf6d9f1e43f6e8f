use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::errors::{Error, ErrorKind, Result};
use crate::loader::Loader;
use crate::template::Template;
use crate::utils::sibling_path;

/// The AST of a template
pub mod ast;
mod lexer;

#[cfg(test)]
mod tests;

use self::ast::*;
use self::lexer::{Lexer, Token, OPEN};

/// Everything needed to resolve the partials of the template being parsed
pub(crate) struct Source<'a> {
    /// Directory partials are resolved from
    pub dir: &'a Path,
    /// Extension appended to partial names, with its leading dot
    pub ext: &'a str,
    pub loader: &'a Arc<dyn Loader>,
    /// Paths of the templates currently being parsed, outermost first
    pub includes: &'a [PathBuf],
}

/// The result of parsing a single template
#[derive(Debug)]
pub(crate) struct Parsed {
    pub nodes: Vec<Node>,
    pub blocks: HashMap<String, Block>,
    pub parent: Option<String>,
}

/// Recursive descent parser building the node tree, one tag at a time
pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    source: Source<'a>,
    parent: Option<String>,
    blocks: HashMap<String, Block>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8], source: Source<'a>) -> Parser<'a> {
        Parser { lexer: Lexer::new(input), source, parent: None, blocks: HashMap::new() }
    }

    pub fn parse(mut self) -> Result<Parsed> {
        let nodes = self.parse_body(None)?;

        Ok(Parsed { nodes, blocks: self.blocks, parent: self.parent })
    }

    /// Once a template extends another one, only its blocks matter: whatever
    /// else is found at its top level is dropped
    fn discards(&self, container: Option<&str>) -> bool {
        container.is_none() && self.parent.is_some()
    }

    /// Parses nodes until the end of the input (`container` is `None`) or
    /// until the closing tag of the named section/block
    fn parse_body(&mut self, container: Option<&str>) -> Result<Vec<Node>> {
        let mut nodes = vec![];

        loop {
            let (text, reached_end) = match self.lexer.next_token(OPEN) {
                Token::Delimited(text) => (text, false),
                Token::Eof(text) => (text, true),
            };

            if reached_end {
                if let Some(name) = container {
                    return Err(Error::parse(ErrorKind::UnterminatedContainer {
                        line: self.lexer.line(),
                        name: name.to_string(),
                    }));
                }
            }

            if !text.is_empty() && !self.discards(container) {
                nodes.push(Node::Text(text.to_vec()));
            }

            if reached_end {
                return Ok(nodes);
            }

            let closing = self.lexer.closing_delimiter();
            let body = match self.lexer.next_token(closing) {
                Token::Delimited(body) => body,
                Token::Eof(_) => {
                    return Err(Error::parse(ErrorKind::UnterminatedTag { line: self.lexer.line() }))
                }
            };

            let tag = String::from_utf8(body.to_vec()).map_err(|e| {
                Error::utf8_conversion_error(e, format!("tag on line {}", self.lexer.line()))
            })?;
            let tag = tag.trim();
            let sigil = match tag.chars().next() {
                Some(c) => c,
                None => return Err(Error::parse(ErrorKind::EmptyTag { line: self.lexer.line() })),
            };
            let name = tag[sigil.len_utf8()..].trim();

            match sigil {
                '!' => (),
                '#' | '^' => {
                    // the line break right after the opening tag belongs to the tag
                    self.lexer.skip_newline();
                    let body = self.parse_body(Some(name))?;
                    if !self.discards(container) {
                        nodes.push(Node::Section(Section {
                            name: name.to_string(),
                            inverted: sigil == '^',
                            body,
                        }));
                    }
                }
                '{' => {
                    if !self.discards(container) {
                        nodes.push(Node::Variable(Variable { name: name.to_string(), raw: true }));
                    }
                }
                '>' => {
                    if !self.discards(container) {
                        let partial = self.parse_partial(name)?;
                        nodes.push(Node::Partial(Box::new(partial)));
                    }
                }
                '<' => {
                    if container.is_none() {
                        self.parent = Some(name.to_string());
                    }
                }
                '*' => {
                    let block = Block { name: name.to_string(), body: self.parse_body(Some(name))? };
                    self.blocks.insert(block.name.clone(), block.clone());
                    nodes.push(Node::Block(block));
                }
                '/' => {
                    return match container {
                        Some(open) if open == name => Ok(nodes),
                        Some(_) => Err(Error::parse(ErrorKind::MismatchedClosingTag {
                            line: self.lexer.line(),
                            name: name.to_string(),
                        })),
                        None => Err(Error::parse(ErrorKind::UnmatchedClosingTag {
                            line: self.lexer.line(),
                            name: name.to_string(),
                        })),
                    };
                }
                _ => {
                    if !self.discards(container) {
                        nodes.push(Node::Variable(Variable { name: tag.to_string(), raw: false }));
                    }
                }
            }
        }
    }

    /// Loads and parses a partial right away
    fn parse_partial(&self, name: &str) -> Result<Template> {
        let path = sibling_path(self.source.dir, name, self.source.ext);

        if self.source.includes.contains(&path) {
            let include_chain =
                self.source.includes.iter().map(|p| p.display().to_string()).collect();
            return Err(Error::circular_include(path.display(), include_chain));
        }

        debug!("Parsing partial `{}` from {}", name, path.display());
        Template::parse_included(path, Arc::clone(self.source.loader), self.source.includes)
    }
}
