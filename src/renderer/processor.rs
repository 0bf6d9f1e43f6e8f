use std::collections::HashMap;
use std::io::Write;

use serde_json::Value;

use crate::context::{Val, ValueRender, ValueTruthy};
use crate::errors::Result;
use crate::parser::ast::*;
use crate::renderer::lookup::{lookup, Chain, Scope};
use crate::renderer::{EscapeFn, Renderer, TemplateSource};

/// Walks the nodes of a template and writes the output
pub struct Processor<'a> {
    /// Which definition of each block to render
    blocks: HashMap<&'a str, &'a Block>,
    /// Where partials find their own parents
    source: &'a dyn TemplateSource,
    escape_fn: EscapeFn,
}

impl<'a> Processor<'a> {
    pub fn new(
        blocks: HashMap<&'a str, &'a Block>,
        source: &'a dyn TemplateSource,
        escape_fn: EscapeFn,
    ) -> Self {
        Processor { blocks, source, escape_fn }
    }

    /// Renders the nodes of the template at the top of the inheritance chain.
    ///
    /// Only its top-level blocks are replaced by their most derived definition,
    /// a block nested in another one renders its own body.
    pub fn render_root<W: Write>(
        &self,
        nodes: &[Node],
        chain: &Chain<'_>,
        write: &mut W,
    ) -> Result<()> {
        for node in nodes {
            match *node {
                Node::Block(ref block) => {
                    let body = match self.blocks.get(block.name.as_str()) {
                        Some(found) => &found.body,
                        None => &block.body,
                    };
                    self.render_body(body, chain, write)?;
                }
                _ => self.render_node(node, chain, write)?,
            }
        }

        Ok(())
    }

    pub fn render_body<W: Write>(&self, body: &[Node], chain: &Chain<'_>, write: &mut W) -> Result<()> {
        for node in body {
            self.render_node(node, chain, write)?;
        }

        Ok(())
    }

    fn render_node<W: Write>(&self, node: &Node, chain: &Chain<'_>, write: &mut W) -> Result<()> {
        match *node {
            Node::Text(ref s) => write.write_all(s)?,
            Node::Variable(ref variable) => self.render_variable(variable, chain, write)?,
            Node::Section(ref section) => self.render_section(section, chain, write)?,
            Node::Block(ref block) => self.render_body(&block.body, chain, write)?,
            Node::Partial(ref template) => {
                Renderer::new(template, self.source, self.escape_fn).render_chain(chain, write)?
            }
        };

        Ok(())
    }

    fn render_variable<W: Write>(
        &self,
        variable: &Variable,
        chain: &Chain<'_>,
        write: &mut W,
    ) -> Result<()> {
        let value = match lookup(&variable.name, chain)? {
            Some(v) => v,
            None => return Ok(()),
        };

        let rendered = value.render();
        if variable.raw {
            write.write_all(rendered.as_bytes())?;
        } else {
            write.write_all((self.escape_fn)(&rendered).as_bytes())?;
        }

        Ok(())
    }

    fn render_section<W: Write>(
        &self,
        section: &Section,
        chain: &Chain<'_>,
        write: &mut W,
    ) -> Result<()> {
        let value = lookup(&section.name, chain)?;
        let truthy = value.as_ref().map_or(false, ValueTruthy::is_truthy);
        if truthy == section.inverted {
            return Ok(());
        }

        match value {
            Some(Val::Json(ref json)) => match **json {
                Value::Array(ref items) => {
                    for item in items {
                        self.render_body(&section.body, &chain.push(Scope::Value(item)), write)?;
                    }
                }
                ref v => self.render_body(&section.body, &chain.push(Scope::Value(v)), write)?,
            },
            Some(Val::Record(record)) => {
                self.render_body(&section.body, &chain.push(Scope::Record(record)), write)?
            }
            Some(Val::Records(records)) => {
                for record in records {
                    self.render_body(&section.body, &chain.push(Scope::Record(record)), write)?;
                }
            }
            None => {
                let empty = Value::String(String::new());
                self.render_body(&section.body, &chain.push(Scope::Value(&empty)), write)?;
            }
        }

        Ok(())
    }
}
