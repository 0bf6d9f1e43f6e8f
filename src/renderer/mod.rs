//! Responsible for rendering templates

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::context::Context;
use crate::errors::{Error, Result};
use crate::loader::Loader;
use crate::template::Template;

mod inheritance;
mod lookup;
mod processor;

#[cfg(test)]
mod tests;

use self::lookup::Chain;
use self::processor::Processor;

/// The escape function type definition
pub type EscapeFn = fn(&str) -> String;

/// Where the renderer gets the parents of the template it renders
pub trait TemplateSource {
    /// Returns the compiled template at `path`
    fn get_parent(&self, path: &Path) -> Result<Cow<'_, Template>>;
}

/// Reads and parses parents every time they are needed
pub struct LoaderSource<'a>(pub &'a Arc<dyn Loader>);

impl<'a> TemplateSource for LoaderSource<'a> {
    fn get_parent(&self, path: &Path) -> Result<Cow<'_, Template>> {
        Template::from_loader(path, Arc::clone(self.0)).map(Cow::Owned)
    }
}

/// Given a `Template` and where to find its parents, renders text
pub struct Renderer<'a> {
    /// Template to render
    template: &'a Template,
    /// Provides the parents of `template`
    source: &'a dyn TemplateSource,
    /// Applied to every variable that isn't raw
    escape_fn: EscapeFn,
}

impl<'a> Renderer<'a> {
    /// Create a new `Renderer`
    #[inline]
    pub fn new(template: &'a Template, source: &'a dyn TemplateSource, escape_fn: EscapeFn) -> Renderer<'a> {
        Renderer { template, source, escape_fn }
    }

    /// Combines the contexts with the Template to generate text results
    pub fn render(&self, contexts: &[&Context]) -> Result<String> {
        let mut output = Vec::with_capacity(2000);
        self.render_to(contexts, &mut output)?;
        buffer_to_string(|| "converting buffer to string".to_string(), output)
    }

    /// Combines the contexts with the Template and writes the result
    pub fn render_to(&self, contexts: &[&Context], mut output: impl Write) -> Result<()> {
        let chain = Chain::Root(contexts);
        self.render_chain(&chain, &mut output)
    }

    /// Renders the template in the given chain. Partials go through here so
    /// they see the scopes of the section they are in.
    pub fn render_chain<W: Write>(&self, chain: &Chain<'_>, output: &mut W) -> Result<()> {
        let ancestors = inheritance::load_ancestors(self.template, self.source)
            .map_err(|e| Error::chain(format!("Failed to render '{}'", self.template.name), e))?;
        // The root of the inheritance chain gives the layout, the chain gives the blocks
        let root = ancestors.last().map(|t| &**t).unwrap_or(self.template);
        let blocks = inheritance::compose_blocks(self.template, &ancestors);

        Processor::new(blocks, self.source, self.escape_fn)
            .render_root(&root.nodes, chain, output)
            .map_err(|e| Error::chain(format!("Failed to render '{}'", self.template.name), e))
    }
}

/// Converts the rendered bytes to a `String`
fn buffer_to_string(context: impl FnOnce() -> String, buffer: Vec<u8>) -> Result<String> {
    String::from_utf8(buffer).map_err(|error| Error::utf8_conversion_error(error, context()))
}
