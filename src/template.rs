use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::context::Context;
use crate::errors::Result;
use crate::loader::{FileSystemLoader, Loader};
use crate::parser::ast::{Block, Node};
use crate::parser::{Parser, Source};
use crate::renderer::{LoaderSource, Renderer};
use crate::utils::{dir_and_ext, escape_html, normalize};

/// Name given to templates parsed from a string
pub(crate) const ONE_OFF_TEMPLATE_NAME: &str = "__moustache_one_off";

/// Environment variable giving the directory partials of string templates are resolved from
const BASE_DIR_ENV: &str = "CWD";

/// This is the parsed equivalent of a template file.
/// It also contains the information needed to find its partials and parents.
#[derive(Clone)]
pub struct Template {
    /// Name of the template, usually very similar to the path
    pub name: String,
    /// Original path of the file. A template doesn't necessarily have
    /// a file associated with it though so it's optional.
    pub path: Option<PathBuf>,
    /// Top-level nodes, in source order
    pub nodes: Vec<Node>,
    /// Every block defined in that template, at any depth. The last definition of a name wins.
    pub blocks: HashMap<String, Block>,
    /// The name of the template this one inherits from, if any
    pub parent: Option<String>,
    /// Directory partials and parents are resolved from
    pub(crate) dir: PathBuf,
    /// Extension appended to partial and parent names, with its leading dot
    pub(crate) ext: String,
    loader: Arc<dyn Loader>,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("nodes", &self.nodes)
            .field("blocks", &self.blocks)
            .field("parent", &self.parent)
            .field("dir", &self.dir)
            .field("ext", &self.ext)
            .finish()
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.path == other.path
            && self.nodes == other.nodes
            && self.blocks == other.blocks
            && self.parent == other.parent
    }
}

impl Template {
    /// Parses a template from a string.
    ///
    /// Partials are read from the file system, relative to the directory in the
    /// `CWD` environment variable (or the current directory) and without any extension.
    pub fn new(name: &str, input: &str) -> Result<Template> {
        let dir = std::env::var_os(BASE_DIR_ENV).map(PathBuf::from).unwrap_or_default();
        Template::parse(name, None, input.as_bytes(), dir, String::new(), Arc::new(FileSystemLoader), &[])
    }

    /// Reads and parses the file at `path`. Partials and parents are looked up
    /// next to it, with the same extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Template> {
        Template::from_loader(path, Arc::new(FileSystemLoader))
    }

    /// Same as [`Template::from_file`] but reading templates with the given loader
    pub fn from_loader<P: AsRef<Path>>(path: P, loader: Arc<dyn Loader>) -> Result<Template> {
        Template::parse_included(normalize(path.as_ref()), loader, &[])
    }

    /// Parses a template that doesn't come from a file but whose name is used as a path
    /// to resolve its partials and parents
    pub(crate) fn from_named_str(name: &str, input: &str, loader: Arc<dyn Loader>) -> Result<Template> {
        let path = normalize(Path::new(name));
        let (dir, ext) = dir_and_ext(&path);
        let includes = vec![path.clone()];
        Template::parse(name, Some(path), input.as_bytes(), dir, ext, loader, &includes)
    }

    /// Loads and parses the template at `path`, `includes` being the templates
    /// already being parsed when it is a partial
    pub(crate) fn parse_included(
        path: PathBuf,
        loader: Arc<dyn Loader>,
        includes: &[PathBuf],
    ) -> Result<Template> {
        let input = loader.load(&path)?;
        let (dir, ext) = dir_and_ext(&path);
        let mut includes = includes.to_vec();
        includes.push(path.clone());
        let name = path.to_string_lossy().replace('\\', "/");

        Template::parse(&name, Some(path), &input, dir, ext, loader, &includes)
    }

    fn parse(
        name: &str,
        path: Option<PathBuf>,
        input: &[u8],
        dir: PathBuf,
        ext: String,
        loader: Arc<dyn Loader>,
        includes: &[PathBuf],
    ) -> Result<Template> {
        let parsed = {
            let source = Source { dir: &dir, ext: &ext, loader: &loader, includes };
            Parser::new(input, source).parse()?
        };

        Ok(Template {
            name: name.to_string(),
            path,
            nodes: parsed.nodes,
            blocks: parsed.blocks,
            parent: parsed.parent,
            dir,
            ext,
            loader,
        })
    }

    /// The loader this template reads its partials and parents with
    pub fn loader(&self) -> &Arc<dyn Loader> {
        &self.loader
    }

    /// Renders the template against the given contexts, innermost first.
    ///
    /// Parent templates are read and parsed again on every call.
    pub fn render(&self, contexts: &[&Context]) -> Result<String> {
        Renderer::new(self, &LoaderSource(&self.loader), escape_html).render(contexts)
    }

    /// Renders the template into `write`
    pub fn render_to(&self, contexts: &[&Context], write: impl Write) -> Result<()> {
        Renderer::new(self, &LoaderSource(&self.loader), escape_html).render_to(contexts, write)
    }
}
