use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globwalk::glob_builder;
use log::{debug, trace};

use crate::context::Context;
use crate::errors::{Error, ErrorKind, Result};
use crate::loader::{FileSystemLoader, Loader};
use crate::renderer::{EscapeFn, Renderer, TemplateSource};
use crate::template::Template;
use crate::utils::{escape_html, normalize};

/// Main point of interaction in this library.
///
/// Holds compiled templates keyed by their path. Parents found there are
/// reused from one render to the next instead of being read and parsed again;
/// anything missing is read through the loader on each render.
#[derive(Clone)]
pub struct Moustache {
    // The glob used in `Moustache::new`, None if Moustache was instantiated differently
    #[doc(hidden)]
    glob: Option<String>,
    /// Templates are resolved relative to this directory
    root: PathBuf,
    #[doc(hidden)]
    templates: HashMap<PathBuf, Template>,
    loader: Arc<dyn Loader>,
    escape_fn: EscapeFn,
}

impl fmt::Debug for Moustache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Moustache {{")?;
        writeln!(f, "\n\ttemplates: [")?;

        let mut names = self.get_template_names().collect::<Vec<_>>();
        names.sort();
        for name in names {
            writeln!(f, "\t\t{},", name)?;
        }
        write!(f, "\t]")?;
        write!(f, "\n}}")
    }
}

impl Moustache {
    fn create(dir: &str, parse_only: bool) -> Result<Moustache> {
        if dir.find('*').is_none() {
            return Err(Error::msg(format!(
                "Moustache expects a glob as input, no * were found in `{}`",
                dir
            )));
        }

        let mut moustache = Moustache {
            glob: Some(dir.to_string()),
            ..Moustache::default()
        };

        moustache.load_from_glob()?;
        if !parse_only {
            moustache.check_parents()?;
        }

        Ok(moustache)
    }

    /// Create a new instance of Moustache, containing all the parsed templates found in the `dir` glob
    ///
    /// The example below is what the [glob](https://docs.rs/globwalk) crate calls a glob.
    ///
    ///```ignore
    ///match Moustache::new("templates/**/*") {
    ///    Ok(m) => m,
    ///    Err(e) => {
    ///        println!("Parsing error(s): {}", e);
    ///        ::std::process::exit(1);
    ///    }
    ///}
    ///```
    pub fn new(dir: &str) -> Result<Moustache> {
        Self::create(dir, false)
    }

    /// Create a new instance of Moustache, containing all the parsed templates found in the `dir` glob
    /// The difference with `Moustache::new` is that it won't check that every parent exists.
    pub fn parse(dir: &str) -> Result<Moustache> {
        Self::create(dir, true)
    }

    /// Create an empty instance reading templates with `loader`
    pub fn with_loader<L: Loader + 'static>(loader: L) -> Moustache {
        Moustache { loader: Arc::new(loader), ..Moustache::default() }
    }

    /// Loads all the templates found in the glob that was given to `Moustache::new`
    fn load_from_glob(&mut self) -> Result<()> {
        let glob = match &self.glob {
            Some(g) => g,
            None => return Err(Error::msg("Moustache can only load from glob if a glob is provided")),
        };

        // We want to preserve templates that have been added by name so we only keep those
        self.templates.clear();

        let mut errors = String::new();

        // Need to canonicalize the glob path because globwalk always returns
        // an empty list for paths starting with `./` or `../`.
        let star = glob.find('*').unwrap_or(glob.len());
        let (parent_dir, glob_end) = glob.split_at(star);
        let parent_dir = match std::fs::canonicalize(parent_dir) {
            Ok(d) => d,
            // If canonicalize fails, just abort it and resume with the given path.
            // Consumers expect invalid globs to just return the empty set instead of failing.
            Err(_) => PathBuf::from(parent_dir),
        };
        let dir = parent_dir.join(glob_end).to_string_lossy().to_string();

        let walker = glob_builder(&dir)
            .follow_links(true)
            .build()
            .map_err(|e| Error::msg(format!("Invalid glob `{}`: {}", glob, e)))?;

        let mut found = Vec::new();
        for entry in walker.filter_map(std::result::Result::ok) {
            let path = entry.into_path();
            // We only care about actual files
            if path.is_file() {
                found.push(path);
            }
        }

        self.root = parent_dir;
        for path in found {
            if let Err(e) = self.add_file(path) {
                use std::error::Error;

                errors += &format!("\n* {}", e);
                let mut cause = e.source();
                while let Some(cause_err) = cause {
                    errors += &format!("\n{}", cause_err);
                    cause = cause_err.source();
                }
            }
        }

        if !errors.is_empty() {
            return Err(Error::msg(errors));
        }

        Ok(())
    }

    /// Parses the file at `path` and stores it under that path
    fn add_file(&mut self, path: PathBuf) -> Result<()> {
        let path = normalize(&path);
        debug!("Loading template {}", path.display());
        let tpl = Template::from_loader(&path, Arc::clone(&self.loader))
            .map_err(|e| Error::chain(format!("Failed to parse {:?}", path), e))?;
        self.templates.insert(path, tpl);

        Ok(())
    }

    /// Makes sure every parent declared by a template in the cache can be found
    fn check_parents(&self) -> Result<()> {
        for tpl in self.templates.values() {
            if let Some(ref parent) = tpl.parent {
                let path = crate::utils::sibling_path(&tpl.dir, parent, &tpl.ext);
                if !self.templates.contains_key(&path) && self.loader.load(&path).is_err() {
                    return Err(Error::msg(format!(
                        "Template '{}' is inheriting from '{}', which doesn't exist or isn't loaded.",
                        tpl.name, parent
                    )));
                }
            }
        }

        Ok(())
    }

    /// Where a template named `name` is stored
    fn path_of(&self, name: &str) -> PathBuf {
        normalize(&self.root.join(name))
    }

    /// The compiled template at `path`, from the cache if it is there or
    /// freshly read and parsed otherwise
    fn fetch(&self, path: &Path) -> Result<Cow<'_, Template>> {
        if let Some(tpl) = self.templates.get(path) {
            trace!("Cache hit for {}", path.display());
            return Ok(Cow::Borrowed(tpl));
        }

        trace!("Cache miss for {}", path.display());
        Template::from_loader(path, Arc::clone(&self.loader)).map(Cow::Owned)
    }

    /// Returns the compiled template stored for `name`
    pub fn get_template(&self, name: &str) -> Result<&Template> {
        match self.templates.get(&self.path_of(name)) {
            Some(tpl) => Ok(tpl),
            None => Err(Error::template_not_found(name)),
        }
    }

    /// Returns an iterator over all the compiled templates, in an unspecified order.
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Returns an iterator over the names of all registered templates in an
    /// unspecified order.
    pub fn get_template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.values().map(|t| t.name.as_str())
    }

    /// Renders a template using the given contexts, innermost first.
    ///
    /// A template that isn't in the cache is read through the loader.
    ///
    /// ```rust,ignore
    /// let mut context = Context::new();
    /// context.insert("user", &user);
    /// let rendered = moustache.render("index.html", &[&context])?;
    /// ```
    pub fn render(&self, name: &str, contexts: &[&Context]) -> Result<String> {
        let template = self.lookup(name)?;
        Renderer::new(&template, self, self.escape_fn).render(contexts)
    }

    /// Renders a template into `write`
    pub fn render_to(&self, name: &str, contexts: &[&Context], write: impl Write) -> Result<()> {
        let template = self.lookup(name)?;
        Renderer::new(&template, self, self.escape_fn).render_to(contexts, write)
    }

    fn lookup(&self, name: &str) -> Result<Cow<'_, Template>> {
        self.fetch(&self.path_of(name)).map_err(|e| match e.kind {
            ErrorKind::Io(std::io::ErrorKind::NotFound) => Error::template_not_found(name),
            _ => e,
        })
    }

    /// Add a single template to the Moustache instance, parsing it right away.
    ///
    /// Its name is used as its path to find its partials and parents.
    /// This will error if the inheritance chain can't be built, such as adding a child
    /// template without the parent one.
    pub fn add_raw_template(&mut self, name: &str, content: &str) -> Result<()> {
        let path = self.path_of(name);
        let tpl = Template::from_named_str(&path.to_string_lossy(), content, Arc::clone(&self.loader))
            .map_err(|e| Error::chain(format!("Failed to parse '{}'", name), e))?;
        self.templates.insert(path, tpl);
        self.check_parents()?;

        Ok(())
    }

    /// Add all the templates given to the Moustache instance
    ///
    /// ```rust,ignore
    /// moustache.add_raw_templates(vec![
    ///     ("new.html", "blabla"),
    ///     ("new2.html", "hello"),
    /// ]);
    /// ```
    pub fn add_raw_templates<I, N, C>(&mut self, templates: I) -> Result<()>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        for (name, content) in templates {
            let path = self.path_of(name.as_ref());
            let tpl = Template::from_named_str(
                &path.to_string_lossy(),
                content.as_ref(),
                Arc::clone(&self.loader),
            )
            .map_err(|e| Error::chain(format!("Failed to parse '{}'", name.as_ref()), e))?;
            self.templates.insert(path, tpl);
        }
        self.check_parents()?;

        Ok(())
    }

    /// Add a single template from a path to the Moustache instance, parsing it right away.
    pub fn add_template_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.add_file(path.as_ref().to_path_buf())?;
        self.check_parents()
    }

    /// Drops the compiled template stored for `name`, returning whether there was one.
    ///
    /// The next render needing it reads it again through the loader.
    pub fn invalidate(&mut self, name: &str) -> bool {
        let path = self.path_of(name);
        debug!("Invalidating {}", path.display());
        self.templates.remove(&path).is_some()
    }

    /// Re-parse all templates found in the glob given to Moustache.
    ///
    /// Use this when you are watching a directory and want to reload everything,
    /// for example when a file is added.
    ///
    /// If you are adding templates without using a glob, we can't know when a template
    /// is deleted, which would result in an error if we are trying to reload that file.
    pub fn full_reload(&mut self) -> Result<()> {
        if self.glob.is_some() {
            self.load_from_glob()?;
        } else {
            return Err(Error::msg("Reloading is only available if you are using a glob"));
        }

        self.check_parents()
    }

    /// Set user-defined function that is used to escape content.
    ///
    /// Often times, arbitrary data needs to be injected into a template without allowing injection
    /// attacks. For this reason, typically escaping is performed on all variables but raw ones.
    ///
    /// ```rust
    /// # use moustache::Moustache;
    /// # let mut moustache = Moustache::default();
    /// // escape characters that would break a JSON string
    /// fn escape_c_string(input: &str) -> String {
    ///     let mut output = String::with_capacity(input.len() * 2);
    ///     for c in input.chars() {
    ///         match c {
    ///             '\'' => output.push_str("\\'"),
    ///             '\"' => output.push_str("\\\""),
    ///             '\\' => output.push_str("\\\\"),
    ///             '\n' => output.push_str("\\n"),
    ///             '\r' => output.push_str("\\r"),
    ///             '\t' => output.push_str("\\t"),
    ///             _ => output.push(c),
    ///         }
    ///     }
    ///     output
    /// }
    /// moustache.set_escape_fn(escape_c_string);
    /// ```
    pub fn set_escape_fn(&mut self, function: EscapeFn) {
        self.escape_fn = function;
    }

    /// Reset escape function to default `escape_html`.
    pub fn reset_escape_fn(&mut self) {
        self.escape_fn = escape_html;
    }
}

impl TemplateSource for Moustache {
    fn get_parent(&self, path: &Path) -> Result<Cow<'_, Template>> {
        self.fetch(path)
    }
}

impl Default for Moustache {
    fn default() -> Moustache {
        Moustache {
            glob: None,
            root: PathBuf::new(),
            templates: HashMap::new(),
            loader: Arc::new(FileSystemLoader),
            escape_fn: escape_html,
        }
    }
}
