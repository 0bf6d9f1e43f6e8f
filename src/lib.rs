#![doc(html_root_url = "https://docs.rs/moustache")]
//! # Moustache
//!
//! Mustache templates with partials and block inheritance.
//!
//! Templates are compiled once into a tree of nodes and rendered against a chain of
//! contexts, innermost first:
//!
//! ```rust
//! use moustache::{Context, Template};
//!
//! let template = Template::new("hello", "Hello {{ name }}!").unwrap();
//! let mut context = Context::new();
//! context.insert("name", "World");
//!
//! assert_eq!(template.render(&[&context]).unwrap(), "Hello World!");
//! ```
//!
//! ## Syntax
//!
//! - `{{ name }}` escaped variable, `{{{ name }}}` raw variable
//! - `{{# name }}...{{/ name }}` section, `{{^ name }}...{{/ name }}` inverted section
//! - `{{! comment }}`
//! - `{{> name }}` partial, looked up next to the template with the same extension
//! - `{{< name }}` declares the parent template
//! - `{{* name }}...{{/ name }}` block that children can override
//!
//! Names can be dotted (`user.address.city`) and `{{ . }}` is the current element
//! of the enclosing section.
//!
//! ## Inheritance
//!
//! A template declaring a parent only contributes its blocks: the layout comes from the
//! template at the top of the chain, each of its blocks replaced by the most derived definition.
//!
//! ```rust
//! use moustache::{Context, MemoryLoader, Moustache};
//!
//! let mut moustache = Moustache::with_loader(MemoryLoader::new());
//! moustache
//!     .add_raw_templates(vec![
//!         ("layout.html", "<title>{{*title}}Default{{/title}}</title>"),
//!         ("page.html", "{{<layout}}{{*title}}{{ name }}{{/title}}"),
//!     ])
//!     .unwrap();
//!
//! let mut context = Context::new();
//! context.insert("name", "Home");
//! assert_eq!(moustache.render("page.html", &[&context]).unwrap(), "<title>Home</title>");
//! ```

#![deny(missing_docs)]

mod context;
mod engine;
mod errors;
mod loader;
mod parser;
mod renderer;
mod template;
mod utils;

use std::error::Error as StdError;
use std::path::Path;

// Library exports.

pub use crate::context::{Context, Method, ValueRender, ValueTruthy};
pub use crate::engine::Moustache;
pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::loader::{FileSystemLoader, Loader, MemoryLoader};
pub use crate::renderer::EscapeFn;
pub use crate::template::Template;
pub use crate::utils::escape_html;
// Re-export Value and other useful things from serde
// so apps/tools can use those without having to add serde_json as a dependency
pub use serde_json::value::{from_value, to_value, Map, Number, Value};

// The AST and dotted_pointer are meant to be used internally only but are exported for test/bench.
#[doc(hidden)]
pub use crate::context::dotted_pointer;
#[doc(hidden)]
pub use crate::parser::ast;

/// Parses `input` and renders it against `contexts`.
///
/// Partials are looked up relative to the directory in the `CWD` environment variable.
/// Any error is described in the returned text instead of being returned on its own:
/// use [`Template::new`] and [`Template::render`] to tell them apart.
///
/// ```rust
/// let mut context = moustache::Context::new();
/// context.insert("c", "5 > 2");
/// assert_eq!(moustache::render("{{c}} {{{c}}}", &[&context]), "5 &gt; 2 5 > 2");
/// ```
pub fn render(input: &str, contexts: &[&Context]) -> String {
    let rendered = Template::new(template::ONE_OFF_TEMPLATE_NAME, input)
        .and_then(|template| template.render(contexts));
    fold_error(rendered)
}

/// Parses the file at `path` and renders it against `contexts`.
///
/// Like [`render`], errors end up in the returned text.
pub fn render_file<P: AsRef<Path>>(path: P, contexts: &[&Context]) -> String {
    let rendered = Template::from_file(path).and_then(|template| template.render(contexts));
    fold_error(rendered)
}

/// The rendered text, or the description of the error and all its sources
fn fold_error(rendered: Result<String>) -> String {
    match rendered {
        Ok(output) => output,
        Err(e) => {
            let mut description = e.to_string();
            let mut cause = e.source();
            while let Some(cause_err) = cause {
                description += &format!(": {}", cause_err);
                cause = cause_err.source();
            }
            description
        }
    }
}
