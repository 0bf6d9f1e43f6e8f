use std::sync::Arc;

use serde_derive::Serialize;

use crate::context::Context;
use crate::errors::Result;
use crate::loader::{Loader, MemoryLoader};
use crate::template::Template;

mod inheritance;

#[derive(Debug, Serialize)]
pub struct Review {
    title: String,
    paragraphs: Vec<String>,
}

impl Review {
    pub fn new() -> Review {
        Review {
            title: "My review".to_owned(),
            paragraphs: vec!["A".to_owned(), "B".to_owned(), "C".to_owned()],
        }
    }
}

/// Renders `content` as `templates/main.html`, with `files` available to it
fn render_with(content: &str, files: Vec<(&str, &str)>, contexts: &[&Context]) -> Result<String> {
    let loader: Arc<dyn Loader> = Arc::new(MemoryLoader::new().with_files(files));
    let template = Template::from_named_str("templates/main.html", content, loader)?;
    template.render(contexts)
}

fn render_template(content: &str, context: &Context) -> Result<String> {
    render_with(content, vec![], &[context])
}
