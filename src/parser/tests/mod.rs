use std::path::Path;
use std::sync::Arc;

use crate::errors::Result;
use crate::loader::{Loader, MemoryLoader};
use crate::parser::{Parsed, Parser, Source};


/// Parses `input` as if it were `templates/test.html`, partials being served by `files`
fn parse_with(input: &str, files: Vec<(&str, &str)>) -> Result<Parsed> {
    let loader: Arc<dyn Loader> = Arc::new(MemoryLoader::new().with_files(files));
    let includes = vec![Path::new("templates/test.html").to_path_buf()];
    let source =
        Source { dir: Path::new("templates"), ext: ".html", loader: &loader, includes: &includes };
    Parser::new(input.as_bytes(), source).parse()
}

fn parse(input: &str) -> Result<Parsed> {
    parse_with(input, vec![])
}
