#![no_main]
use libfuzzer_sys::fuzz_target;

use moustache::{Context, MemoryLoader, Template};
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let mut context = Context::new();
    context.insert("a", &vec![1, 2]);
    context.insert("b", "<b>");

    // Partials and parents of that one never leave memory
    let loader = MemoryLoader::new().with_files(vec![("main.html", data)]);
    if let Ok(template) = Template::from_loader("main.html", Arc::new(loader)) {
        let _ = template.render_to(&[&context], std::io::sink());
    }
    let _ = moustache::render(&String::from_utf8_lossy(data), &[&context]);
});
