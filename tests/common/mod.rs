use moustache::Context;
use serde_derive::Serialize;

#[derive(Debug, Serialize)]
pub struct Link {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct User {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Post {
    pub title: String,
    pub tags: Vec<String>,
}

impl Post {
    pub fn new(title: &str, tags: &[&str]) -> Post {
        Post { title: title.to_string(), tags: tags.iter().map(|t| t.to_string()).collect() }
    }
}

/// The context shared by every page of the site
pub fn site_context() -> Context {
    let mut context = Context::new();
    context.insert(
        "links",
        &vec![
            Link { url: "/".to_string(), name: "Home".to_string() },
            Link { url: "/about".to_string(), name: "About".to_string() },
        ],
    );
    context.insert("site", "<b>moustache</b>");
    context
}
