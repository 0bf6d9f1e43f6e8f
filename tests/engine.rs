use moustache::{Context, ErrorKind, MemoryLoader, Moustache};

use pretty_assertions::assert_eq;

mod common;
use crate::common::{site_context, Post, User};

#[test]
fn can_load_a_glob() {
    let moustache = Moustache::new("tests/templates/**/*").unwrap();

    let mut names = moustache
        .get_template_names()
        .map(|n| n.rsplit("tests/templates/").next().unwrap_or(n).to_string())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(
        names,
        vec![
            "about.html",
            "blog/base.html",
            "blog/post.html",
            "index.html",
            "layout.html",
            "partials/nav.html"
        ]
    );
    assert_eq!(moustache.templates().count(), 6);
}

#[test]
fn glob_relative_paths_are_canonicalized() {
    let moustache = Moustache::new("./tests/templates/**/*.html").unwrap();
    assert!(moustache.get_template("index.html").is_ok());
    assert!(moustache.get_template("blog/post.html").is_ok());
}

#[test]
fn glob_with_broken_templates_fails() {
    let err = Moustache::new("tests/broken/*.html").unwrap_err();
    assert!(err.to_string().contains("missing closing tag for `items`"), "{}", err);
}

#[test]
fn engine_renders_like_templates() {
    let moustache = Moustache::new("tests/templates/**/*").unwrap();
    let mut page = Context::new();
    page.insert("user", &User { name: "Bob".to_string() });
    page.insert("post", &Post::new("Hi", &["rust"]));
    let site = site_context();

    for name in &["index.html", "about.html", "blog/post.html"] {
        let from_engine = moustache.render(name, &[&page, &site]).unwrap();
        let from_file =
            moustache::render_file(format!("tests/templates/{}", name), &[&page, &site]);
        assert_eq!(from_engine, from_file);
    }
}

#[test]
fn engine_render_to_writer() {
    let moustache = Moustache::new("tests/templates/**/*").unwrap();
    let site = site_context();

    let mut out = Vec::new();
    moustache.render_to("partials/nav.html", &[&site], &mut out).unwrap();
    assert!(String::from_utf8(out).unwrap().starts_with("<nav><a href=\"/\">Home</a>"));
}

#[test]
fn engine_unknown_template() {
    let moustache = Moustache::new("tests/templates/**/*").unwrap();
    let err = moustache.render("nope.html", &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TemplateNotFound(ref name) if name == "nope.html"));
}

#[test]
fn engine_with_memory_loader() {
    let loader = MemoryLoader::new().with_files(vec![
        ("layout.html", "<main>{{*body}}{{/body}}</main>"),
        ("card.html", "<div>{{ title }}</div>"),
    ]);
    let mut moustache = Moustache::with_loader(loader);
    moustache
        .add_raw_template("page.html", "{{<layout}}{{*body}}{{#cards}}{{> card }}{{/cards}}{{/body}}")
        .unwrap();

    let context = Context::from_value(serde_json::json!({
        "cards": [{"title": "a"}, {"title": "b"}],
    }))
    .unwrap();
    assert_eq!(
        moustache.render("page.html", &[&context]).unwrap(),
        "<main><div>a</div><div>b</div></main>"
    );
}

#[test]
fn engine_can_add_template_files() {
    let mut moustache = Moustache::default();
    assert!(moustache.add_template_file("tests/templates/index.html").is_ok());
    assert!(moustache.get_template("tests/templates/index.html").is_ok());
}
