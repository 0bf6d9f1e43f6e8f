use super::render_with;
use crate::context::Context;

const LAYOUT: &str = "<html>
<head><title>{{*title}}Default title{{/title}}</title></head>
<body>
{{*body}}
Default body
{{/body}}
</body>
</html>
";

#[test]
fn render_simple_inheritance() {
    let child = "{{<layout}}
{{*title}}My page{{/title}}
{{*body}}<p>Hello {{name}}</p>{{/body}}
";
    let mut context = Context::new();
    context.insert("name", "World");

    let result =
        render_with(child, vec![("templates/layout.html", LAYOUT)], &[&context]).unwrap();
    assert_eq!(
        result,
        "<html>
<head><title>My page</title></head>
<body>
<p>Hello World</p>
</body>
</html>
"
    );
}

#[test]
fn render_inheritance_keeps_default_blocks() {
    let child = "{{<layout}}{{*title}}Only the title{{/title}}";
    let result = render_with(child, vec![("templates/layout.html", LAYOUT)], &[]).unwrap();
    assert_eq!(
        result,
        "<html>
<head><title>Only the title</title></head>
<body>

Default body

</body>
</html>
"
    );
}

#[test]
fn render_inheritance_ignores_top_level_content_of_child() {
    let child = "{{<layout}}ignored {{ name }}{{#name}}ignored{{/name}}{{*title}}T{{/title}}";
    let mut context = Context::new();
    context.insert("name", "World");

    let result =
        render_with(child, vec![("templates/base.html", "[{{*title}}{{/title}}]")], &[&context]);
    // the parent doesn't exist under that name
    assert!(result.is_err());

    let child = child.replace("layout", "base");
    let result =
        render_with(&child, vec![("templates/base.html", "[{{*title}}{{/title}}]")], &[&context])
            .unwrap();
    assert_eq!(result, "[T]");
}

#[test]
fn render_multiple_inheritance() {
    let result = render_with(
        "{{<mid}}{{*title}}child{{/title}}",
        vec![
            ("templates/mid.html", "{{<base}}{{*title}}mid{{/title}}{{*body}}mid body{{/body}}"),
            ("templates/base.html", "{{*title}}base{{/title}}|{{*body}}base body{{/body}}|{{*foot}}base foot{{/foot}}"),
        ],
        &[],
    )
    .unwrap();
    assert_eq!(result, "child|mid body|base foot");
}

#[test]
fn render_override_skipping_an_intermediate_template_is_ignored() {
    let result = render_with(
        "{{<mid}}{{*title}}child{{/title}}",
        vec![
            ("templates/mid.html", "{{<base}}"),
            ("templates/base.html", "{{*title}}base{{/title}}"),
        ],
        &[],
    )
    .unwrap();
    assert_eq!(result, "base");
}

#[test]
fn render_parents_are_resolved_from_the_child() {
    let result = render_with(
        "{{<sub/mid}}{{*title}}child{{/title}}",
        vec![
            ("templates/sub/mid.html", "{{<base}}{{*title}}mid{{/title}}"),
            ("templates/base.html", "top: {{*title}}{{/title}}"),
            ("templates/sub/base.html", "sub: {{*title}}{{/title}}"),
        ],
        &[],
    )
    .unwrap();
    assert_eq!(result, "top: child");
}

#[test]
fn render_nested_blocks_keep_their_own_body() {
    let result = render_with(
        "{{<base}}{{*inner}}I{{/inner}}",
        vec![("templates/base.html", "{{*outer}}O[{{*inner}}i{{/inner}}]{{/outer}}")],
        &[],
    )
    .unwrap();
    assert_eq!(result, "O[i]");
}

#[test]
fn render_block_overriding_a_block_with_nested_blocks() {
    let result = render_with(
        "{{<base}}{{*outer}}new {{*inner}}child inner{{/inner}}{{/outer}}",
        vec![("templates/base.html", "{{*outer}}O[{{*inner}}i{{/inner}}]{{/outer}}")],
        &[],
    )
    .unwrap();
    assert_eq!(result, "new child inner");
}

#[test]
fn render_blocks_inside_sections_keep_their_own_body() {
    let mut context = Context::new();
    context.insert("items", &vec![1, 2]);

    let result = render_with(
        "{{<base}}{{*item}}+{{.}}{{/item}}",
        vec![("templates/base.html", "{{#items}}{{*item}}-{{.}}{{/item}}{{/items}}")],
        &[&context],
    )
    .unwrap();
    assert_eq!(result, "-1-2");
}

#[test]
fn render_block_containing_a_block_of_the_same_name() {
    let result = render_with("{{*a}}x{{*a}}y{{/a}}{{/a}}", vec![], &[]).unwrap();
    assert_eq!(result, "xy");
}

#[test]
fn render_overridden_block_containing_a_block_of_the_same_name() {
    let result = render_with(
        "{{<base}}{{*a}}<{{*a}}deep{{/a}}>{{/a}}",
        vec![("templates/base.html", "[{{*a}}base{{/a}}]")],
        &[],
    )
    .unwrap();
    assert_eq!(result, "[<deep>]");
}

#[test]
fn render_duplicate_blocks_without_parent() {
    let result = render_with("{{*a}}first{{/a}} {{*a}}second{{/a}}", vec![], &[]).unwrap();
    assert_eq!(result, "second second");
}

#[test]
fn render_block_content_without_parent() {
    let mut context = Context::new();
    context.insert("name", "Bob");
    let result = render_with("<{{*a}}hi {{name}}{{/a}}>", vec![], &[&context]).unwrap();
    assert_eq!(result, "<hi Bob>");
}

#[test]
fn render_partials_in_overridden_blocks() {
    let mut context = Context::new();
    context.insert("name", "Bob");

    let result = render_with(
        "{{<base}}{{*body}}{{> greeting }}{{/body}}",
        vec![
            ("templates/base.html", "<main>{{*body}}{{/body}}</main>"),
            ("templates/greeting.html", "Hello {{name}}"),
        ],
        &[&context],
    )
    .unwrap();
    assert_eq!(result, "<main>Hello Bob</main>");
}
