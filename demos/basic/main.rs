use std::error::Error;

use moustache::{Context, Moustache};

fn main() {
    let moustache = match Moustache::new("demos/basic/templates/**/*") {
        Ok(m) => m,
        Err(e) => {
            println!("Parsing error(s): {}", e);
            ::std::process::exit(1);
        }
    };

    let mut context = Context::new();
    context.insert("username", &"Bob");
    context.insert("numbers", &vec![1, 2, 3]);
    context.insert("show_all", &false);
    context.insert("bio", &"<script>alert('pwnd');</script>");

    // A one off template
    println!("{}", moustache::render("Hello {{ username }}", &[&context]));

    match moustache.render("users/profile.html", &[&context]) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            println!("Error: {}", e);
            let mut cause = e.source();
            while let Some(e) = cause {
                println!("Reason: {}", e);
                cause = e.source();
            }
        }
    };
}
