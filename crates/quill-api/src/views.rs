//! HTML pages
//!
//! Every page shares one layout: a nav bar reflecting the current identity,
//! an optional message line, and the page body. All user-supplied text goes
//! through [`escape`].

use std::fmt::Write;

use axum::http::StatusCode;
use axum::response::Html;
use quill_auth::AuthUser;
use quill_db::PostWithAuthor;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&AuthUser>, message: Option<&str>, content: &str) -> Html<String> {
    let nav = match user {
        Some(user) => format!(
            r#"<li><span>{}</span></li><li><a href="/auth/logout">Log Out</a></li>"#,
            escape(&user.username)
        ),
        None => r#"<li><a href="/auth/register">Register</a></li><li><a href="/auth/login">Log In</a></li>"#
            .to_string(),
    };
    let flash = message
        .map(|m| format!(r#"<div class="flash">{}</div>"#, escape(m)))
        .unwrap_or_default();

    Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>{title} - Quill</title></head>
<body>
<nav><h1><a href="/">Quill</a></h1><ul>{nav}</ul></nav>
<section class="content">
<header><h1>{title}</h1></header>
{flash}{content}
</section>
</body>
</html>
"#,
        title = escape(title),
    ))
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label for="username">Username</label>
<input name="username" id="username" required>
<label for="password">Password</label>
<input type="password" name="password" id="password" required>
<input type="submit" value="{submit}">
</form>"#
    )
}

fn post_form(action: &str, title: &str, body: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label for="title">Title</label>
<input name="title" id="title" value="{title}" required>
<label for="body">Body</label>
<textarea name="body" id="body">{body}</textarea>
<input type="submit" value="{submit}">
</form>"#,
        title = escape(title),
        body = escape(body),
    )
}

pub fn register_page(message: Option<&str>) -> Html<String> {
    layout(
        "Register",
        None,
        message,
        &credentials_form("/auth/register", "Register"),
    )
}

pub fn login_page(message: Option<&str>) -> Html<String> {
    layout("Log In", None, message, &credentials_form("/auth/login", "Log In"))
}

/// Post list; the viewer's own posts get an edit link
pub fn index_page(user: Option<&AuthUser>, posts: &[PostWithAuthor]) -> Html<String> {
    let mut content = String::new();
    if user.is_some() {
        content.push_str(r#"<a class="action" href="/create">New</a>"#);
    }

    for entry in posts {
        let post = &entry.post;
        let edit = match user {
            Some(user) if user.id == post.author_id => {
                format!(r#"<a class="action" href="/{}/update">Edit</a>"#, post.id)
            }
            _ => String::new(),
        };
        let _ = write!(
            content,
            r#"
<article class="post">
<header><div><h1>{title}</h1><div class="about">by {author} on {date}</div></div>{edit}</header>
<p class="body">{body}</p>
</article>"#,
            title = escape(&post.title),
            author = escape(&entry.username),
            date = post.created_at.format("%Y-%m-%d"),
            body = escape(&post.body),
        );
    }

    layout("Posts", user, None, &content)
}

pub fn create_page(user: &AuthUser, message: Option<&str>, title: &str, body: &str) -> Html<String> {
    layout(
        "New Post",
        Some(user),
        message,
        &post_form("/create", title, body, "Save"),
    )
}

pub fn update_page(
    user: &AuthUser,
    post_id: i64,
    message: Option<&str>,
    title: &str,
    body: &str,
) -> Html<String> {
    let mut content = post_form(&format!("/{post_id}/update"), title, body, "Save");
    let _ = write!(
        content,
        r#"
<hr>
<form action="/{post_id}/delete" method="post">
<input class="danger" type="submit" value="Delete" onclick="return confirm('Are you sure?');">
</form>"#
    );

    layout(&format!("Edit \"{title}\""), Some(user), message, &content)
}

pub fn error_page(status: StatusCode, user: Option<&AuthUser>, message: &str) -> Html<String> {
    let heading = status.canonical_reason().unwrap_or("Error");
    layout(heading, user, None, &format!("<p>{}</p>", escape(message)))
}
