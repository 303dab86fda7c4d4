//! Shared page shell, HTML escaping, flash messages and redirects

use std::collections::HashMap;

use axum::response::{Html, Redirect};
use scriptorium_common::model::TaskStatus;
use serde::Deserialize;

/// Top navigation entry highlighted on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Projects,
    Tasks,
    Scriptures,
    None,
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Wrap page content in the dashboard shell
pub fn page(title: &str, active: Nav, body: &str) -> Html<String> {
    let nav_link = |nav: Nav, href: &str, label: &str| {
        let class = if nav == active { " class=\"active\"" } else { "" };
        format!(r#"<a href="{href}"{class}>{label}</a>"#)
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Scriptorium</title>
    <link rel="stylesheet" href="/static/dashboard.css">
    <script src="/static/selector.js" defer></script>
</head>
<body>
    <header>
        <div class="header-content">
            <span class="brand">Scriptorium</span>
            <nav>
                {projects}
                {tasks}
                {scriptures}
            </nav>
        </div>
    </header>
    <main class="container">
{body}
    </main>
    <footer>v{version} [{git_hash}] built {built}</footer>
</body>
</html>"#,
        title = escape(title),
        projects = nav_link(Nav::Projects, "/", "Projects"),
        tasks = nav_link(Nav::Tasks, "/tasks", "Tasks"),
        scriptures = nav_link(Nav::Scriptures, "/scriptures", "Scriptures"),
        body = body,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
    ))
}

pub fn error_banner(message: &str) -> String {
    format!(r#"<div class="banner banner-error">{}</div>"#, escape(message))
}

pub fn notice_banner(message: &str) -> String {
    format!(r#"<div class="banner banner-notice">{}</div>"#, escape(message))
}

pub fn warning_banner(message: &str) -> String {
    format!(r#"<div class="banner banner-warning">{}</div>"#, escape(message))
}

/// One-shot messages carried in the query string after a redirect
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Flash {
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Flash {
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(notice) = self.notice.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&notice_banner(notice));
        }
        if let Some(error) = self.error.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&error_banner(error));
        }
        out
    }
}

/// `k=v&...` with both sides percent-encoded; empty values are dropped
pub fn query_string<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .filter(|(_, v)| !v.as_ref().is_empty())
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// `path?query`, or just `path` when no pair has a value
pub fn with_query<K, V>(path: &str, pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let query = query_string(pairs);
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

/// Submitted fields by name; a repeated name keeps its first value
pub fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut fields = HashMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        fields.entry(name).or_insert(value);
    }
    fields
}

/// Percent-encode one path segment (ids may contain `/` or spaces)
pub fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

pub fn redirect_notice(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_query(path, &[("notice", message)]))
}

pub fn redirect_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_query(path, &[("error", message)]))
}

/// Colored status pill
pub fn status_badge(status: TaskStatus) -> String {
    format!(
        r#"<span class="badge status-{s}">{s}</span>"#,
        s = status.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_query_string_encodes_and_skips_empty() {
        let qs = query_string(&[("notice", "Project \"A&B\" created"), ("error", "")]);
        assert_eq!(qs, "notice=Project%20%22A%26B%22%20created");
        assert_eq!(with_query("/", &[("q", "")]), "/");
        assert_eq!(with_query("/tasks", &[("a", "1")]), "/tasks?a=1");
    }

    #[test]
    fn test_first_values_keeps_first() {
        let fields = first_values(vec![
            ("source".to_string(), "A".to_string()),
            ("books".to_string(), "MAT".to_string()),
            ("source".to_string(), "B".to_string()),
        ]);
        assert_eq!(fields["source"], "A");
        assert_eq!(fields["books"], "MAT");
    }

    #[test]
    fn test_flash_render_escapes() {
        let flash = Flash {
            notice: Some("<b>ok</b>".to_string()),
            error: Some(String::new()),
        };
        let html = flash.render();
        assert!(html.contains("&lt;b&gt;ok&lt;/b&gt;"));
        assert!(!html.contains("banner-error"));
    }

    #[test]
    fn test_status_badge_class() {
        assert!(status_badge(TaskStatus::Failed).contains("status-failed"));
        assert!(status_badge(TaskStatus::Unknown).contains(">unknown<"));
    }

    #[test]
    fn test_page_marks_active_nav() {
        let Html(html) = page("Tasks", Nav::Tasks, "<p>body</p>");
        assert!(html.contains(r#"<a href="/tasks" class="active">Tasks</a>"#));
        assert!(html.contains(r#"<a href="/">Projects</a>"#));
        assert!(html.contains("<p>body</p>"));
    }
}
