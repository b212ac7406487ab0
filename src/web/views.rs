//! HTML views for the browser interface.

use std::fmt::Write;

use crate::archive::Archive;
use crate::web::handlers::{
    FIELD_AUTHOR, FIELD_AUTH_CODE, FIELD_DATED, FIELD_FILE, FIELD_NAME, FIELD_TYPE,
};

/// Archives sharing the year of their `dated_on` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGroup {
    /// Year, or `None` for archives without a parsable date.
    pub year: Option<i32>,
    /// Archives of that year, newest identifier first.
    pub archives: Vec<Archive>,
}

/// Group archives by year, most recent year first; undated archives go last.
pub fn group_by_year(mut archives: Vec<Archive>) -> Vec<YearGroup> {
    archives.sort_by(|a, b| {
        // `None` sorts below every `Some`, so reversing puts undated last.
        b.dated_year()
            .cmp(&a.dated_year())
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut groups: Vec<YearGroup> = Vec::new();
    for archive in archives {
        let year = archive.dated_year();
        match groups.last_mut() {
            Some(group) if group.year == year => group.archives.push(archive),
            _ => groups.push(YearGroup {
                year,
                archives: vec![archive],
            }),
        }
    }
    groups
}

/// Format a byte count as a human-readable string (1024-based).
pub fn pretty_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT && exp < 5 {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, prefix)
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - Locara</title>
<link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
<header><a href="/">Locara</a> <a href="/upload">Upload</a></header>
<main>
{body}
</main>
<script src="/static/js/app.js"></script>
</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

/// Render the archive index page.
pub fn render_index(groups: &[YearGroup], base_url: &str) -> String {
    let mut body = String::new();

    if !base_url.is_empty() {
        let _ = writeln!(body, "<p class=\"base-url\">{}</p>", escape_html(base_url));
    }

    if groups.is_empty() {
        body.push_str("<p>No archives yet.</p>\n");
    }

    for group in groups {
        let heading = match group.year {
            Some(year) => year.to_string(),
            None => "Undated".to_string(),
        };
        let _ = writeln!(body, "<section>\n<h2>{heading}</h2>\n<table>");
        body.push_str(
            "<tr><th>Name</th><th>Date</th><th>Type</th><th>Author</th><th>Size</th><th>Uploaded by</th></tr>\n",
        );
        for archive in &group.archives {
            let _ = writeln!(
                body,
                "<tr><td><a href=\"/api/archive/{id}\">{name}</a></td><td>{dated}</td><td>{kind}</td><td>{author}</td><td>{size}</td><td>{uploader}</td></tr>",
                id = archive.id,
                name = escape_html(&archive.name),
                dated = escape_html(&archive.dated_on),
                kind = escape_html(&archive.kind),
                author = escape_html(&archive.author),
                size = pretty_bytes(archive.size_bytes),
                uploader = escape_html(&archive.uploader),
            );
        }
        body.push_str("</table>\n</section>\n");
    }

    layout("Archives", &body)
}

/// Render the upload form page.
pub fn render_upload() -> String {
    let body = format!(
        r#"<h1>Upload archive</h1>
<form action="/api/archive/create" method="post" enctype="multipart/form-data">
<label>Name <input type="text" name="{FIELD_NAME}" required></label>
<label>Dated <input type="date" name="{FIELD_DATED}" required></label>
<label>Type <input type="text" name="{FIELD_TYPE}" required></label>
<label>Author <input type="text" name="{FIELD_AUTHOR}" required></label>
<label>File <input type="file" name="{FIELD_FILE}" required></label>
<label>Auth code <input type="password" name="{FIELD_AUTH_CODE}" required></label>
<button type="submit">Upload</button>
</form>"#
    );
    layout("Upload", &body)
}

/// Render the error page shown after a rejected upload.
pub fn render_error() -> String {
    layout(
        "Error",
        "<h1>Upload rejected</h1>\n<p>The auth code was not accepted.</p>\n<p><a href=\"/upload\">Try again</a></p>",
    )
}
