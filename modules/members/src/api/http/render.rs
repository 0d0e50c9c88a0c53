//! Inline HTML rendering for the server-rendered pages and htmx
//! fragments. Deliberately template-engine free: the pages are small
//! enough that explicit string building with an escape helper is clearer
//! than a templating dependency.

use crate::contract::model::{Member, MemberPage};
use std::fmt::Write;

/// HTML-escape a text value for element content or attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Minimal page skeleton shared by all views. Loads htmx and listens for
/// the toggle trigger to show a toast.
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title} — Member Registry</title>\n\
         <script src=\"https://unpkg.com/htmx.org@1.9.12\"></script>\n\
         </head>\n<body>\n\
         <div id=\"toast\" hidden>Status updated.</div>\n\
         <script>document.body.addEventListener('memberStatusToggled', function () {{\n\
           var t = document.getElementById('toast');\n\
           t.hidden = false;\n\
           setTimeout(function () {{ t.hidden = true; }}, 2000);\n\
         }});</script>\n\
         {body}\n</body>\n</html>\n",
        title = escape(title),
        body = body,
    )
}

/// The status line plus toggle control. Returned whole-sale on htmx
/// toggle requests (hx-swap=\"outerHTML\" replaces the wrapper div).
pub fn status_fragment(member: &Member) -> String {
    format!(
        "<div id=\"member-status\"><p>Status: <strong>{status}</strong></p>\
         <form hx-post=\"/members/{id}/toggle/\" hx-target=\"#member-status\" hx-swap=\"outerHTML\" \
         method=\"post\" action=\"/members/{id}/toggle/\">\
         <button type=\"submit\">Toggle status</button></form></div>",
        status = escape(member.status.display_name()),
        id = member.id,
    )
}

pub fn list_page(page_data: &MemberPage, q: Option<&str>, notice: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Members</h1>\n");
    if let Some(notice) = notice {
        let _ = write!(body, "<p class=\"notice\">{}</p>\n", escape(notice));
    }
    let _ = write!(
        body,
        "<form method=\"get\" action=\"/\"><input type=\"text\" name=\"q\" value=\"{}\" placeholder=\"Filter by name\"><button type=\"submit\">Search</button></form>\n",
        escape(q.unwrap_or(""))
    );
    body.push_str("<p><a href=\"/members/add/\">Add member</a></p>\n<ul>\n");
    for member in &page_data.items {
        let _ = write!(
            body,
            "<li><a href=\"/members/{id}/\">{name}</a> — {email} ({status})</li>\n",
            id = member.id,
            name = escape(&member.name),
            email = escape(&member.email),
            status = escape(member.status.display_name()),
        );
    }
    if page_data.items.is_empty() {
        body.push_str("<li>No members found.</li>\n");
    }
    body.push_str("</ul>\n");

    // Pagination links preserve the current filter
    let query_prefix = match q {
        Some(q) if !q.is_empty() => format!("q={}&", urlencoding::encode(q)),
        _ => String::new(),
    };
    body.push_str("<p>");
    if page_data.has_prev() {
        let _ = write!(
            body,
            "<a href=\"/?{}page={}\">Previous</a> ",
            query_prefix,
            page_data.page - 1
        );
    }
    let _ = write!(
        body,
        "Page {} of {}",
        page_data.page,
        page_data.total_pages()
    );
    if page_data.has_next() {
        let _ = write!(
            body,
            " <a href=\"/?{}page={}\">Next</a>",
            query_prefix,
            page_data.page + 1
        );
    }
    body.push_str("</p>\n<form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>\n");

    page("Members", &body)
}

pub fn detail_page(member: &Member) -> String {
    let body = format!(
        "<h1>{name}</h1>\n<p>Email: {email}</p>\n{status}\n\
         <p>Created: {created} · Updated: {updated}</p>\n\
         <p><a href=\"/members/{id}/edit/\">Edit</a> · <a href=\"/\">Back to list</a></p>\n",
        name = escape(&member.name),
        email = escape(&member.email),
        status = status_fragment(member),
        created = member.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        updated = member.updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        id = member.id,
    );
    page(&member.name, &body)
}

fn field_errors(errors: &[(&str, String)], field: &str) -> String {
    let msgs: Vec<&(&str, String)> = errors.iter().filter(|(f, _)| *f == field).collect();
    if msgs.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"errorlist\">");
    for (_, message) in msgs {
        let _ = write!(out, "<li>{}</li>", escape(message));
    }
    out.push_str("</ul>");
    out
}

/// Create/edit form. `errors` is a list of (field, message) pairs
/// rendered inline next to the offending field.
pub fn member_form_page(
    title: &str,
    action: &str,
    name_value: &str,
    email_value: &str,
    errors: &[(&str, String)],
) -> String {
    let body = format!(
        "<h1>{title}</h1>\n<form method=\"post\" action=\"{action}\">\n\
         <p><label>Name <input type=\"text\" name=\"name\" value=\"{name}\"></label>{name_errors}</p>\n\
         <p><label>Email <input type=\"text\" name=\"email\" value=\"{email}\"></label>{email_errors}</p>\n\
         <button type=\"submit\">Save</button>\n</form>\n\
         <p><a href=\"/\">Back to list</a></p>\n",
        title = escape(title),
        action = escape(action),
        name = escape(name_value),
        name_errors = field_errors(errors, "name"),
        email = escape(email_value),
        email_errors = field_errors(errors, "email"),
    );
    page(title, &body)
}

pub fn login_page(next: &str, error: Option<&str>) -> String {
    let error_html = match error {
        Some(message) => format!("<p class=\"error\">{}</p>\n", escape(message)),
        None => String::new(),
    };
    let body = format!(
        "<h1>Log in</h1>\n{error_html}\
         <form method=\"post\" action=\"/login\">\n\
         <input type=\"hidden\" name=\"next\" value=\"{next}\">\n\
         <p><label>Access key <input type=\"password\" name=\"access_key\"></label></p>\n\
         <button type=\"submit\">Log in</button>\n</form>\n",
        next = escape(next),
    );
    page("Log in", &body)
}
