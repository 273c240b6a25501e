//! Shared HTML components: navigation bar, chat history sidebar, and the
//! base page template.

use crate::models::HistoryGroup;
use crate::render::html_escape;

use super::styles::STYLE;

// ============================================================================
// Navigation Bar
// ============================================================================

pub fn nav_bar() -> String {
    r#"<nav class="nav-bar">
            <span class="brand">PaperLens</span>
            <a href="/">Summarize</a>
            <a href="/multi-agent">Multi-Agent</a>
            <span class="spacer"></span>
        </nav>"#
        .to_string()
}

// ============================================================================
// Chat History Sidebar
// ============================================================================

pub fn history_sidebar(groups: &[HistoryGroup], current: Option<&str>) -> String {
    let mut html = String::from(r#"<aside class="sidebar"><h2>Chat History</h2>"#);

    if groups.is_empty() {
        html.push_str(r#"<p class="muted">No conversations yet.</p>"#);
    }

    for group in groups {
        html.push_str(&format!("<h3>{}</h3>", html_escape(&group.filename)));
        for session in &group.sessions {
            let class = if current == Some(session.paper_id.as_str()) {
                "session-item current"
            } else {
                "session-item"
            };
            html.push_str(&format!(
                r#"<div class="{class}">
                    <span><a href="/paper/{id}">{label}</a><span class="count">{count}</span></span>
                    <button title="Delete chat" onclick="deleteHistory('{id}')">✕</button>
                </div>"#,
                class = class,
                id = html_escape(&session.paper_id),
                label = html_escape(&session.label),
                count = session.messages,
            ));
        }
    }

    html.push_str("</aside>");
    html
}

/// Script backing the sidebar's delete buttons.
pub const SIDEBAR_SCRIPT: &str = r#"
    async function deleteHistory(paperId) {
        if (!confirm('Delete this conversation?')) return;
        try {
            const response = await fetch('/api/history/' + encodeURIComponent(paperId), { method: 'DELETE' });
            if (response.ok) {
                window.location.reload();
            } else {
                const err = await response.json().catch(() => ({}));
                alert('Failed to delete: ' + (err.error || response.status));
            }
        } catch (e) {
            alert('Error deleting conversation: ' + e.message);
        }
    }
"#;

// ============================================================================
// Base HTML Template
// ============================================================================

pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {content}
    </div>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav_bar(),
    )
}

/// Page with the chat history sidebar on the left.
pub fn sidebar_html(title: &str, content: &str, groups: &[HistoryGroup]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="layout">
        {sidebar}
        <div class="container">
            {content}
        </div>
    </div>
    <script>{script}</script>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav_bar(),
        sidebar = history_sidebar(groups, None),
        script = SIDEBAR_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryEntry;

    #[test]
    fn test_sidebar_escapes_and_marks_current() {
        let groups = vec![HistoryGroup {
            filename: "<evil>.pdf".to_string(),
            sessions: vec![HistoryEntry {
                paper_id: "abc123".to_string(),
                label: "Chat abc123".to_string(),
                messages: 4,
            }],
        }];
        let html = history_sidebar(&groups, Some("abc123"));
        assert!(html.contains("&lt;evil&gt;.pdf"));
        assert!(html.contains("session-item current"));
        assert!(html.contains("href=\"/paper/abc123\""));
    }

    #[test]
    fn test_sidebar_empty() {
        assert!(history_sidebar(&[], None).contains("No conversations yet."));
    }

    #[test]
    fn test_base_html_escapes_title() {
        let html = base_html("a <b>", "<p>body</p>");
        assert!(html.contains("<title>a &lt;b&gt;</title>"));
        assert!(html.contains("<p>body</p>"));
    }
}
