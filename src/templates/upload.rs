//! Upload pages: the single summary form with recent papers, and the
//! multi-agent form.

use crate::models::{HistoryGroup, PaperRecord, SummaryType};
use crate::render::html_escape;

use super::components::sidebar_html;

/// Disables the submit button and shows progress while the backend works.
const UPLOAD_SCRIPT: &str = r#"
    function startUpload(form) {
        const btn = form.querySelector('button[type="submit"]');
        const progress = form.querySelector('.progress');
        if (btn) {
            btn.disabled = true;
            btn.textContent = 'Summarizing...';
        }
        if (progress) progress.style.display = 'block';
        return true;
    }
"#;

fn summary_type_options(selected: SummaryType) -> String {
    [SummaryType::Short, SummaryType::Detailed]
        .iter()
        .map(|t| {
            format!(
                r#"<option value="{v}"{sel}>{label}</option>"#,
                v = t.as_str(),
                sel = if *t == selected { " selected" } else { "" },
                label = match t {
                    SummaryType::Short => "Short",
                    SummaryType::Detailed => "Detailed",
                },
            )
        })
        .collect()
}

fn paper_list(papers: &[PaperRecord]) -> String {
    if papers.is_empty() {
        return r#"<p class="muted">No papers yet. Upload one above.</p>"#.to_string();
    }

    let items: String = papers
        .iter()
        .map(|p| {
            format!(
                r#"<li class="paper-item">
                    <span><span class="type-badge">{mode}</span><a href="/paper/{id}">{name}</a></span>
                    <span class="meta">{date}</span>
                </li>"#,
                mode = html_escape(&p.mode.label()),
                id = html_escape(&p.paper_id),
                name = html_escape(&p.filename),
                date = p.created.format("%Y-%m-%d %H:%M"),
            )
        })
        .collect();

    format!(r#"<ul class="paper-list">{}</ul>"#, items)
}

pub fn render_index(papers: &[PaperRecord], history: &[HistoryGroup]) -> String {
    let content = format!(
        r#"<h1>Summarize a paper</h1>
        <form class="upload-form" action="/summarize" method="post" enctype="multipart/form-data" onsubmit="return startUpload(this)">
            <div><input type="file" name="pdf" accept="application/pdf,.pdf" required></div>
            <div>
                <label for="summary_type">Summary</label>
                <select id="summary_type" name="summary_type">{options}</select>
            </div>
            <button type="submit" class="btn">Summarize</button>
            <p class="progress" style="display:none">Uploading and summarizing. Large papers can take a few minutes.</p>
        </form>
        <h2>Recent papers</h2>
        {papers}
        <script>{script}</script>"#,
        options = summary_type_options(SummaryType::default()),
        papers = paper_list(papers),
        script = UPLOAD_SCRIPT,
    );
    sidebar_html("PaperLens", &content, history)
}

pub fn render_multi_agent(history: &[HistoryGroup]) -> String {
    let content = format!(
        r#"<h1>Multi-agent summary</h1>
        <p class="muted">Each section of the paper is summarized separately, then combined into one overview.</p>
        <form class="upload-form" action="/multi-agent" method="post" enctype="multipart/form-data" onsubmit="return startUpload(this)">
            <div><input type="file" name="pdf" accept="application/pdf,.pdf" required></div>
            <button type="submit" class="btn">Summarize sections</button>
            <p class="progress" style="display:none">Running the section agents. This can take several minutes.</p>
        </form>
        <script>{script}</script>"#,
        script = UPLOAD_SCRIPT,
    );
    sidebar_html("Multi-agent summary - PaperLens", &content, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QaStatus, SummaryMode};
    use chrono::Utc;

    fn record(id: &str, filename: &str) -> PaperRecord {
        PaperRecord {
            paper_id: id.to_string(),
            filename: filename.to_string(),
            stored_pdf: format!("{}.pdf", id),
            pdf_sha256: String::new(),
            mode: SummaryMode::Single(SummaryType::Detailed),
            summary: "summary".to_string(),
            sections: Vec::new(),
            highlights: Vec::new(),
            qa_status: QaStatus::Ready,
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    #[test]
    fn test_index_lists_papers_escaped() {
        let html = render_index(&[record("p1", "a&b.pdf")], &[]);
        assert!(html.contains("action=\"/summarize\""));
        assert!(html.contains("href=\"/paper/p1\""));
        assert!(html.contains("a&amp;b.pdf"));
        assert!(html.contains("detailed summary"));
    }

    #[test]
    fn test_index_empty_and_default_option() {
        let html = render_index(&[], &[]);
        assert!(html.contains("No papers yet."));
        assert!(html.contains(r#"<option value="short" selected>"#));
    }

    #[test]
    fn test_multi_agent_form_posts_to_multi_agent() {
        let html = render_multi_agent(&[]);
        assert!(html.contains("action=\"/multi-agent\""));
        assert!(html.contains("name=\"pdf\""));
    }
}
