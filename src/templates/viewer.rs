//! Paper view: highlighted text layer or pdf.js rendering on the left,
//! summary and chat on the right.

use crate::models::{
    ChatRole, HistoryGroup, PaperRecord, QaStatus, RenderedMessage, RenderedPage, SummaryMode,
    SummaryType,
};
use crate::render::{html_escape, render_markdown, render_pages_html};

use super::components::{history_sidebar, nav_bar, SIDEBAR_SCRIPT};
use super::styles::STYLE;

fn chat_messages_html(messages: &[RenderedMessage]) -> String {
    if messages.is_empty() {
        return r#"<p class="muted" id="chat-empty">Ask anything about this paper.</p>"#
            .to_string();
    }
    messages
        .iter()
        .map(|m| {
            let class = match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            // content_html is already sanitized
            format!(
                r#"<div class="chat-msg {} markdown">{}</div>"#,
                class, m.content_html
            )
        })
        .collect()
}

fn sections_html(record: &PaperRecord) -> String {
    if record.sections.is_empty() {
        return String::new();
    }
    let mut html = String::from("<h2>Sections</h2>");
    for section in &record.sections {
        html.push_str(&format!(
            r#"<div class="section-summary"><h3>{}</h3><div class="markdown">{}</div></div>"#,
            html_escape(&section.section),
            render_markdown(&section.summary)
        ));
    }
    html
}

fn resummarize_form(record: &PaperRecord) -> String {
    let select = match record.mode {
        SummaryMode::Single(current) => {
            let options: String = [SummaryType::Short, SummaryType::Detailed]
                .iter()
                .map(|t| {
                    format!(
                        r#"<option value="{v}"{sel}>{v}</option>"#,
                        v = t.as_str(),
                        sel = if *t == current { " selected" } else { "" }
                    )
                })
                .collect();
            format!(r#"<select name="summary_type">{}</select>"#, options)
        }
        SummaryMode::MultiAgent => String::new(),
    };
    format!(
        r#"<form class="actions" action="/paper/{id}/resummarize" method="post" onsubmit="this.querySelector('button').disabled = true">
            {select}
            <button type="submit" class="btn secondary">Summarize again</button>
            <button type="button" class="btn danger" onclick="deletePaper()">Delete paper</button>
        </form>"#,
        id = html_escape(&record.paper_id),
        select = select,
    )
}

pub fn render_paper(
    record: &PaperRecord,
    pages: &[RenderedPage],
    text_error: Option<&str>,
    messages: &[RenderedMessage],
    history: &[HistoryGroup],
) -> String {
    let text_layer = match text_error {
        Some(err) => format!(
            r#"<p class="pdf-message">Could not read the PDF text: {}</p>"#,
            html_escape(err)
        ),
        None => render_pages_html(pages),
    };

    let summary_html = if record.summary.trim().is_empty() {
        r#"<p class="muted">No summary returned.</p>"#.to_string()
    } else {
        render_markdown(&record.summary)
    };

    let qa_class = match record.qa_status {
        QaStatus::Failed => "error-text",
        _ => "muted",
    };
    let chat_disabled = if record.qa_status == QaStatus::Failed {
        " disabled"
    } else {
        ""
    };

    // Both values go into <script>; ids and stored names are restricted to
    // safe characters, serde_json adds the quoting.
    let paper_id_json = serde_json::to_string(&record.paper_id).unwrap_or_else(|_| "\"\"".into());
    let pdf_json = serde_json::to_string(&record.stored_pdf).unwrap_or_else(|_| "\"\"".into());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - PaperLens</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="split">
        <div class="split-left">
            <div class="pane-toolbar">
                <button id="text-tab" class="active" onclick="showTextLayer()">Text</button>
                <button id="pdf-tab" onclick="showPdfViewer()">PDF</button>
                <span id="pdf-controls" style="display:none">
                    <button id="pdf-prev-btn" onclick="pdfPrevPage()">&lt;</button>
                    <button id="pdf-next-btn" onclick="pdfNextPage()">&gt;</button>
                    <button onclick="setPdfScale(currentPdfScale - 0.25)">-</button>
                    <button onclick="setPdfScale(currentPdfScale + 0.25)">+</button>
                </span>
                <span class="info" id="pdf-page-info"></span>
            </div>
            <div class="pane-body active" id="text-pane">
                {text_layer}
            </div>
            <div class="pane-body" id="pdf-pane">
                <p class="pdf-message" id="pdf-loading">Loading PDF...</p>
            </div>
        </div>
        <div class="split-right">
            <h1>{title}</h1>
            <p class="summary-meta">{mode} &middot; uploaded {created}</p>
            {resummarize}
            <h2>Summary</h2>
            <div class="markdown">{summary}</div>
            {sections}
            <h2>Ask about this paper</h2>
            <p class="{qa_class}" id="qa-status">{qa_message}</p>
            <div class="chat-log" id="chat-log">{chat}</div>
            <form id="chat-form" onsubmit="return askQuestion(event)">
                <textarea id="question" placeholder="What is the main contribution?"{chat_disabled}></textarea>
                <div class="actions"><button type="submit" class="btn" id="ask-btn"{chat_disabled}>Ask</button></div>
            </form>
            {sidebar}
        </div>
    </div>

    <script src="https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.min.js"></script>
    <script>
        pdfjsLib.GlobalWorkerOptions.workerSrc = 'https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.worker.min.js';

        const paperId = {paper_id_json};
        const pdfFilename = {pdf_json};

        let pdfDoc = null;
        let currentPdfPage = 1;
        let totalPdfPages = 0;
        let currentPdfScale = parseFloat(localStorage.getItem('pdfScale')) || 1.25;

        function setActiveTab(showPdf) {{
            document.getElementById('text-tab').classList.toggle('active', !showPdf);
            document.getElementById('pdf-tab').classList.toggle('active', showPdf);
            document.getElementById('text-pane').classList.toggle('active', !showPdf);
            document.getElementById('pdf-pane').classList.toggle('active', showPdf);
            document.getElementById('pdf-controls').style.display = showPdf ? 'inline' : 'none';
            document.getElementById('pdf-page-info').style.display = showPdf ? 'inline' : 'none';
        }}

        function showTextLayer() {{
            setActiveTab(false);
        }}

        async function showPdfViewer() {{
            setActiveTab(true);
            if (!pdfDoc) {{
                await loadPdf();
            }}
        }}

        async function loadPdf() {{
            const container = document.getElementById('pdf-pane');
            try {{
                const loadingTask = pdfjsLib.getDocument('/pdfs/' + encodeURIComponent(pdfFilename));
                pdfDoc = await loadingTask.promise;
                totalPdfPages = pdfDoc.numPages;
                await renderAllPages();
            }} catch (error) {{
                container.innerHTML = '<p class="pdf-message">Failed to load PDF: ' + error.message + '</p>';
                console.error('PDF load error:', error);
            }}
        }}

        async function renderAllPages() {{
            if (!pdfDoc) return;

            const container = document.getElementById('pdf-pane');
            container.innerHTML = '';
            const dpr = window.devicePixelRatio || 1;

            for (let pageNum = 1; pageNum <= totalPdfPages; pageNum++) {{
                const page = await pdfDoc.getPage(pageNum);
                const viewport = page.getViewport({{ scale: currentPdfScale }});

                const canvas = document.createElement('canvas');
                canvas.id = 'pdf-page-' + pageNum;
                const ctx = canvas.getContext('2d');
                canvas.width = Math.floor(viewport.width * dpr);
                canvas.height = Math.floor(viewport.height * dpr);
                canvas.style.width = Math.floor(viewport.width) + 'px';
                canvas.style.height = Math.floor(viewport.height) + 'px';
                ctx.scale(dpr, dpr);

                container.appendChild(canvas);
                await page.render({{ canvasContext: ctx, viewport: viewport }}).promise;
            }}

            updatePageInfo();
        }}

        function updatePageInfo() {{
            document.getElementById('pdf-page-info').textContent =
                'Page ' + currentPdfPage + ' of ' + totalPdfPages;
            document.getElementById('pdf-prev-btn').disabled = currentPdfPage <= 1;
            document.getElementById('pdf-next-btn').disabled = currentPdfPage >= totalPdfPages;
        }}

        function scrollToPage(pageNum) {{
            const canvas = document.getElementById('pdf-page-' + pageNum);
            if (canvas) {{
                canvas.scrollIntoView({{ behavior: 'smooth', block: 'start' }});
            }}
        }}

        function pdfPrevPage() {{
            if (currentPdfPage <= 1) return;
            currentPdfPage--;
            scrollToPage(currentPdfPage);
            updatePageInfo();
        }}

        function pdfNextPage() {{
            if (currentPdfPage >= totalPdfPages) return;
            currentPdfPage++;
            scrollToPage(currentPdfPage);
            updatePageInfo();
        }}

        async function setPdfScale(scale) {{
            currentPdfScale = Math.min(3, Math.max(0.5, scale));
            localStorage.setItem('pdfScale', currentPdfScale);
            await renderAllPages();
            scrollToPage(currentPdfPage);
        }}

        function appendMessage(role, html) {{
            const log = document.getElementById('chat-log');
            const empty = document.getElementById('chat-empty');
            if (empty) empty.remove();
            const div = document.createElement('div');
            div.className = 'chat-msg markdown ' + role;
            div.innerHTML = html;
            log.appendChild(div);
            log.scrollTop = log.scrollHeight;
            return div;
        }}

        function escapeText(text) {{
            const div = document.createElement('div');
            div.textContent = text;
            return div.innerHTML;
        }}

        async function askQuestion(event) {{
            event.preventDefault();
            const input = document.getElementById('question');
            const btn = document.getElementById('ask-btn');
            const question = input.value.trim();
            if (!question) return false;

            input.value = '';
            btn.disabled = true;
            appendMessage('user', escapeText(question));
            const pending = appendMessage('assistant', '<em>Thinking...</em>');

            try {{
                const response = await fetch('/api/paper/' + encodeURIComponent(paperId) + '/ask', {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{ question }})
                }});
                const data = await response.json();
                if (!response.ok) {{
                    pending.innerHTML = escapeText(data.error || 'Failed to get answer');
                }} else {{
                    const log = document.getElementById('chat-log');
                    log.innerHTML = '';
                    data.conversation.forEach(m => appendMessage(m.role, m.content_html));
                }}
            }} catch (e) {{
                pending.innerHTML = 'Failed to get answer';
            }} finally {{
                btn.disabled = false;
            }}
            return false;
        }}

        async function deletePaper() {{
            if (!confirm('Delete this paper and its chat?')) return;
            const response = await fetch('/api/paper/' + encodeURIComponent(paperId), {{ method: 'DELETE' }});
            if (response.ok) {{
                window.location.href = '/';
            }} else {{
                const err = await response.json().catch(() => ({{}}));
                alert('Failed to delete: ' + (err.error || response.status));
            }}
        }}

        {sidebar_script}

        // Jump to the first highlight in the text layer
        const firstMark = document.querySelector('mark.hl');
        if (firstMark) {{
            firstMark.scrollIntoView({{ block: 'center' }});
        }}
    </script>
</body>
</html>"#,
        title = html_escape(&record.filename),
        nav = nav_bar(),
        text_layer = text_layer,
        mode = html_escape(&record.mode.label()),
        created = record.created.format("%Y-%m-%d %H:%M"),
        resummarize = resummarize_form(record),
        summary = summary_html,
        sections = sections_html(record),
        qa_class = qa_class,
        qa_message = record.qa_status.message(),
        chat = chat_messages_html(messages),
        chat_disabled = chat_disabled,
        sidebar = history_sidebar(history, Some(&record.paper_id)),
        paper_id_json = paper_id_json,
        pdf_json = pdf_json,
        sidebar_script = SIDEBAR_SCRIPT,
    )
}
