//! CSS styles for the summarizer.
//!
//! Contains the main STYLE constant with all CSS for the web interface.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base03: #002b36;
    --base02: #073642;
    --base01: #586e75;
    --base00: #657b83;
    --base0: #839496;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --yellow: #b58900;
    --orange: #cb4b16;
    --red: #dc322f;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --link-hover: var(--cyan);
    --accent: var(--base2);
    --mark: #fce38a;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

h1, h2, h3 { font-weight: 600; margin-top: 1.5em; margin-bottom: 0.5em; }
h1 { font-size: 1.5rem; }
h2 { font-size: 1.2rem; }

.nav-bar {
    position: sticky;
    top: 0;
    background: var(--bg);
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    display: flex;
    gap: 1rem;
    align-items: center;
    z-index: 100;
}
.nav-bar .brand { font-weight: 600; color: var(--base01); }
.nav-bar .spacer { flex: 1; }

.layout { display: flex; min-height: calc(100vh - 44px); }

.container {
    flex: 1;
    max-width: 900px;
    margin: 0 auto;
    padding: 1rem;
}

/* Chat history sidebar */
.sidebar {
    width: 16rem;
    flex-shrink: 0;
    background: var(--accent);
    border-right: 1px solid var(--border);
    padding: 1rem;
    overflow-y: auto;
    font-size: 0.85rem;
}
.sidebar h2 { margin-top: 0; font-size: 1rem; }
.sidebar h3 { font-size: 0.8rem; color: var(--base01); margin: 1rem 0 0.4rem; word-break: break-all; }
.session-item {
    display: flex;
    justify-content: space-between;
    align-items: center;
    background: var(--bg);
    border-radius: 4px;
    padding: 0.3rem 0.5rem;
    margin-bottom: 0.3rem;
}
.session-item.current { outline: 1px solid var(--link); }
.session-item .count { color: var(--muted); font-size: 0.75rem; margin-left: 0.3rem; }
.session-item button {
    background: none;
    border: none;
    color: var(--red);
    cursor: pointer;
    font-size: 0.85rem;
}

/* Forms */
.upload-form { display: flex; flex-direction: column; gap: 0.75rem; margin: 1rem 0; }
.upload-form label { font-weight: 500; margin-right: 0.5rem; }
select, textarea, input[type="file"] {
    font-family: inherit;
    font-size: 0.9rem;
    color: var(--fg);
    background: var(--bg);
    border: 1px solid var(--border);
    border-radius: 4px;
    padding: 0.4rem;
}
textarea { width: 100%; min-height: 4rem; resize: vertical; }
.btn {
    padding: 0.45rem 1rem;
    border: none;
    border-radius: 4px;
    background: var(--link);
    color: white;
    cursor: pointer;
    font-size: 0.9rem;
    font-family: inherit;
    align-self: flex-start;
}
.btn:disabled { background: var(--muted); cursor: default; }
.btn.secondary { background: var(--accent); color: var(--fg); border: 1px solid var(--base1); }
.btn.danger { background: var(--red); }
.progress { font-size: 0.85rem; font-style: italic; color: var(--muted); }
.error-text { color: var(--red); }
.muted { color: var(--muted); }

.paper-list { list-style: none; }
.paper-item {
    padding: 0.6rem 0;
    border-bottom: 1px solid var(--border);
    display: flex;
    justify-content: space-between;
    gap: 1rem;
}
.paper-item .meta { font-size: 0.8rem; color: var(--muted); white-space: nowrap; }
.type-badge {
    font-size: 0.65rem;
    padding: 0.1rem 0.4rem;
    background: var(--accent);
    border-radius: 3px;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    margin-right: 0.5rem;
}

/* Rendered markdown */
.markdown pre {
    background: var(--accent);
    padding: 1rem;
    overflow-x: auto;
    border-radius: 4px;
    margin: 1rem 0;
}
.markdown code { font-family: "SF Mono", "Consolas", "Liberation Mono", monospace; font-size: 0.9em; }
.markdown ul, .markdown ol { margin: 0.5rem 0; padding-left: 1.5rem; }
.markdown p { margin: 0.5rem 0; }
.markdown table { border-collapse: collapse; margin: 0.5rem 0; }
.markdown th, .markdown td { border: 1px solid var(--border); padding: 0.25rem 0.5rem; }

/* Split view */
.split { position: fixed; top: 44px; left: 0; right: 0; bottom: 0; display: flex; }
.split-left {
    width: 60%;
    display: flex;
    flex-direction: column;
    border-right: 1px solid var(--border);
    background: #586e75;
}
.split-right { flex: 1; overflow-y: auto; padding: 1rem 1.5rem; }

.pane-toolbar {
    height: 40px;
    background: var(--accent);
    border-bottom: 1px solid var(--border);
    display: flex;
    align-items: center;
    padding: 0 0.5rem;
    gap: 0.5rem;
    flex-shrink: 0;
    font-size: 0.8rem;
}
.pane-toolbar button {
    padding: 0.3rem 0.6rem;
    border: 1px solid var(--border);
    border-radius: 3px;
    background: var(--bg);
    color: var(--fg);
    cursor: pointer;
    font-size: 0.8rem;
    font-family: inherit;
}
.pane-toolbar button.active { background: var(--link); color: white; border-color: var(--link); }
.pane-toolbar .info { margin-left: auto; color: var(--fg); }

.pane-body { flex: 1; overflow: auto; padding: 1rem; display: none; }
.pane-body.active { display: flex; flex-direction: column; align-items: center; gap: 1rem; }
.pane-body canvas { background: white; box-shadow: 0 2px 8px rgba(0,0,0,0.3); }

.text-page {
    background: white;
    width: 100%;
    max-width: 800px;
    padding: 1.5rem 2rem;
    box-shadow: 0 2px 8px rgba(0,0,0,0.3);
    font-family: Georgia, "Times New Roman", serif;
    font-size: 0.9rem;
    color: #333;
}
.text-page .page-label { font-size: 0.75rem; color: var(--muted); text-align: center; margin-bottom: 0.75rem; }
.text-page .line { white-space: pre-wrap; }
mark.hl { background: var(--mark); border-radius: 2px; padding: 0 1px; }

.pdf-message { color: var(--base3); font-size: 0.9rem; padding: 2rem; text-align: center; }

/* Summary and chat */
.summary-meta { font-size: 0.8rem; color: var(--muted); }
.section-summary { border: 1px solid var(--border); border-radius: 4px; padding: 0.5rem 0.75rem; margin: 0.5rem 0; }
.section-summary h3 { margin-top: 0; font-size: 0.95rem; }
.chat-log { display: flex; flex-direction: column; gap: 0.5rem; margin: 0.75rem 0; max-height: 24rem; overflow-y: auto; }
.chat-msg { padding: 0.4rem 0.75rem; border-radius: 6px; font-size: 0.9rem; }
.chat-msg.user { background: #dbe9f6; align-self: flex-end; max-width: 85%; }
.chat-msg.assistant { background: var(--accent); max-width: 95%; }
.actions { display: flex; gap: 0.5rem; flex-wrap: wrap; align-items: center; margin: 0.75rem 0; }
"#;
