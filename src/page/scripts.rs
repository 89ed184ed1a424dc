//! JavaScript evaluated inside the Chrome page.

/// Quotes `value` as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Serializes the document. Each attached shadow root is emitted as a
/// `<threadline-shadow-root>` first child of its host.
pub(crate) fn serialize_document() -> &'static str {
    r#"
    (() => {
        const VOID = new Set(['area', 'base', 'br', 'col', 'embed', 'hr', 'img',
            'input', 'link', 'meta', 'source', 'track', 'wbr']);
        const RAW = new Set(['script', 'style']);
        const text = (s) => s.replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;');
        const attr = (s) => s.replace(/&/g, '&amp;').replace(/"/g, '&quot;');

        const children = (parent, raw) => {
            let out = '';
            for (const child of parent.childNodes) out += serialize(child, raw);
            return out;
        };

        const serialize = (node, raw) => {
            if (node.nodeType === Node.TEXT_NODE) {
                return raw ? node.data : text(node.data);
            }
            if (node.nodeType !== Node.ELEMENT_NODE) return '';

            const tag = node.localName;
            let out = '<' + tag;
            for (const a of node.attributes) out += ' ' + a.name + '="' + attr(a.value) + '"';
            out += '>';
            if (VOID.has(tag)) return out;

            if (node.shadowRoot) {
                out += '<threadline-shadow-root>'
                    + children(node.shadowRoot, false)
                    + '</threadline-shadow-root>';
            }
            const source = tag === 'template' ? node.content : node;
            return out + children(source, RAW.has(tag)) + '</' + tag + '>';
        };

        return '<!DOCTYPE html>' + serialize(document.documentElement, false);
    })()
    "#
}

pub(crate) fn scroll_into_view(selector: &str) -> String {
    let selector = js_string(selector);
    format!(
        r#"
        (() => {{
            const el = document.querySelector({selector});
            if (!el) return false;
            el.scrollIntoView({{ behavior: 'smooth', block: 'center' }});
            return true;
        }})()
        "#
    )
}

/// Toggles the highlight on an element, or on its shadow comment body.
pub(crate) fn set_highlight(selector: &str, on: bool) -> String {
    let selector = js_string(selector);
    format!(
        r#"
        (() => {{
            const el = document.querySelector({selector});
            if (!el) return false;
            const target = (el.shadowRoot && el.shadowRoot.querySelector('.comment-body')) || el;
            target.classList.toggle('threadline-highlight', {on});
            target.style.backgroundColor = {on} ? 'rgba(0, 121, 211, 0.05)' : '';
            target.style.borderLeft = {on} ? '3px solid #0079d3' : '';
            return true;
        }})()
        "#
    )
}

pub(crate) fn attach_affordance(selector: &str, label: &str) -> String {
    let selector = js_string(selector);
    let label = js_string(label);
    format!(
        r#"
        (() => {{
            const el = document.querySelector({selector});
            if (!el || el.querySelector(':scope .threadline-summarize-btn')) return false;
            const anchor = el.querySelector('.comhead')
                || el.querySelector('div[class*="qu-justifyContent--space-between"]')
                || el;
            const btn = document.createElement('a');
            btn.href = 'javascript:void(0)';
            btn.className = 'threadline-summarize-btn';
            btn.textContent = {label};
            const timeLink = el.querySelector('a[rel="nofollow noopener noreferrer"]');
            if (timeLink) timeLink.after(btn);
            else anchor.appendChild(btn);
            return true;
        }})()
        "#
    )
}

pub(crate) fn inject_style(id: &str, css: &str) -> String {
    let id = js_string(id);
    let css = js_string(css);
    format!(
        r#"
        (() => {{
            if (document.getElementById({id})) return false;
            const style = document.createElement('style');
            style.id = {id};
            style.textContent = {css};
            document.head.appendChild(style);
            return true;
        }})()
        "#
    )
}

pub(crate) fn remove_style(id: &str) -> String {
    let id = js_string(id);
    format!(
        r#"
        (() => {{
            const style = document.getElementById({id});
            if (style) style.remove();
            return true;
        }})()
        "#
    )
}
