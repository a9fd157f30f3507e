//! JavaScript snippets evaluated in the live chat tab.
use serde_json::Value;

use crate::selectors::ElementTarget;

fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Outer HTML of the whole document.
pub(crate) fn document_html() -> &'static str {
    "document.documentElement.outerHTML"
}

/// Replace the composer content and fire `input`/`change` so the page's
/// framework picks the new value up. Evaluates to `false` when the element
/// is gone.
pub(crate) fn fill_input(target: &ElementTarget, text: &str) -> String {
    let selector = js_string(&target.selector);
    let text = js_string(text);
    format!(
        r#"(() => {{
  const el = document.querySelector({selector});
  if (!el) return false;
  const text = {text};
  el.focus();
  if (el.tagName === 'TEXTAREA') {{
    const setter = Object.getOwnPropertyDescriptor(HTMLTextAreaElement.prototype, 'value').set;
    setter.call(el, text);
  }} else {{
    let inserted = false;
    try {{
      const range = document.createRange();
      range.selectNodeContents(el);
      const selection = window.getSelection();
      selection.removeAllRanges();
      selection.addRange(range);
      document.execCommand('selectAll', false, null);
      inserted = document.execCommand('insertText', false, text);
    }} catch (_) {{}}
    if (!inserted) {{
      el.innerHTML = '';
      el.textContent = text;
    }}
  }}
  try {{
    el.dispatchEvent(new InputEvent('input', {{ bubbles: true, cancelable: true, data: text, inputType: 'insertText' }}));
  }} catch (_) {{
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  }}
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})()"#
    )
}

/// Clear `disabled` on the element and click it. Evaluates to `false` when
/// the element is gone.
pub(crate) fn click(target: &ElementTarget) -> String {
    let selector = js_string(&target.selector);
    format!(
        r#"(() => {{
  const el = document.querySelector({selector});
  if (!el) return false;
  if (el.disabled) el.disabled = false;
  el.click();
  return true;
}})()"#
    )
}
