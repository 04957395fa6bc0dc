//! Page scripts evaluated inside the attached tab.
//!
//! Each script is an async function taking the action parameters and
//! resolving to `{ success, result?, error? }`.

use serde_json::Value;

use buddy_protocols::BrowserTool;

const READ_PAGE_CONTENT: &str = r#"async () => {
  const selectors = ['main', 'article', '[role="main"]', '.content', '.main-content', '#content', '#main', 'body'];
  let root = document.body;
  for (const selector of selectors) {
    const el = document.querySelector(selector);
    if (el && (el.innerText || '').trim().length > 200) { root = el; break; }
  }
  const text = (root.innerText || '')
    .split('\n')
    .map(line => line.trim())
    .filter(line => line.length > 0)
    .join('\n');
  return { success: true, result: text };
}"#;

const DOM_SNAPSHOT: &str = r#"async () => {
  const interactive = ['a', 'button', 'input', 'select', 'textarea'];
  const elements = [];
  document.querySelectorAll('*').forEach((element, index) => {
    const rect = element.getBoundingClientRect();
    const styles = window.getComputedStyle(element);
    if (rect.width === 0 || rect.height === 0 || styles.display === 'none' || styles.visibility === 'hidden') return;
    if (rect.bottom < 0 || rect.top > window.innerHeight) return;
    const tag = element.tagName.toLowerCase();
    const info = {
      tagName: tag,
      index,
      id: element.id || undefined,
      className: typeof element.className === 'string' && element.className ? element.className : undefined,
      text: (element.textContent || '').trim().substring(0, 100) || undefined,
      position: {
        top: Math.round(rect.top),
        left: Math.round(rect.left),
        width: Math.round(rect.width),
        height: Math.round(rect.height),
      },
    };
    if (interactive.includes(tag)) {
      info.interactive = true;
      if (tag === 'a') info.href = element.href;
      if (tag === 'input' || tag === 'textarea') {
        info.inputType = element.type;
        info.placeholder = element.placeholder;
        info.value = element.value;
      }
    }
    elements.push(info);
  });
  const snapshot = {
    url: window.location.href,
    title: document.title,
    viewport: { width: window.innerWidth, height: window.innerHeight },
    elements,
  };
  return { success: true, result: JSON.stringify(snapshot, null, 2) };
}"#;

const CLICK: &str = r#"async (params) => {
  const { elementText, elementId } = params;
  const exact = params.exact !== false;
  const matches = (text) => exact ? text === elementText : text.includes(elementText);
  const find = () => {
    if (elementId) {
      const byId = document.getElementById(elementId);
      if (byId) return byId;
    }
    if (!elementText) return null;
    const clickable = ['a', 'button', 'input[type="button"]', 'input[type="submit"]', '[role="button"]', '[onclick]'];
    for (const selector of clickable) {
      for (const el of document.querySelectorAll(selector)) {
        const text = (el.textContent || '').trim();
        if (text && matches(text)) return el;
      }
    }
    for (const el of document.querySelectorAll('*')) {
      const text = (el.textContent || '').trim();
      if (!text) continue;
      const hasTextChildren = Array.from(el.children).some(c => (c.textContent || '').trim().length > 0);
      if (!hasTextChildren && matches(text)) return el;
    }
    return null;
  };
  const element = find();
  if (!element) return { success: false, error: `Element not found: ${elementId || elementText}` };
  if (typeof element.focus === 'function') element.focus();
  const rect = element.getBoundingClientRect();
  const init = { view: window, bubbles: true, cancelable: true, clientX: rect.left + rect.width / 2, clientY: rect.top + rect.height / 2, button: 0 };
  const pause = () => new Promise(r => setTimeout(r, 50));
  element.dispatchEvent(new MouseEvent('mousedown', init));
  await pause();
  element.dispatchEvent(new MouseEvent('mouseup', init));
  await pause();
  element.dispatchEvent(new MouseEvent('click', init));
  const href = element instanceof HTMLAnchorElement ? element.getAttribute('href') || '' : '';
  const navigating = element instanceof HTMLAnchorElement && !!element.href &&
    !href.startsWith('#') && !href.startsWith('javascript:') && element.target !== '_blank';
  if (['A', 'BUTTON', 'INPUT'].includes(element.tagName)) element.click();
  return { success: true, result: { navigating } };
}"#;

const TYPE_TEXT: &str = r#"async (params) => {
  const active = document.activeElement;
  if (!active || !['INPUT', 'TEXTAREA'].includes(active.tagName)) {
    return { success: false, error: 'No input element is focused' };
  }
  for (const char of params.text || '') {
    active.dispatchEvent(new KeyboardEvent('keydown', { key: char }));
    active.value += char;
    active.dispatchEvent(new Event('input', { bubbles: true }));
    await new Promise(r => setTimeout(r, 20));
  }
  return { success: true };
}"#;

const SCROLL_DOWN: &str = r#"async () => {
  window.scrollBy({ top: window.innerHeight, behavior: 'smooth' });
  await new Promise(r => setTimeout(r, 500));
  return { success: true };
}"#;

const SCROLL_UP: &str = r#"async () => {
  window.scrollBy({ top: -window.innerHeight, behavior: 'smooth' });
  await new Promise(r => setTimeout(r, 500));
  return { success: true };
}"#;

/// Script body for a page-side action. `None` for tools the host handles
/// natively.
pub fn action_script(tool: BrowserTool) -> Option<&'static str> {
    match tool {
        BrowserTool::ReadPageContent => Some(READ_PAGE_CONTENT),
        BrowserTool::DomSnapshot => Some(DOM_SNAPSHOT),
        BrowserTool::Click => Some(CLICK),
        BrowserTool::TypeText => Some(TYPE_TEXT),
        BrowserTool::ScrollDown => Some(SCROLL_DOWN),
        BrowserTool::ScrollUp => Some(SCROLL_UP),
        _ => None,
    }
}

/// Invocation expression for `Runtime.evaluate`.
pub fn invocation(script: &str, params: &Value) -> String {
    format!("({})({})", script, params)
}
