//! Length-bounded, word-safe summarization.
//!
//! Content over the limit is cut from the end: nodes are visited in reverse
//! document order and removed whole until the next one only needs a partial
//! trim. A cut never splits a word, even one spread over several text nodes,
//! as long as whitespace precedes it somewhere in the content. Elements the
//! cut empties are removed. The marker is then appended, and the serialized
//! result (marker included) fits the limit.

use tracing::debug;

use crate::dom::Dom;
use crate::dom::serialize::{
    escape_text, escaped_char_len, escaped_len, inner_html, inner_len, is_void_element,
};

/// Default truncation marker.
pub const DEFAULT_MARKER: &str = "...";

/// Result of summarizing one piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Serialized markup, at most the requested length.
    pub html: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Summarizer<'a> {
    marker: &'a str,
}

impl Default for Summarizer<'static> {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
        }
    }
}

impl<'a> Summarizer<'a> {
    pub fn new(marker: &'a str) -> Self {
        Self { marker }
    }

    /// Summarize the root content of `dom` to at most `max` characters of
    /// serialized markup.
    pub fn summarize(&self, dom: &Dom, max: usize) -> Summary {
        let root = dom.root();
        let len = inner_len(dom, root);
        if len <= max {
            return Summary {
                html: inner_html(dom, root),
                truncated: false,
            };
        }

        let marker_len = escaped_len(self.marker);
        if max < marker_len {
            return Summary {
                html: self.clipped_marker(max),
                truncated: true,
            };
        }

        let budget = max - marker_len;
        let mut dom = dom.clone();
        let order = dom.descendants(root);

        // Whether some text before each node offers a word boundary.
        let mut space_before = Vec::with_capacity(order.len());
        let mut seen_space = false;
        for &id in &order {
            space_before.push(seen_space);
            if let Some(text) = dom.text_content(id) {
                seen_space |= text.contains(char::is_whitespace);
            }
        }

        // Set when the content removed so far began inside a word that
        // continues in the text before it.
        let mut mid_word = false;
        for (idx, &id) in order.iter().enumerate().rev() {
            let current = inner_len(&dom, root);
            if current <= budget && !mid_word {
                break;
            }
            let need = current.saturating_sub(budget);

            let Some(text) = dom.text_content(id).map(str::to_owned) else {
                if dom.element_name(id).is_some_and(is_void_element) {
                    mid_word = false;
                    if need > 0 {
                        dom.detach(id);
                    }
                } else if dom.children(id).next().is_none() {
                    dom.detach(id);
                }
                continue;
            };

            if escaped_len(&text) <= need {
                if !text.is_empty() {
                    mid_word = !text.starts_with(char::is_whitespace);
                }
                dom.detach(id);
                continue;
            }

            match word_safe_cut(&text, need, mid_word) {
                Some(head) if head.is_empty() => {
                    dom.detach(id);
                    mid_word = false;
                }
                Some(head) => {
                    dom.set_text(id, head.to_string());
                    mid_word = false;
                }
                None if space_before[idx] => {
                    dom.detach(id);
                    mid_word = true;
                }
                None => {
                    let cut = cut_index(&text, need);
                    dom.set_text(id, text[..cut].to_string());
                    mid_word = false;
                }
            }
        }

        trim_trailing_space(&mut dom);
        prune_empty_elements(&mut dom);
        dom.append_text(root, self.marker);
        let html = inner_html(&dom, root);
        debug!(from = len, to = html.chars().count(), max, "summarized content");
        Summary {
            html,
            truncated: true,
        }
    }

    fn clipped_marker(&self, max: usize) -> String {
        let mut width = 0;
        let clipped: String = self
            .marker
            .chars()
            .take_while(|&c| {
                width += escaped_char_len(c);
                width <= max
            })
            .collect();
        escape_text(&clipped)
    }
}

/// Byte index that drops at least `need` escaped characters from the end
/// of `text`.
fn cut_index(text: &str, need: usize) -> usize {
    let mut removed = 0;
    let mut cut = text.len();
    for (idx, c) in text.char_indices().rev() {
        if removed >= need {
            break;
        }
        removed += escaped_char_len(c);
        cut = idx;
    }
    cut
}

/// Drop at least `need` escaped characters from the end of `text` without
/// splitting a word.
///
/// `continues` tells whether the character after `text` (in content already
/// removed) belongs to the same word. The cut backs up to the nearest
/// whitespace at or before the computed index. Returns `None` when `text`
/// has no such whitespace.
fn word_safe_cut(text: &str, need: usize, continues: bool) -> Option<&str> {
    let cut = cut_index(text, need);
    let next_is_space = match text[cut..].chars().next() {
        Some(c) => c.is_whitespace(),
        None => !continues,
    };
    let head = if next_is_space || text[..cut].ends_with(char::is_whitespace) {
        &text[..cut]
    } else {
        &text[..text[..cut].rfind(char::is_whitespace)?]
    };
    Some(head.trim_end())
}

/// Trim whitespace off the end of the remaining text.
fn trim_trailing_space(dom: &mut Dom) {
    for id in dom.descendants(dom.root()).into_iter().rev() {
        if let Some(text) = dom.text_content(id) {
            let trimmed = text.trim_end();
            if !trimmed.is_empty() {
                let trimmed = trimmed.to_string();
                dom.set_text(id, trimmed);
                return;
            }
            dom.detach(id);
        } else if dom.element_name(id).is_some_and(is_void_element) {
            return;
        }
    }
}

/// Remove elements the cut left without content.
fn prune_empty_elements(dom: &mut Dom) {
    for id in dom.descendants(dom.root()).into_iter().rev() {
        if dom
            .element_name(id)
            .is_some_and(|name| !is_void_element(name))
            && dom.children(id).next().is_none()
        {
            dom.detach(id);
        }
    }
}
