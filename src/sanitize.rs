//! Whitelist sanitizer.
//!
//! Builds a fresh tree from a parsed one, bottom-up: each element's children
//! are sanitized first, then the element is either kept (with its attributes
//! filtered by its [`AttrPolicy`](crate::policy::AttrPolicy)) or unwrapped,
//! its sanitized children spliced into the parent in its place. Text passes
//! through; comments are dropped.

use tracing::{debug, trace};

use crate::dom::{Dom, NodeData, NodeId, parse_html};
use crate::policy::Whitelist;

/// Sanitizer bound to one whitelist.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'w> {
    whitelist: &'w Whitelist,
}

impl<'w> Sanitizer<'w> {
    pub fn new(whitelist: &'w Whitelist) -> Self {
        Self { whitelist }
    }

    /// Parse markup and sanitize it.
    pub fn sanitize_html(&self, html: &str) -> Dom {
        self.sanitize(&parse_html(html))
    }

    /// Sanitize the content of `src` into a new tree.
    ///
    /// The result's root children are the sanitized children of
    /// `src.content_root()`.
    pub fn sanitize(&self, src: &Dom) -> Dom {
        let mut out = Dom::new();
        let root = out.root();
        self.sanitize_children(src, src.content_root(), &mut out, root);
        out
    }

    fn sanitize_children(&self, src: &Dom, parent: NodeId, out: &mut Dom, out_parent: NodeId) {
        for child in src.children(parent) {
            let Some(node) = src.get(child) else {
                continue;
            };
            match &node.data {
                NodeData::Text(text) => out.append_text(out_parent, text),
                NodeData::Element { name, attrs } => {
                    let tag = name.local.as_ref();

                    // Children first, into a detached copy of this element.
                    let copy = out.create_element(name.clone(), Vec::new());
                    self.sanitize_children(src, child, out, copy);

                    match self.whitelist.get(tag).and_then(|p| p.apply(attrs)) {
                        Some(kept) => {
                            if kept.len() < attrs.len() {
                                trace!(tag, dropped = attrs.len() - kept.len(), "removed attributes");
                            }
                            if let Some(node) = out.get_mut(copy)
                                && let NodeData::Element { attrs, .. } = &mut node.data
                            {
                                *attrs = kept;
                            }
                            out.append(out_parent, copy);
                        }
                        None => {
                            debug!(tag, "unwrapping tag");
                            splice_children(out, copy, out_parent);
                        }
                    }
                }
                NodeData::Comment(_) | NodeData::Document => {}
            }
        }
    }
}

/// Move the children of a detached node to the end of `parent`, merging
/// adjacent text so the tree stays normalized.
fn splice_children(out: &mut Dom, node: NodeId, parent: NodeId) {
    let children: Vec<_> = out.children(node).collect();
    for child in children {
        out.detach(child);
        match out.text_content(child).map(str::to_owned) {
            Some(text) => out.append_text(parent, &text),
            None => out.append(parent, child),
        }
    }
}
