//! Media-aware splitting.
//!
//! A sanitized tree is walked in document order. Every `img` and `video`
//! marks a cut: the content before it becomes a [`TextSegment`] and the media
//! becomes a [`MediaReference`]. Media inside an anchor carries the nearest
//! anchor's `href` as its wrapping link.
//!
//! Inline elements open across a cut are closed in the segment before it and
//! reopened in the segment after it, so every segment is well-formed on its
//! own. Reopened elements only appear once content lands in them.

use html5ever::QualName;
use tracing::{debug, trace, warn};

use crate::dom::serialize::is_void_element;
use crate::dom::{Attribute, Dom, NodeData, NodeId, inner_html};
use crate::error::Diagnostic;

/// What kind of media a reference points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    /// Downloadability is decided when the video becomes a message unit.
    Video,
}

/// An extracted media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub kind: MediaKind,
    pub src: String,
    /// Target of the nearest anchor enclosing the media, if any.
    pub link: Option<String>,
}

/// Markup between two media boundaries.
#[derive(Debug, Clone)]
pub struct TextSegment {
    dom: Dom,
}

impl TextSegment {
    pub fn new(dom: Dom) -> Self {
        Self { dom }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn to_html(&self) -> String {
        inner_html(&self.dom, self.dom.root())
    }

    /// Plain text with markup stripped.
    pub fn text(&self) -> String {
        self.dom.text_of(self.dom.root())
    }

    /// True when the segment carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// One item of split output, in document order.
#[derive(Debug, Clone)]
pub enum Piece {
    Text(TextSegment),
    Media(MediaReference),
}

fn is_media_tag(tag: &str) -> bool {
    matches!(tag, "img" | "video")
}

/// Splits sanitized trees into text segments and media references.
#[derive(Debug, Clone, Copy, Default)]
pub struct Splitter;

impl Splitter {
    pub fn new() -> Self {
        Self
    }

    /// Split `dom` into text segments and media references.
    ///
    /// Media elements without a usable source are skipped and reported on
    /// `diagnostics`.
    pub fn split(&self, dom: &Dom, diagnostics: &mut Vec<Diagnostic>) -> Vec<Piece> {
        let mut writer = SegmentWriter::new();
        self.walk(dom, dom.root(), None, &mut writer, diagnostics);
        let pieces = writer.finish();
        debug!(pieces = pieces.len(), "split content");
        pieces
    }

    fn walk(
        &self,
        dom: &Dom,
        parent: NodeId,
        link: Option<&str>,
        writer: &mut SegmentWriter,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for child in dom.children(parent) {
            let Some(node) = dom.get(child) else {
                continue;
            };
            match &node.data {
                NodeData::Text(text) => writer.push_text(text),
                NodeData::Element { name, attrs } => match &*name.local {
                    tag if is_media_tag(tag) => {
                        if let Some(media) = reference(dom, child, link, diagnostics) {
                            writer.cut(media);
                        }
                    }
                    // Only meaningful inside a video, which is never descended.
                    "source" => trace!("dropping stray <source>"),
                    tag if is_void_element(tag) => writer.push_void(name.clone(), attrs.clone()),
                    tag => {
                        let link = match tag {
                            "a" => dom.get_attr(child, "href").or(link),
                            _ => link,
                        };
                        writer.open(name.clone(), attrs.clone());
                        self.walk(dom, child, link, writer, diagnostics);
                        writer.close();
                    }
                },
                NodeData::Comment(_) | NodeData::Document => {}
            }
        }
    }
}

fn reference(
    dom: &Dom,
    element: NodeId,
    link: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<MediaReference> {
    let tag = dom.element_name(element).unwrap_or_default();
    let Some(src) = media_source(dom, element) else {
        warn!(tag, "media element without source");
        diagnostics.push(Diagnostic::MissingMediaSource {
            tag: tag.to_string(),
        });
        return None;
    };

    let kind = match tag {
        "video" => MediaKind::Video,
        _ => MediaKind::Image,
    };
    Some(MediaReference {
        kind,
        src,
        link: link.map(str::to_owned),
    })
}

/// `src` of the element, or of a video's first `<source>` child.
fn media_source(dom: &Dom, element: NodeId) -> Option<String> {
    let own = dom.get_attr(element, "src");
    let nested = || {
        dom.children(element)
            .find(|&c| dom.element_name(c) == Some("source"))
            .and_then(|c| dom.get_attr(c, "src"))
    };
    own.or_else(nested)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// An inline element that is open at the current position.
struct OpenElement {
    name: QualName,
    attrs: Vec<Attribute>,
    /// The element's copy in the segment being built, once it has content.
    copy: Option<NodeId>,
}

/// Accumulates the segment being built and the stack of open inline
/// elements that must be reopened after each cut.
struct SegmentWriter {
    pieces: Vec<Piece>,
    current: Dom,
    open: Vec<OpenElement>,
}

impl SegmentWriter {
    fn new() -> Self {
        Self {
            pieces: Vec::new(),
            current: Dom::new(),
            open: Vec::new(),
        }
    }

    /// The innermost open element, materializing the open chain on demand.
    fn insertion_point(&mut self) -> NodeId {
        let mut parent = self.current.root();
        for element in &mut self.open {
            let copy = match element.copy {
                Some(copy) => copy,
                None => {
                    let copy = self
                        .current
                        .create_element(element.name.clone(), element.attrs.clone());
                    self.current.append(parent, copy);
                    element.copy = Some(copy);
                    copy
                }
            };
            parent = copy;
        }
        parent
    }

    fn open(&mut self, name: QualName, attrs: Vec<Attribute>) {
        self.open.push(OpenElement {
            name,
            attrs,
            copy: None,
        });
    }

    fn close(&mut self) {
        self.open.pop();
    }

    fn push_text(&mut self, text: &str) {
        let at = self.insertion_point();
        self.current.append_text(at, text);
    }

    fn push_void(&mut self, name: QualName, attrs: Vec<Attribute>) {
        let at = self.insertion_point();
        let element = self.current.create_element(name, attrs);
        self.current.append(at, element);
    }

    fn flush(&mut self) {
        let segment = TextSegment::new(std::mem::take(&mut self.current));
        if !segment.is_blank() {
            self.pieces.push(Piece::Text(segment));
        }
    }

    /// End the current segment, emit the media, and start a new segment
    /// under the same open elements.
    fn cut(&mut self, media: MediaReference) {
        self.flush();
        self.pieces.push(Piece::Media(media));
        for element in &mut self.open {
            element.copy = None;
        }
    }

    fn finish(mut self) -> Vec<Piece> {
        self.flush();
        self.pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AttrPolicy, Whitelist};
    use crate::sanitize::Sanitizer;

    fn split_with_diagnostics(html: &str) -> (Vec<Piece>, Vec<Diagnostic>) {
        let dom = Sanitizer::new(&Whitelist::telegram()).sanitize_html(html);
        let mut diagnostics = Vec::new();
        let pieces = Splitter::new().split(&dom, &mut diagnostics);
        (pieces, diagnostics)
    }

    fn split(html: &str) -> Vec<Piece> {
        split_with_diagnostics(html).0
    }

    fn text(piece: &Piece) -> String {
        match piece {
            Piece::Text(segment) => segment.to_html(),
            Piece::Media(m) => panic!("expected text, got media {}", m.src),
        }
    }

    fn media(piece: &Piece) -> &MediaReference {
        match piece {
            Piece::Media(m) => m,
            Piece::Text(t) => panic!("expected media, got text {}", t.to_html()),
        }
    }

    #[test]
    fn test_no_media_is_single_segment() {
        let pieces = split("<p>Hello <b>World</b></p>");
        assert_eq!(pieces.len(), 1);
        assert_eq!(text(&pieces[0]), "Hello <b>World</b>");
    }

    #[test]
    fn test_text_media_text() {
        let pieces = split(r#"<p>A</p><img src="x.jpg"><p>B</p>"#);
        assert_eq!(pieces.len(), 3);
        assert_eq!(text(&pieces[0]), "A");
        assert_eq!(
            media(&pieces[1]),
            &MediaReference {
                kind: MediaKind::Image,
                src: "x.jpg".into(),
                link: None,
            }
        );
        assert_eq!(text(&pieces[2]), "B");
    }

    #[test]
    fn test_anchor_wrapped_media_captures_link() {
        let pieces = split(r#"before <a href="https://full.test"><img src="thumb.jpg"></a> after"#);
        assert_eq!(pieces.len(), 3);
        assert_eq!(text(&pieces[0]), "before ");
        let m = media(&pieces[1]);
        assert_eq!(m.src, "thumb.jpg");
        assert_eq!(m.link.as_deref(), Some("https://full.test"));
        assert_eq!(text(&pieces[2]), " after");
    }

    #[test]
    fn test_media_nested_deep_in_anchor() {
        let (pieces, diagnostics) = split_with_diagnostics(
            r#"<a href="L"><img src="1.jpg"><b>caption <img src="2.jpg"></b></a>"#,
        );
        assert!(diagnostics.is_empty());
        assert_eq!(pieces.len(), 3);
        assert_eq!(media(&pieces[0]).src, "1.jpg");
        assert_eq!(text(&pieces[1]), r#"<a href="L"><b>caption </b></a>"#);
        assert_eq!(media(&pieces[2]).src, "2.jpg");
        assert_eq!(media(&pieces[2]).link.as_deref(), Some("L"));
    }

    #[test]
    fn test_open_elements_reopen_after_cut() {
        let pieces = split(r#"<b>bold <img src="x.jpg"> still bold</b>"#);
        assert_eq!(text(&pieces[0]), "<b>bold </b>");
        assert_eq!(media(&pieces[1]).src, "x.jpg");
        assert_eq!(text(&pieces[2]), "<b> still bold</b>");
    }

    #[test]
    fn test_reopened_elements_need_content() {
        let pieces = split(r#"<b>bold <img src="x.jpg"></b> plain"#);
        assert_eq!(text(&pieces[2]), " plain");
    }

    #[test]
    fn test_blank_segments_are_dropped() {
        let pieces = split("<img src=\"a.jpg\">\n  <img src=\"b.jpg\">");
        assert_eq!(pieces.len(), 2);
        assert_eq!(media(&pieces[0]).src, "a.jpg");
        assert_eq!(media(&pieces[1]).src, "b.jpg");
    }

    #[test]
    fn test_identical_media_keep_their_order() {
        let pieces = split(r#"one <img src="x.jpg"> two <img src="x.jpg"> three"#);
        let texts: Vec<_> = pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Text(t) => Some(t.text()),
                Piece::Media(_) => None,
            })
            .collect();
        assert_eq!(texts, vec!["one ", " two ", " three"]);
        assert_eq!(pieces.len(), 5);
    }

    #[test]
    fn test_several_media_in_one_anchor() {
        let pieces = split(
            r#"<a href="https://gallery.test"><img src="1.jpg"><img src="2.jpg"></a>"#,
        );
        assert_eq!(pieces.len(), 2);
        assert_eq!(media(&pieces[0]).src, "1.jpg");
        assert_eq!(media(&pieces[1]).src, "2.jpg");
        assert!(
            pieces
                .iter()
                .all(|p| media(p).link.as_deref() == Some("https://gallery.test"))
        );
    }

    #[test]
    fn test_video_source_child() {
        let pieces = split(
            r#"<video controls><source src="clip.mp4" type="video/mp4">fallback</video>"#,
        );
        assert_eq!(pieces.len(), 1);
        let m = media(&pieces[0]);
        assert_eq!(m.src, "clip.mp4");
        assert_eq!(m.kind, MediaKind::Video);
    }

    #[test]
    fn test_stray_source_is_dropped() {
        let pieces = split(r#"<audio><source src="a.mp3"></audio>text"#);
        assert_eq!(pieces.len(), 1);
        assert_eq!(text(&pieces[0]), "text");
    }

    #[test]
    fn test_line_breaks_survive() {
        let whitelist = Whitelist::telegram().with("br", AttrPolicy::StripAll);
        let dom = Sanitizer::new(&whitelist).sanitize_html("<b>one<br>two</b>");
        let pieces = Splitter::new().split(&dom, &mut Vec::new());
        assert_eq!(text(&pieces[0]), "<b>one<br>two</b>");
    }

    #[test]
    fn test_video_without_source_is_skipped() {
        let (pieces, diagnostics) = split_with_diagnostics("a<video>no source</video>b");
        assert_eq!(pieces.len(), 1);
        assert_eq!(text(&pieces[0]), "ab");
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MissingMediaSource {
                tag: "video".into()
            }]
        );
    }
}
