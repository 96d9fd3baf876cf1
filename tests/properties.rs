//! Property tests for the rendering pipeline.

use proptest::prelude::*;

use feedpost::dom::{NodeData, to_html};
use feedpost::{
    LengthLimits, MessageUnit, NeverDownloadable, RenderConfig, Sanitizer, Whitelist, render,
};

fn tag() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "b", "i", "em", "strong", "a", "p", "div", "span", "code", "pre", "u", "s", "font",
        "table", "li", "h2",
    ])
}

fn attr() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(" href=\"https://x.test/?a=1&b=2\"".to_string()),
        Just(" class=\"c\"".to_string()),
        Just(" language=\"rust\"".to_string()),
        Just(" onclick=\"evil()\"".to_string()),
    ]
}

fn text() -> impl Strategy<Value = String> {
    "[a-z <>&\"]{0,12}"
}

/// Loosely nested markup, not always well-formed.
fn markup() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        text(),
        Just("<img src=\"p.jpg\">".to_string()),
        Just("<img>".to_string()),
        Just("<br>".to_string()),
        Just("<video src=\"v.mp4\"></video>".to_string()),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        (tag(), attr(), prop::collection::vec(inner, 0..4))
            .prop_map(|(t, a, kids)| format!("<{t}{a}>{}</{t}>", kids.concat()))
    })
}

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,15}", 1..900).prop_map(|w| w.join(" "))
}

/// Words whose tail sits in a `<b>`, as (markup, plain text).
fn split_words() -> impl Strategy<Value = (String, String)> {
    prop::collection::vec(("[a-z]{1,8}", "[a-z]{0,8}"), 1..40).prop_map(|pairs| {
        let markup: Vec<_> = pairs.iter().map(|(h, t)| format!("{h}<b>{t}</b>")).collect();
        let plain: Vec<_> = pairs.iter().map(|(h, t)| format!("{h}{t}")).collect();
        (markup.join(" "), plain.join(" "))
    })
}

proptest! {
    #[test]
    fn prop_sanitized_tags_are_whitelisted(html in markup()) {
        let whitelist = Whitelist::telegram();
        let dom = Sanitizer::new(&whitelist).sanitize_html(&html);
        let root = dom.root();
        for id in dom.descendants(root) {
            if let Some(NodeData::Element { name, attrs }) = dom.get(id).map(|n| &n.data) {
                let policy = whitelist.get(name.local.as_ref());
                prop_assert!(policy.is_some(), "tag {} survived", name.local);
                let policy = policy.unwrap();
                for attr in attrs {
                    prop_assert!(policy.allows_attr(attr.local_name()));
                }
            }
        }
    }

    #[test]
    fn prop_sanitize_is_idempotent(html in markup()) {
        let whitelist = Whitelist::telegram();
        let sanitizer = Sanitizer::new(&whitelist);
        let once = to_html(&sanitizer.sanitize_html(&html));
        let twice = to_html(&sanitizer.sanitize_html(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_units_fit_their_ceilings(html in markup(), tail in words()) {
        let config = RenderConfig::default();
        let out = render(&format!("{html}{tail}"), None, &config, &NeverDownloadable);
        for unit in &out.units {
            let (len, max) = match unit {
                MessageUnit::Text(t) => (t.text.chars().count(), 4096),
                MessageUnit::Photo(m) | MessageUnit::Video(m) => {
                    (m.caption.as_deref().unwrap_or("").chars().count(), 200)
                }
            };
            prop_assert!(len <= max, "{len} > {max}");
        }
    }

    #[test]
    fn prop_truncation_keeps_words_whole(text in words()) {
        let config = RenderConfig::default();
        let out = render(&text, None, &config, &NeverDownloadable);
        prop_assert_eq!(out.units.len(), 1);
        let body = out.units[0].body().unwrap_or("");
        if out.truncated {
            let kept = body.strip_suffix("...");
            prop_assert!(kept.is_some());
            let kept = kept.unwrap();
            prop_assert!(text.starts_with(kept));
            let next = text[kept.len()..].chars().next();
            prop_assert!(next.is_none_or(char::is_whitespace));
        } else {
            prop_assert_eq!(body, text.as_str());
        }
    }

    #[test]
    fn prop_words_spread_over_elements_stay_whole((html, plain) in split_words()) {
        let config = RenderConfig {
            limits: LengthLimits { text: 120, ..Default::default() },
            ..Default::default()
        };
        let out = render(&html, None, &config, &NeverDownloadable);
        let body = out.units[0].body().unwrap_or("");
        prop_assert!(body.chars().count() <= 120);

        let text = body.replace("<b>", "").replace("</b>", "");
        let kept = if out.truncated {
            let kept = text.strip_suffix("...");
            prop_assert!(kept.is_some());
            kept.unwrap()
        } else {
            text.as_str()
        };
        prop_assert!(plain.starts_with(kept), "{kept:?} is not a prefix of {plain:?}");
        let next = plain[kept.len()..].chars().next();
        prop_assert!(next.is_none_or(char::is_whitespace), "{kept:?} splits a word");
    }

    #[test]
    fn prop_read_more_only_on_last(html in markup()) {
        let config = RenderConfig::default();
        let out = render(&html, Some("https://post.test"), &config, &NeverDownloadable);
        if let Some((last, rest)) = out.units.split_last() {
            let rows = last.keyboard().unwrap_or(&[]);
            let read_more = rows.iter().flatten().filter(|b| b.text == "Read more").count();
            prop_assert_eq!(read_more, 1);
            for unit in rest {
                let count = unit
                    .keyboard()
                    .unwrap_or(&[])
                    .iter()
                    .flatten()
                    .filter(|b| b.text == "Read more")
                    .count();
                prop_assert_eq!(count, 0);
            }
        }
    }
}
