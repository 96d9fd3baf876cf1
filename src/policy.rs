//! Tag and attribute whitelist.
//!
//! A [`Whitelist`] maps tag names to an [`AttrPolicy`]. Tags missing from the
//! table are unwrapped by the sanitizer; tags present keep only the
//! attributes their policy allows.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::dom::Attribute;

/// What a whitelisted tag may keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrPolicy {
    /// Keep the tag, drop every attribute.
    StripAll,
    /// Keep the tag and any attributes from the set.
    KeepAnyOf(BTreeSet<String>),
    /// Keep the tag only when every attribute in the set is present.
    /// Only those attributes survive.
    RequireAllOf(BTreeSet<String>),
}

impl AttrPolicy {
    pub fn keep_any_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AttrPolicy::KeepAnyOf(lowercase_set(names))
    }

    pub fn require_all_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AttrPolicy::RequireAllOf(lowercase_set(names))
    }

    /// The same policy with attribute names lowercased. Parsed markup always
    /// carries lowercase attribute names.
    fn normalized(self) -> Self {
        match self {
            AttrPolicy::StripAll => AttrPolicy::StripAll,
            AttrPolicy::KeepAnyOf(set) => AttrPolicy::keep_any_of(set),
            AttrPolicy::RequireAllOf(set) => AttrPolicy::require_all_of(set),
        }
    }

    /// Filter an element's attributes.
    ///
    /// Returns `None` when the element fails the policy and must be
    /// unwrapped.
    pub fn apply(&self, attrs: &[Attribute]) -> Option<Vec<Attribute>> {
        match self {
            AttrPolicy::StripAll => Some(Vec::new()),
            AttrPolicy::KeepAnyOf(allowed) => Some(
                attrs
                    .iter()
                    .filter(|a| allowed.contains(a.local_name()))
                    .cloned()
                    .collect(),
            ),
            AttrPolicy::RequireAllOf(required) => {
                let all_present = required
                    .iter()
                    .all(|name| attrs.iter().any(|a| a.local_name() == name));
                all_present.then(|| {
                    attrs
                        .iter()
                        .filter(|a| required.contains(a.local_name()))
                        .cloned()
                        .collect()
                })
            }
        }
    }

    /// Whether an attribute name can ever survive this policy.
    pub fn allows_attr(&self, name: &str) -> bool {
        match self {
            AttrPolicy::StripAll => false,
            AttrPolicy::KeepAnyOf(set) | AttrPolicy::RequireAllOf(set) => set.contains(name),
        }
    }
}

fn lowercase_set<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().to_ascii_lowercase())
        .collect()
}

/// Tag name → attribute policy. Tag and attribute names are stored
/// lowercase, however they were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<String, AttrPolicy>",
    into = "HashMap<String, AttrPolicy>"
)]
pub struct Whitelist {
    tags: HashMap<String, AttrPolicy>,
}

impl Whitelist {
    /// An empty whitelist: every tag is unwrapped.
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    /// The formatting and media tags Telegram's HTML mode understands.
    pub fn telegram() -> Self {
        let mut list = Self::empty()
            .with("a", AttrPolicy::keep_any_of(["href"]))
            .with("pre", AttrPolicy::keep_any_of(["language"]))
            .with("img", AttrPolicy::require_all_of(["src"]))
            .with("video", AttrPolicy::keep_any_of(["src"]))
            .with("source", AttrPolicy::require_all_of(["src"]));
        for tag in ["b", "strong", "i", "em", "code", "s", "strike", "del", "u"] {
            list.insert(tag, AttrPolicy::StripAll);
        }
        list
    }

    /// Builder-style insert.
    pub fn with(mut self, tag: &str, policy: AttrPolicy) -> Self {
        self.insert(tag, policy);
        self
    }

    pub fn insert(&mut self, tag: &str, policy: AttrPolicy) {
        self.tags.insert(tag.to_ascii_lowercase(), policy.normalized());
    }

    pub fn get(&self, tag: &str) -> Option<&AttrPolicy> {
        self.tags.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::telegram()
    }
}

impl From<HashMap<String, AttrPolicy>> for Whitelist {
    fn from(table: HashMap<String, AttrPolicy>) -> Self {
        let mut list = Self::empty();
        for (tag, policy) in table {
            list.insert(&tag, policy);
        }
        list
    }
}

impl From<Whitelist> for HashMap<String, AttrPolicy> {
    fn from(list: Whitelist) -> Self {
        list.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<Attribute> {
        pairs.iter().map(|(n, v)| Attribute::new(n, *v)).collect()
    }

    fn names(attrs: &[Attribute]) -> Vec<&str> {
        attrs.iter().map(Attribute::local_name).collect()
    }

    #[test]
    fn test_strip_all() {
        let kept = AttrPolicy::StripAll.apply(&attrs(&[("class", "x"), ("id", "y")]));
        assert_eq!(kept, Some(vec![]));
    }

    #[test]
    fn test_keep_any_of() {
        let policy = AttrPolicy::keep_any_of(["href"]);
        let kept = policy
            .apply(&attrs(&[("href", "https://x.test"), ("target", "_blank")]))
            .unwrap();
        assert_eq!(names(&kept), vec!["href"]);

        // Missing allowed attributes are fine.
        assert_eq!(policy.apply(&attrs(&[("target", "_blank")])), Some(vec![]));
    }

    #[test]
    fn test_require_all_of() {
        let policy = AttrPolicy::require_all_of(["src"]);
        let kept = policy
            .apply(&attrs(&[("src", "x.jpg"), ("alt", "x")]))
            .unwrap();
        assert_eq!(names(&kept), vec!["src"]);

        assert_eq!(policy.apply(&attrs(&[("alt", "x")])), None);
    }

    #[test]
    fn test_telegram_whitelist() {
        let list = Whitelist::telegram();
        assert!(list.contains("b"));
        assert!(list.contains("img"));
        assert!(!list.contains("p"));
        assert!(!list.contains("script"));
        assert!(list.get("a").unwrap().allows_attr("href"));
        assert!(!list.get("b").unwrap().allows_attr("class"));
    }

    #[test]
    fn test_insert_lowercases() {
        let list = Whitelist::empty()
            .with("B", AttrPolicy::StripAll)
            .with("A", AttrPolicy::keep_any_of(["HREF"]));
        assert!(list.contains("b"));
        assert_eq!(list.len(), 2);
        assert!(list.get("a").unwrap().allows_attr("href"));
    }

    #[test]
    fn test_table_keys_are_lowercased() {
        let mut table = HashMap::new();
        table.insert("IMG".to_string(), AttrPolicy::RequireAllOf(["SRC".to_string()].into()));
        let list = Whitelist::from(table);
        assert_eq!(list.get("img"), Some(&AttrPolicy::require_all_of(["src"])));
        assert!(!list.contains("IMG"));
    }
}
