//! Entry templates.
//!
//! A template is Tera markup expanded with the entry's fields before the
//! result goes through the pipeline. Available variables: `title`,
//! `content`, and, when the entry has them, `link`, `summary`, `author`,
//! `published`. Referencing a field the entry lacks is an error.

use tera::{Context, Tera};

use crate::entry::FeedEntry;
use crate::error::Result;

/// Expand `template` with `entry`'s fields.
///
/// Autoescaping is off: fields are markup and are sanitized afterwards.
pub fn expand(template: &str, entry: &FeedEntry) -> Result<String> {
    let mut context = Context::new();
    context.insert("title", &entry.title);
    context.insert("content", &*entry.body_markup());
    let optional = [
        ("link", &entry.link),
        ("summary", &entry.summary),
        ("author", &entry.author),
        ("published", &entry.published),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            context.insert(key, value);
        }
    }

    Ok(Tera::one_off(template, &context, false)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn entry() -> FeedEntry {
        FeedEntry::new("Release 1.0")
            .with_link("https://blog.test/1.0")
            .with_content("text/html", "<p>Notes & more</p>")
    }

    #[test]
    fn test_expands_fields() {
        let out = expand("<b>{{ title }}</b>\n{{ content }}\n{{ link }}", &entry()).unwrap();
        assert_eq!(out, "<b>Release 1.0</b>\n<p>Notes & more</p>\nhttps://blog.test/1.0");
    }

    #[test]
    fn test_missing_field_is_error() {
        let err = expand("{{ author }}", &entry()).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn test_optional_field_with_default() {
        let out = expand("by {{ author | default(value=\"anonymous\") }}", &entry()).unwrap();
        assert_eq!(out, "by anonymous");

        let signed = entry().with_author("Ada");
        let out = expand("by {{ author | default(value=\"anonymous\") }}", &signed).unwrap();
        assert_eq!(out, "by Ada");
    }

    #[test]
    fn test_syntax_error() {
        assert!(expand("{{ title ", &entry()).is_err());
    }
}
