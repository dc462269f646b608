//! Source content API payloads (`/wp-json/wp/v2/posts`, `/wp-json/wp/v2/pages`).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A `{ "rendered": "..." }` markup field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// A post as returned with `_embed=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePost {
    pub id: u64,
    /// Publish time in the site's timezone.
    pub date: NaiveDateTime,
    /// Publish time in GMT, when the site exposes it.
    #[serde(default)]
    pub date_gmt: Option<NaiveDateTime>,
    pub slug: String,
    pub title: Rendered,
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub author: u64,
    #[serde(default)]
    pub featured_media: u64,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<Embedded>,
}

/// A page. Pages are fetched without embeds.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePage {
    pub id: u64,
    pub slug: String,
    pub title: Rendered,
    pub content: Rendered,
}

/// Related entities inlined by `_embed`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub author: Vec<EmbeddedAuthor>,
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<EmbeddedMedia>,
    /// Term groups, one per taxonomy; the first group holds categories.
    #[serde(rename = "wp:term", default, deserialize_with = "lenient_terms")]
    pub terms: Vec<Vec<EmbeddedTerm>>,
}

/// Term groups with unreadable entries dropped. Restricted taxonomies embed
/// error objects in place of terms; a group that is not an array is empty.
fn lenient_terms<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<EmbeddedTerm>>, D::Error>
where
    D: Deserializer<'de>,
{
    let groups = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(groups
        .into_iter()
        .map(|group| match group {
            serde_json::Value::Array(entries) => entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value(entry).ok())
                .collect(),
            _ => Vec::new(),
        })
        .collect())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddedAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

/// Embedded media. Restricted media embeds as an error object, which leaves
/// `source_url` empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddedMedia {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub alt_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbeddedTerm {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub taxonomy: Option<String>,
}

impl SourcePost {
    /// Display name of the embedded author, if any.
    pub fn author_name(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .author
            .first()?
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
    }

    /// Featured media with a usable URL, if any.
    pub fn featured_media(&self) -> Option<&EmbeddedMedia> {
        self.embedded
            .as_ref()?
            .featured_media
            .first()
            .filter(|m| m.source_url.as_deref().is_some_and(|u| !u.is_empty()))
    }

    /// Category terms from the first embedded term group.
    pub fn category_terms(&self) -> &[EmbeddedTerm] {
        self.embedded
            .as_ref()
            .and_then(|e| e.terms.first())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Publish timestamp, preferring the GMT value.
    pub fn published_at(&self) -> DateTime<Utc> {
        self.date_gmt.unwrap_or(self.date).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/wordpress")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    #[test]
    fn parses_embedded_post() {
        let posts: Vec<SourcePost> =
            serde_json::from_str(&fixture("posts-page-1.json")).expect("parse posts");
        assert_eq!(posts.len(), 2);

        let post = &posts[0];
        assert_eq!(post.id, 101);
        assert_eq!(post.slug, "spring-rewards-launch");
        assert_eq!(post.author_name(), Some("Jordan Lee"));
        assert_eq!(post.categories, vec![7]);
        assert_eq!(post.category_terms()[0].name, "Promotions");
        let media = post.featured_media().expect("media");
        assert_eq!(media.alt_text, "Spring catalog banner");
        assert_eq!(post.published_at().to_rfc3339(), "2024-01-15T15:30:00+00:00");
    }

    #[test]
    fn post_without_embeds() {
        let posts: Vec<SourcePost> =
            serde_json::from_str(&fixture("posts-page-1.json")).expect("parse posts");
        let post = &posts[1];
        assert_eq!(post.author_name(), None);
        assert!(post.featured_media().is_none());
        assert_eq!(post.published_at().to_rfc3339(), "2024-01-10T09:00:00+00:00");
    }

    #[test]
    fn restricted_media_is_not_usable() {
        let posts: Vec<SourcePost> =
            serde_json::from_str(&fixture("posts-page-2.json")).expect("parse posts");
        assert!(posts[0].featured_media().is_none());
        assert_eq!(posts[0].category_terms().len(), 2);
    }

    #[test]
    fn forbidden_term_entries_are_dropped() {
        let post: SourcePost = serde_json::from_value(serde_json::json!({
            "id": 9,
            "date": "2024-02-02T10:00:00",
            "slug": "mixed-terms",
            "title": { "rendered": "Mixed" },
            "content": { "rendered": "" },
            "_embedded": {
                "wp:term": [
                    [
                        { "code": "rest_forbidden", "message": "Sorry" },
                        { "id": 4, "name": "Updates", "slug": "updates" }
                    ],
                    { "code": "rest_forbidden" }
                ]
            }
        }))
        .expect("parse post");

        let terms = post.category_terms();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].id, 4);
    }

    #[test]
    fn parses_pages() {
        let pages: Vec<SourcePage> =
            serde_json::from_str(&fixture("pages.json")).expect("parse pages");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].slug, "about");
        assert!(pages[0].title.rendered.contains("<span>"));
    }
}
