//! Destination document model.
//!
//! These types serialize to the JSON shape the content store expects for
//! `create` mutations: every object carries its `_type` tag, references use
//! `_ref`, and array members carry a `_key`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DocumentId
// ---------------------------------------------------------------------------

/// Identifier assigned by the content store to a created document or asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// URL slug: `{"_type": "slug", "current": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "_type", rename = "slug")]
pub struct Slug {
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }
}

/// Reference to another document or asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "_type", rename = "reference")]
pub struct Reference {
    /// Array key, present when the reference is an array member.
    #[serde(rename = "_key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "_ref")]
    pub target: DocumentId,
}

impl Reference {
    /// A bare reference (object field, not an array member).
    pub fn to(target: DocumentId) -> Self {
        Self { key: None, target }
    }

    /// A reference used as an array member.
    pub fn keyed(key: impl Into<String>, target: DocumentId) -> Self {
        Self {
            key: Some(key.into()),
            target,
        }
    }
}

/// Image field pointing at an uploaded asset, with alt-text annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "_type", rename = "image")]
pub struct ImageRef {
    pub asset: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImageRef {
    pub fn new(asset_id: DocumentId) -> Self {
        Self {
            asset: Reference::to(asset_id),
            alt: None,
        }
    }

    /// Attach alt text; empty strings are kept so the field is explicit.
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// An inline text run inside a [`Block`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "_type", rename = "span")]
pub struct Span {
    #[serde(rename = "_key")]
    pub key: String,
    pub text: String,
    pub marks: Vec<String>,
}

/// A rich-text block: one paragraph-level element made of text runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "_type", rename = "block")]
pub struct Block {
    #[serde(rename = "_key")]
    pub key: String,
    pub style: String,
    pub children: Vec<Span>,
    #[serde(rename = "markDefs")]
    pub mark_defs: Vec<serde_json::Value>,
}

/// SEO metadata object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub meta_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// `category` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDocument {
    pub title: String,
    pub slug: Slug,
}

/// `blogPost` document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostDocument {
    pub title: String,
    pub slug: Slug,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<ImageRef>,
    pub categories: Vec<Reference>,
    pub content: Vec<Block>,
    pub seo: Seo,
}

/// `page` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub title: String,
    pub slug: Slug,
    pub page_type: String,
    pub content: Vec<Block>,
    pub seo: Seo,
}

/// Any document the migration writes, tagged with its schema type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "_type")]
pub enum Document {
    #[serde(rename = "category")]
    Category(CategoryDocument),
    #[serde(rename = "blogPost")]
    BlogPost(BlogPostDocument),
    #[serde(rename = "page")]
    Page(PageDocument),
}

impl Document {
    /// Schema type name as written to `_type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Category(_) => "category",
            Self::BlogPost(_) => "blogPost",
            Self::Page(_) => "page",
        }
    }

    /// The document's slug value.
    pub fn slug(&self) -> &str {
        match self {
            Self::Category(c) => &c.slug.current,
            Self::BlogPost(p) => &p.slug.current,
            Self::Page(p) => &p.slug.current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_document_shape() {
        let doc = Document::Category(CategoryDocument {
            title: "Promotions".into(),
            slug: Slug::new("promotions"),
        });

        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(
            value,
            json!({
                "_type": "category",
                "title": "Promotions",
                "slug": { "_type": "slug", "current": "promotions" }
            })
        );
        assert_eq!(doc.type_name(), "category");
        assert_eq!(doc.slug(), "promotions");
    }

    #[test]
    fn image_ref_shape() {
        let image = ImageRef::new("image-abc-10x10-jpg".into()).with_alt("A cat");
        let value = serde_json::to_value(&image).expect("serialize");
        assert_eq!(
            value,
            json!({
                "_type": "image",
                "asset": { "_type": "reference", "_ref": "image-abc-10x10-jpg" },
                "alt": "A cat"
            })
        );
    }

    #[test]
    fn blog_post_omits_missing_image() {
        let doc = Document::BlogPost(BlogPostDocument {
            title: "Hello".into(),
            slug: Slug::new("hello"),
            author: "Jane".into(),
            published_at: "2024-01-15T10:30:00Z".parse().expect("timestamp"),
            excerpt: "Short".into(),
            featured_image: None,
            categories: vec![Reference::keyed("cat-7", "abc".into())],
            content: vec![],
            seo: Seo {
                meta_title: "Hello".into(),
                meta_description: Some("Short".into()),
            },
        });

        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(value["_type"], "blogPost");
        assert_eq!(value["publishedAt"], "2024-01-15T10:30:00Z");
        assert!(value.get("featuredImage").is_none());
        assert_eq!(value["categories"][0]["_key"], "cat-7");
        assert_eq!(value["categories"][0]["_ref"], "abc");
        assert_eq!(value["seo"]["metaDescription"], "Short");
    }

    #[test]
    fn page_seo_without_description() {
        let doc = Document::Page(PageDocument {
            title: "About".into(),
            slug: Slug::new("about"),
            page_type: "company".into(),
            content: vec![],
            seo: Seo {
                meta_title: "About".into(),
                meta_description: None,
            },
        });

        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(value["pageType"], "company");
        assert_eq!(value["seo"], json!({ "metaTitle": "About" }));
    }
}
