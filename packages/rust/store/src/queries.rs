//! Read-side GROQ queries with typed projections.
//!
//! These are the reads the site's presentation layer performs against the
//! migrated content. Fields the store returns as `null` deserialize to
//! `None` or to an empty collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use wpmigrate_shared::Result;

use crate::SanityClient;

/// All blog posts, newest first.
pub const ALL_BLOG_POSTS: &str = r#"*[_type == "blogPost"] | order(publishedAt desc) {
  _id,
  title,
  slug,
  author,
  publishedAt,
  excerpt,
  featuredImage,
  categories[]-> {
    title,
    slug
  }
}"#;

/// One blog post by slug, with body and SEO fields.
pub const BLOG_POST_BY_SLUG: &str = r#"*[_type == "blogPost" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  author,
  publishedAt,
  excerpt,
  featuredImage,
  content,
  categories[]-> {
    title,
    slug
  },
  seo
}"#;

/// All pages.
pub const ALL_PAGES: &str = r#"*[_type == "page"] {
  _id,
  title,
  slug,
  pageType
}"#;

/// One page by slug.
pub const PAGE_BY_SLUG: &str = r#"*[_type == "page" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  pageType,
  hero,
  content,
  features,
  seo
}"#;

/// A navigation menu by its `menuId`.
pub const NAVIGATION_BY_MENU_ID: &str = r#"*[_type == "navigation" && menuId == $menuId][0] {
  title,
  menuId,
  items[] {
    label,
    url,
    page-> {
      slug
    },
    color,
    submenu[] {
      label,
      url,
      page-> {
        slug
      },
      description
    }
  }
}"#;

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugValue {
    pub current: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageValue {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<SlugValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoValue {
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanValue {
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

/// A rich-text block as returned by the store. Non-text members keep their
/// `_type` and have no children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockValue {
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<SpanValue>,
}

impl BlockValue {
    /// Concatenated text of all children.
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Listing projection of a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<SlugValue>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<ImageValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<CategorySummary>,
}

/// Full projection of a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(flatten)]
    pub summary: BlogPostSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<BlockValue>,
    #[serde(default)]
    pub seo: Option<SeoValue>,
}

/// Listing projection of a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<SlugValue>,
    #[serde(default)]
    pub page_type: Option<String>,
}

/// Full projection of a page. Hero and feature sections are schema-specific
/// and kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(flatten)]
    pub summary: PageSummary,
    #[serde(default)]
    pub hero: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<BlockValue>,
    #[serde(default)]
    pub features: Option<serde_json::Value>,
    #[serde(default)]
    pub seo: Option<SeoValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLink {
    #[serde(default)]
    pub slug: Option<SlugValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmenuItem {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub page: Option<PageLink>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub page: Option<PageLink>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub submenu: Vec<SubmenuItem>,
}

impl MenuItem {
    /// Link target: the explicit URL, else `/<page slug>`.
    pub fn href(&self) -> Option<String> {
        link_target(self.url.as_deref(), self.page.as_ref())
    }
}

impl SubmenuItem {
    /// Link target: the explicit URL, else `/<page slug>`.
    pub fn href(&self) -> Option<String> {
        link_target(self.url.as_deref(), self.page.as_ref())
    }
}

fn link_target(url: Option<&str>, page: Option<&PageLink>) -> Option<String> {
    url.filter(|u| !u.is_empty()).map(String::from).or_else(|| {
        page.and_then(|p| p.slug.as_ref())
            .map(|s| format!("/{}", s.current))
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub title: String,
    pub menu_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<MenuItem>,
}

// ---------------------------------------------------------------------------
// Query functions
// ---------------------------------------------------------------------------

pub async fn all_blog_posts(client: &SanityClient) -> Result<Vec<BlogPostSummary>> {
    client.query(ALL_BLOG_POSTS, &[]).await
}

pub async fn blog_post_by_slug(client: &SanityClient, slug: &str) -> Result<Option<BlogPost>> {
    client.query(BLOG_POST_BY_SLUG, &[("slug", slug)]).await
}

pub async fn all_pages(client: &SanityClient) -> Result<Vec<PageSummary>> {
    client.query(ALL_PAGES, &[]).await
}

pub async fn page_by_slug(client: &SanityClient, slug: &str) -> Result<Option<Page>> {
    client.query(PAGE_BY_SLUG, &[("slug", slug)]).await
}

pub async fn navigation_by_menu_id(
    client: &SanityClient,
    menu_id: &str,
) -> Result<Option<Navigation>> {
    client
        .query(NAVIGATION_BY_MENU_ID, &[("menuId", menu_id)])
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wpmigrate_shared::DestinationSettings;

    fn client_for(server: &MockServer) -> SanityClient {
        SanityClient::new(&DestinationSettings {
            project_id: "proj1".into(),
            dataset: "production".into(),
            api_version: "2024-01-01".into(),
            api_host: Some(server.uri()),
            use_cdn: false,
            token: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    async fn respond(server: &MockServer, query: &str, result: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/v2024-01-01/data/query/production"))
            .and(query_param("query", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn lists_blog_posts_with_null_categories() {
        let server = MockServer::start().await;
        respond(
            &server,
            ALL_BLOG_POSTS,
            json!([
                {
                    "_id": "p1",
                    "title": "Spring Rewards Launch",
                    "slug": { "_type": "slug", "current": "spring-rewards-launch" },
                    "author": "Jordan Lee",
                    "publishedAt": "2024-01-15T15:30:00Z",
                    "excerpt": "Our spring catalog is live.",
                    "featuredImage": {
                        "_type": "image",
                        "asset": { "_type": "reference", "_ref": "image-abc-640x480-jpg" },
                        "alt": "Banner"
                    },
                    "categories": [{ "title": "Promotions", "slug": { "current": "promotions" } }]
                },
                {
                    "_id": "p2",
                    "title": "Draft",
                    "slug": null,
                    "author": null,
                    "publishedAt": null,
                    "excerpt": null,
                    "featuredImage": null,
                    "categories": null
                }
            ]),
        )
        .await;

        let posts = all_blog_posts(&client_for(&server)).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].categories[0].title.as_deref(), Some("Promotions"));
        assert_eq!(
            posts[0].featured_image.as_ref().unwrap().asset.as_ref().unwrap().target,
            "image-abc-640x480-jpg"
        );
        assert!(posts[1].categories.is_empty());
        assert!(posts[1].slug.is_none());
    }

    #[tokio::test]
    async fn post_by_slug_includes_content() {
        let server = MockServer::start().await;
        respond(
            &server,
            BLOG_POST_BY_SLUG,
            json!({
                "_id": "p1",
                "title": "Hello",
                "slug": { "current": "hello" },
                "content": [{
                    "_type": "block",
                    "style": "normal",
                    "children": [{ "_type": "span", "text": "Hello ", "marks": [] }, { "_type": "span", "text": "World" }]
                }],
                "categories": [],
                "seo": { "metaTitle": "Hello", "metaDescription": null }
            }),
        )
        .await;

        let post = blog_post_by_slug(&client_for(&server), "hello")
            .await
            .unwrap()
            .expect("post");
        assert_eq!(post.summary.id, "p1");
        assert_eq!(post.content[0].plain_text(), "Hello World");
        assert_eq!(post.seo.unwrap().meta_title.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn missing_page_is_none() {
        let server = MockServer::start().await;
        respond(&server, PAGE_BY_SLUG, serde_json::Value::Null).await;

        let page = page_by_slug(&client_for(&server), "nope").await.unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn lists_pages() {
        let server = MockServer::start().await;
        respond(
            &server,
            ALL_PAGES,
            json!([{ "_id": "pg1", "title": "About", "slug": { "current": "about" }, "pageType": "company" }]),
        )
        .await;

        let pages = all_pages(&client_for(&server)).await.unwrap();
        assert_eq!(pages[0].page_type.as_deref(), Some("company"));
    }

    #[tokio::test]
    async fn navigation_resolves_links() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2024-01-01/data/query/production"))
            .and(query_param("$menuId", "\"main\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "title": "Main Menu",
                    "menuId": "main",
                    "items": [
                        {
                            "label": "Company",
                            "url": null,
                            "page": { "slug": { "current": "about" } },
                            "color": "blue",
                            "submenu": [
                                { "label": "Careers", "url": "https://jobs.example.com", "page": null, "description": "Join us" }
                            ]
                        },
                        { "label": "Blog", "url": "/blog", "page": null, "color": null, "submenu": null }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let nav = navigation_by_menu_id(&client_for(&server), "main")
            .await
            .unwrap()
            .expect("navigation");

        assert_eq!(nav.menu_id, "main");
        assert_eq!(nav.items[0].href().as_deref(), Some("/about"));
        assert_eq!(
            nav.items[0].submenu[0].href().as_deref(),
            Some("https://jobs.example.com")
        );
        assert_eq!(nav.items[1].href().as_deref(), Some("/blog"));
        assert!(nav.items[1].submenu.is_empty());
    }
}
