//! Link-preview metadata: platform-clipped preview copy, Open Graph and
//! Twitter Card meta tags, and a JSON-LD `Person` record.
//!
//! Everything here is a pure function of a [`PreviewProfile`], which the
//! server builds once from configuration and hands to handlers.

pub mod html;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use html::render_html;

const ELLIPSIS: &str = "...";

// ─── Platforms ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Twitter,
    Linkedin,
    Whatsapp,
}

/// Character budgets for one platform's preview card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub title: usize,
    pub description: usize,
}

/// Budget applied when no platform is requested.
pub const DEFAULT_BUDGET: Budget = Budget {
    title: 60,
    description: 160,
};

impl Platform {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "facebook" => Some(Self::Facebook),
            "twitter" => Some(Self::Twitter),
            "linkedin" => Some(Self::Linkedin),
            "whatsapp" => Some(Self::Whatsapp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Whatsapp => "whatsapp",
        }
    }

    pub fn budget(self) -> Budget {
        let (title, description) = match self {
            Self::Facebook => (88, 200),
            Self::Twitter => (70, 200),
            Self::Linkedin => (150, 300),
            Self::Whatsapp => (65, 160),
        };
        Budget { title, description }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn budget_for(platform: Option<Platform>) -> Budget {
    platform.map(Platform::budget).unwrap_or(DEFAULT_BUDGET)
}

/// Clips `text` to `budget` characters, ending in `...` when clipped.
pub fn truncate(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_owned();
    }
    let keep = budget.saturating_sub(ELLIPSIS.len());
    let clipped: String = text.chars().take(keep).collect();
    format!("{}{ELLIPSIS}", clipped.trim_end())
}

/// Representation a bundle is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewFormat {
    #[default]
    Json,
    Html,
    StructuredData,
}

impl PreviewFormat {
    /// Unknown values fall back to JSON.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "html" => Self::Html,
            "structured-data" | "structured" => Self::StructuredData,
            _ => Self::Json,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::StructuredData => "structured-data",
        }
    }
}

// ─── Records ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewData {
    pub title: String,
    pub description: String,
    pub image: String,
    pub url: String,
    pub site_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Per-platform replacement copy, applied before clipping.
#[derive(Debug, Clone, Default)]
pub struct PreviewOverride {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredAuthor {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    pub url: String,
}

/// JSON-LD description of the site owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredData {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub image: String,
    pub author: StructuredAuthor,
    #[serde(rename = "sameAs")]
    pub same_as: Vec<String>,
}

/// Dimensions reported for the preview image. The server cannot fetch and
/// decode it, so it reports the recommended card size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageValidation {
    pub width: u32,
    pub height: u32,
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleMeta {
    pub generated_at: String,
    pub platform: String,
    pub format: String,
}

/// Everything a caller needs to render or inspect a preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBundle {
    pub preview: PreviewData,
    pub structured_data: StructuredData,
    pub meta_tags: BTreeMap<String, String>,
    pub image_validation: ImageValidation,
    pub meta: BundleMeta,
}

impl PreviewBundle {
    /// Records the representation the bundle is served as.
    pub fn rendered_as(mut self, format: PreviewFormat) -> Self {
        self.meta.format = format.as_str().to_owned();
        self
    }
}

// ─── Profile ─────────────────────────────────────────────────────

/// Site owner and default copy the previews are generated from.
#[derive(Debug, Clone)]
pub struct PreviewProfile {
    pub base_url: String,
    pub owner_name: String,
    pub job_title: String,
    pub site_name: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub twitter_handle: String,
    pub linkedin_owner: String,
    pub same_as: Vec<String>,
    pub overrides: HashMap<Platform, PreviewOverride>,
}

impl PreviewProfile {
    /// Default portfolio copy rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();

        let mut overrides = HashMap::new();
        overrides.insert(
            Platform::Twitter,
            PreviewOverride {
                title: Some("Full Stack Developer Portfolio".into()),
                description: Some(
                    "Laravel • React • Symfony • SaaS. Building scalable web applications and optimizing databases."
                        .into(),
                ),
            },
        );
        overrides.insert(
            Platform::Linkedin,
            PreviewOverride {
                title: Some("Full Stack Developer | Laravel & React Specialist".into()),
                description: Some(
                    "Experienced Full Stack Developer with expertise in Laravel, React and Symfony. Specialized in building enterprise-level SaaS platforms, optimizing database performance and creating scalable web applications. Open to new opportunities and collaborations."
                        .into(),
                ),
            },
        );
        overrides.insert(
            Platform::Facebook,
            PreviewOverride {
                title: None,
                description: Some(
                    "Check out my professional portfolio showcasing Laravel, React, Symfony and modern web development. Real-world projects, certifications and full-stack technical skills."
                        .into(),
                ),
            },
        );
        overrides.insert(
            Platform::Whatsapp,
            PreviewOverride {
                title: Some("Developer Portfolio".into()),
                description: Some(
                    "Full Stack Developer | Laravel, React, Symfony. View my projects and get in touch!".into(),
                ),
            },
        );

        Self {
            base_url,
            owner_name: "Portfolio Owner".into(),
            job_title: "Full Stack Developer".into(),
            site_name: "Developer Portfolio".into(),
            title: "Full Stack Developer | Laravel, React, Symfony".into(),
            description: "Professional Full Stack Developer specializing in Laravel, React, Symfony and modern web technologies. Experienced with SaaS platforms, database optimization and scalable web applications."
                .into(),
            keywords: "Full Stack Developer, Laravel, React, Symfony, Web Development, SaaS, Database Optimization, PHP, JavaScript, TypeScript"
                .into(),
            twitter_handle: "@portfolio".into(),
            linkedin_owner: "portfolio".into(),
            same_as: vec![
                "https://github.com/portfolio".into(),
                "https://linkedin.com/in/portfolio".into(),
                "https://twitter.com/portfolio".into(),
            ],
            overrides,
        }
    }

    /// Same profile rooted at a different base URL.
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            ..self.clone()
        }
    }

    pub fn default_image(&self) -> String {
        format!("{}/images/og-image.jpg", self.base_url)
    }

    /// Unclipped preview record built from the profile defaults.
    pub fn base_record(&self) -> PreviewData {
        PreviewData {
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.default_image(),
            url: self.base_url.clone(),
            site_name: self.site_name.clone(),
            kind: "website".into(),
        }
    }

    /// Profile preview with the platform's copy overrides and budget applied.
    pub fn preview(&self, platform: Option<Platform>) -> PreviewData {
        let mut record = self.base_record();
        if let Some(o) = platform.and_then(|p| self.overrides.get(&p)) {
            if let Some(title) = &o.title {
                record.title = title.clone();
            }
            if let Some(description) = &o.description {
                record.description = description.clone();
            }
        }
        clip(record, platform)
    }

    /// Caller-supplied record clipped to the platform budget.
    pub fn preview_from(&self, record: PreviewData, platform: Option<Platform>) -> PreviewData {
        clip(record, platform)
    }

    pub fn meta_tags(&self, platform: Option<Platform>) -> BTreeMap<String, String> {
        self.meta_tags_for(&self.preview(platform))
    }

    /// Flat Open Graph / Twitter Card tag map for a preview record.
    pub fn meta_tags_for(&self, preview: &PreviewData) -> BTreeMap<String, String> {
        let pairs = [
            ("title", preview.title.as_str()),
            ("description", preview.description.as_str()),
            ("keywords", self.keywords.as_str()),
            ("og:title", preview.title.as_str()),
            ("og:description", preview.description.as_str()),
            ("og:image", preview.image.as_str()),
            ("og:url", preview.url.as_str()),
            ("og:type", preview.kind.as_str()),
            ("og:site_name", preview.site_name.as_str()),
            ("twitter:card", "summary_large_image"),
            ("twitter:title", preview.title.as_str()),
            ("twitter:description", preview.description.as_str()),
            ("twitter:image", preview.image.as_str()),
            ("twitter:creator", self.twitter_handle.as_str()),
            ("linkedin:owner", self.linkedin_owner.as_str()),
        ];
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    pub fn structured_data(&self) -> StructuredData {
        StructuredData {
            context: "https://schema.org".into(),
            kind: "Person".into(),
            name: self.owner_name.clone(),
            description: format!(
                "{} specializing in Laravel, React, Symfony and modern web technologies",
                self.job_title
            ),
            url: self.base_url.clone(),
            image: self.default_image(),
            author: StructuredAuthor {
                kind: "Person".into(),
                name: self.owner_name.clone(),
                job_title: self.job_title.clone(),
                url: self.base_url.clone(),
            },
            same_as: self.same_as.clone(),
        }
    }

    /// Full bundle for the profile's own copy.
    pub fn complete(&self, platform: Option<Platform>) -> PreviewBundle {
        let preview = self.preview(platform);
        let label = platform.map(|p| p.as_str()).unwrap_or("default");
        self.bundle(preview, label)
    }

    /// Full bundle for caller-supplied copy; missing image and URL fall back
    /// to the profile's.
    pub fn complete_from(&self, custom: CustomPreview, platform: Option<Platform>) -> PreviewBundle {
        let record = PreviewData {
            title: custom.title,
            description: custom.description,
            image: custom.image.unwrap_or_else(|| self.default_image()),
            url: custom.url.unwrap_or_else(|| self.base_url.clone()),
            site_name: self.site_name.clone(),
            kind: "website".into(),
        };
        let label = platform.map(|p| p.as_str()).unwrap_or("custom");
        self.bundle(self.preview_from(record, platform), label)
    }

    fn bundle(&self, preview: PreviewData, platform_label: &str) -> PreviewBundle {
        PreviewBundle {
            meta_tags: self.meta_tags_for(&preview),
            structured_data: self.structured_data(),
            image_validation: ImageValidation {
                width: 1200,
                height: 630,
                is_valid: true,
            },
            meta: BundleMeta {
                generated_at: chrono::Utc::now().to_rfc3339(),
                platform: platform_label.to_owned(),
                format: PreviewFormat::default().as_str().to_owned(),
            },
            preview,
        }
    }
}

/// Caller-supplied preview copy.
#[derive(Debug, Clone, Default)]
pub struct CustomPreview {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub url: Option<String>,
}

fn clip(mut record: PreviewData, platform: Option<Platform>) -> PreviewData {
    let budget = budget_for(platform);
    record.title = truncate(&record.title, budget.title);
    record.description = truncate(&record.description, budget.description);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> PreviewProfile {
        PreviewProfile::new("https://me.dev/")
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("", 10), "");
    }

    #[test]
    fn truncate_clips_to_budget_with_ellipsis() {
        let out = truncate("abcdefghij", 8);
        assert_eq!(out, "abcde...");
        assert_eq!(out.chars().count(), 8);
    }

    #[test]
    fn truncate_is_char_boundary_safe() {
        let out = truncate("ééééééééé", 6);
        assert_eq!(out, "ééé...");
    }

    #[test]
    fn truncate_trims_dangling_space() {
        assert_eq!(truncate("abc defgh", 7), "abc...");
    }

    #[test]
    fn platform_parse() {
        assert_eq!(Platform::parse("LinkedIn"), Some(Platform::Linkedin));
        assert_eq!(Platform::parse("myspace"), None);
    }

    #[test]
    fn default_preview_respects_default_budget() {
        let p = profile().preview(None);
        assert!(p.title.chars().count() <= DEFAULT_BUDGET.title);
        assert!(p.description.chars().count() <= DEFAULT_BUDGET.description);
        assert!(p.description.ends_with("..."));
        assert_eq!(p.url, "https://me.dev");
        assert_eq!(p.image, "https://me.dev/images/og-image.jpg");
    }

    #[test]
    fn platform_override_is_applied() {
        let p = profile().preview(Some(Platform::Whatsapp));
        assert_eq!(p.title, "Developer Portfolio");
        let p = profile().preview(Some(Platform::Linkedin));
        assert_eq!(p.title, "Full Stack Developer | Laravel & React Specialist");
        // 300-char budget leaves the long LinkedIn copy unclipped
        assert!(p.description.starts_with("Experienced Full Stack Developer"));
        assert!(p.description.ends_with("collaborations."));
    }

    #[test]
    fn facebook_swaps_description_only() {
        let p = profile().preview(Some(Platform::Facebook));
        assert_eq!(p.title, profile().title);
        assert!(p.description.starts_with("Check out my professional portfolio"));
        assert!(p.description.chars().count() <= Platform::Facebook.budget().description);
    }

    #[test]
    fn meta_tags_mirror_preview() {
        let tags = profile().meta_tags(Some(Platform::Twitter));
        assert_eq!(tags["og:title"], tags["twitter:title"]);
        assert_eq!(tags["twitter:card"], "summary_large_image");
        assert_eq!(tags["og:type"], "website");
        assert_eq!(tags.len(), 15);
    }

    #[test]
    fn structured_data_is_json_ld_person() {
        let json = serde_json::to_value(profile().structured_data()).unwrap();
        assert_eq!(json["@context"], "https://schema.org");
        assert_eq!(json["@type"], "Person");
        assert_eq!(json["author"]["jobTitle"], "Full Stack Developer");
        assert_eq!(json["sameAs"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["sameAs"][0], "https://github.com/portfolio");
    }

    #[test]
    fn bundle_records_rendered_format() {
        assert_eq!(profile().complete(None).meta.format, "json");
        let bundle = profile()
            .complete(None)
            .rendered_as(PreviewFormat::parse("html"));
        assert_eq!(bundle.meta.format, "html");
        assert_eq!(PreviewFormat::parse("structured"), PreviewFormat::StructuredData);
        assert_eq!(PreviewFormat::parse("xml"), PreviewFormat::Json);
    }

    #[test]
    fn custom_bundle_falls_back_to_profile_image() {
        let bundle = profile().complete_from(
            CustomPreview {
                title: "Hi".into(),
                description: "There".into(),
                ..Default::default()
            },
            None,
        );
        assert_eq!(bundle.preview.image, "https://me.dev/images/og-image.jpg");
        assert_eq!(bundle.meta.platform, "custom");
        assert_eq!(bundle.meta_tags["og:title"], "Hi");
    }

    #[test]
    fn bundle_serializes_camel_case() {
        let json = serde_json::to_value(profile().complete(Some(Platform::Facebook))).unwrap();
        assert!(json.get("structuredData").is_some());
        assert!(json.get("metaTags").is_some());
        assert_eq!(json["imageValidation"]["isValid"], true);
        assert_eq!(json["preview"]["siteName"], "Developer Portfolio");
        assert_eq!(json["meta"]["platform"], "facebook");
    }
}
