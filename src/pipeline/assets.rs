//! Asset resolution: profile picture, inline icons and stylesheet text.
//!
//! The picture is resolved by walking an ordered list of [`PictureSource`]s;
//! the first one that produces a usable reference wins. The default chain is:
//!
//! 1. [`ExplicitPhoto`]: the caller's `--profile-photo`
//! 2. [`ConventionalPhoto`]: `public/profile.jpg` under the working directory
//! 3. [`DocumentPicture`]: `basics.picture` from the resume itself
//!
//! and the built-in placeholder avatar terminates the chain, so resolution
//! never fails. Readable images are embedded as base64 data URIs to keep the
//! output self-contained.
//!
//! A `basics.picture` that is itself a URI (`https://…`, `data:…`) is passed
//! through verbatim when it cannot be read as a local file. A plain path that
//! cannot be read is skipped, falling through to the placeholder.

use crate::config::RenderConfig;
use crate::model::ResumeDocument;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PAPER_CSS: &str = include_str!("../../static/paper.css");
const STYLES_CSS: &str = include_str!("../../static/styles.css");
const PLACEHOLDER_AVATAR_SVG: &str = include_str!("../../static/placeholder-avatar.svg");

static ICONS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("calendar", include_str!("../../static/icons/calendar.svg").trim_end()),
        ("email", include_str!("../../static/icons/email.svg").trim_end()),
        ("github", include_str!("../../static/icons/github.svg").trim_end()),
        ("linkedin", include_str!("../../static/icons/linkedin.svg").trim_end()),
        ("location", include_str!("../../static/icons/location.svg").trim_end()),
        ("phone", include_str!("../../static/icons/phone.svg").trim_end()),
        ("twitter", include_str!("../../static/icons/twitter.svg").trim_end()),
        ("website", include_str!("../../static/icons/website.svg").trim_end()),
    ])
});

/// Scheme prefix of a URI. Two or more characters so `C:\…` stays a path.
static RE_URI_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").unwrap());

/// Built-in icons keyed by logical name ("email", "phone", "location", …).
pub fn svg_icons() -> &'static BTreeMap<&'static str, &'static str> {
    &ICONS
}

/// The print sheet followed by the theme, separated by a blank line.
pub fn stylesheet() -> String {
    format!("{PAPER_CSS}\n\n{STYLES_CSS}")
}

/// The placeholder avatar as a data URI.
pub fn placeholder_avatar_data_uri() -> String {
    data_uri("image/svg+xml", PLACEHOLDER_AVATAR_SVG.as_bytes())
}

/// Whether `reference` already carries a URI scheme.
pub fn is_uri(reference: &str) -> bool {
    RE_URI_SCHEME.is_match(reference)
}

/// Read an image file and wrap it as a base64 data URI.
///
/// Returns `None` when the file is missing, unreadable or not a recognised
/// image format.
pub fn image_data_uri(path: &Path) -> Option<String> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            debug!("Picture candidate {} unreadable: {}", path.display(), e);
            return None;
        }
    };
    let Some(mime) = sniff_mime(path, &bytes) else {
        warn!("Picture candidate {} is not a supported image", path.display());
        return None;
    };
    debug!("Encoded {} ({} bytes, {})", path.display(), bytes.len(), mime);
    Some(data_uri(mime, &bytes))
}

fn sniff_mime(path: &Path, bytes: &[u8]) -> Option<&'static str> {
    if let Ok(format) = image::guess_format(bytes) {
        return Some(format.to_mime_type());
    }
    let is_svg_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    let looks_like_svg = std::str::from_utf8(bytes).is_ok_and(|s| s.contains("<svg"));
    (is_svg_ext && looks_like_svg).then_some("image/svg+xml")
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

// ── Picture sources ──────────────────────────────────────────────────────

/// One step in the picture resolution chain.
pub trait PictureSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// A ready-to-embed reference, or `None` to defer to the next source.
    fn resolve(&self, doc: &ResumeDocument) -> Option<String>;
}

/// A caller-supplied override path.
pub struct ExplicitPhoto(pub PathBuf);

impl PictureSource for ExplicitPhoto {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn resolve(&self, _doc: &ResumeDocument) -> Option<String> {
        image_data_uri(&self.0)
    }
}

/// Conventional locations, first readable one wins.
pub struct ConventionalPhoto {
    pub candidates: Vec<PathBuf>,
}

impl PictureSource for ConventionalPhoto {
    fn name(&self) -> &'static str {
        "conventional"
    }

    fn resolve(&self, _doc: &ResumeDocument) -> Option<String> {
        self.candidates.iter().find_map(|p| image_data_uri(p))
    }
}

/// The document's own `basics.picture`, relative paths taken from `base_dir`.
pub struct DocumentPicture {
    pub base_dir: PathBuf,
}

impl DocumentPicture {
    fn local_path(&self, reference: &str) -> PathBuf {
        let raw = reference.strip_prefix("file://").unwrap_or(reference);
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl PictureSource for DocumentPicture {
    fn name(&self) -> &'static str {
        "document"
    }

    fn resolve(&self, doc: &ResumeDocument) -> Option<String> {
        let reference = doc.basics.picture.as_deref()?.trim();
        if reference.is_empty() {
            return None;
        }
        if let Some(uri) = image_data_uri(&self.local_path(reference)) {
            return Some(uri);
        }
        if is_uri(reference) {
            debug!("Passing picture URI through unchanged: {}", reference);
            return Some(reference.to_string());
        }
        warn!("basics.picture '{}' could not be read; skipping", reference);
        None
    }
}

/// Where the resolved picture came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPicture {
    pub uri: String,
    pub source: &'static str,
}

/// Ordered picture strategies terminated by the placeholder avatar.
pub struct AssetResolver {
    sources: Vec<Box<dyn PictureSource>>,
}

impl AssetResolver {
    /// A resolver with no sources; everything resolves to the placeholder.
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// The standard chain for a render configuration.
    pub fn from_config(config: &RenderConfig) -> Self {
        let mut resolver = Self::empty();
        if let Some(ref photo) = config.profile_photo {
            resolver = resolver.with_source(ExplicitPhoto(photo.clone()));
        }
        let candidates = config
            .conventional_pictures
            .iter()
            .map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    config.working_dir.join(p)
                }
            })
            .collect();
        resolver
            .with_source(ConventionalPhoto { candidates })
            .with_source(DocumentPicture {
                base_dir: config.working_dir.clone(),
            })
    }

    /// Append a source after the existing ones.
    pub fn with_source(mut self, source: impl PictureSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Resolve the profile picture. Never fails.
    pub fn resolve_picture(&self, doc: &ResumeDocument) -> ResolvedPicture {
        for source in &self.sources {
            if let Some(uri) = source.resolve(doc) {
                debug!("Profile picture resolved by '{}' source", source.name());
                return ResolvedPicture {
                    uri,
                    source: source.name(),
                };
            }
        }
        debug!("No picture found; using placeholder avatar");
        ResolvedPicture {
            uri: placeholder_avatar_data_uri(),
            source: "placeholder",
        }
    }
}
