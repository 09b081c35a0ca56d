//! Saving and creating blog posts.
//!
//! A save merges the edited body with the post's stored frontmatter, applies
//! the metadata changes, and optionally renames the file. Stores are behind
//! [`PostStore`] so the same flow runs against a directory or memory.

mod meta;
mod store;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

pub use meta::{
    DEFAULT_EXCERPT_LIMIT, PostForm, PostMeta, SaveRequest, SaveResponse, build_changes,
    collect_tags, iso_to_local, latest_meta, make_excerpt, normalize_tags, post_path, slugify,
    strip_md,
};
pub use store::{DirectoryStore, MemoryStore, PostStore};

use crate::frontmatter::{self, FrontmatterChanges, to_iso, yaml_quote};

const DEFAULT_TITLE: &str = "Untitled Post";
const DEFAULT_SLUG: &str = "untitled";
const MAX_NAME_ATTEMPTS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("invalid filename `{0}`: expected a .md file")]
    InvalidFilename(String),

    #[error("post not found: {0}")]
    NotFound(String),

    #[error("a post named `{0}` already exists")]
    Conflict(String),

    #[error("invalid post path: {0}")]
    InvalidPath(String),

    #[error("failed to access {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Last path segment, trimmed.
fn basename(path: &str) -> &str {
    path.trim().rsplit(['/', '\\']).next().unwrap_or_default()
}

fn is_markdown_name(name: &str) -> bool {
    !strip_md(name).is_empty() && strip_md(name).len() < name.len()
}

/// Merge an edited body into the stored text.
///
/// Incoming text that carries its own frontmatter wins outright. Otherwise
/// the stored frontmatter, if any, is updated and put back on top.
pub fn compose_document(original: &str, incoming: &str, changes: &FrontmatterChanges) -> String {
    if frontmatter::has_frontmatter(incoming) {
        return incoming.to_string();
    }
    match frontmatter::split(original) {
        (Some(fm), _) => {
            let updated = frontmatter::update(fm, changes);
            format!("---\n{updated}\n---\n\n{incoming}")
        }
        (None, _) => incoming.to_string(),
    }
}

/// Save an edited post and report its metadata as persisted.
pub fn save_post<S: PostStore + ?Sized>(
    store: &mut S,
    filename: &str,
    request: &SaveRequest,
    now: DateTime<Utc>,
) -> Result<SaveResponse, PostError> {
    let filename = basename(filename);
    if !is_markdown_name(filename) {
        return Err(PostError::InvalidFilename(filename.to_string()));
    }

    let changes = build_changes(request, now);
    let original = store.read(filename)?;
    let text = compose_document(&original, &request.content_markdown, &changes);
    store.write(filename, &text)?;
    info!(filename, keys = changes.len(), "saved post");

    let (block, _) = frontmatter::parse(&text);
    let meta = latest_meta(&block, &changes);

    let desired = request.path.as_deref().map(basename).unwrap_or_default();
    if !desired.is_empty() {
        let desired = if is_markdown_name(desired) {
            desired.to_string()
        } else {
            format!("{desired}.md")
        };
        if desired != filename {
            if store.exists(&desired) {
                return Err(PostError::Conflict(desired));
            }
            match store.rename(filename, &desired) {
                Ok(()) => {
                    info!(from = filename, to = %desired, "renamed post");
                    return Ok(SaveResponse {
                        updated: true,
                        renamed: true,
                        path: meta::join_dir(store.content_dir(), &desired),
                        filename: desired,
                        meta,
                    });
                }
                Err(PostError::Conflict(name)) => return Err(PostError::Conflict(name)),
                Err(err) => warn!(error = %err, "rename failed, keeping the saved file"),
            }
        }
    }

    Ok(SaveResponse {
        updated: true,
        renamed: false,
        filename: filename.to_string(),
        path: meta::join_dir(store.content_dir(), filename),
        meta,
    })
}

/// Starting text for a new post.
pub fn new_post_template(title: &str, now: DateTime<Utc>) -> String {
    let now = to_iso(&now);
    format!(
        "---\ntitle: {}\ndescription: \"\"\npubDate: {now}\ndraft: false\ntags: []\nupdatedDate: {now}\n---\n\nWrite your post here...\n",
        yaml_quote(title)
    )
}

/// Create a new post under the first free `slug.md` / `slug-N.md` name and
/// return that filename.
pub fn create_post<S: PostStore + ?Sized>(
    store: &mut S,
    title: &str,
    now: DateTime<Utc>,
) -> Result<String, PostError> {
    let title = match title.trim() {
        "" => DEFAULT_TITLE,
        title => title,
    };
    let slug = match slugify(title) {
        slug if slug.is_empty() => DEFAULT_SLUG.to_string(),
        slug => slug,
    };
    let content = new_post_template(title, now);

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = if attempt == 0 {
            format!("{slug}.md")
        } else {
            format!("{slug}-{attempt}.md")
        };
        match store.create(&candidate, &content) {
            Ok(()) => {
                info!(filename = %candidate, "created post");
                return Ok(candidate);
            }
            Err(PostError::Conflict(_)) => {}
            Err(err) => return Err(err),
        }
    }
    Err(PostError::Conflict(format!("{slug}.md")))
}
