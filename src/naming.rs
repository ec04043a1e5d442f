//! Project naming and output path conventions.
//!
//! The generator script namespaces its output as `{output}/{name}/html`. The
//! dispatcher predicts that location from the same rules, so both sides
//! should call [`derive_project_name`] rather than reimplementing it.

use std::path::Path;
use url::Url;

use crate::models::Source;

/// Derive a project name from a repository URL or a local directory.
///
/// Returns `None` when the URL cannot be parsed or the last segment is empty.
pub fn derive_project_name(source: &Source) -> Option<String> {
    match source {
        Source::Remote(repo_url) => name_from_url(repo_url),
        Source::Local(dir) => Path::new(dir)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty()),
    }
}

fn name_from_url(repo_url: &str) -> Option<String> {
    let url = match Url::parse(repo_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(repo_url, error = %e, "could not derive project name from URL");
            return None;
        }
    };

    let path = url.path().trim_start_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let name = path.rsplit('/').next().unwrap_or_default();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// `{output_base}/{project_name}/html`, always with forward slashes.
pub fn final_output_path(output_base: &str, project_name: &str) -> String {
    Path::new(output_base)
        .join(project_name)
        .join("html")
        .to_string_lossy()
        .replace('\\', "/")
}
