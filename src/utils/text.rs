use std::path::Path;

use urlencoding::encode;

/// Normalise a repository path: forward slashes, no leading/trailing or doubled separators.
///
/// `None` for an empty path or one containing `..`, which would leave the contents endpoint.
pub fn clean_repo_path(path: &str) -> Option<String> {
    let normalized = path.replace('\\', "/");
    let segments: Vec<&str> = normalized
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if segments.is_empty() || segments.contains(&"..") {
        return None;
    }
    Some(segments.join("/"))
}

/// Default location for an uploaded file: `<media_dir>/<file name>`
pub fn default_destination(media_dir: &str, local_file: &Path) -> Option<String> {
    let file_name = local_file.file_name()?.to_str()?;
    clean_repo_path(&format!("{}/{}", media_dir, file_name))
}

/// Percent-encode each path segment, keeping the separators
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Last path segment, used in commit messages
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
