//! Static file responder
//! Serves files beneath a fixed root; anything resolving outside it is refused

use crate::error::StaticError;
use crate::mime;
use crate::response::{file_response, HttpResponse};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Fold `.` and `..` components without touching the filesystem.
/// `..` at the filesystem root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
        }
    }
    normalized
}

/// Static file responder
#[derive(Debug, Clone)]
pub struct StaticResponder {
    root: PathBuf,
}

impl StaticResponder {
    /// `root` is expected to be absolute and normalized (see `ServerConfig::with_static_root`)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to a file under the root.
    ///
    /// The lexical check runs first so nothing outside the root is ever
    /// touched. When the target exists, its canonical form must also stay
    /// under the canonical root, which catches symlinks pointing outside.
    pub async fn resolve(&self, request_path: &str) -> Result<PathBuf, StaticError> {
        let decoded = urlencoding::decode(request_path).map_err(|_| StaticError::NotFound)?;
        let relative = decoded.trim_start_matches('/');
        let resolved = normalize_path(&self.root.join(relative));

        if !resolved.starts_with(&self.root) {
            warn!("Path traversal attempt blocked: {} -> {}", request_path, resolved.display());
            return Err(StaticError::Forbidden);
        }

        if let Ok(canonical) = fs::canonicalize(&resolved).await {
            let canonical_root = fs::canonicalize(&self.root)
                .await
                .unwrap_or_else(|_| self.root.clone());
            if !canonical.starts_with(&canonical_root) {
                warn!("Symlink escape blocked: {} -> {}", request_path, canonical.display());
                return Err(StaticError::Forbidden);
            }
        }

        Ok(resolved)
    }

    /// Serve a request path. Every outcome is a complete response.
    pub async fn serve(&self, request_path: &str) -> HttpResponse {
        let file_path = match self.resolve(request_path).await {
            Ok(p) => p,
            Err(e) => return e.into_response(),
        };

        match fs::read(&file_path).await {
            Ok(content) => {
                debug!("Serving {} ({} bytes)", file_path.display(), content.len());
                file_response(content, mime::content_type(&file_path))
            }
            Err(e) => {
                debug!("Failed to read {}: {}", file_path.display(), e);
                StaticError::NotFound.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/srv/app/./a/../b")), PathBuf::from("/srv/app/b"));
        assert_eq!(normalize_path(Path::new("/srv/app/../../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize_path(Path::new("/srv/app/")), PathBuf::from("/srv/app"));
    }

    #[tokio::test]
    async fn test_resolve_inside_root() {
        let responder = StaticResponder::new("/srv/app");
        let path = responder.resolve("/css/site.css").await.unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/css/site.css"));
    }

    #[tokio::test]
    async fn test_resolve_traversal_forbidden() {
        let responder = StaticResponder::new("/srv/app");
        assert_eq!(
            responder.resolve("/../../etc/passwd").await,
            Err(StaticError::Forbidden)
        );
        assert_eq!(
            responder.resolve("/%2e%2e/%2e%2e/etc/passwd").await,
            Err(StaticError::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_resolve_sibling_with_shared_prefix_forbidden() {
        let responder = StaticResponder::new("/srv/app");
        assert_eq!(
            responder.resolve("/../app-other/secret.json").await,
            Err(StaticError::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_resolve_inner_dotdot_allowed() {
        let responder = StaticResponder::new("/srv/app");
        let path = responder.resolve("/js/../index.html").await.unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/index.html"));
    }

    #[tokio::test]
    async fn test_serve_file_and_missing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("data.json"), br#"{"ok":true}"#).unwrap();
        let root = dir.path().canonicalize().unwrap();
        let responder = StaticResponder::new(root);

        let response = responder.serve("/data.json").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"ok":true}"#);

        let response = responder.serve("/nonexistent.html").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_directory_is_not_found() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        let responder = StaticResponder::new(dir.path().canonicalize().unwrap());

        let response = responder.serve("/assets").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_forbidden() {
        let outside = tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("link.txt"))
            .unwrap();
        let responder = StaticResponder::new(dir.path().canonicalize().unwrap());

        let response = responder.serve("/link.txt").await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
