//! Static file serving behind a `*filepath` route.
//!
//! [`RouterGroup::static_files`](crate::RouterGroup::static_files) registers
//! `GET <relative_path>/*filepath` and binds the handler built here. The
//! handler resolves `filepath` under the configured root and answers with the
//! file contents, or with a 404 failure when the file is missing or the path
//! tries to escape the root.

use http::StatusCode;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::context::Context;
use crate::handler::{handler, SharedHandler};

/// Name of the route parameter the static route binds
pub const FILEPATH_PARAM: &str = "filepath";

pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "wasm" => "application/wasm",
            _ => "application/octet-stream",
        }
    }

    /// Read a file below the root
    ///
    /// A directory is served through its `index.html` when it has one.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let mut path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if path.is_dir() {
            path.push("index.html");
        }
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }

    /// Build the handler for a `*filepath` route
    #[must_use]
    pub fn into_handler(self) -> SharedHandler {
        handler(move |c: &mut Context| {
            let file = c.param(FILEPATH_PARAM).unwrap_or_default().to_string();
            match self.load(&file) {
                Ok((bytes, content_type)) => c.write(StatusCode::OK, Some(content_type), bytes),
                Err(e) => c.fail(StatusCode::NOT_FOUND, &format!("{file}: {e}")),
            }
        })
    }
}
