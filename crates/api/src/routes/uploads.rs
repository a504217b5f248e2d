//! Static serving of stored attachments.

use std::path::Path;

use tower_http::services::ServeDir;

/// Serve files from the flat upload directory, mounted at `/uploads`.
pub fn service(dir: &Path) -> ServeDir {
    ServeDir::new(dir)
}
