use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

/// Static site service. Paths with no matching file get `index.html`
/// (status 200) so client-side routes resolve.
pub fn serve_site(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(dir.join("index.html")))
}
