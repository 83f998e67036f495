//! Config template loading and token substitution
//!
//! The topology embeds four config files verbatim into its ConfigMaps, with
//! exactly one substitution: the PHP-FPM upstream address is spliced into the
//! nginx site config. Everything else in the files, including pipeline
//! placeholder tokens, passes through untouched. A missing file is fatal;
//! synthesis aborts without producing output.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

/// Relative path of the nginx site config (holds the upstream token)
pub const NGINX_SITE_CONFIG: &str = "nginx/default.conf";

/// Relative path of the nginx main config
pub const NGINX_MAIN_CONFIG: &str = "nginx/nginx.conf";

/// Relative path of the PHP-FPM pool config
pub const FPM_POOL_CONFIG: &str = "php-fpm/www.conf";

/// Relative path of the PHP-FPM docker overrides
pub const FPM_DOCKER_CONFIG: &str = "php-fpm/docker.conf";

/// Root directory containing the per-service config templates
#[derive(Clone, Debug)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    /// Create a loader rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory templates are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a template file to a string, verbatim
    ///
    /// Fails with [`Error::ConfigLoad`] if the file is missing or unreadable.
    /// Not recovered anywhere: file reads are local and a missing template
    /// means the repository checkout is broken.
    pub fn load(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        let content =
            std::fs::read_to_string(&path).map_err(|e| Error::config_load(&path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "loaded config template");
        Ok(content)
    }
}

/// Replace the first occurrence of `token` in `content` with `replacement`
///
/// All other text, including any further occurrences of the token, is left
/// untouched. Returns the input unchanged when the token is absent.
pub fn substitute_once(content: &str, token: &str, replacement: &str) -> String {
    content.replacen(token, replacement, 1)
}
