//! Shared test utilities for the sitemill test suite.
//!
//! Builders for the small values almost every route test needs, plus the
//! fixture site copied into a temp directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let config = site_config(&["en", "es"], "en");
//! let instance = loaded("hello", Some("es"), params(&[("slug", "hola")]));
//!
//! let tmp = setup_fixtures();
//! let site = scan(tmp.path()).unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::route::{InstanceProvider, StaticInstances};
use crate::types::{InstanceSeed, LoadedInstance, ParamValue, Params};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

// =========================================================================
// Value builders
// =========================================================================

/// Single-valued params from `(name, value)` pairs.
pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), ParamValue::from(*value)))
        .collect()
}

/// A loaded instance without data.
pub fn loaded(key: &str, locale: Option<&str>, params: Params) -> LoadedInstance {
    LoadedInstance {
        key: key.to_string(),
        locale: locale.map(String::from),
        params,
        data: None,
    }
}

/// Provider returning a fixed list of seeds.
pub fn provider_of(seeds: Vec<InstanceSeed>) -> Arc<dyn InstanceProvider> {
    Arc::new(StaticInstances(seeds))
}

/// Default config with the given locales.
pub fn site_config(locales: &[&str], default_locale: &str) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.i18n.locales = locales.iter().map(|l| l.to_string()).collect();
    config.i18n.default_locale = default_locale.to_string();
    config
}
