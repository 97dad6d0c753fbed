use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::ObjectId;

pub const INPUT_DIR: &str = "objects";
pub const STAGING_DIR: &str = "artifacts";

pub const OBJECT_MANIFEST: &str = "object.json";
pub const IMAGES_MANIFEST: &str = "images.json";
pub const IMAGES_CONTAINER: &str = "images.dat";
pub const IMAGES_DIR: &str = "images";

pub const PARKOBJ_EXTENSION: &str = "parkobj";
pub const AGGREGATE_ARCHIVE: &str = "objects.zip";

static MANIFEST_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+\..+\.json$").expect("static regex is valid"));

/// Directory layout of one build, rooted at the directory the tool runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    pub fn at(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// `<base>/objects`, the pristine input tree.
    pub fn input_root(&self) -> PathBuf {
        self.base.join(INPUT_DIR)
    }

    /// `<base>/artifacts`, the staged copy the build consumes.
    pub fn staging_root(&self) -> PathBuf {
        self.base.join(STAGING_DIR)
    }
}

/// `<id>.parkobj`
pub fn parkobj_file_name(id: &ObjectId) -> String {
    format!("{id}.{PARKOBJ_EXTENSION}")
}

/// Whether a file name looks like a discoverable manifest (`<name>.<variant>.json`).
///
/// The plain `object.json` written by reprocessing and the transient
/// `images.json` never match.
pub fn is_manifest_file_name(name: &str) -> bool {
    MANIFEST_NAME_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_names() {
        assert!(is_manifest_file_name("object.1.json"));
        assert!(is_manifest_file_name("rct2.ride.wooden.json"));
        assert!(!is_manifest_file_name(OBJECT_MANIFEST));
        assert!(!is_manifest_file_name(IMAGES_MANIFEST));
        assert!(!is_manifest_file_name("object.1.json.bak"));
    }

    #[test]
    fn roots_hang_off_base() {
        let layout = Layout::at("/work");
        assert_eq!(layout.input_root(), PathBuf::from("/work/objects"));
        assert_eq!(layout.staging_root(), PathBuf::from("/work/artifacts"));
    }

    #[test]
    fn parkobj_name() {
        assert_eq!(parkobj_file_name(&ObjectId::from("foo")), "foo.parkobj");
    }
}
