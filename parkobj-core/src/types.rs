//! Domain types for object manifests.
//!
//! A manifest is a JSON object. Only two of its fields carry meaning here:
//! `id` (diagnostics and archive naming) and `images` (the image data that
//! may need compiling). Every other field is passed through untouched, in
//! its original order.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ManifestError;

/// Manifest key holding the image data.
pub const IMAGES_KEY: &str = "images";

/// Manifest key holding the object identifier.
pub const ID_KEY: &str = "id";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed object identifier, as read from the manifest's `id` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Container reference
// ---------------------------------------------------------------------------

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$LGX:([^\[]+)\[([0-9]+)\.\.([0-9]+)\]$").expect("static regex is valid")
});

/// Symbolic reference to a range of entries inside a compiled image container,
/// written as `$LGX:<file>[<first>..<last>]` (both bounds inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerReference {
    pub file: String,
    pub first: u32,
    pub last: u32,
}

impl ContainerReference {
    /// Reference covering every entry of a container holding `count` entries.
    ///
    /// Returns `None` for an empty container, which has no valid range.
    pub fn for_entries(file: impl Into<String>, count: u32) -> Option<Self> {
        let last = count.checked_sub(1)?;
        Some(Self {
            file: file.into(),
            first: 0,
            last,
        })
    }

    /// Number of entries covered by the range.
    pub fn entry_count(&self) -> u32 {
        self.last - self.first + 1
    }
}

impl fmt::Display for ContainerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$LGX:{}[{}..{}]", self.file, self.first, self.last)
    }
}

impl FromStr for ContainerReference {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ManifestError::InvalidReference(s.to_owned());
        let caps = REFERENCE_RE.captures(s).ok_or_else(invalid)?;
        let first = caps[2].parse().map_err(|_| invalid())?;
        let last = caps[3].parse().map_err(|_| invalid())?;
        if last < first {
            return Err(invalid());
        }
        Ok(Self {
            file: caps[1].to_owned(),
            first,
            last,
        })
    }
}

// ---------------------------------------------------------------------------
// Image set
// ---------------------------------------------------------------------------

/// The shape of a manifest's `images` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSet {
    /// No `images` field at all.
    Absent,
    /// A non-empty array with no string entries: image descriptors that still
    /// have to be compiled into a container.
    Raw(Vec<Value>),
    /// An already-compiled `$LGX:` reference.
    Compiled(ContainerReference),
    /// Anything else, left exactly as found: an empty array, an array holding
    /// at least one string, a plain string, or a non-array value.
    Resolved(Value),
}

impl ImageSet {
    /// Classify a raw `images` value.
    ///
    /// Only a non-empty array without a single string entry counts as raw.
    /// Mixed arrays (some strings, some descriptors) are treated as resolved.
    pub fn classify(value: Option<&Value>) -> Self {
        match value {
            None => Self::Absent,
            Some(Value::Array(items))
                if !items.is_empty() && !items.iter().any(Value::is_string) =>
            {
                Self::Raw(items.clone())
            }
            Some(Value::String(s)) => match s.parse() {
                Ok(reference) => Self::Compiled(reference),
                Err(_) => Self::Resolved(Value::String(s.clone())),
            },
            Some(other) => Self::Resolved(other.clone()),
        }
    }

    pub fn needs_compilation(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// The raw image descriptors, if this set still needs compiling.
    pub fn raw_entries(&self) -> Option<&[Value]> {
        match self {
            Self::Raw(items) => Some(items),
            _ => None,
        }
    }

    /// JSON form of the field; `None` when the field is absent.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Raw(items) => Some(Value::Array(items.clone())),
            Self::Compiled(reference) => Some(Value::String(reference.to_string())),
            Self::Resolved(value) => Some(value.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Object record
// ---------------------------------------------------------------------------

/// One manifest discovered in the staged tree.
///
/// `directory` is the directory the manifest was found in. It is never part of
/// the persisted manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub directory: PathBuf,
    pub images: ImageSet,
    fields: Map<String, Value>,
}

impl ObjectRecord {
    /// Build a record from an already-parsed manifest object.
    ///
    /// The id falls back to the owning directory's name when the manifest has
    /// no string `id` field.
    pub fn from_fields(directory: impl Into<PathBuf>, fields: Map<String, Value>) -> Self {
        let directory = directory.into();
        let id = match fields.get(ID_KEY).and_then(Value::as_str) {
            Some(id) => ObjectId::from(id),
            None => ObjectId::from(
                directory
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
        };
        let images = ImageSet::classify(fields.get(IMAGES_KEY));
        Self {
            id,
            directory,
            images,
            fields,
        }
    }

    /// Parse the manifest text read from `path`; the owning directory is the
    /// manifest's parent directory.
    pub fn from_manifest_str(path: &Path, text: &str) -> Result<Self, ManifestError> {
        let fields: Map<String, Value> =
            serde_json::from_str(text).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::from_fields(directory, fields))
    }

    /// The manifest to persist: loaded fields with the current `images` value
    /// written back into its original position.
    pub fn to_manifest(&self) -> Map<String, Value> {
        let mut manifest = self.fields.clone();
        match self.images.to_value() {
            Some(value) => {
                manifest.insert(IMAGES_KEY.to_owned(), value);
            }
            None => {
                manifest.shift_remove(IMAGES_KEY);
            }
        }
        manifest
    }

    /// Pretty-printed manifest text, ready to be written to disk.
    pub fn to_manifest_json(&self) -> Result<String, ManifestError> {
        to_pretty_json(&self.to_manifest())
    }
}

/// Serialize with four-space indentation and a single trailing newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ManifestError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
