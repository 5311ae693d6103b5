//! Admission rules deciding which path elements enter the index.
//!
//! Directory rules are coarse and prune whole subtrees; file rules combine
//! test-file naming heuristics with an extension allow-list. The naming
//! heuristics are case-sensitive, extension matching is not.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Extensions indexed when no `-ft` override or config is given
pub const DEFAULT_FILE_TYPES: &str = "c|cpp|cxx|cc|inc|asm|s|h|hh|hxx|hpp|def|hdr|y|lex|yy";

/// Directory names that hold test trees rather than sources
const TEST_DIRS: &[&str] = &[
    "test",
    "tests",
    "testsuite",
    "testsuites",
    "unittest",
    "unittests",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Keep,
    Skip,
}

impl Admission {
    pub fn is_keep(self) -> bool {
        self == Admission::Keep
    }

    fn from_bool(keep: bool) -> Self {
        if keep { Admission::Keep } else { Admission::Skip }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    File,
    Directory,
}

/// Hidden files, lock files and editor backups
fn is_artifact_name(name: &str) -> bool {
    name.is_empty()
        || name.starts_with(['.', '#', '~'])
        || name.ends_with('~')
}

/// Pipe-separated set of file extensions, compared case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionAllowList {
    extensions: Vec<String>,
}

impl ExtensionAllowList {
    pub fn contains(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|e| *e == ext)
    }
}

impl FromStr for ExtensionAllowList {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let extensions = s
            .split('|')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Ok(Self { extensions })
    }
}

impl Default for ExtensionAllowList {
    fn default() -> Self {
        DEFAULT_FILE_TYPES.parse().unwrap_or_else(|never| match never {})
    }
}

impl fmt::Display for ExtensionAllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extensions.join("|"))
    }
}

impl Serialize for ExtensionAllowList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExtensionAllowList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Decides whether the walker descends into a directory
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryAdmission;

impl DirectoryAdmission {
    pub fn decide(&self, name: &str) -> Admission {
        Admission::from_bool(!is_artifact_name(name) && !TEST_DIRS.contains(&name))
    }
}

/// Decides whether a regular file is handed to the index builder
#[derive(Debug, Clone, Default)]
pub struct FileAdmission {
    allow: ExtensionAllowList,
}

impl FileAdmission {
    pub fn new(allow: ExtensionAllowList) -> Self {
        Self { allow }
    }

    pub fn decide(&self, name: &str) -> Admission {
        if is_artifact_name(name) {
            return Admission::Skip;
        }
        // foo_test.c, test_foo.c
        if name.contains("_test.") || name.starts_with("test_") {
            return Admission::Skip;
        }
        match name.rsplit_once('.') {
            Some((_, ext)) => Admission::from_bool(self.allow.contains(ext)),
            None => Admission::Skip,
        }
    }
}

/// Both rule sets, dispatched on the scope of the element
#[derive(Debug, Clone, Default)]
pub struct AdmissionFilter {
    pub directories: DirectoryAdmission,
    pub files: FileAdmission,
}

impl AdmissionFilter {
    pub fn new(allow: ExtensionAllowList) -> Self {
        Self {
            directories: DirectoryAdmission,
            files: FileAdmission::new(allow),
        }
    }

    pub fn decide(&self, name: &str, scope: Scope) -> Admission {
        match scope {
            Scope::Directory => self.directories.decide(name),
            Scope::File => self.files.decide(name),
        }
    }
}
