//! Package descriptors and the small enums that classify them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Version label used for the trunk build of a theme or plugin.
pub const DEV_VERSION_LABEL: &str = "Development Version";

/// Kind of package hosted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Core,
    Theme,
    Plugin,
}

impl PackageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageKind::Core => "core",
            PackageKind::Theme => "theme",
            PackageKind::Plugin => "plugin",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package kinds the registry looks up by slug. Core releases are resolved
/// through version offers instead, so they have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Theme,
    Plugin,
}

impl From<ItemKind> for PackageKind {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Theme => PackageKind::Theme,
            ItemKind::Plugin => PackageKind::Plugin,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PackageKind::from(*self).fmt(f)
    }
}

/// Archive format of a downloadable artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileType {
    #[default]
    #[serde(rename = "zip")]
    Zip,
    #[serde(rename = "tar.gz")]
    TarGz,
}

impl FileType {
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Zip => "zip",
            FileType::TarGz => "tar.gz",
        }
    }

    /// Infers the archive format from the path of a download URL.
    /// Anything that is not a `.tar.gz` is treated as a zip.
    pub fn from_url(url: &str) -> FileType {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            FileType::TarGz
        } else {
            FileType::Zip
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(FileType::Zip),
            "tar.gz" | "tgz" => Ok(FileType::TarGz),
            other => Err(format!("unsupported file type '{other}' (expected zip or tar.gz)")),
        }
    }
}

/// A package as described by the registry, ready to be fetched.
///
/// For core, `slug` holds the locale the release was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub slug: String,
    pub version: String,
    pub download_url: String,
    pub kind: PackageKind,
}

impl PackageDescriptor {
    /// Synthesizes the descriptor of a core release.
    pub fn core(version: &str, locale: &str, download_url: String) -> Self {
        PackageDescriptor {
            name: "WordPress".to_string(),
            slug: locale.to_string(),
            version: version.to_string(),
            download_url,
            kind: PackageKind::Core,
        }
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_url(&self.download_url)
    }
}
