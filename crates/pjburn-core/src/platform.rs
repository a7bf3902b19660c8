//! Platform registry and autodetection
//!
//! A platform is a board whose firmware images are burned often enough that
//! its Promjet geometry is worth remembering. Images are matched against the
//! registry first by an identity tag embedded in the image data, then by the
//! input file name. Registry order is significant: the first match wins.
//!
//! Extra platforms can be loaded from a TOML file:
//!
//! ```toml
//! [[platform]]
//! name = "walnut"
//! width = 16
//! swap = true
//! size = "4M"
//! ```

use std::fs;
use std::path::Path;

use bstr::ByteSlice;

use crate::error::{Error, Result};
use crate::tables::{legal_widths, BusWidth, DeviceSize};

/// Prefix of the identity tag shipped firmware images carry
pub const MARKER_PREFIX: &str = "SonicWALL,";

/// Default geometry for a known platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSpec {
    /// Lower-case platform name
    pub name: String,
    /// Bus width the platform's flash sits on
    pub width: BusWidth,
    /// Whether bytes are swapped on transfer
    pub swap: bool,
    /// Device size, when the platform always uses the same one
    pub size: Option<DeviceSize>,
}

impl PlatformSpec {
    /// Create a platform entry without a fixed size
    pub fn new(name: impl Into<String>, width: BusWidth, swap: bool) -> Self {
        Self {
            name: name.into().to_lowercase(),
            width,
            swap,
            size: None,
        }
    }

    /// Set a fixed device size
    pub fn with_size(mut self, size: DeviceSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Identity tag searched for in image data, e.g. `SonicWALL,Maple`
    pub fn marker(&self) -> String {
        let mut chars = self.name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{}{}", MARKER_PREFIX, capitalized)
    }
}

// (name, width, swap, size)
const BUILTIN: &[(&str, BusWidth, bool, Option<&str>)] = &[
    ("uboot-mvebu", BusWidth::Serial, false, Some("16M")),
    ("ash", BusWidth::W8, false, None),
    ("balsa", BusWidth::W8, false, None),
    ("birch", BusWidth::W8, false, None),
    ("fir", BusWidth::W8, false, None),
    ("beech", BusWidth::W8, false, None),
    ("chestnut", BusWidth::W8, false, None),
    ("durian", BusWidth::W8, false, None),
    ("ebony", BusWidth::W8, false, None),
    ("gombe", BusWidth::W8, false, None),
    ("hemlock", BusWidth::W8, false, None),
    ("cherry", BusWidth::W8, false, None),
    ("jarrah", BusWidth::W8, false, None),
    ("khaya", BusWidth::W8, false, None),
    ("cedar", BusWidth::W8, false, None),
    ("greenheart", BusWidth::W8, false, None),
    ("hickory", BusWidth::W8, false, None),
    ("karri", BusWidth::W8, false, None),
    ("camito", BusWidth::W8, false, None),
    ("canarium", BusWidth::W8, false, None),
    ("iroko", BusWidth::W16, true, None),
    ("larch", BusWidth::W16, true, None),
    ("maple", BusWidth::W16, true, None),
    ("medang", BusWidth::W16, true, None),
    ("oak", BusWidth::W8, false, None),
    ("poplar", BusWidth::W8, false, None),
    ("holly", BusWidth::W16, true, None),
    ("ayan", BusWidth::W16, true, None),
    ("mahogany", BusWidth::W16, true, None),
    ("odoko", BusWidth::W16, true, None),
    ("pacific", BusWidth::W16, true, None),
    ("alder", BusWidth::W16, true, None),
    ("brazilwood", BusWidth::W16, true, None),
    ("okoume", BusWidth::W16, true, None),
    ("marblewood", BusWidth::W16, true, None),
    ("ebb6600", BusWidth::W16, true, None),
    ("cn6600", BusWidth::W16, true, None),
    ("thunder-bootfs-uboot-t81", BusWidth::Serial, false, Some("16M")),
];

// ============================================================================
// TOML deserialization types
// ============================================================================

#[derive(Debug, serde::Deserialize)]
struct PlatformFile {
    #[serde(default)]
    platform: Vec<PlatformDef>,
}

#[derive(Debug, serde::Deserialize)]
struct PlatformDef {
    name: String,
    width: u32,
    #[serde(default)]
    swap: bool,
    size: Option<String>,
}

impl TryFrom<PlatformDef> for PlatformSpec {
    type Error = Error;

    fn try_from(def: PlatformDef) -> Result<Self> {
        if def.name.trim().is_empty() {
            return Err(Error::PlatformDb("platform with empty name".into()));
        }
        let width = BusWidth::from_bits(def.width).ok_or_else(|| Error::InvalidWidth {
            value: def.width.to_string(),
            legal: legal_widths(),
        })?;
        let mut spec = PlatformSpec::new(def.name.trim(), width, def.swap);
        if let Some(size) = def.size {
            spec = spec.with_size(DeviceSize::lookup(&size)?);
        }
        Ok(spec)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Ordered, read-only list of known platforms
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<PlatformSpec>,
}

impl PlatformRegistry {
    /// Registry holding only the built-in platforms
    pub fn builtin() -> Self {
        let platforms = BUILTIN
            .iter()
            .map(|&(name, width, swap, size)| {
                let spec = PlatformSpec::new(name, width, swap);
                match size.and_then(|s| DeviceSize::lookup(s).ok()) {
                    Some(size) => spec.with_size(size),
                    None => spec,
                }
            })
            .collect();
        Self { platforms }
    }

    /// Create a registry from an explicit list
    pub fn from_specs(platforms: Vec<PlatformSpec>) -> Self {
        Self { platforms }
    }

    /// Add platforms from a TOML file ahead of the current entries
    pub fn with_file(self, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::PlatformDbIo {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = self.with_toml_str(&content)?;
        log::debug!(
            "Loaded platform database {} ({} platforms total)",
            path.display(),
            registry.len()
        );
        Ok(registry)
    }

    /// Add platforms from a TOML string ahead of the current entries
    pub fn with_toml_str(self, content: &str) -> Result<Self> {
        let file: PlatformFile =
            toml::from_str(content).map_err(|e| Error::PlatformDb(e.to_string()))?;

        let mut platforms = file
            .platform
            .into_iter()
            .map(PlatformSpec::try_from)
            .collect::<Result<Vec<_>>>()?;
        platforms.extend(self.platforms);
        Ok(Self { platforms })
    }

    /// All platforms in match order
    pub fn platforms(&self) -> &[PlatformSpec] {
        &self.platforms
    }

    /// Number of platforms
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Find a platform by exact name
    pub fn find(&self, name: &str) -> Option<&PlatformSpec> {
        self.platforms
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Find the platform an image belongs to
    ///
    /// Image content is searched first since file names are chosen by the
    /// user. `filename` is `None` when reading from stdin.
    pub fn detect(&self, filename: Option<&str>, data: &[u8]) -> Option<&PlatformSpec> {
        if let Some(platform) = self
            .platforms
            .iter()
            .find(|p| data.contains_str(p.marker()))
        {
            log::debug!("Found identity tag {} in image", platform.marker());
            return Some(platform);
        }

        let base = Path::new(filename?)
            .file_name()?
            .to_string_lossy()
            .to_lowercase();
        let platform = self.platforms.iter().find(|p| base.contains(&p.name))?;
        log::debug!("File name {} matches platform {}", base, platform.name);
        Some(platform)
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let reg = PlatformRegistry::builtin();
        assert_eq!(reg.len(), BUILTIN.len());
        assert_eq!(reg.platforms()[0].name, "uboot-mvebu");

        let mvebu = reg.find("uboot-mvebu").unwrap();
        assert_eq!(mvebu.width, BusWidth::Serial);
        assert_eq!(mvebu.size.map(|s| s.label), Some("16M"));

        let maple = reg.find("maple").unwrap();
        assert_eq!(maple.width, BusWidth::W16);
        assert!(maple.swap);
        assert_eq!(maple.size, None);
    }

    #[test]
    fn test_marker() {
        let reg = PlatformRegistry::builtin();
        assert_eq!(reg.find("maple").unwrap().marker(), "SonicWALL,Maple");
        assert_eq!(
            reg.find("uboot-mvebu").unwrap().marker(),
            "SonicWALL,Uboot-mvebu"
        );
    }

    #[test]
    fn test_detect_by_filename() {
        let reg = PlatformRegistry::builtin();
        let found = reg.detect(Some("/tmp/U-Boot-Octeon_Maple.bin"), &[0xFF; 64]);
        assert_eq!(found.map(|p| p.name.as_str()), Some("maple"));
    }

    #[test]
    fn test_detect_content_beats_filename() {
        let reg = PlatformRegistry::builtin();
        let mut data = vec![0u8; 128];
        data.extend_from_slice(b"SonicWALL,Larch\0");
        data.extend_from_slice(&[0xFF; 16]);
        let found = reg.detect(Some("u-boot-octeon_maple.bin"), &data);
        assert_eq!(found.map(|p| p.name.as_str()), Some("larch"));
    }

    #[test]
    fn test_detect_first_registry_match_wins() {
        let reg = PlatformRegistry::builtin();
        // both "ebony" and "oak" occur in this name
        let found = reg.detect(Some("ebony-oak.bin"), &[]);
        assert_eq!(found.map(|p| p.name.as_str()), Some("ebony"));
    }

    #[test]
    fn test_detect_miss() {
        let reg = PlatformRegistry::builtin();
        assert!(reg.detect(Some("image.bin"), &[0x00, 0xFF, 0x80]).is_none());
        assert!(reg.detect(None, &[0xC3; 1024]).is_none());
        assert!(reg.detect(Some(""), &[]).is_none());
    }

    #[test]
    fn test_detect_stdin_uses_content_only() {
        let reg = PlatformRegistry::builtin();
        let found = reg.detect(None, b"xxSonicWALL,Cn6600yy");
        assert_eq!(found.map(|p| p.name.as_str()), Some("cn6600"));
    }

    #[test]
    fn test_toml_entries_come_first() {
        let toml = r#"
[[platform]]
name = "Maple"
width = 32
swap = false
size = "4m"

[[platform]]
name = "walnut"
width = 8
"#;
        let reg = PlatformRegistry::builtin().with_toml_str(toml).unwrap();
        assert_eq!(reg.len(), BUILTIN.len() + 2);
        assert_eq!(reg.platforms()[0].name, "maple");
        assert_eq!(reg.platforms()[1].name, "walnut");

        let found = reg.detect(Some("maple.bin"), &[]).unwrap();
        assert_eq!(found.width, BusWidth::W32);
        assert_eq!(found.size.map(|s| s.label), Some("4M"));
    }

    #[test]
    fn test_toml_rejects_bad_entries() {
        let bad_width = "[[platform]]\nname = \"x\"\nwidth = 12\n";
        assert!(matches!(
            PlatformRegistry::builtin().with_toml_str(bad_width),
            Err(Error::InvalidWidth { .. })
        ));

        let bad_size = "[[platform]]\nname = \"x\"\nwidth = 8\nsize = \"3M\"\n";
        assert!(matches!(
            PlatformRegistry::builtin().with_toml_str(bad_size),
            Err(Error::InvalidSize { .. })
        ));

        let no_name = "[[platform]]\nname = \"\"\nwidth = 8\n";
        assert!(matches!(
            PlatformRegistry::builtin().with_toml_str(no_name),
            Err(Error::PlatformDb(_))
        ));

        assert!(PlatformRegistry::builtin().with_toml_str("[[platform]").is_err());
    }
}
