//! JAR manifest main-section parsing

/// Canonical location of the manifest inside an archive
pub const MANIFEST_NAME: &str = "META-INF/MANIFEST.MF";

/// Main attributes that change with every rebuild
pub const IGNORED_ATTRIBUTES: &[&str] = &[
    "Archiver-Version",
    "Bnd-LastModified",
    "Built-By",
    "Build-Jdk",
    "Build-Timestamp",
    "Created-By",
    "Implementation-Version",
    "Java-Vendor",
    "Java-Version",
    "JBossAS-Release-Version",
    "Os-Arch",
    "Os-Name",
    "Os-Version",
    "Scm-Revision",
    "Specification-Version",
];

/// Whether a main attribute is excluded from comparison hashing
pub fn is_ignored_attribute(name: &str) -> bool {
    IGNORED_ATTRIBUTES
        .iter()
        .any(|ignored| ignored.eq_ignore_ascii_case(name))
}

/// Parse the main section of a manifest into `(name, value)` pairs
///
/// The main section ends at the first blank line. Lines starting with a single
/// space continue the previous value. Lines without a `:` separator are skipped.
pub fn main_attributes(content: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(content);
    let mut attributes: Vec<(String, String)> = Vec::new();

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            if attributes.is_empty() {
                continue;
            }
            break;
        }
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some((_, value)) = attributes.last_mut() {
                value.push_str(continuation);
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.strip_prefix(' ').unwrap_or(value);
            attributes.push((name.trim().to_string(), value.to_string()));
        }
    }

    attributes
}
