use ahash::AHashMap;

use padbind_joystick::mapping::{guid_prefix, strip_platform};

/// Writes `saved` over `existing` line by line.
///
/// A line of `existing` is dropped when `saved` has the same GUID for the
/// same platform, or when it names no platform at all. Comments, blank
/// lines and mappings for other platforms or devices are kept in place.
pub(crate) fn merge_mappings(existing: &str, saved: &str) -> String {
    let mut replaced: AHashMap<&str, Option<&str>> = AHashMap::new();
    for line in saved.lines().filter(|line| !line.trim().is_empty()) {
        let (platform, _) = strip_platform(line);
        replaced.insert(guid_prefix(line), platform);
    }

    let mut out = String::new();
    for line in existing.lines() {
        let keep = if line.trim().is_empty() || line.starts_with('#') {
            true
        } else {
            match replaced.get(guid_prefix(line)) {
                None => true,
                Some(saved_platform) => {
                    let (platform, _) = strip_platform(line);
                    platform.is_some() && platform != *saved_platform
                }
            }
        };
        if keep {
            out.push_str(line);
            out.push('\n');
        }
    }
    for line in saved.lines().filter(|line| !line.trim().is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    out
}
