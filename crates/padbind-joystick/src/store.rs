use std::collections::BTreeSet;

use log::debug;

use crate::backend::MappingBackend;
use crate::guid::Guid;
use crate::mapping::{canonicalize, guid_prefix, strip_platform};
use crate::{Error, Result};

/// GUIDs seen as gamepads during this process lifetime.
///
/// Only these are written out by [`MappingStore::save`]. The mapping text
/// itself lives in the backend.
#[derive(Debug, Default)]
pub struct MappingStore {
    recent: BTreeSet<Guid>,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_seen(&mut self, guid: Guid) {
        self.recent.insert(guid);
    }

    pub fn is_recent(&self, guid: &Guid) -> bool {
        self.recent.contains(guid)
    }

    pub fn recent(&self) -> impl Iterator<Item = &Guid> {
        self.recent.iter()
    }

    /// Installs every usable line of a mapping database and returns the
    /// GUIDs that were installed.
    ///
    /// Blank lines and `#` comments are skipped. Lines for another platform
    /// count as recognized but are not installed.
    pub fn load<M: MappingBackend>(
        &mut self,
        backend: &mut M,
        mappings: &str,
    ) -> Result<Vec<Guid>> {
        let mut recognized = false;
        let mut installed = Vec::new();

        for line in mappings.lines() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let (platform, stripped) = strip_platform(line);
            if let Some(platform) = platform {
                if platform != backend.platform() {
                    recognized = true;
                    continue;
                }
            }

            if backend.add_mapping(&stripped).is_success() {
                recognized = true;
                let guid = Guid::from_text(guid_prefix(&stripped));
                if !guid.is_zero() {
                    self.mark_seen(guid);
                    installed.push(guid);
                }
            } else {
                debug!("mapping rejected: {stripped}");
            }
        }

        if !recognized && !mappings.is_empty() {
            return Err(Error::InvalidMappings);
        }
        Ok(installed)
    }

    /// One canonical line per recent GUID that still resolves, each
    /// terminated by a newline.
    pub fn save<M: MappingBackend>(&self, backend: &M) -> String {
        let mut out = String::new();
        for guid in &self.recent {
            if let Some(mapping) = canonical_mapping(backend, guid) {
                out.push_str(&mapping);
                out.push('\n');
            }
        }
        out
    }
}

/// Mapping text for `guid` in canonical form, comma terminated and with a
/// platform clause.
pub fn canonical_mapping<M: MappingBackend>(backend: &M, guid: &Guid) -> Option<String> {
    backend
        .mapping_for_guid(guid)
        .map(|mapping| canonicalize(&mapping, backend.platform()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    const PAD: &str = "030000005e0400008e02000014010000";

    #[test]
    fn load_skips_comments_and_installs_valid_line() {
        let mut backend = MockBackend::new();
        let mut store = MappingStore::new();
        let text = format!("#comment\n{PAD},X360 Controller,a:b0,b:b1,\n");
        let installed = store.load(&mut backend, &text).expect("load");
        assert_eq!(installed.len(), 1);
        assert_eq!(backend.installed_count(), 1);
        assert!(store.is_recent(&PAD.parse().unwrap()));
    }

    #[test]
    fn load_empty_is_not_an_error() {
        let mut backend = MockBackend::new();
        let mut store = MappingStore::new();
        let installed = store.load(&mut backend, "").expect("empty load");
        assert!(installed.is_empty());
        assert_eq!(backend.installed_count(), 0);
    }

    #[test]
    fn load_all_invalid_fails() {
        let mut backend = MockBackend::new();
        let mut store = MappingStore::new();
        assert!(matches!(
            store.load(&mut backend, "garbage\nmore garbage\n"),
            Err(Error::InvalidMappings)
        ));
        assert!(matches!(
            store.load(&mut backend, "# only a comment"),
            Err(Error::InvalidMappings)
        ));
    }

    #[test]
    fn load_blank_lines_only_fails() {
        let mut backend = MockBackend::new();
        let mut store = MappingStore::new();
        for text in ["\n", "   \n  ", "\r\n\r\n"] {
            assert!(
                matches!(store.load(&mut backend, text), Err(Error::InvalidMappings)),
                "{text:?}"
            );
        }
        assert_eq!(backend.installed_count(), 0);
    }

    #[test]
    fn load_partial_success_is_ok() {
        let mut backend = MockBackend::new();
        let mut store = MappingStore::new();
        let text = format!("garbage\n{PAD},Pad,a:b0,\n");
        let installed = store.load(&mut backend, &text).expect("partial load");
        assert_eq!(installed.len(), 1);
    }

    #[test]
    fn load_foreign_platform_is_recognized_but_not_installed() {
        let mut backend = MockBackend::new();
        let mut store = MappingStore::new();
        let text = format!("{PAD},Pad,a:b0,platform:Windows,\n");
        let installed = store.load(&mut backend, &text).expect("foreign platform");
        assert!(installed.is_empty());
        assert_eq!(backend.installed_count(), 0);
        assert_eq!(store.recent().count(), 0);
    }

    #[test]
    fn load_local_platform_strips_clause() {
        let mut backend = MockBackend::new();
        let mut store = MappingStore::new();
        let text = format!("{PAD},Pad,a:b0,platform:Linux,x:b2,\r\n");
        store.load(&mut backend, &text).expect("local platform");
        let guid: Guid = PAD.parse().unwrap();
        assert_eq!(
            backend.raw_mapping(&guid).as_deref(),
            Some(format!("{PAD},Pad,a:b0,x:b2,").as_str())
        );
    }

    #[test]
    fn save_emits_canonical_lines() {
        let mut backend = MockBackend::new();
        let mut store = MappingStore::new();
        store
            .load(&mut backend, &format!("{PAD},Pad,a:b0"))
            .expect("load");
        assert_eq!(store.save(&backend), format!("{PAD},Pad,a:b0,platform:Linux,\n"));
    }

    #[test]
    fn save_skips_unresolvable_guids() {
        let backend = MockBackend::new();
        let mut store = MappingStore::new();
        store.mark_seen(PAD.parse().unwrap());
        assert_eq!(store.save(&backend), "");
        assert_eq!(MappingStore::new().save(&backend), "");
    }
}
