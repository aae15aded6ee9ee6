//! In-memory backend used by the unit tests.

use std::cell::Cell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::backend::{
    DeviceBackend, DeviceHandle, DeviceId, InstanceId, MappingBackend,
    MappingStatus,
};
use crate::guid::Guid;
use crate::mapping::guid_prefix;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub(crate) struct MockDevice {
    pub guid: Guid,
    pub name: String,
    pub instance: InstanceId,
    pub gamepad: bool,
    pub fail_open: bool,
}

pub(crate) struct MockHandle {
    instance: InstanceId,
    name: String,
    open: Rc<Cell<usize>>,
}

impl DeviceHandle for MockHandle {
    fn instance_id(&self) -> InstanceId {
        self.instance
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.open.set(self.open.get() - 1);
    }
}

pub(crate) struct MockBackend {
    pub devices: Vec<MockDevice>,
    pub reject_mappings: bool,
    mappings: AHashMap<Guid, String>,
    open: Rc<Cell<usize>>,
    mapping_calls: Cell<usize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            reject_mappings: false,
            mappings: AHashMap::new(),
            open: Rc::new(Cell::new(0)),
            mapping_calls: Cell::new(0),
        }
    }

    /// Plugs in a device and returns its device id.
    pub fn plug(&mut self, guid: &str, name: &str, instance: InstanceId) -> DeviceId {
        self.devices.push(MockDevice {
            guid: Guid::from_text(guid),
            name: name.to_string(),
            instance,
            gamepad: false,
            fail_open: false,
        });
        (self.devices.len() - 1) as DeviceId
    }

    pub fn plug_gamepad(
        &mut self,
        guid: &str,
        name: &str,
        instance: InstanceId,
    ) -> DeviceId {
        let id = self.plug(guid, name, instance);
        self.devices[id as usize].gamepad = true;
        id
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> Rc<Cell<usize>> {
        self.open.clone()
    }

    pub fn installed_count(&self) -> usize {
        self.mappings.len()
    }

    pub fn raw_mapping(&self, guid: &Guid) -> Option<String> {
        self.mappings.get(guid).cloned()
    }

    /// Number of calls made into the mapping capability.
    pub fn mapping_calls(&self) -> usize {
        self.mapping_calls.get()
    }

    fn device(&self, device: DeviceId) -> Option<&MockDevice> {
        self.devices.get(device as usize)
    }
}

impl DeviceBackend for MockBackend {
    type Handle = MockHandle;

    fn enumerate_devices(&self) -> Vec<DeviceId> {
        (0..self.devices.len() as DeviceId).collect()
    }

    fn is_valid_device(&self, device: DeviceId) -> bool {
        (device as usize) < self.devices.len()
    }

    fn device_guid(&self, device: DeviceId) -> Option<Guid> {
        self.device(device).map(|d| d.guid)
    }

    fn open(&mut self, device: DeviceId) -> Result<MockHandle> {
        let Some(dev) = self.device(device) else {
            return Err(Error::Open(device, "no such device".into()));
        };
        if dev.fail_open {
            return Err(Error::Open(device, "device busy".into()));
        }
        let handle = MockHandle {
            instance: dev.instance,
            name: dev.name.clone(),
            open: self.open.clone(),
        };
        self.open.set(self.open.get() + 1);
        Ok(handle)
    }

    fn is_gamepad(&self, device: DeviceId) -> bool {
        self.device(device).is_some_and(|d| d.gamepad)
    }

    fn device_instance_id(&mut self, device: DeviceId) -> Option<InstanceId> {
        self.device(device).map(|d| d.instance)
    }
}

impl MappingBackend for MockBackend {
    fn add_mapping(&mut self, mapping: &str) -> MappingStatus {
        self.mapping_calls.set(self.mapping_calls.get() + 1);
        if self.reject_mappings {
            return MappingStatus::Rejected;
        }
        let Ok(guid) = guid_prefix(mapping).parse::<Guid>() else {
            return MappingStatus::Rejected;
        };
        let has_name = mapping
            .split(',')
            .nth(1)
            .is_some_and(|name| !name.is_empty());
        if !has_name {
            return MappingStatus::Rejected;
        }
        // Once a mapping exists SDL treats the device as a gamepad.
        for device in self.devices.iter_mut().filter(|d| d.guid == guid) {
            device.gamepad = true;
        }
        match self.mappings.insert(guid, mapping.to_string()) {
            Some(_) => MappingStatus::Updated,
            None => MappingStatus::Added,
        }
    }

    fn mapping_for_guid(&self, guid: &Guid) -> Option<String> {
        self.mapping_calls.set(self.mapping_calls.get() + 1);
        self.mappings.get(guid).cloned()
    }

    fn platform(&self) -> &str {
        "Linux"
    }
}
