use log::debug;

use crate::backend::{DeviceBackend, DeviceHandle, DeviceId, InstanceId};
use crate::guid::Guid;
use crate::store::MappingStore;

/// Stable logical index of a joystick.
///
/// Assigned once, on first sight of a device slot, and kept across
/// disconnects so application code can hold on to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JoystickId(usize);

impl JoystickId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A joystick record owned by the registry pool.
#[derive(Debug)]
pub struct LogicalJoystick<H> {
    id: JoystickId,
    guid: Guid,
    name: String,
    handle: Option<H>,
    instance_id: Option<InstanceId>,
    gamepad: bool,
}

impl<H> LogicalJoystick<H> {
    fn new(id: JoystickId, guid: Guid) -> Self {
        Self {
            id,
            guid,
            name: String::new(),
            handle: None,
            instance_id: None,
            gamepad: false,
        }
    }

    pub fn id(&self) -> JoystickId {
        self.id
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Name of the device last opened through this record.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_gamepad(&self) -> bool {
        self.gamepad
    }

    pub fn instance_id(&self) -> Option<InstanceId> {
        self.instance_id
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    fn close(&mut self) {
        // Dropping the handle closes the device.
        self.handle = None;
        self.instance_id = None;
    }
}

/// Every joystick ever seen plus the ordered subset currently connected.
#[derive(Debug)]
pub(crate) struct Registry<H> {
    pool: Vec<LogicalJoystick<H>>,
    active: Vec<JoystickId>,
}

impl<H: DeviceHandle> Registry<H> {
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Brings a connecting device into the active set.
    ///
    /// A disconnected record with the same GUID is reused before a new one
    /// is created. Duplicates of an already active device are detected after
    /// opening by comparing instance ids, in which case the active record is
    /// returned.
    pub fn add<B>(
        &mut self,
        backend: &mut B,
        store: &mut MappingStore,
        device: DeviceId,
    ) -> Option<JoystickId>
    where
        B: DeviceBackend<Handle = H>,
    {
        if !backend.is_valid_device(device) {
            debug!("device {device} out of range");
            return None;
        }
        let guid = backend.device_guid(device)?;

        let reused = self
            .pool
            .iter()
            .find(|stick| !stick.is_connected() && stick.guid == guid)
            .map(|stick| stick.id);
        let id = match reused {
            Some(id) => id,
            None => {
                let id = JoystickId(self.pool.len());
                self.pool.push(LogicalJoystick::new(id, guid));
                id
            }
        };

        self.remove(id);

        let handle = match backend.open(device) {
            Ok(handle) => handle,
            Err(e) => {
                debug!("{e}");
                return None;
            }
        };

        let instance = handle.instance_id();
        if let Some(existing) = self.find_active_instance(instance) {
            drop(handle);
            // Never a distinct identity: forget it. Fresh records are always
            // the last one pushed.
            if reused.is_none() {
                debug_assert_eq!(self.pool.len(), id.0 + 1);
                self.pool.pop();
            }
            debug!("device {device} is a duplicate of joystick {}", existing.0);
            return Some(existing);
        }

        let gamepad = backend.is_gamepad(device);
        if gamepad {
            store.mark_seen(guid);
        }

        let stick = &mut self.pool[id.0];
        stick.name = handle.name().to_string();
        stick.instance_id = Some(instance);
        stick.handle = Some(handle);
        stick.gamepad = gamepad;

        self.active.push(id);
        Some(id)
    }

    /// Closes the device and drops it from the active set. The record stays
    /// pooled for reuse.
    pub fn remove(&mut self, id: JoystickId) {
        let Some(pos) = self.active.iter().position(|active| *active == id) else {
            return;
        };
        self.active.remove(pos);
        if let Some(stick) = self.pool.get_mut(id.0) {
            stick.close();
        }
    }

    /// Marks active joysticks of `guid` as gamepads when the backend now
    /// reports them as such. Returns how many records changed.
    pub fn refresh_gamepads<B>(&mut self, backend: &mut B, guid: &Guid) -> usize
    where
        B: DeviceBackend<Handle = H>,
    {
        let mut changed = 0;
        for device in backend.enumerate_devices() {
            if !backend.is_gamepad(device) || backend.device_guid(device) != Some(*guid) {
                continue;
            }
            let Some(instance) = backend.device_instance_id(device) else {
                continue;
            };
            for id in &self.active {
                let stick = &mut self.pool[id.0];
                if stick.guid == *guid && stick.instance_id == Some(instance) && !stick.gamepad {
                    stick.gamepad = true;
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn joystick(&self, index: usize) -> Option<&LogicalJoystick<H>> {
        self.active.get(index).map(|id| &self.pool[id.0])
    }

    pub fn index_of(&self, id: JoystickId) -> Option<usize> {
        self.active.iter().position(|active| *active == id)
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }

    pub fn from_instance_id(&self, instance: InstanceId) -> Option<&LogicalJoystick<H>> {
        self.find_active_instance(instance).map(|id| &self.pool[id.0])
    }

    /// Any pooled record, connected or not.
    pub fn pooled(&self, id: JoystickId) -> Option<&LogicalJoystick<H>> {
        self.pool.get(id.0)
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn active(&self) -> impl Iterator<Item = &LogicalJoystick<H>> {
        self.active.iter().map(move |id| &self.pool[id.0])
    }

    /// Name of a known device of this GUID, preferring connected ones.
    pub fn name_for_guid(&self, guid: &Guid) -> Option<&str> {
        self.pool
            .iter()
            .filter(|stick| stick.guid == *guid && !stick.name.is_empty())
            .max_by_key(|stick| stick.is_connected())
            .map(|stick| stick.name.as_str())
    }

    /// Closes every handle, active or not.
    pub fn close_all(&mut self) {
        self.active.clear();
        for stick in &mut self.pool {
            stick.close();
        }
    }

    fn find_active_instance(&self, instance: InstanceId) -> Option<JoystickId> {
        self.active
            .iter()
            .copied()
            .find(|id| self.pool[id.0].instance_id == Some(instance))
    }
}
