use log::debug;

use crate::backend::{DeviceBackend, DeviceId, InstanceId, MappingBackend, MappingStatus};
use crate::guid::{Guid, GUID_TEXT_LEN};
use crate::input::{GamepadInput, JoystickInput};
use crate::mapping::{ensure_trailing_comma, rebind};
use crate::registry::{JoystickId, LogicalJoystick, Registry};
use crate::store::{canonical_mapping, MappingStore};
use crate::{Error, Result};

const DEFAULT_CONTROLLER_NAME: &str = "Controller";

/// Joystick registry and gamepad mapping database over a backend.
///
/// Application-visible indices (`joystick(i)`) follow connection order and
/// shift as devices come and go. [`JoystickId`]s never change: a device
/// that reconnects gets its old id back.
pub struct JoystickModule<B: DeviceBackend + MappingBackend> {
    backend: B,
    registry: Registry<B::Handle>,
    store: MappingStore,
}

impl<B: DeviceBackend + MappingBackend> JoystickModule<B> {
    /// Creates the module and opens every device that is already connected.
    pub fn new(backend: B) -> Self {
        let mut module = Self {
            backend,
            registry: Registry::new(),
            store: MappingStore::new(),
        };
        for device in module.backend.enumerate_devices() {
            module.add_joystick(device);
        }
        module
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Handles a connect notification. Returns `None` if the device id is
    /// out of range or the device cannot be opened.
    pub fn add_joystick(&mut self, device: DeviceId) -> Option<JoystickId> {
        let id = self
            .registry
            .add(&mut self.backend, &mut self.store, device)?;
        debug!("joystick {} connected from device {device}", id.index());
        Some(id)
    }

    /// Handles a disconnect notification.
    pub fn remove_joystick(&mut self, id: JoystickId) {
        self.registry.remove(id);
    }

    /// Handles a device-added event. Returns the id only when the active set
    /// grew, so repeated events for an open device yield `None`.
    pub fn connect_device(&mut self, device: DeviceId) -> Option<JoystickId> {
        let before = self.joystick_count();
        let id = self.add_joystick(device)?;
        (self.joystick_count() > before).then_some(id)
    }

    /// Handles a device-removed event. Returns the index the joystick held
    /// and its id, or `None` if no active joystick has that instance id.
    pub fn disconnect_instance(&mut self, instance: InstanceId) -> Option<(usize, JoystickId)> {
        let id = self.joystick_from_instance_id(instance)?.id();
        let index = self.index_of(id)?;
        self.remove_joystick(id);
        debug!("joystick {} disconnected from instance {instance}", id.index());
        Some((index, id))
    }

    /// Active joystick at `index`, in connection order.
    pub fn joystick(&self, index: usize) -> Option<&LogicalJoystick<B::Handle>> {
        self.registry.joystick(index)
    }

    /// Position of `id` in the active set, `None` if disconnected.
    pub fn index_of(&self, id: JoystickId) -> Option<usize> {
        self.registry.index_of(id)
    }

    pub fn joystick_count(&self) -> usize {
        self.registry.count()
    }

    pub fn joystick_from_instance_id(
        &self,
        instance: InstanceId,
    ) -> Option<&LogicalJoystick<B::Handle>> {
        self.registry.from_instance_id(instance)
    }

    /// Looks up any record ever created, including disconnected ones.
    pub fn pooled_joystick(&self, id: JoystickId) -> Option<&LogicalJoystick<B::Handle>> {
        self.registry.pooled(id)
    }

    pub fn joysticks(&self) -> impl Iterator<Item = &LogicalJoystick<B::Handle>> {
        self.registry.active()
    }

    /// Class GUID of a connecting device.
    pub fn device_guid(&self, device: DeviceId) -> Option<Guid> {
        if !self.backend.is_valid_device(device) {
            return None;
        }
        self.backend.device_guid(device)
    }

    pub fn recent_gamepad_guids(&self) -> impl Iterator<Item = &Guid> {
        self.store.recent()
    }

    /// Binds a physical joystick input to a logical gamepad input in the
    /// mapping for `guid`.
    ///
    /// Returns `Ok(false)` when the backend rejects the resulting mapping.
    pub fn set_gamepad_mapping(
        &mut self,
        guid: &str,
        gamepad_input: GamepadInput,
        joystick_input: JoystickInput,
    ) -> Result<bool> {
        if guid.len() != GUID_TEXT_LEN {
            return Err(Error::InvalidGuid(guid.to_string()));
        }
        let guid: Guid = guid.parse()?;
        let token = joystick_input.token()?;

        let current = match self.backend.mapping_for_guid(&guid) {
            Some(mapping) => ensure_trailing_comma(&mapping),
            None => {
                let name = self
                    .registry
                    .name_for_guid(&guid)
                    .unwrap_or(DEFAULT_CONTROLLER_NAME)
                    .replace(',', " ");
                format!("{guid},{name},")
            }
        };

        let mapping = rebind(&current, gamepad_input.as_str(), &token);
        let status = self.backend.add_mapping(&mapping);
        debug!("set mapping {guid} {}:{token} -> {status:?}", gamepad_input.as_str());

        if status.is_success() {
            self.store.mark_seen(guid);
        }
        if status == MappingStatus::Added {
            self.registry.refresh_gamepads(&mut self.backend, &guid);
        }
        Ok(status.is_success())
    }

    /// Canonical mapping text for `guid`, or an empty string if unknown.
    pub fn gamepad_mapping_string(&self, guid: &str) -> String {
        let Ok(guid) = guid.parse::<Guid>() else {
            return String::new();
        };
        canonical_mapping(&self.backend, &guid).unwrap_or_default()
    }

    /// Installs a newline-separated mapping database. Returns the number of
    /// lines installed.
    pub fn load_gamepad_mappings(&mut self, mappings: &str) -> Result<usize> {
        let installed = self.store.load(&mut self.backend, mappings)?;
        for guid in &installed {
            self.registry.refresh_gamepads(&mut self.backend, guid);
        }
        Ok(installed.len())
    }

    /// Mappings of every gamepad seen this session, one line each.
    pub fn save_gamepad_mappings(&self) -> String {
        self.store.save(&self.backend)
    }
}

impl<B: DeviceBackend + MappingBackend> Drop for JoystickModule<B> {
    fn drop(&mut self) {
        self.registry.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{GamepadAxis, GamepadButton, HatDirection};
    use crate::mock::MockBackend;

    const PAD: &str = "030000005e0400008e02000014010000";
    const STICK: &str = "030000006d04000015c2000010010000";

    fn left_trigger() -> GamepadInput {
        GamepadInput::Axis(GamepadAxis::LeftTrigger)
    }

    #[test]
    fn new_opens_connected_devices() {
        let mut backend = MockBackend::new();
        backend.plug(PAD, "Pad", 1);
        backend.plug(STICK, "Stick", 2);
        let module = JoystickModule::new(backend);
        assert_eq!(module.joystick_count(), 2);
        assert_eq!(module.joystick(1).unwrap().name(), "Stick");
    }

    #[test]
    fn set_mapping_builds_skeleton_for_unknown_guid() {
        let mut module = JoystickModule::new(MockBackend::new());
        let ok = module
            .set_gamepad_mapping(PAD, left_trigger(), JoystickInput::Axis(2))
            .expect("valid mapping");
        assert!(ok);
        let mapping = module.gamepad_mapping_string(PAD);
        assert!(
            mapping.starts_with(&format!("{PAD},Controller,lefttrigger:a2,")),
            "{mapping}"
        );
        assert_eq!(mapping, format!("{PAD},Controller,lefttrigger:a2,platform:Linux,"));
    }

    #[test]
    fn set_mapping_uses_known_device_name() {
        let mut backend = MockBackend::new();
        backend.plug(STICK, "Flight, Stick", 1);
        let mut module = JoystickModule::new(backend);
        module
            .set_gamepad_mapping(
                STICK,
                GamepadInput::Button(GamepadButton::A),
                JoystickInput::Button(0),
            )
            .unwrap();
        assert_eq!(
            module.gamepad_mapping_string(STICK),
            format!("{STICK},Flight  Stick,a:b0,platform:Linux,")
        );
    }

    #[test]
    fn short_guid_fails_before_backend_calls() {
        let mut module = JoystickModule::new(MockBackend::new());
        let result =
            module.set_gamepad_mapping("short", left_trigger(), JoystickInput::Axis(2));
        assert!(matches!(result, Err(Error::InvalidGuid(_))));
        assert_eq!(module.backend().mapping_calls(), 0);
    }

    #[test]
    fn invalid_input_fails_before_backend_calls() {
        let mut module = JoystickModule::new(MockBackend::new());
        let result = module.set_gamepad_mapping(
            PAD,
            left_trigger(),
            JoystickInput::Hat {
                index: -1,
                direction: HatDirection::Up,
            },
        );
        assert!(matches!(result, Err(Error::InvalidInput)));
        assert_eq!(module.backend().mapping_calls(), 0);
        assert_eq!(module.save_gamepad_mappings(), "");
    }

    #[test]
    fn rejected_mapping_returns_false() {
        let mut backend = MockBackend::new();
        backend.reject_mappings = true;
        let mut module = JoystickModule::new(backend);
        let ok = module
            .set_gamepad_mapping(PAD, left_trigger(), JoystickInput::Axis(2))
            .unwrap();
        assert!(!ok);
        assert_eq!(module.recent_gamepad_guids().count(), 0);
    }

    #[test]
    fn set_mapping_moves_physical_input() {
        let mut module = JoystickModule::new(MockBackend::new());
        module
            .load_gamepad_mappings(&format!("{PAD},Pad,a:b0,b:b1,platform:Linux,"))
            .unwrap();
        module
            .set_gamepad_mapping(
                PAD,
                GamepadInput::Button(GamepadButton::Guide),
                JoystickInput::Button(1),
            )
            .unwrap();
        assert_eq!(
            module.gamepad_mapping_string(PAD),
            format!("{PAD},Pad,a:b0,guide:b1,platform:Linux,")
        );
    }

    #[test]
    fn new_mapping_turns_joystick_into_gamepad() {
        let mut backend = MockBackend::new();
        backend.plug(STICK, "Stick", 5);
        let mut module = JoystickModule::new(backend);
        assert!(!module.joystick(0).unwrap().is_gamepad());
        module
            .set_gamepad_mapping(STICK, left_trigger(), JoystickInput::Axis(3))
            .unwrap();
        assert!(module.joystick(0).unwrap().is_gamepad());
    }

    #[test]
    fn unknown_mapping_is_empty() {
        let module = JoystickModule::new(MockBackend::new());
        assert_eq!(module.gamepad_mapping_string(PAD), "");
        assert_eq!(module.gamepad_mapping_string("nope"), "");
    }

    #[test]
    fn load_comment_and_valid_line() {
        let mut module = JoystickModule::new(MockBackend::new());
        let installed = module
            .load_gamepad_mappings(&format!("#comment\n{PAD},Pad,a:b0,"))
            .unwrap();
        assert_eq!(installed, 1);
        assert_eq!(module.backend().installed_count(), 1);
    }

    #[test]
    fn load_empty_string() {
        let mut module = JoystickModule::new(MockBackend::new());
        assert_eq!(module.load_gamepad_mappings("").unwrap(), 0);
        assert_eq!(module.backend().installed_count(), 0);
    }

    #[test]
    fn save_then_load_round_trips_recent_guids() {
        let mut backend = MockBackend::new();
        backend.plug_gamepad(PAD, "Pad", 1);
        let mut module = JoystickModule::new(backend);
        module
            .load_gamepad_mappings(&format!("{PAD},Pad,a:b0,b:b1,"))
            .unwrap();
        module
            .set_gamepad_mapping(STICK, left_trigger(), JoystickInput::Axis(2))
            .unwrap();
        let saved = module.save_gamepad_mappings();
        assert_eq!(saved.lines().count(), 2);

        let mut restored = JoystickModule::new(MockBackend::new());
        restored.load_gamepad_mappings(&saved).unwrap();
        let before: Vec<_> = module.recent_gamepad_guids().copied().collect();
        let after: Vec<_> = restored.recent_gamepad_guids().copied().collect();
        assert_eq!(before, after);
        assert_eq!(restored.save_gamepad_mappings(), saved);
    }

    #[test]
    fn joystick_ids_survive_disconnect() {
        let mut backend = MockBackend::new();
        backend.plug(PAD, "Pad", 1);
        backend.plug(STICK, "Stick", 2);
        let mut module = JoystickModule::new(backend);
        let pad = module.joystick(0).unwrap().id();
        module.remove_joystick(pad);
        assert_eq!(module.index_of(pad), None);
        assert_eq!(module.joystick_count(), 1);
        let record = module.pooled_joystick(pad).unwrap();
        assert!(!record.is_connected());
        assert_eq!(record.guid().to_text(), PAD);

        assert_eq!(module.add_joystick(0), Some(pad));
        assert_eq!(module.index_of(pad), Some(1));
        assert_eq!(module.joystick_from_instance_id(1).unwrap().id(), pad);
    }

    #[test]
    fn repeated_connect_events_are_ignored() {
        let mut backend = MockBackend::new();
        let pad = backend.plug(PAD, "Pad", 1);
        let mut module = JoystickModule::new(backend);
        let pool = module.registry.pool_len();
        assert_eq!(module.connect_device(pad), None);
        assert_eq!(module.connect_device(pad), None);
        assert_eq!(module.joystick_count(), 1);
        assert_eq!(module.registry.pool_len(), pool);
        assert_eq!(module.connect_device(7), None);
    }

    #[test]
    fn connect_after_startup_reports_new_joystick() {
        let mut module = JoystickModule::new(MockBackend::new());
        assert_eq!(module.joystick_count(), 0);
        let stick = module.backend.plug(STICK, "Stick", 4);
        let id = module.connect_device(stick).expect("new joystick");
        assert_eq!(module.index_of(id), Some(0));
        assert_eq!(module.connect_device(stick), None);
    }

    #[test]
    fn disconnect_instance_reports_former_index() {
        let mut backend = MockBackend::new();
        let pad = backend.plug(PAD, "Pad", 1);
        backend.plug(STICK, "Stick", 2);
        let mut module = JoystickModule::new(backend);
        let stick = module.joystick(1).unwrap().id();

        assert_eq!(module.disconnect_instance(9), None);
        assert_eq!(module.disconnect_instance(2), Some((1, stick)));
        assert_eq!(module.joystick_count(), 1);
        assert_eq!(module.disconnect_instance(2), None);
        assert_eq!(module.pooled_joystick(stick).unwrap().name(), "Stick");

        let first = module.joystick(0).unwrap().id();
        assert_eq!(module.disconnect_instance(1), Some((0, first)));
        assert_eq!(module.joystick_count(), 0);
        assert_eq!(module.connect_device(pad), Some(first));
    }

    #[test]
    fn set_mapping_keeps_name_that_looks_like_a_clause() {
        let mut backend = MockBackend::new();
        backend.plug(PAD, "Pad:b0", 1);
        let mut module = JoystickModule::new(backend);
        module
            .set_gamepad_mapping(
                PAD,
                GamepadInput::Button(GamepadButton::A),
                JoystickInput::Button(0),
            )
            .unwrap();
        assert_eq!(
            module.gamepad_mapping_string(PAD),
            format!("{PAD},Pad:b0,a:b0,platform:Linux,")
        );
    }

    #[test]
    fn device_guid_of_invalid_device_is_none() {
        let mut backend = MockBackend::new();
        backend.plug(PAD, "Pad", 1);
        let module = JoystickModule::new(backend);
        assert_eq!(module.device_guid(0).map(|g| g.to_text()).as_deref(), Some(PAD));
        assert!(module.device_guid(9).is_none());
    }

    #[test]
    fn drop_closes_every_handle() {
        let mut backend = MockBackend::new();
        backend.plug(PAD, "Pad", 1);
        backend.plug(STICK, "Stick", 2);
        let open = backend.open_handles();
        let mut module = JoystickModule::new(backend);
        let first = module.joystick(0).unwrap().id();
        module.remove_joystick(first);
        assert_eq!(open.get(), 1);
        drop(module);
        assert_eq!(open.get(), 0);
    }
}
