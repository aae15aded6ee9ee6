use sdl2::controller::MappingStatus as SdlMappingStatus;
use sdl2::joystick::{Guid as SdlGuid, Joystick};
use sdl2::{GameControllerSubsystem, JoystickSubsystem};

use padbind_joystick::{
    DeviceBackend, DeviceHandle, DeviceId, Error, Guid, InstanceId, MappingBackend,
    MappingStatus, Result,
};

/// An opened SDL joystick. Dropping it closes the device.
pub struct SdlJoystick {
    joystick: Joystick,
    name: String,
}

impl DeviceHandle for SdlJoystick {
    fn instance_id(&self) -> InstanceId {
        self.joystick.instance_id()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Device and mapping capabilities on top of the SDL2 subsystems.
///
/// Must stay on the thread that initialized SDL.
pub struct SdlBackend {
    joystick: JoystickSubsystem,
    controller: GameControllerSubsystem,
    platform: &'static str,
}

impl SdlBackend {
    pub fn new(joystick: JoystickSubsystem, controller: GameControllerSubsystem) -> Self {
        Self {
            joystick,
            controller,
            platform: sdl2::get_platform(),
        }
    }

    fn device_count(&self) -> u32 {
        self.joystick.num_joysticks().unwrap_or(0)
    }
}

fn to_sdl_guid(guid: &Guid) -> Option<SdlGuid> {
    SdlGuid::from_string(&guid.to_text()).ok()
}

impl DeviceBackend for SdlBackend {
    type Handle = SdlJoystick;

    fn enumerate_devices(&self) -> Vec<DeviceId> {
        (0..self.device_count()).collect()
    }

    fn is_valid_device(&self, device: DeviceId) -> bool {
        device < self.device_count()
    }

    fn device_guid(&self, device: DeviceId) -> Option<Guid> {
        let guid = self.joystick.device_guid(device).ok()?;
        Some(Guid::from_text(&guid.string()))
    }

    fn open(&mut self, device: DeviceId) -> Result<SdlJoystick> {
        let joystick = self
            .joystick
            .open(device)
            .map_err(|e| Error::Open(device, e.to_string()))?;
        let name = joystick.name();
        Ok(SdlJoystick { joystick, name })
    }

    fn is_gamepad(&self, device: DeviceId) -> bool {
        self.controller.is_game_controller(device)
    }

    fn device_instance_id(&mut self, device: DeviceId) -> Option<InstanceId> {
        // SDL reference counts opens, so this leaves existing handles alone.
        self.joystick.open(device).ok().map(|js| js.instance_id())
    }
}

impl MappingBackend for SdlBackend {
    fn add_mapping(&mut self, mapping: &str) -> MappingStatus {
        match self.controller.add_mapping(mapping) {
            Ok(SdlMappingStatus::Added) => MappingStatus::Added,
            Ok(SdlMappingStatus::Updated) => MappingStatus::Updated,
            Err(e) => {
                log::debug!("SDL rejected mapping: {e}");
                MappingStatus::Rejected
            }
        }
    }

    fn mapping_for_guid(&self, guid: &Guid) -> Option<String> {
        let guid = to_sdl_guid(guid)?;
        self.controller.mapping_for_guid(guid).ok()
    }

    fn platform(&self) -> &str {
        self.platform
    }
}
