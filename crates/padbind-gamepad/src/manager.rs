use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Sender};
use log::warn;

use padbind_joystick::{GamepadInput, JoystickInput};

use crate::command::Command;
use crate::events::{EventReceiver, JoystickEvent};
use crate::runtime::start_runtime_thread;
use crate::types::JoystickInfo;
use crate::{Error, Result};

/// Shared state used by the manager and the runtime loop.
pub(crate) struct Inner {
    pub subscribers: Mutex<Vec<Sender<JoystickEvent>>>,
    pub joysticks: RwLock<Vec<JoystickInfo>>,
    pub cmd_tx: Sender<Command>,
}

/// Owns the joystick runtime thread and talks to it over channels.
///
/// Every request is served in order by the runtime thread, so the manager
/// can be shared between threads.
pub struct JoystickManager {
    inner: Arc<Inner>,
    thread: Option<JoinHandle<()>>,
}

impl JoystickManager {
    /// Starts the runtime thread, installs `initial_mappings` and opens every
    /// connected joystick. Blocks briefly until that completes (up to 1s).
    pub fn new(initial_mappings: Option<String>) -> Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        let inner = Arc::new(Inner {
            subscribers: Mutex::new(Vec::new()),
            joysticks: RwLock::new(Vec::new()),
            cmd_tx,
        });

        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let thread = start_runtime_thread(inner.clone(), cmd_rx, initial_mappings, ready_tx);

        // Best-effort wait for the initial enumeration.
        match ready_rx.recv_timeout(Duration::from_secs(1)) {
            Ok(Err(e)) => return Err(Error::BackendInit(e)),
            Ok(Ok(())) => {}
            Err(_) => warn!("joystick runtime is slow to start"),
        }

        Ok(Self {
            inner,
            thread: Some(thread),
        })
    }

    /// Subscribes to joystick events. Dropped subscribers are cleaned automatically.
    pub fn subscribe(&self) -> EventReceiver {
        subscribe(&self.inner)
    }

    /// Returns a snapshot of the active joysticks in connection order.
    pub fn joysticks(&self) -> Vec<JoystickInfo> {
        if let Ok(list) = self.inner.joysticks.read() {
            return list.clone();
        }
        Vec::new()
    }

    pub fn joystick(&self, index: usize) -> Option<JoystickInfo> {
        self.inner.joysticks.read().ok()?.get(index).cloned()
    }

    pub fn joystick_count(&self) -> usize {
        self.inner.joysticks.read().map(|list| list.len()).unwrap_or(0)
    }

    /// See [`padbind_joystick::JoystickModule::set_gamepad_mapping`].
    pub fn set_gamepad_mapping(
        &self,
        guid: &str,
        gamepad: GamepadInput,
        joystick: JoystickInput,
    ) -> Result<bool> {
        let guid = guid.to_string();
        let result = self.request(|reply| Command::SetMapping {
            guid,
            gamepad,
            joystick,
            reply,
        })?;
        Ok(result?)
    }

    pub fn gamepad_mapping_string(&self, guid: &str) -> Result<String> {
        let guid = guid.to_string();
        self.request(|reply| Command::GetMapping { guid, reply })
    }

    /// Installs a mapping database. Returns the number of lines installed.
    pub fn load_gamepad_mappings(&self, mappings: &str) -> Result<usize> {
        let mappings = mappings.to_string();
        let result = self.request(|reply| Command::LoadMappings { mappings, reply })?;
        Ok(result?)
    }

    pub fn save_gamepad_mappings(&self) -> Result<String> {
        self.request(|reply| Command::SaveMappings { reply })
    }

    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = bounded(1);
        self.inner
            .cmd_tx
            .send(make(reply_tx))
            .map_err(|_| Error::RuntimeStopped)?;
        reply_rx.recv().map_err(|_| Error::RuntimeStopped)
    }
}

impl Drop for JoystickManager {
    fn drop(&mut self) {
        let _ = self.inner.cmd_tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub(crate) fn subscribe(inner: &Inner) -> EventReceiver {
    let (tx, rx) = unbounded();
    if let Ok(mut subs) = inner.subscribers.lock() {
        subs.push(tx);
    }
    rx
}
