use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, warn};
use sdl2::event::Event;

use padbind_joystick::{JoystickModule, MappingBackend};

use crate::backend::SdlBackend;
use crate::command::Command;
use crate::events::JoystickEvent;
use crate::manager::Inner;
use crate::types::JoystickInfo;

type Module = JoystickModule<SdlBackend>;

/// Starts the SDL2-backed runtime thread that owns the joystick module.
///
/// `ready_tx` receives the outcome of initialization once the initial
/// mappings are loaded and connected devices are enumerated.
pub(crate) fn start_runtime_thread(
    inner: Arc<Inner>,
    cmd_rx: Receiver<Command>,
    initial_mappings: Option<String>,
    ready_tx: mpsc::Sender<Result<(), String>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // SDL must live entirely within this thread
        let sdl_ctx = match sdl2::init() {
            Ok(ctx) => ctx,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
        let joystick_subsystem = match sdl_ctx.joystick() {
            Ok(j) => j,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
        let controller_subsystem = match sdl_ctx.game_controller() {
            Ok(c) => c,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
        let mut event_pump = match sdl_ctx.event_pump() {
            Ok(p) => p,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        let backend = SdlBackend::new(joystick_subsystem, controller_subsystem);
        let mut module = Module::new(backend);
        if let Some(mappings) = initial_mappings {
            match module.load_gamepad_mappings(&mappings) {
                Ok(count) => debug!("installed {count} initial mappings"),
                Err(e) => warn!("initial mappings: {e}"),
            }
        }
        run(&inner, &cmd_rx, &mut event_pump, module, ready_tx);
    })
}

fn run(
    inner: &Inner,
    cmd_rx: &Receiver<Command>,
    event_pump: &mut sdl2::EventPump,
    mut module: Module,
    ready_tx: mpsc::Sender<Result<(), String>>,
) {
    refresh_snapshot(inner, &module);
    for index in 0..module.joystick_count() {
        if let Some(stick) = module.joystick(index) {
            broadcast(inner, JoystickEvent::Connected(JoystickInfo::new(index, stick)));
        }
    }
    let _ = ready_tx.send(Ok(()));

    loop {
        // Wait for an SDL event or timeout to reduce idle CPU usage
        if let Some(event) = event_pump.wait_event_timeout(10) {
            handle_event(inner, &mut module, event);
            for event in event_pump.poll_iter() {
                handle_event(inner, &mut module, event);
            }
        }

        loop {
            match cmd_rx.try_recv() {
                Ok(Command::Shutdown) | Err(TryRecvError::Disconnected) => {
                    debug!("joystick runtime shutting down");
                    // Dropping the module closes every handle.
                    drop(module);
                    if let Ok(mut snapshot) = inner.joysticks.write() {
                        snapshot.clear();
                    }
                    return;
                }
                Ok(cmd) => handle_command(inner, &mut module, cmd),
                Err(TryRecvError::Empty) => break,
            }
        }
    }
}

fn handle_event(inner: &Inner, module: &mut Module, event: Event) {
    match event {
        Event::JoyDeviceAdded { which, .. } => {
            let Some(id) = module.connect_device(which) else {
                return;
            };
            refresh_snapshot(inner, module);
            if let Some(index) = module.index_of(id) {
                if let Some(stick) = module.joystick(index) {
                    broadcast(inner, JoystickEvent::Connected(JoystickInfo::new(index, stick)));
                }
            }
        }
        Event::JoyDeviceRemoved { which, .. } => {
            let Some((index, id)) = module.disconnect_instance(which) else {
                return;
            };
            refresh_snapshot(inner, module);
            if let Some(stick) = module.pooled_joystick(id) {
                let mut info = JoystickInfo::new(index, stick);
                info.instance_id = Some(which);
                broadcast(inner, JoystickEvent::Disconnected(info));
            }
        }
        _ => {}
    }
}

fn handle_command(inner: &Inner, module: &mut Module, cmd: Command) {
    match cmd {
        Command::SetMapping {
            guid,
            gamepad,
            joystick,
            reply,
        } => {
            let result = module.set_gamepad_mapping(&guid, gamepad, joystick);
            if matches!(result, Ok(true)) {
                mappings_changed(inner, module);
            }
            let _ = reply.send(result);
        }
        Command::GetMapping { guid, reply } => {
            let _ = reply.send(module.gamepad_mapping_string(&guid));
        }
        Command::LoadMappings { mappings, reply } => {
            let result = module.load_gamepad_mappings(&mappings);
            if result.is_ok() {
                mappings_changed(inner, module);
            }
            let _ = reply.send(result);
        }
        Command::SaveMappings { reply } => {
            let _ = reply.send(module.save_gamepad_mappings());
        }
        Command::Shutdown => {}
    }
}

fn mappings_changed(inner: &Inner, module: &Module) {
    debug!("mappings changed on {}", module.backend().platform());
    refresh_snapshot(inner, module);
    broadcast(inner, JoystickEvent::MappingsChanged);
}

fn refresh_snapshot(inner: &Inner, module: &Module) {
    let infos: Vec<JoystickInfo> = module
        .joysticks()
        .enumerate()
        .map(|(index, stick)| JoystickInfo::new(index, stick))
        .collect();
    if let Ok(mut snapshot) = inner.joysticks.write() {
        *snapshot = infos;
    }
}

pub(crate) fn broadcast(inner: &Inner, event: JoystickEvent) {
    if let Ok(mut subs) = inner.subscribers.lock() {
        subs.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
