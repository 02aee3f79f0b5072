//! `portable-pty` backed process host.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread;
use std::time::Duration;

use portable_pty::{native_pty_system, ChildKiller, CommandBuilder, MasterPty, PtySize};
use tokio::sync::mpsc;
use ttygate_common::{Geometry, DEFAULT_TERM};

use super::types::{
    ProcessHost, ProcessSpawner, PtyError, PtyEvent, SpawnRequest, SpawnedProcess,
    PTY_EVENT_QUEUE, PTY_READ_CHUNK,
};

/// How long the waiter gives an idle reader to flush remaining output after
/// the child exits. A grandchild holding the PTY open must not delay
/// `Exited` forever. A reader stalled on a full queue is always waited for,
/// so `Exited` stays last.
const READER_DRAIN_GRACE: Duration = Duration::from_millis(250);

fn pty_size(geometry: Geometry) -> PtySize {
    PtySize {
        rows: geometry.rows,
        cols: geometry.cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

/// Build a `CommandBuilder` whose environment is exactly the snapshot.
fn build_command(request: &SpawnRequest, term: &str) -> CommandBuilder {
    let mut cmd = CommandBuilder::new(&request.program);
    cmd.args(&request.args);

    cmd.env_clear();
    for (key, value) in request.env.iter() {
        cmd.env(key, value);
    }
    cmd.env("TERM", term);

    match &request.working_directory {
        Some(dir) => cmd.cwd(dir),
        None => {
            if let Ok(dir) = std::env::current_dir() {
                cmd.cwd(dir);
            }
        }
    }

    cmd
}

fn spawn_thread<F>(name: &str, f: F) -> Result<(), PtyError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map(|_| ())
        .map_err(|e| PtyError::SpawnFailed(format!("failed to spawn {name} thread: {e}")))
}

// =============================================================================
// SPAWNER
// =============================================================================

/// Spawns processes in native pseudo-terminals.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePtySpawner;

impl ProcessSpawner for NativePtySpawner {
    fn spawn(&self, request: SpawnRequest) -> Result<SpawnedProcess, PtyError> {
        if !request.geometry.is_valid() {
            return Err(PtyError::InvalidGeometry(request.geometry));
        }
        let term = if request.term.trim().is_empty() {
            DEFAULT_TERM
        } else {
            request.term.as_str()
        };

        let pair = native_pty_system()
            .openpty(pty_size(request.geometry))
            .map_err(|e| PtyError::SpawnFailed(format!("failed to open PTY: {e}")))?;

        let cmd = build_command(&request, term);
        let mut child = pair.slave.spawn_command(cmd).map_err(|e| {
            PtyError::SpawnFailed(format!("failed to spawn '{}': {e}", request.program))
        })?;

        // Only the master side stays open in this process.
        drop(pair.slave);

        let pid = child.process_id();
        let mut killer = child.clone_killer();
        let abort = |killer: &mut Box<dyn ChildKiller + Send + Sync>, err: PtyError| {
            let _ = killer.kill();
            err
        };

        let mut writer = match pair.master.take_writer() {
            Ok(w) => w,
            Err(e) => {
                return Err(abort(
                    &mut killer,
                    PtyError::SpawnFailed(format!("failed to take PTY writer: {e}")),
                ))
            }
        };
        let mut reader = match pair.master.try_clone_reader() {
            Ok(r) => r,
            Err(e) => {
                return Err(abort(
                    &mut killer,
                    PtyError::SpawnFailed(format!("failed to clone PTY reader: {e}")),
                ))
            }
        };

        let (event_tx, event_rx) = mpsc::channel::<PtyEvent>(PTY_EVENT_QUEUE);
        let (drained_tx, drained_rx) = std_mpsc::channel::<()>();
        let (input_tx, input_rx) = std_mpsc::channel::<Vec<u8>>();
        let alive = Arc::new(AtomicBool::new(true));
        let reader_busy = Arc::new(AtomicBool::new(false));

        let output_tx = event_tx.clone();
        let busy = Arc::clone(&reader_busy);
        let reader_thread = spawn_thread("pty-reader", move || {
            let mut buf = [0u8; PTY_READ_CHUNK];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        // Blocks while the queue is full.
                        busy.store(true, Ordering::SeqCst);
                        let sent = output_tx.blocking_send(PtyEvent::Output(buf[..n].to_vec()));
                        busy.store(false, Ordering::SeqCst);
                        if sent.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("PTY reader stopped: {e}");
                        break;
                    }
                }
            }
            let _ = drained_tx.send(());
        });
        if let Err(e) = reader_thread {
            return Err(abort(&mut killer, e));
        }

        let writer_thread = spawn_thread("pty-writer", move || {
            for chunk in input_rx {
                if let Err(e) = writer.write_all(&chunk).and_then(|_| writer.flush()) {
                    tracing::debug!("PTY writer stopped: {e}");
                    break;
                }
            }
        });
        if let Err(e) = writer_thread {
            return Err(abort(&mut killer, e));
        }

        let exit_alive = Arc::clone(&alive);
        let waiter_thread = spawn_thread("pty-waiter", move || {
            let code = match child.wait() {
                Ok(status) => status.exit_code(),
                Err(e) => {
                    tracing::debug!("PTY wait error: {e}");
                    1
                }
            };
            exit_alive.store(false, Ordering::SeqCst);
            loop {
                match drained_rx.recv_timeout(READER_DRAIN_GRACE) {
                    Err(std_mpsc::RecvTimeoutError::Timeout)
                        if reader_busy.load(Ordering::SeqCst) => {}
                    _ => break,
                }
            }
            let _ = event_tx.blocking_send(PtyEvent::Exited(code));
        });
        if let Err(e) = waiter_thread {
            return Err(abort(&mut killer, e));
        }

        tracing::debug!(
            pid = ?pid,
            program = %request.program,
            geometry = %request.geometry,
            term,
            "spawned PTY process"
        );

        Ok(SpawnedProcess {
            host: Box::new(NativePtyHost {
                master: pair.master,
                killer,
                input_tx: Some(input_tx),
                alive,
                pid,
                geometry: request.geometry,
            }),
            events: event_rx,
        })
    }
}

// =============================================================================
// HOST
// =============================================================================

/// A process running in a native PTY.
///
/// Owns the master side of the PTY pair. Input goes through a writer
/// thread, output and exit arrive on the event stream returned at spawn.
pub struct NativePtyHost {
    master: Box<dyn MasterPty + Send>,
    killer: Box<dyn ChildKiller + Send + Sync>,
    input_tx: Option<std_mpsc::Sender<Vec<u8>>>,
    alive: Arc<AtomicBool>,
    pid: Option<u32>,
    geometry: Geometry,
}

impl ProcessHost for NativePtyHost {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && self.input_tx.is_some()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), PtyError> {
        if !self.is_alive() {
            return Err(PtyError::WriteFailed("process is not running".into()));
        }
        match &self.input_tx {
            Some(tx) => tx
                .send(data.to_vec())
                .map_err(|_| PtyError::WriteFailed("PTY writer has stopped".into())),
            None => Err(PtyError::WriteFailed("process is not running".into())),
        }
    }

    fn resize(&mut self, geometry: Geometry) -> Result<(), PtyError> {
        if !self.is_alive() {
            return Ok(());
        }
        if !geometry.is_valid() {
            return Err(PtyError::InvalidGeometry(geometry));
        }
        self.master
            .resize(pty_size(geometry))
            .map_err(|e| PtyError::ResizeFailed(e.to_string()))?;
        self.geometry = geometry;
        Ok(())
    }

    fn terminate(&mut self) {
        // Dropping the sender ends the writer thread.
        if self.input_tx.take().is_none() {
            return;
        }
        if self.alive.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.killer.kill() {
                tracing::debug!("PTY kill error (may already be dead): {e}");
            }
        }
    }
}

impl Drop for NativePtyHost {
    fn drop(&mut self) {
        self.terminate();
    }
}

// =============================================================================
// TESTS
// =============================================================================
