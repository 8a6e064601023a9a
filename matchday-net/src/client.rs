//! Live session: connection, receiver thread, and shutdown sequencing.
//!
//! Two contexts touch the session for its lifetime: the caller's command
//! path and one receiver thread blocked on the next frame. Both go through
//! a single mutex around the engine; each logical operation holds the lock
//! for its full duration and releases it before blocking on the socket. The
//! termination flag is the only state read without the lock.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};

use matchday_types::{render, MatchFile};

use crate::frame::Frame;
use crate::framing::{read_frame, write_frame};
use crate::protocol::{Engine, SessionEvent};

/// Connection parameters for a login.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    /// Value for the CONNECT `host` header; empty means use `host`.
    pub vhost: String,
    pub accept_version: String,
}

/// An authenticated session over one TCP connection.
pub struct Session {
    writer: BufWriter<TcpStream>,
    /// Second handle on the socket, kept to force the receiver's blocking
    /// read to return at shutdown.
    stream: TcpStream,
    engine: Arc<Mutex<Engine>>,
    terminate: Arc<AtomicBool>,
    receiver: Option<JoinHandle<()>>,
}

impl Session {
    /// Connect, start the receiver thread, then send the CONNECT frame.
    ///
    /// `on_event` runs on the receiver thread for every notification the
    /// session produces.
    pub fn connect<F>(
        options: &ConnectOptions,
        login: &str,
        passcode: &str,
        on_event: F,
    ) -> io::Result<Session>
    where
        F: FnMut(SessionEvent) + Send + 'static,
    {
        let stream = TcpStream::connect((options.host.as_str(), options.port))?;
        let read_stream = stream.try_clone()?;
        let shutdown_handle = stream.try_clone()?;

        let mut engine = Engine::new(&options.accept_version);
        let vhost = if options.vhost.is_empty() {
            options.host.as_str()
        } else {
            options.vhost.as_str()
        };
        let connect_frame = engine.connect_frame(vhost, login, passcode);

        let engine = Arc::new(Mutex::new(engine));
        let terminate = Arc::new(AtomicBool::new(false));

        let receiver = {
            let engine = Arc::clone(&engine);
            let terminate = Arc::clone(&terminate);
            thread::spawn(move || receiver_loop(read_stream, engine, terminate, on_event))
        };

        info!("connected to {}:{} as {}", options.host, options.port, login);

        let mut session = Session {
            writer: BufWriter::new(stream),
            stream: shutdown_handle,
            engine,
            terminate,
            receiver: Some(receiver),
        };
        if let Err(e) = session.send(&connect_frame) {
            session.shutdown();
            return Err(e);
        }
        Ok(session)
    }

    /// Subscribe to a channel. Returns false (and sends nothing) when the
    /// channel is already joined.
    pub fn join(&mut self, channel: &str) -> io::Result<bool> {
        let frame = self.lock_engine().subscribe(channel);
        match frame {
            Some(frame) => self.send(&frame).map(|_| true),
            None => Ok(false),
        }
    }

    /// Leave a channel. Returns false (and sends nothing) when the channel
    /// was not joined.
    pub fn leave(&mut self, channel: &str) -> io::Result<bool> {
        let frame = self.lock_engine().unsubscribe(channel);
        match frame {
            Some(frame) => self.send(&frame).map(|_| true),
            None => Ok(false),
        }
    }

    /// Send one report frame per event, in file order.
    pub fn report(&mut self, report: &MatchFile) -> io::Result<usize> {
        let frames: Vec<Frame> = {
            let engine = self.lock_engine();
            report
                .events
                .iter()
                .map(|event| engine.report_frame(&report.team_a, &report.team_b, event))
                .collect()
        };
        for frame in &frames {
            self.send(frame)?;
        }
        Ok(frames.len())
    }

    /// Request a graceful logout. Termination is driven by the receipt.
    pub fn logout(&mut self) -> io::Result<()> {
        let frame = self.lock_engine().disconnect_frame();
        self.send(&frame)
    }

    /// Render the summary for a (channel, reporter) pair, if any reports
    /// arrived for it. Local only; touches no network state.
    pub fn summary(&self, channel: &str, reporter: &str) -> Option<String> {
        let engine = self.lock_engine();
        engine.record(channel, reporter).map(render)
    }

    /// True once the session reached its terminating state (logout receipt,
    /// server error, or lost transport).
    pub fn is_terminated(&self) -> bool {
        self.terminate.load(Ordering::Relaxed)
    }

    /// Close the transport first so the receiver's blocking read returns,
    /// then wait for the receiver to finish.
    pub fn shutdown(mut self) {
        self.terminate.store(true, Ordering::Relaxed);
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!("socket already closed: {}", e);
        }
        if let Some(receiver) = self.receiver.take() {
            if receiver.join().is_err() {
                warn!("receiver thread panicked");
            }
        }
    }

    fn lock_engine(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A failed send means the transport is gone; flag termination so the
    /// caller tears the session down.
    fn send(&mut self, frame: &Frame) -> io::Result<()> {
        let result = write_frame(&mut self.writer, frame.to_string().as_bytes());
        if let Err(ref e) = result {
            warn!("send failed, treating transport as closed: {}", e);
            self.terminate.store(true, Ordering::Relaxed);
        }
        result
    }
}

/// The receiving context: block on the next frame, feed it through the
/// engine, emit the resulting notifications. Exits when the transport
/// closes or the session terminates.
fn receiver_loop<F>(
    stream: TcpStream,
    engine: Arc<Mutex<Engine>>,
    terminate: Arc<AtomicBool>,
    mut on_event: F,
) where
    F: FnMut(SessionEvent),
{
    let mut reader = BufReader::new(stream);

    while !terminate.load(Ordering::Relaxed) {
        match read_frame(&mut reader) {
            Ok(Some(raw)) => {
                let text = String::from_utf8_lossy(&raw);
                if text.trim().is_empty() {
                    // Stray newline between frames; some servers emit them.
                    continue;
                }
                let frame = Frame::parse(&text);
                debug!("received {} frame", frame.command);

                let events = {
                    let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
                    engine.handle_frame(&frame)
                };
                for event in events {
                    if matches!(
                        event,
                        SessionEvent::LogoutComplete | SessionEvent::ProtocolError(_)
                    ) {
                        terminate.store(true, Ordering::Relaxed);
                    }
                    on_event(event);
                }
            }
            Ok(None) => {
                if !terminate.swap(true, Ordering::Relaxed) {
                    on_event(SessionEvent::ConnectionLost);
                }
                break;
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    error!("receive error: {}", e);
                }
                if !terminate.swap(true, Ordering::Relaxed) {
                    on_event(SessionEvent::ConnectionLost);
                }
                break;
            }
        }
    }

    debug!("receiver thread exiting");
}
