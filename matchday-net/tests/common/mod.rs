#![allow(dead_code)]
//! Scripted-server harness for session integration tests.
//!
//! Each test binds a listener, runs a server script against the one
//! connection the client opens, and observes the client through its event
//! callback.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{channel, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use matchday_net::client::{ConnectOptions, Session};
use matchday_net::frame::Frame;
use matchday_net::framing::{read_frame, write_frame};
use matchday_net::protocol::SessionEvent;

pub const WAIT: Duration = Duration::from_secs(5);

/// One accepted client connection, seen from the server side.
pub struct ServerConn {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl ServerConn {
    /// Read the next frame, panicking on close or I/O failure.
    pub fn expect_frame(&mut self) -> Frame {
        match read_frame(&mut self.reader).expect("server read failed") {
            Some(raw) => Frame::parse(&String::from_utf8_lossy(&raw)),
            None => panic!("client closed the connection early"),
        }
    }

    /// Read the next frame, or None once the client closes the connection.
    pub fn next_frame(&mut self) -> Option<Frame> {
        read_frame(&mut self.reader)
            .ok()
            .flatten()
            .map(|raw| Frame::parse(&String::from_utf8_lossy(&raw)))
    }

    pub fn send(&mut self, frame: &Frame) {
        write_frame(&mut self.writer, frame.to_string().as_bytes()).expect("server write failed");
    }

    pub fn send_connected(&mut self) {
        self.send(&Frame::new("CONNECTED").with_header("version", "1.2"));
    }

    pub fn send_receipt(&mut self, receipt_id: &str) {
        self.send(&Frame::new("RECEIPT").with_header("receipt-id", receipt_id));
    }

    /// Read a frame and immediately acknowledge its `receipt` header.
    pub fn ack_next(&mut self) -> Frame {
        let frame = self.expect_frame();
        let receipt = frame
            .header("receipt")
            .expect("frame without a receipt header")
            .to_string();
        self.send_receipt(&receipt);
        frame
    }
}

/// Spawn a server that accepts a single connection and runs `script` on it.
pub fn scripted_server<T, F>(script: F) -> (SocketAddr, JoinHandle<T>)
where
    T: Send + 'static,
    F: FnOnce(&mut ServerConn) -> T + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind scripted server");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let writer = BufWriter::new(stream);
        let mut conn = ServerConn { reader, writer };
        script(&mut conn)
    });
    (addr, handle)
}

/// Connect a session to the scripted server, routing events into a channel.
pub fn connect(addr: SocketAddr, login: &str) -> (Session, Receiver<SessionEvent>) {
    let (tx, rx) = channel();
    let options = ConnectOptions {
        host: addr.ip().to_string(),
        port: addr.port(),
        vhost: String::new(),
        accept_version: "1.2".to_string(),
    };
    let session = Session::connect(&options, login, "secret", move |event| {
        let _ = tx.send(event);
    })
    .expect("client connect");
    (session, rx)
}

pub fn expect_event(rx: &Receiver<SessionEvent>, expected: &SessionEvent) {
    let got = rx.recv_timeout(WAIT).expect("timed out waiting for session event");
    assert_eq!(&got, expected);
}

pub fn expect_no_event(rx: &Receiver<SessionEvent>) {
    if let Ok(event) = rx.recv_timeout(Duration::from_millis(200)) {
        panic!("unexpected session event: {:?}", event);
    }
}

/// Poll the session's summary until `pred` accepts it.
pub fn wait_for_summary(
    session: &Session,
    channel: &str,
    reporter: &str,
    pred: impl Fn(&str) -> bool,
) -> String {
    let deadline = Instant::now() + WAIT;
    loop {
        if let Some(text) = session.summary(channel, reporter) {
            if pred(&text) {
                return text;
            }
        }
        if Instant::now() > deadline {
            panic!("timed out waiting for aggregated reports");
        }
        thread::sleep(Duration::from_millis(10));
    }
}
