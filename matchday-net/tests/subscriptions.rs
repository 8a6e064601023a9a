//! Channel join/exit behavior over a live connection.

mod common;

use common::{connect, expect_event, scripted_server};
use matchday_net::frame::Frame;
use matchday_net::protocol::SessionEvent;

#[test]
fn join_and_exit_allocate_increasing_ids() {
    let (addr, server) = scripted_server(|conn| {
        conn.expect_frame(); // CONNECT
        conn.send_connected();

        let mut seen: Vec<Frame> = Vec::new();
        seen.push(conn.ack_next()); // SUBSCRIBE germany_japan
        seen.push(conn.ack_next()); // SUBSCRIBE france_spain
        seen.push(conn.ack_next()); // UNSUBSCRIBE germany_japan
        conn.next_frame();
        seen
    });

    let (mut session, rx) = connect(addr, "alice");
    expect_event(&rx, &SessionEvent::LoginSuccessful);

    assert!(session.join("germany_japan").unwrap());
    // Re-joining is a local no-op; nothing reaches the server.
    assert!(!session.join("germany_japan").unwrap());
    assert!(session.join("france_spain").unwrap());
    // Exiting an unknown channel is a local no-op as well.
    assert!(!session.leave("belgium_brazil").unwrap());
    assert!(session.leave("germany_japan").unwrap());

    expect_event(&rx, &SessionEvent::JoinedChannel("germany_japan".into()));
    expect_event(&rx, &SessionEvent::JoinedChannel("france_spain".into()));
    expect_event(&rx, &SessionEvent::ExitedChannel("germany_japan".into()));

    session.shutdown();
    let seen = server.join().expect("server thread");

    assert_eq!(seen[0].command, "SUBSCRIBE");
    assert_eq!(seen[0].header("destination"), Some("/germany_japan"));
    assert_eq!(seen[0].header("id"), Some("0"));
    assert_eq!(seen[1].command, "SUBSCRIBE");
    assert_eq!(seen[1].header("destination"), Some("/france_spain"));
    assert_eq!(seen[1].header("id"), Some("1"));
    assert_eq!(seen[2].command, "UNSUBSCRIBE");
    assert_eq!(seen[2].header("id"), Some("0"));

    // Receipt ids never repeat across the session.
    let receipts: Vec<&str> = seen.iter().map(|f| f.header("receipt").unwrap()).collect();
    assert_eq!(receipts.len(), 3);
    assert!(receipts.windows(2).all(|w| w[0] != w[1]));
}

#[test]
fn unknown_receipts_are_silently_dropped() {
    let (addr, server) = scripted_server(|conn| {
        conn.expect_frame(); // CONNECT
        conn.send_connected();
        conn.send_receipt("999");
        conn.ack_next(); // SUBSCRIBE, acknowledged properly
        conn.next_frame()
    });

    let (mut session, rx) = connect(addr, "alice");
    expect_event(&rx, &SessionEvent::LoginSuccessful);

    assert!(session.join("germany_japan").unwrap());
    // The bogus receipt produces nothing; the real one still resolves.
    expect_event(&rx, &SessionEvent::JoinedChannel("germany_japan".into()));

    session.shutdown();
    server.join().expect("server thread");
}
