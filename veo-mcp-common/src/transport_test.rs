//! Unit tests for transport configuration.

use super::transport::{Transport, TransportArgs, TransportMode};

#[test]
fn test_transport_default_is_stdio() {
    let transport = Transport::default();
    assert!(transport.is_stdio());
    assert!(!transport.is_http());
    assert_eq!(transport.port(), None);
}

#[test]
fn test_transport_stdio_constructor() {
    let transport = Transport::stdio();
    assert!(transport.is_stdio());
    assert_eq!(transport.to_string(), "stdio");
}

#[test]
fn test_transport_http_constructor() {
    let transport = Transport::http(3000);
    assert!(transport.is_http());
    assert!(!transport.is_stdio());
    assert_eq!(transport.port(), Some(3000));
    assert_eq!(transport.to_string(), "http (port 3000)");
}

#[test]
fn test_transport_args_default() {
    let args = TransportArgs::default();
    assert_eq!(args.transport, TransportMode::Stdio);
    assert_eq!(args.port, 8080);
}

#[test]
fn test_transport_args_into_transport_stdio() {
    let args = TransportArgs {
        transport: TransportMode::Stdio,
        port: 9000,
    };
    let transport = args.into_transport();
    assert!(transport.is_stdio());
    // Port is ignored for stdio
    assert_eq!(transport.port(), None);
}

#[test]
fn test_transport_args_into_transport_http() {
    let args = TransportArgs {
        transport: TransportMode::Http,
        port: 3000,
    };
    let transport = args.into_transport();
    assert!(transport.is_http());
    assert_eq!(transport.port(), Some(3000));
}

#[test]
fn test_transport_equality() {
    assert_eq!(Transport::Stdio, Transport::Stdio);
    assert_eq!(Transport::Http { port: 8080 }, Transport::Http { port: 8080 });

    assert_ne!(Transport::Stdio, Transport::Http { port: 8080 });
    assert_ne!(Transport::Http { port: 8080 }, Transport::Http { port: 9000 });
}
