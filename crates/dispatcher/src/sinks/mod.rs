//! Sink implementations

mod udp;

pub use self::udp::UdpSink;
