//! # Integration Tests
//!
//! End-to-end tests over loopback UDP.
//!
//! Covers:
//! - Configuration to running topology
//! - Listener -> Distributor -> every target
//! - Startup failure when a listen port is taken
//! - Isolation of an unreachable target

#[cfg(test)]
mod contract_tests {
    use contracts::Target;
    use dispatcher::DistributorConfig;

    #[test]
    fn test_config_to_distributor_config() {
        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
listen_ports = [8000, 8001]
targets = ["127.0.0.1:9000", "[::1]:9001"]
intake_capacity = 50
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let config = DistributorConfig::from_blueprint(&blueprint).unwrap();
        assert_eq!(
            config.targets,
            vec![Target::new("127.0.0.1", 9000), Target::new("::1", 9001)]
        );
        assert_eq!(config.intake_capacity, 50);
        assert_eq!(config.sender_queue_capacity, 100);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{codec, Message, OscType, Target};
    use dispatcher::{CancellationToken, Distributor, DistributorBuilder, DistributorConfig};
    use ingestion::{IngestionError, ListenerSet};
    use tokio::net::UdpSocket;
    use tracing::Span;

    async fn start_distributor(
        targets: Vec<SocketAddr>,
        shutdown: &CancellationToken,
    ) -> Distributor {
        let targets = targets
            .into_iter()
            .map(|a| Target::new(a.ip().to_string(), a.port()))
            .collect();
        DistributorBuilder::new(DistributorConfig::new(targets), shutdown.clone())
            .build()
            .await
            .unwrap()
    }

    async fn start_listeners(
        distributor: &Distributor,
        shutdown: &CancellationToken,
    ) -> ListenerSet {
        let listeners = ListenerSet::bind_all("127.0.0.1", &[0], shutdown, Span::none())
            .await
            .unwrap();
        let handle = distributor.handle();
        listeners.start_all(Arc::new(move |msg| {
            handle.send(msg);
        }));
        listeners
    }

    async fn recv_message(socket: &UdpSocket) -> Message {
        let mut buf = vec![0u8; 1536];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
            .await
            .expect("target received nothing")
            .unwrap();
        codec::decode_datagram(&buf[..len]).unwrap().remove(0)
    }

    async fn send_to(addr: SocketAddr, msg: &Message) {
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client
            .send_to(&codec::encode_message(msg).unwrap(), addr)
            .await
            .unwrap();
    }

    /// One listener, two targets, one message: both targets get it
    #[tokio::test]
    async fn test_e2e_repeat_to_two_targets() {
        let shutdown = CancellationToken::new();
        let t1 = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let t2 = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let distributor = start_distributor(
            vec![t1.local_addr().unwrap(), t2.local_addr().unwrap()],
            &shutdown,
        )
        .await;
        let listeners = start_listeners(&distributor, &shutdown).await;

        let msg = Message::from_parts("/test", vec![OscType::Int(42)]);
        send_to(listeners.local_addrs()[0], &msg).await;

        let got1 = recv_message(&t1).await;
        let got2 = recv_message(&t2).await;
        assert_eq!(got1.addr(), "/test");
        assert_eq!(got1.args(), &[OscType::Int(42)]);
        assert_eq!(got2, got1);

        shutdown.cancel();
        distributor.shutdown().await;
    }

    /// A taken listen port fails startup and nothing keeps running
    #[tokio::test]
    async fn test_e2e_listen_port_in_use() {
        let shutdown = CancellationToken::new();
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let distributor = start_distributor(vec![target.local_addr().unwrap()], &shutdown).await;

        let port = taken.local_addr().unwrap().port();
        let result = ListenerSet::bind_all("127.0.0.1", &[port], &shutdown, Span::none()).await;
        assert!(matches!(result, Err(IngestionError::Bind { .. })));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !distributor.is_stopped() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    /// An unreachable target does not hold back a healthy one
    #[tokio::test]
    async fn test_e2e_unreachable_target_is_isolated() {
        let shutdown = CancellationToken::new();
        let dead = {
            let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
            socket.local_addr().unwrap()
        };
        let healthy = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let distributor =
            start_distributor(vec![dead, healthy.local_addr().unwrap()], &shutdown).await;
        let listeners = start_listeners(&distributor, &shutdown).await;
        let listen = listeners.local_addrs()[0];

        for i in 0..20 {
            send_to(listen, &Message::from_parts(format!("/seq/{i}"), vec![])).await;
        }

        for i in 0..20 {
            assert_eq!(recv_message(&healthy).await.addr(), format!("/seq/{i}"));
        }

        shutdown.cancel();
        distributor.shutdown().await;
    }
}
