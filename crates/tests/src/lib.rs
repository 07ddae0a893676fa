//! # Integration Tests
//!
//! Contract snapshots and loopback end-to-end tests.
//!
//! Covers:
//! - Wire contract snapshots (field names and order)
//! - Builder -> sender -> UDP -> receiver over 127.0.0.1
//! - Loss, restart and multi-source behaviour of the receiver

#[cfg(test)]
mod contract_tests {
    use contracts::{TrackerFrame, TrackerPose, Vector3};

    /// The serde field order is the wire schema; changing it must bump
    /// the envelope schema version.
    #[test]
    fn test_frame_field_order_snapshot() {
        let mut frame = TrackerFrame::new(0, 1, "YoloVr");
        frame.trackers.push(TrackerPose::new(0, Vector3::ZERO));

        // Struct serialization emits fields in declaration order
        let text = serde_json::to_string(&frame).unwrap();
        let fields = [
            "frame_id",
            "timestamp",
            "source_id",
            "system_name",
            "system_fps",
            "is_calibrated",
            "lost_tracking_count",
            "hmd_pose",
            "trackers",
        ];
        let positions: Vec<usize> = fields
            .iter()
            .map(|field| text.find(&format!("\"{field}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let pose = &json["trackers"][0];
        for key in [
            "tracker_id",
            "tracker_name",
            "position",
            "rotation",
            "velocity",
            "angular_velocity",
            "confidence",
            "is_tracking",
            "timestamp",
        ] {
            assert!(pose.get(key).is_some(), "missing pose field {key}");
        }
        assert_eq!(frame_codec::SCHEMA_VERSION, 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        BodyTracker, ErrorKind, ReceiverConfig, SenderConfig, TrackerFrame, TrackerPose, Vector3,
        WireFormat, HMD_TRACKER_ID, HMD_TRACKER_NAME,
    };
    use frame_builder::TrackerUpdate;
    use frame_codec::EnvelopeHeader;
    use tokio::net::UdpSocket;
    use tokio::time::timeout;
    use transport::{ReceivedFrame, SequenceEvent, TrackerReceiver, TrackerSender};

    const WAIT: Duration = Duration::from_secs(2);

    async fn loopback_receiver() -> (TrackerReceiver, SocketAddr) {
        let config = ReceiverConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            ..Default::default()
        };
        let receiver = TrackerReceiver::bind(config).await.unwrap();
        let addr = receiver.local_addr().unwrap();
        (receiver, addr)
    }

    fn sender_config(port: u16) -> SenderConfig {
        SenderConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        }
    }

    fn no_trackers() -> Vec<(u32, TrackerUpdate)> {
        Vec::new()
    }

    async fn next(receiver: &mut TrackerReceiver) -> ReceivedFrame {
        timeout(WAIT, receiver.recv_frame())
            .await
            .expect("receiver timed out")
            .expect("frame rejected")
    }

    /// Two trackers, the second not tracking with confidence 0.9
    #[tokio::test]
    async fn test_e2e_sample_scenario() {
        let (mut receiver, addr) = loopback_receiver().await;
        let mut sender = TrackerSender::bind(sender_config(addr.port())).await.unwrap();

        let mut builder = sender.create_frame();
        builder.add_position(0, [1.0, 2.0, 3.0]).add_tracker(
            1,
            TrackerUpdate::new([4.0, 5.0, 6.0])
                .with_rotation([0.0, 0.0, 0.0, 1.0])
                .with_confidence(0.9)
                .with_tracking(false),
        );
        let frame = builder.build();
        assert_eq!(frame.frame_id, 0);
        assert_eq!(frame.source_id, 1);

        let report = sender.send_frame(&frame).await.unwrap();
        let received = next(&mut receiver).await;

        assert_eq!(received.bytes, report.bytes);
        assert_eq!(received.frame, frame);
        assert_eq!(received.frame.trackers.len(), 2);
        let second = received.frame.tracker(1).unwrap();
        assert!(!second.is_tracking);
        assert_eq!(second.confidence, 0.9);
        assert_eq!(received.frame.trackers[0].tracker_name, "LeftLeg");
    }

    #[tokio::test]
    async fn test_e2e_monotonic_frame_ids() {
        let (mut receiver, addr) = loopback_receiver().await;
        let mut sender = TrackerSender::bind(sender_config(addr.port())).await.unwrap();

        for i in 0..10u64 {
            let mut builder = sender.create_frame();
            builder.add_position(BodyTracker::Hip.id(), [0.0, 1.0 + i as f64 * 0.01, 0.0]);
            sender.send_frame(&builder.build()).await.unwrap();
        }

        let mut ids = Vec::new();
        for _ in 0..10 {
            ids.push(next(&mut receiver).await.frame.frame_id);
        }

        assert_eq!(ids, (0..10).collect::<Vec<u64>>());
        assert_eq!(sender.next_frame_id(), 10);
        assert_eq!(sender.metrics().sent_count(), 10);
        assert_eq!(receiver.stats().gaps, 0);
    }

    /// Frames 5, 6, 8 reach the receiver; 7 goes elsewhere
    #[tokio::test]
    async fn test_e2e_loss_tolerance() {
        let (mut receiver, addr) = loopback_receiver().await;
        let black_hole = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let mut config = sender_config(addr.port());
        config.initial_frame_id = 5;
        let mut sender = TrackerSender::bind(config).await.unwrap();

        let mut events = Vec::new();
        for frame_id in 5..=8u64 {
            let dropped = frame_id == 7;
            let port = if dropped {
                black_hole.local_addr().unwrap().port()
            } else {
                addr.port()
            };
            sender.reconfigure_destination(None, Some(port)).await.unwrap();

            let report = sender
                .send_tracker_snapshot([(0, TrackerUpdate::new([0.0, 0.5, 0.0]))])
                .await
                .unwrap();
            assert_eq!(report.frame_id, frame_id);

            if !dropped {
                let received = next(&mut receiver).await;
                assert_eq!(received.frame.frame_id, frame_id);
                events.push(received.event);
            }
        }

        assert_eq!(
            events,
            vec![
                SequenceEvent::First,
                SequenceEvent::InOrder,
                SequenceEvent::Gap { missing: 1 }
            ]
        );
        let stats = receiver.stats();
        assert_eq!(stats.gaps, 1);
        assert_eq!(stats.frames_lost, 1);
        assert_eq!(stats.frames_dropped, 0);
        assert_eq!(receiver.latest_frame().unwrap().frame_id, 8);

        let summary = receiver.link_summary();
        assert_eq!(summary.total_frames, 3);
        assert_eq!(summary.total_gaps, 1);
        assert!((summary.loss_rate - 25.0).abs() < 1e-9);
        assert!(summary.to_string().contains("in 1 gaps"));
    }

    #[tokio::test]
    async fn test_e2e_hmd_pose_is_separate() {
        let (mut receiver, addr) = loopback_receiver().await;
        let mut sender = TrackerSender::bind(sender_config(addr.port())).await.unwrap();

        let mut builder = sender.create_frame();
        builder
            .set_hmd_pose(TrackerUpdate::new([0.0, 1.7, 0.0]).with_velocity([0.0, 0.0, 0.0]))
            .add_position(BodyTracker::Waist.id(), [0.0, 1.0, 0.0]);
        sender.send_frame(&builder.build()).await.unwrap();

        let frame = next(&mut receiver).await.frame;
        let hmd = frame.hmd_pose.as_ref().unwrap();
        assert_eq!(hmd.tracker_id, HMD_TRACKER_ID);
        assert_eq!(hmd.tracker_name, HMD_TRACKER_NAME);
        // Provided as zero stays distinct from unknown
        assert_eq!(hmd.velocity, Some(Vector3::ZERO));
        assert_eq!(hmd.angular_velocity, None);
        assert_eq!(frame.tracker_ids(), vec![BodyTracker::Waist.id()]);
    }

    /// Id 999 only ever travels in `hmd_pose`
    #[tokio::test]
    async fn test_e2e_hmd_id_misuse_rejected_both_ends() {
        let (mut receiver, addr) = loopback_receiver().await;
        let mut sender = TrackerSender::bind(sender_config(addr.port())).await.unwrap();

        let err = sender
            .send_tracker_snapshot([(HMD_TRACKER_ID, TrackerUpdate::new([0.0, 1.7, 0.0]))])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSample);
        assert_eq!(sender.next_frame_id(), 0);

        // Hand-forged datagram whose HMD slot carries a body landmark id
        let mut frame = TrackerFrame::new(0, 9, "forged");
        frame.hmd_pose = Some(TrackerPose::new(BodyTracker::Hip.id(), Vector3::ZERO));
        let mut datagram = Vec::new();
        EnvelopeHeader::new(WireFormat::Json).write_to(&mut datagram);
        datagram.extend(serde_json::to_vec(&frame).unwrap());

        let rogue = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        rogue.send_to(&datagram, addr).await.unwrap();
        let err = timeout(WAIT, receiver.recv_frame()).await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSample);
        assert!(receiver.latest_frame().is_none());
        assert_eq!(receiver.stats().frames_dropped, 1);
    }

    #[tokio::test]
    async fn test_e2e_bad_datagram_does_not_stop_stream() {
        let (mut receiver, addr) = loopback_receiver().await;
        let rogue = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut sender = TrackerSender::bind(sender_config(addr.port())).await.unwrap();

        rogue.send_to(b"YV\x09\x00junk", addr).await.unwrap();
        let err = timeout(WAIT, receiver.recv_frame()).await.unwrap().unwrap_err();
        assert!(!err.is_fatal());

        sender
            .send_tracker_snapshot([(2, TrackerUpdate::new([0.1, 0.4, 0.0]))])
            .await
            .unwrap();
        let received = next(&mut receiver).await;

        assert_eq!(received.frame.frame_id, 0);
        assert_eq!(receiver.stats().parse_errors, 1);
    }

    #[tokio::test]
    async fn test_e2e_sender_restart_detected() {
        let (mut receiver, addr) = loopback_receiver().await;

        let mut config = sender_config(addr.port());
        config.initial_frame_id = 500;
        let mut first = TrackerSender::bind(config).await.unwrap();
        first.send_tracker_snapshot(no_trackers()).await.unwrap();
        first.close().await.unwrap();
        assert_eq!(next(&mut receiver).await.event, SequenceEvent::First);

        let mut second = TrackerSender::bind(sender_config(addr.port())).await.unwrap();
        second.send_tracker_snapshot(no_trackers()).await.unwrap();
        assert_eq!(
            next(&mut receiver).await.event,
            SequenceEvent::Restart { previous: 500 }
        );
        assert_eq!(receiver.latest_frame().unwrap().frame_id, 0);
    }

    #[tokio::test]
    async fn test_e2e_independent_sources() {
        let (mut receiver, addr) = loopback_receiver().await;

        let mut a = TrackerSender::bind(sender_config(addr.port())).await.unwrap();
        let mut config = sender_config(addr.port());
        config.source_id = 2;
        config.initial_frame_id = 1000;
        let mut b = TrackerSender::bind(config).await.unwrap();

        for _ in 0..3 {
            a.send_tracker_snapshot(no_trackers()).await.unwrap();
            next(&mut receiver).await;
            b.send_tracker_snapshot(no_trackers()).await.unwrap();
            next(&mut receiver).await;
        }

        assert_eq!(a.next_frame_id(), 3);
        assert_eq!(b.next_frame_id(), 1003);
        let stats = receiver.stats();
        assert_eq!(stats.frames_received, 6);
        assert_eq!(stats.gaps, 0);
        assert_eq!(stats.stale_frames, 0);
    }

    /// Config file -> JSON wire format -> background receiver
    #[tokio::test]
    async fn test_e2e_configured_json_stream_via_handle() {
        let config = ConfigLoader::load_from_str(
            r#"
[sender]
host = "127.0.0.1"
port = 9999
source_id = 7
wire_format = "json"

[receiver]
bind_address = "127.0.0.1"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(config.sender.wire_format, WireFormat::Json);

        let mut receiver_config = config.receiver.clone();
        receiver_config.port = 0;
        let handle = TrackerReceiver::bind(receiver_config).await.unwrap().spawn();
        let addr = handle.local_addr().unwrap();
        let mut updates = handle.subscribe();

        let mut sender_config = config.sender.clone();
        sender_config.port = addr.port();
        let mut sender = TrackerSender::bind(sender_config).await.unwrap();

        for _ in 0..5 {
            sender
                .send_tracker_snapshot([(
                    BodyTracker::Chest.id(),
                    TrackerUpdate::new([0.0, 1.3, 0.0]),
                )])
                .await
                .unwrap();
        }

        timeout(WAIT, async {
            loop {
                updates.changed().await.unwrap();
                let done = updates
                    .borrow()
                    .as_ref()
                    .is_some_and(|latest| latest.frame.frame_id == 4);
                if done {
                    break;
                }
            }
        })
        .await
        .unwrap();

        let latest = handle.latest_frame().unwrap();
        assert_eq!(latest.frame.source_id, 7);
        assert!(handle.has_recent_data(Some(WAIT)));
        assert_eq!(handle.stats().frames_received, 5);

        sender.close().await.unwrap();
        handle.shutdown().await;
    }
}
