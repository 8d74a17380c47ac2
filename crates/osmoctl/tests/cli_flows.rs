//! End-to-end tests that spawn the binary against a scripted UDP device.

use std::net::UdpSocket;
use std::process::Command;

use bytes::Bytes;
use osmoctl_duml::{
    encode_message, ComponentId, InterfaceId, Message, MessageId, MessageType,
};

fn osmoctl() -> Command {
    Command::new(env!("CARGO_BIN_EXE_osmoctl"))
}

fn status_frame() -> Vec<u8> {
    encode_message(&Message::new(
        InterfaceId::new(ComponentId::GIMBAL, ComponentId::APP),
        MessageId(1),
        MessageType::STATUS,
        Bytes::from_static(&[0; 4]),
    ))
    .to_vec()
}

#[test]
fn identify_prints_model() {
    let out = osmoctl()
        .args(["identify", "aa081400", "--format", "pretty"])
        .output()
        .expect("binary should run");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("device=osmo-action4"), "stdout: {stdout}");
}

#[test]
fn identify_rejects_unknown_magic() {
    let out = osmoctl()
        .args(["identify", "aa08ff00"])
        .output()
        .expect("binary should run");
    assert_eq!(out.status.code(), Some(60));
}

#[test]
fn bad_duration_is_a_usage_error() {
    let out = osmoctl()
        .args(["battery", "--addr", "127.0.0.1:1", "--timeout", "soon"])
        .output()
        .expect("binary should run");
    assert_eq!(out.status.code(), Some(64));
}

#[test]
fn battery_flow_against_scripted_device() {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("bind fake device");
    let addr = socket.local_addr().unwrap().to_string();

    let device = std::thread::spawn(move || {
        let mut buf = [0u8; 2048];

        // App handshake: status packet then app identifier.
        let (_, peer) = socket.recv_from(&mut buf).expect("handshake packet");
        socket.send_to(&status_frame(), peer).unwrap();
        socket.recv_from(&mut buf).expect("app identifier packet");

        // Battery query: ack the request, then emit the notification the
        // client is waiting on. Bare frames are accepted on this port.
        socket.recv_from(&mut buf).expect("battery request");
        socket
            .send_to(
                &encode_message(&Message::new(
                    InterfaceId::APP_TO_BATTERY.reversed(),
                    MessageId::ZERO,
                    MessageType::GET_BATTERY_INFO.response_type(),
                    Bytes::from_static(&[0x00]),
                )),
                peer,
            )
            .unwrap();
        let mut payload = [0u8; 24];
        payload[20] = 77;
        socket
            .send_to(
                &encode_message(&Message::new(
                    InterfaceId::new(ComponentId::BATTERY, ComponentId::APP),
                    MessageId(9),
                    MessageType::BATTERY_STATUS,
                    Bytes::copy_from_slice(&payload),
                )),
                peer,
            )
            .unwrap();
    });

    let out = osmoctl()
        .args([
            "battery",
            "--addr",
            &addr,
            "--timeout",
            "5s",
            "--format",
            "pretty",
        ])
        .output()
        .expect("binary should run");

    device.join().unwrap();
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("capacity_percent=77"), "stdout: {stdout}");
}

#[test]
fn version_times_out_against_silent_device() {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("bind fake device");
    let addr = socket.local_addr().unwrap().to_string();

    // Answers the handshake so init succeeds, then goes silent.
    let device = std::thread::spawn(move || {
        let mut buf = [0u8; 2048];
        let (_, peer) = socket.recv_from(&mut buf).expect("handshake packet");
        socket.send_to(&status_frame(), peer).unwrap();
    });

    let out = osmoctl()
        .args(["version", "--addr", &addr, "--timeout", "1s"])
        .output()
        .expect("binary should run");

    device.join().unwrap();
    assert_eq!(out.status.code(), Some(124));
}
