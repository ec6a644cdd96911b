#![cfg(unix)]

use crate::{Capture, CaptureConstraints, Chunk, ErrorKind, ProcessCapture};

use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

fn constraints() -> CaptureConstraints {
    CaptureConstraints {
        timeslice: Duration::from_millis(50),
        ..CaptureConstraints::default()
    }
}

fn shell(script: &str, extra: &[&str]) -> ProcessCapture {
    let mut args = vec!["-c".to_string(), script.to_string()];
    args.extend(extra.iter().map(|a| a.to_string()));
    ProcessCapture::new("sh", args).with_stop_grace(Duration::from_secs(2))
}

async fn drain(mut rx: mpsc::Receiver<Chunk>) -> Vec<u8> {
    let mut bytes = Vec::new();
    while let Some(chunk) = rx.recv().await {
        bytes.extend(chunk);
    }
    bytes
}

/// WHAT: A missing encoder binary is a device error
/// WHY: Only an access refusal counts as permission denied
#[tokio::test]
async fn given_missing_program_when_acquiring_then_device_error() {
    // Given: A program that does not exist
    let capture = ProcessCapture::new("/nonexistent/screen-session-encoder", Vec::new());
    let (tx, _rx) = mpsc::channel(4);

    // When: Acquiring
    let result = capture.acquire(&constraints(), tx).await;

    // Then: DeviceError
    assert!(matches!(result, Err(ref e) if e.kind() == ErrorKind::DeviceError));
}

/// WHAT: A program that may not be executed is a permission error
/// WHY: Permission refusals get their own user-facing message
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_non_executable_program_when_acquiring_then_permission_denied() {
    // Given: A regular file without execute permission
    let program = std::env::temp_dir().join(format!("screen-session-{}", Uuid::new_v4()));
    std::fs::write(&program, "#!/bin/sh\n").unwrap();
    let capture = ProcessCapture::new(program.to_string_lossy(), Vec::new());
    let (tx, _rx) = mpsc::channel(4);

    // When: Acquiring
    let result = capture.acquire(&constraints(), tx).await;
    let _ = std::fs::remove_file(&program);

    // Then: PermissionDenied
    assert!(matches!(result, Err(ref e) if e.kind() == ErrorKind::PermissionDenied));
}

/// WHAT: Stop asks the encoder to quit and keeps everything it wrote
/// WHY: The trailer written while finalizing belongs to the recording
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_encoder_when_stopped_then_all_output_collected_in_order() {
    // Given: An encoder that writes, waits for the quit command, then writes a trailer
    let capture = shell("printf hello; read line; printf bye", &[]);
    let (tx, rx) = mpsc::channel(16);
    let mut handle = capture.acquire(&constraints(), tx).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    // When: Stopping and releasing
    handle.stop().await.unwrap();
    handle.release().await;

    // Then: Header and trailer arrive in order, and the channel is closed
    assert_eq!(drain(rx).await, b"hellobye".to_vec());
}

/// WHAT: Frame-rate and cursor placeholders are filled from the constraints
/// WHY: One configured command line serves every constraint set
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_placeholder_args_when_acquiring_then_expanded_from_constraints() {
    // Given: A command echoing its positional arguments
    let capture = shell(
        "printf '%s-%s' \"$0\" \"$1\"; read line",
        &["{frame_rate}", "{cursor}"],
    );
    let constraints = CaptureConstraints {
        frame_rate: 15,
        show_cursor: false,
        ..constraints()
    };
    let (tx, rx) = mpsc::channel(16);

    // When: Acquiring and stopping
    let mut handle = capture.acquire(&constraints, tx).await.unwrap();
    handle.stop().await.unwrap();
    handle.release().await;

    // Then: The placeholders were substituted
    assert_eq!(drain(rx).await, b"15-0".to_vec());
}

/// WHAT: Pausing a stopped encoder fails
/// WHY: A handle that has finalized cannot produce more output
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stopped_encoder_when_pausing_then_device_error() {
    // Given: A stopped encoder
    let capture = shell("read line", &[]);
    let (tx, _rx) = mpsc::channel(4);
    let mut handle = capture.acquire(&constraints(), tx).await.unwrap();
    handle.stop().await.unwrap();

    // When: Pausing
    let result = handle.pause().await;
    handle.release().await;

    // Then: DeviceError
    assert!(matches!(result, Err(ref e) if e.kind() == ErrorKind::DeviceError));
}
