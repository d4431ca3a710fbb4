pub mod hardware;
pub mod identity;
pub mod system;

use std::fs;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Runs an external command with a hard deadline. Missing binary,
/// non-zero exit and timeout all collapse to None; probes treat every
/// one of those as "no value".
pub(crate) fn run_command(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let Some(status) = wait_with_deadline(&mut child, timeout) else {
        debug!(program, "command exceeded deadline, killing");
        let _ = child.kill();
        let _ = child.wait();
        return None;
    };
    if !status.success() {
        return None;
    }

    let mut raw = Vec::new();
    child.stdout.take()?.read_to_end(&mut raw).ok()?;
    Some(decode_cmd_stdout(&raw))
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return None;
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(_) => return None,
        }
    }
}

pub(crate) fn read_trimmed(path: &str) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// wmic emits BOM-prefixed UTF-16LE on most installations; everything
// else is UTF-8. The BOM check must come first: ASCII-range UTF-16LE is
// also valid UTF-8 with interleaved NULs.
fn decode_cmd_stdout(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        if let Some(s) = decode_utf16le(&bytes[2..]) {
            return s;
        }
    }

    if let Ok(utf8) = std::str::from_utf8(bytes) {
        return utf8.to_string();
    }

    if let Some(s) = decode_utf16le(bytes) {
        return s;
    }

    String::from_utf8_lossy(bytes).to_string()
}

fn decode_utf16le(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return None;
    }
    let u16buf: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&u16buf).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_handles_utf8() {
        assert_eq!(decode_cmd_stdout(b"Dell Inc.\r\n"), "Dell Inc.\r\n");
    }

    #[test]
    fn decode_handles_bom_prefixed_utf16le() {
        let mut bytes = vec![0xFF, 0xFE];
        for ch in "LENOVO\r\n".encode_utf16() {
            bytes.extend_from_slice(&ch.to_le_bytes());
        }
        assert_eq!(decode_cmd_stdout(&bytes), "LENOVO\r\n");
    }

    #[cfg(unix)]
    #[test]
    fn run_command_captures_stdout() {
        let out = run_command("echo", &["hello"], Duration::from_secs(5)).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn run_command_missing_binary_is_none() {
        assert!(run_command("definitely-not-a-binary", &[], Duration::from_secs(1)).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn run_command_kills_on_timeout() {
        let started = Instant::now();
        assert!(run_command("sleep", &["30"], Duration::from_millis(200)).is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn run_command_nonzero_exit_is_none() {
        assert!(run_command("false", &[], Duration::from_secs(1)).is_none());
    }
}
