use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP server: GET answers `OK`, POST echoes the body.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// A local URL nothing listens on.
///
/// # Errors
///
/// Returns an error if a throwaway listener cannot be bound.
pub fn refused_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind throwaway listener failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("throwaway addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Some(body) = read_body(&mut stream) else {
        return;
    };
    let payload = body.unwrap_or_else(|| b"OK".to_vec());
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        payload.len()
    );
    if stream.write_all(head.as_bytes()).is_err() || stream.write_all(&payload).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Read one request. Returns `Some(None)` for a bodiless request.
fn read_body(stream: &mut TcpStream) -> Option<Option<Vec<u8>>> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            return None;
        }
        raw.extend_from_slice(chunk.get(..read)?);
        if let Some(pos) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos.checked_add(4)?;
        }
    };

    let head = String::from_utf8_lossy(raw.get(..header_end)?).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok());
    let Some(length) = length else {
        return Some(None);
    };

    let mut body = raw.get(header_end..)?.to_vec();
    while body.len() < length {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(chunk.get(..read)?);
    }
    Some(Some(body))
}

/// Run the `chainload` binary inside `dir` and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_chainload<I, S>(dir: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = chainload_bin()?;
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "error")
        .env_remove("CHAINLOAD_LOG")
        .env_remove("CHAINLOAD_URL")
        .env_remove("CHAINLOAD_COUNT")
        .output()
        .map_err(|err| format!("run chainload failed: {}", err))
}

/// Fail with both streams attached unless the run succeeded.
///
/// # Errors
///
/// Returns an error when the process exited unsuccessfully.
pub fn require_success(output: &Output) -> Result<String, String> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(stdout)
}

fn chainload_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_chainload").map_or_else(
        || Err("CARGO_BIN_EXE_chainload missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
