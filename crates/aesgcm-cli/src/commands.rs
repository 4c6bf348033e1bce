//! Subcommand dispatch: `keygen`, `encrypt`, `decrypt`.
//!
//! Input is read from stdin in full, output is written to stdout. Keys and
//! envelopes cross the process boundary as standard base64 with padding.

use std::io::{self, Read, Write};
use std::str::FromStr;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::{debug, info, info_span};
use zeroize::Zeroizing;

use crate::config::Config;

/// Bytes pulled from the reader per call while collecting plaintext.
const READ_CHUNK: usize = 8 * 1024;

/// The operation selected by the first command-line argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print a fresh base64 key of the configured size.
    Keygen,
    /// Seal stdin and print the base64 envelope.
    Encrypt,
    /// Open a base64 envelope from stdin and write the plaintext.
    Decrypt,
}

/// The first argument did not name a known subcommand.
#[derive(Debug, Error)]
#[error("unknown command {0:?} (expected one of: keygen, encrypt, decrypt)")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "keygen" => Ok(Command::Keygen),
            "encrypt" => Ok(Command::Encrypt),
            "decrypt" => Ok(Command::Decrypt),
            other => Err(UnknownCommand(other.to_owned())),
        }
    }
}

impl Command {
    fn name(self) -> &'static str {
        match self {
            Command::Keygen => "keygen",
            Command::Encrypt => "encrypt",
            Command::Decrypt => "decrypt",
        }
    }
}

/// Run `command` against `input`, writing its result to `output`.
///
/// # Errors
///
/// Returns an error if the configuration lacks a required key, if I/O fails,
/// or if the underlying key, encrypt or decrypt operation fails.
pub fn run<R: Read, W: Write>(
    command: Command,
    cfg: &Config,
    input: R,
    mut output: W,
) -> Result<()> {
    let span = info_span!("command", op = command.name());
    let _guard = span.enter();

    match command {
        Command::Keygen => keygen(cfg, &mut output)?,
        Command::Encrypt => encrypt(cfg, input, &mut output)?,
        Command::Decrypt => decrypt(cfg, input, &mut output)?,
    }

    output.flush().context("failed to flush output")?;
    Ok(())
}

fn keygen<W: Write>(cfg: &Config, output: &mut W) -> Result<()> {
    let size = cfg.key_size()?;
    let key = aesgcm::create_key(size).context("failed to generate key")?;
    let encoded = Zeroizing::new(STANDARD.encode(key.as_bytes()));

    writeln!(output, "{}", encoded.as_str()).context("failed to write key")?;
    info!(key_bits = size.bits(), "key generated");
    Ok(())
}

fn encrypt<R: Read, W: Write>(cfg: &Config, mut input: R, output: &mut W) -> Result<()> {
    let key = cfg.secret_key()?;

    let plaintext =
        read_all_zeroizing(&mut input).context("failed to read plaintext from stdin")?;
    debug!(plaintext_len = plaintext.len(), "plaintext read");

    let envelope =
        aesgcm::encrypt(key.as_bytes(), &plaintext).context("failed to encrypt input")?;

    writeln!(output, "{}", STANDARD.encode(&envelope)).context("failed to write envelope")?;
    info!(
        key_bits = key.size().bits(),
        envelope_len = envelope.len(),
        "message encrypted"
    );
    Ok(())
}

/// Read `input` to the end into a zeroizing buffer.
///
/// `read_to_end` would let `Vec` reallocate and free the old buffers with
/// plaintext still in them. Here growth goes through a fresh
/// [`Zeroizing`] buffer, so every discarded allocation is wiped on drop.
fn read_all_zeroizing<R: Read>(input: &mut R) -> io::Result<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(Vec::with_capacity(READ_CHUNK));
    let mut chunk = Zeroizing::new([0u8; READ_CHUNK]);

    loop {
        let n = match input.read(&mut chunk[..]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let needed = buf.len() + n;
        if needed > buf.capacity() {
            let capacity = needed.max(buf.capacity() * 2);
            let mut grown = Zeroizing::new(Vec::with_capacity(capacity));
            grown.extend_from_slice(&buf);
            buf = grown;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(buf)
}

fn decrypt<R: Read, W: Write>(cfg: &Config, mut input: R, output: &mut W) -> Result<()> {
    let key = cfg.secret_key()?;

    let mut encoded = String::new();
    input
        .read_to_string(&mut encoded)
        .context("failed to read envelope from stdin")?;
    let envelope = STANDARD
        .decode(encoded.trim())
        .context("envelope is not valid base64")?;
    debug!(envelope_len = envelope.len(), "envelope read");

    let plaintext = Zeroizing::new(
        aesgcm::decrypt(key.as_bytes(), &envelope).context("failed to decrypt input")?,
    );

    output
        .write_all(&plaintext)
        .context("failed to write plaintext")?;
    info!(
        key_bits = key.size().bits(),
        plaintext_len = plaintext.len(),
        "message decrypted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::EnvFilter;

    fn config_with_key(key: &[u8]) -> Config {
        Config {
            key: Some(STANDARD.encode(key)),
            key_bits: 256,
            log_level: "warn".into(),
        }
    }

    fn run_to_vec(command: Command, cfg: &Config, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        run(command, cfg, input, &mut out)?;
        Ok(out)
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!("keygen".parse::<Command>().unwrap(), Command::Keygen);
        assert_eq!("encrypt".parse::<Command>().unwrap(), Command::Encrypt);
        assert_eq!("decrypt".parse::<Command>().unwrap(), Command::Decrypt);
    }

    #[test]
    fn unknown_command_lists_valid_ones() {
        let err = "seal".parse::<Command>().unwrap_err();
        assert!(err.to_string().contains("keygen, encrypt, decrypt"));
    }

    #[test]
    fn keygen_prints_key_of_configured_size() {
        let cfg = Config {
            key: None,
            key_bits: 192,
            log_level: "warn".into(),
        };
        let out = run_to_vec(Command::Keygen, &cfg, b"").unwrap();
        let line = String::from_utf8(out).unwrap();
        let key = STANDARD.decode(line.trim()).unwrap();
        assert_eq!(key.len(), 24);
    }

    #[test]
    fn encrypt_then_decrypt() {
        let cfg = config_with_key(&[3u8; 32]);
        let plaintext = b"This is a very secret message.";

        let envelope = run_to_vec(Command::Encrypt, &cfg, plaintext).unwrap();
        let raw = STANDARD
            .decode(String::from_utf8(envelope.clone()).unwrap().trim())
            .unwrap();
        assert_eq!(raw.len(), 12 + plaintext.len() + 16);

        let decrypted = run_to_vec(Command::Decrypt, &cfg, &envelope).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn decrypt_with_other_key_fails() {
        let envelope =
            run_to_vec(Command::Encrypt, &config_with_key(&[1u8; 16]), b"hi").unwrap();
        let err =
            run_to_vec(Command::Decrypt, &config_with_key(&[2u8; 16]), &envelope).unwrap_err();
        assert!(format!("{err:#}").contains("decryption failed"));
    }

    #[test]
    fn decrypt_rejects_non_base64() {
        let err =
            run_to_vec(Command::Decrypt, &config_with_key(&[1u8; 16]), b"%%%").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn encrypt_requires_key() {
        let cfg = Config {
            key: None,
            key_bits: 256,
            log_level: "warn".into(),
        };
        assert!(run_to_vec(Command::Encrypt, &cfg, b"x").is_err());
    }

    /// Writer that keeps everything the log formatter emits.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    #[test]
    fn log_lines_carry_the_operation_name() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber =
            crate::telemetry::subscriber(EnvFilter::new("info"), move || writer.clone());

        let cfg = config_with_key(&[5u8; 16]);
        tracing::subscriber::with_default(subscriber, || {
            run_to_vec(Command::Encrypt, &cfg, b"payload").unwrap();
        });

        let lines = logs.lines();
        assert!(!lines.is_empty());
        for line in &lines {
            assert_eq!(line["span"]["name"], "command");
            assert_eq!(line["span"]["op"], "encrypt");
        }
        let raw = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(!raw.contains("payload"));
    }

    /// Hands out input a few bytes at a time, interrupting once.
    struct Trickle<'a> {
        data: &'a [u8],
        interrupted: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            let n = buf.len().min(self.data.len()).min(1000);
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_all_zeroizing_collects_input_past_several_growths() {
        let data: Vec<u8> = (0..5 * READ_CHUNK + 123).map(|i| i as u8).collect();
        let mut input = Trickle {
            data: &data,
            interrupted: false,
        };
        let buf = read_all_zeroizing(&mut input).unwrap();
        assert_eq!(buf.as_slice(), data.as_slice());
    }

    #[test]
    fn read_all_zeroizing_handles_empty_input() {
        let buf = read_all_zeroizing(&mut io::empty()).unwrap();
        assert!(buf.is_empty());
    }
}
