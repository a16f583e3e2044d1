//! Line-oriented replay of host and controller traffic.
//!
//! Each input line is either a JSON [`HostMessage`] or a raw controller
//! message written as hex bytes (`90 59 7f`). Blank lines and lines starting
//! with `#` are skipped. Replies are written as JSON lines; controller
//! feedback is written as `midi <hex bytes>`.

use std::io::{self, BufRead, Write};

use midicontrols_comm::{CommSession, HostMessage, KernelMessage};
use midicontrols_core::{ControllerEvent, SurfaceDriver};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub lines: usize,
    pub rejected: usize,
}

pub fn write_messages(out: &mut impl Write, msgs: &[KernelMessage]) -> io::Result<()> {
    for msg in msgs {
        serde_json::to_writer(&mut *out, msg)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn run(
    input: impl BufRead,
    out: &mut impl Write,
    session: &mut CommSession,
    driver: &SurfaceDriver,
) -> io::Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        stats.lines += 1;

        if line.starts_with('{') {
            match serde_json::from_str::<HostMessage>(line) {
                Ok(msg) => write_messages(out, &session.handle(msg))?,
                Err(e) => {
                    log::warn!("line {}: bad host message: {}", number + 1, e);
                    stats.rejected += 1;
                }
            }
            continue;
        }

        let Some(event) = parse_hex(line).as_deref().and_then(ControllerEvent::parse) else {
            log::warn!("line {}: not a controller message: {}", number + 1, line);
            stats.rejected += 1;
            continue;
        };
        match driver.handle(session.registry_mut(), event) {
            Ok(changes) => {
                for change in &changes {
                    if let Some(feedback) = driver.feedback(session.registry(), change) {
                        let bytes = feedback.to_bytes();
                        writeln!(out, "midi {:02x} {:02x} {:02x}", bytes[0], bytes[1], bytes[2])?;
                    }
                }
            }
            Err(e) => log::warn!("line {}: {}", number + 1, e),
        }
        write_messages(out, &session.drain_outbox())?;
    }
    Ok(stats)
}

fn parse_hex(line: &str) -> Option<Vec<u8>> {
    line.split_whitespace().map(|b| u8::from_str_radix(b, 16).ok()).collect()
}
