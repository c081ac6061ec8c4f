//! Line-by-line relay of the engine's standard output

use std::io::{self, BufRead, Write};

/// Receives each line the simulation prints, without its line terminator.
///
/// An error stops the relay and is returned from the run.
pub trait LineSink {
    fn line(&mut self, line: &str) -> io::Result<()>;
}

/// Prints relayed lines to this process's stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LineSink for ConsoleSink {
    fn line(&mut self, line: &str) -> io::Result<()> {
        // `println!` would panic once stdout is a closed pipe
        writeln!(io::stdout().lock(), "{line}")
    }
}

impl<F: FnMut(&str) -> io::Result<()>> LineSink for F {
    fn line(&mut self, line: &str) -> io::Result<()> {
        self(line)
    }
}

impl LineSink for Vec<String> {
    fn line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Relay every line from `reader` until end of stream.
///
/// Empty lines are relayed like any other; only EOF ends the loop. Returns
/// the number of lines relayed.
pub fn relay_lines<R: BufRead>(mut reader: R, sink: &mut dyn LineSink) -> io::Result<usize> {
    let mut buf = Vec::new();
    let mut count = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(count);
        }

        let mut end = buf.len();
        if buf[..end].ends_with(b"\n") {
            end -= 1;
            if buf[..end].ends_with(b"\r") {
                end -= 1;
            }
        }

        sink.line(&String::from_utf8_lossy(&buf[..end]))?;
        count += 1;
    }
}
