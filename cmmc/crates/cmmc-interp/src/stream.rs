//! Stream abstractions between the interpreter and its host.
//!
//! `read` blocks the interpreter until the host delivers a line;
//! cancellation is modeled by closing the input stream, which makes
//! the blocked read return the end-of-input marker. All stream
//! types are `Send` so the interpreter can run on a worker thread
//! while the host stays responsive.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Source of input lines for the built-in `read`.
pub trait InputStream: Send {
    /// Next line of input, or `None` at end of input.
    fn read_line(&mut self) -> Option<String>;
}

/// Output sink shared by `write` and diagnostics.
pub type OutputStream = Box<dyn Write + Send>;

/// Batch input over a fixed string, one line per `read`.
pub struct StringInput {
    lines: VecDeque<String>,
}

impl StringInput {
    /// Create an input source over the given text.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            lines: text.as_ref().lines().map(str::to_string).collect(),
        }
    }
}

impl InputStream for StringInput {
    fn read_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}

/// Interactive input fed through a channel.
///
/// The host keeps the [`Sender`] and pushes one line per `read`;
/// dropping the sender closes the stream and unblocks a waiting
/// interpreter with end-of-input.
///
/// # Examples
///
/// ```
/// use cmmc_interp::{ChannelInput, InputStream};
///
/// let (sender, mut input) = ChannelInput::channel();
/// sender.send("42".to_string()).unwrap();
/// assert_eq!(input.read_line(), Some("42".to_string()));
/// drop(sender);
/// assert_eq!(input.read_line(), None);
/// ```
pub struct ChannelInput {
    receiver: Receiver<String>,
}

impl ChannelInput {
    /// Create a connected sender/input pair.
    pub fn channel() -> (Sender<String>, Self) {
        let (sender, receiver) = channel();
        (sender, Self { receiver })
    }
}

impl InputStream for ChannelInput {
    fn read_line(&mut self) -> Option<String> {
        self.receiver.recv().ok()
    }
}

/// Input read from the process's standard input.
pub struct StdinInput;

impl InputStream for StdinInput {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}
