//! cmmc-interp - Stack-based interpreter for CMM intermediate code.
//!
//! The interpreter executes the four-address op list on a stack of
//! function frames and talks to the host only through three stream
//! abstractions: an input line source and two output sinks. Hosts
//! wanting interactivity implement the input side with a channel;
//! batch hosts use a string.

mod error;
mod interp;
mod stream;
mod value;

pub use error::RuntimeError;
pub use interp::{Frame, Interpreter};
pub use stream::{ChannelInput, InputStream, OutputStream, StdinInput, StringInput};
pub use value::{Kind, RtValue, Slot};
