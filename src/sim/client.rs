//! The notification protocol between the simulator and a front end.
//!
//! A front end implements [`Client`] and attaches itself with
//! [`Simulator::connect`]. Every method has a default implementation that
//! keeps the machine running, so a client overrides only what it needs:
//! a batch front end might implement just `notify_input` and
//! `notify_output`, while a debugger also implements `notify_step` to
//! pause at breakpoints.
//!
//! Two ready-made clients are provided. [`BufferedClient`] queues inputs
//! and collects outputs in shared buffers, which suits batch runs and
//! tests. [`ChannelClient`] moves values over crossbeam channels, which
//! suits a front end running the machine on another thread.
//!
//! [`Simulator::connect`]: super::Simulator::connect

use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crossbeam_channel as cbc;

/// A client's answer to [`Client::notify_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Feed this value through [`set_input`] and continue.
    ///
    /// [`set_input`]: super::Simulator::set_input
    Value(i64),
    /// Continue without touching the input register.
    Continue,
    /// Suspend until the host calls [`set_input`] and [`resume`].
    ///
    /// [`set_input`]: super::Simulator::set_input
    /// [`resume`]: super::Simulator::resume
    Pause,
}

impl From<bool> for Reply {
    fn from(go_on: bool) -> Self {
        if go_on { Reply::Continue } else { Reply::Pause }
    }
}
impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Reply::Value(value)
    }
}

/// The capability set a front end offers the simulator.
///
/// All methods default to "carry on", so an implementation only overrides
/// the notifications it cares about.
pub trait Client {
    /// Called before each instruction fetch with the current program
    /// counter. Returning `false` pauses the machine until `resume`.
    fn notify_step(&mut self, counter: usize) -> bool {
        let _ = counter;
        true
    }

    /// Called when INP executes.
    fn notify_input(&mut self) -> Reply {
        Reply::Continue
    }

    /// Called when OUT executes, with the new output register value.
    fn notify_output(&mut self, value: u32) {
        let _ = value;
    }

    /// Called once when HLT executes.
    fn notify_halt(&mut self) {}
}

impl dyn Client {} // assert Client is dyn safe

/// A client that reads inputs from a queue and collects outputs in a
/// buffer.
///
/// Cloning is shallow: all clones share the same buffers, so a front end
/// keeps one handle while the simulator owns another. When the input
/// queue runs dry the machine suspends, and the host can refill the
/// queue or call `set_input` directly before resuming.
#[derive(Debug, Clone)]
pub struct BufferedClient {
    inputs: Arc<RwLock<VecDeque<i64>>>,
    outputs: Arc<RwLock<Vec<u32>>>,
}

impl BufferedClient {
    /// Creates a client with empty buffers.
    pub fn new() -> Self {
        Self { inputs: Default::default(), outputs: Default::default() }
    }

    /// Creates a client primed with the given inputs.
    pub fn with_inputs(inputs: impl IntoIterator<Item = i64>) -> Self {
        let client = Self::new();
        client.input_buf().extend(inputs);
        client
    }

    fn input_buf(&self) -> RwLockWriteGuard<'_, VecDeque<i64>> {
        match self.inputs.write() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }
    fn output_buf(&self) -> RwLockWriteGuard<'_, Vec<u32>> {
        match self.outputs.write() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    /// Gets a reference to the input queue.
    pub fn get_inputs(&self) -> &Arc<RwLock<VecDeque<i64>>> {
        &self.inputs
    }
    /// Gets a reference to the output buffer.
    pub fn get_outputs(&self) -> &Arc<RwLock<Vec<u32>>> {
        &self.outputs
    }

    /// Takes the collected outputs, leaving the buffer empty.
    pub fn take_outputs(&self) -> Vec<u32> {
        std::mem::take(&mut *self.output_buf())
    }
}

impl Default for BufferedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Client for BufferedClient {
    fn notify_input(&mut self) -> Reply {
        match self.input_buf().pop_front() {
            Some(value) => Reply::Value(value),
            None => Reply::Pause,
        }
    }

    fn notify_output(&mut self, value: u32) {
        self.output_buf().push(value);
    }
}

/// A client that moves values over channels.
///
/// [`ChannelClient::new`] hands back the client along with a sender for
/// inputs and a receiver for outputs, to be held by the host (possibly on
/// another thread). INP takes whatever input is already queued; if none
/// is queued the machine suspends rather than blocking.
pub struct ChannelClient {
    input: cbc::Receiver<i64>,
    output: cbc::Sender<u32>,
}

impl ChannelClient {
    /// Creates a channel client and the host's two channel ends.
    pub fn new() -> (Self, cbc::Sender<i64>, cbc::Receiver<u32>) {
        let (input_tx, input_rx) = cbc::unbounded();
        let (output_tx, output_rx) = cbc::unbounded();
        let client = Self { input: input_rx, output: output_tx };
        (client, input_tx, output_rx)
    }
}

impl Client for ChannelClient {
    fn notify_input(&mut self) -> Reply {
        match self.input.try_recv() {
            Ok(value) => Reply::Value(value),
            Err(_) => Reply::Pause,
        }
    }

    fn notify_output(&mut self, value: u32) {
        // A disconnected host just stops observing output.
        let _ = self.output.send(value);
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferedClient, ChannelClient, Client, Reply};
    use crate::sim::Simulator;

    /// The assembled two-input add program.
    const ADD_PROGRAM: &[u32] = &[901, 306, 901, 106, 902, 0, 0];

    #[test]
    fn test_reply_conversions() {
        assert_eq!(Reply::from(true), Reply::Continue);
        assert_eq!(Reply::from(false), Reply::Pause);
        assert_eq!(Reply::from(42), Reply::Value(42));
    }

    #[test]
    fn test_buffered_run() {
        let mut sim = Simulator::default();
        sim.load_words(ADD_PROGRAM).unwrap();

        let client = BufferedClient::with_inputs([123, 123]);
        sim.connect(client.clone());

        sim.run().unwrap();
        assert_eq!(client.take_outputs(), vec![246]);
        assert!(!sim.is_waiting_for_input());
    }

    #[test]
    fn test_buffered_exhaustion_suspends() {
        let mut sim = Simulator::default();
        sim.load_words(ADD_PROGRAM).unwrap();

        let client = BufferedClient::with_inputs([5]);
        sim.connect(client.clone());

        sim.run().unwrap();
        // The second INP found nothing; the machine is suspended.
        assert!(sim.is_waiting_for_input());
        assert!(client.take_outputs().is_empty());

        sim.set_input(7).unwrap();
        sim.resume().unwrap();
        assert_eq!(client.take_outputs(), vec![12]);
    }

    #[test]
    fn test_channel_run() {
        let mut sim = Simulator::default();
        sim.load_words(ADD_PROGRAM).unwrap();

        let (client, input_tx, output_rx) = ChannelClient::new();
        sim.connect(client);

        input_tx.send(123).unwrap();
        input_tx.send(123).unwrap();
        sim.run().unwrap();
        assert_eq!(output_rx.try_recv(), Ok(246));
    }

    #[test]
    fn test_channel_empty_input_suspends() {
        let mut sim = Simulator::default();
        sim.load_words(ADD_PROGRAM).unwrap();

        let (client, input_tx, output_rx) = ChannelClient::new();
        sim.connect(client);

        // The first INP finds nothing queued and suspends.
        sim.run().unwrap();
        assert!(sim.is_waiting_for_input());

        // The host supplies the missing value directly and queues one
        // for the second INP.
        sim.set_input(3).unwrap();
        input_tx.send(3).unwrap();
        sim.resume().unwrap();
        assert_eq!(output_rx.try_recv(), Ok(6));
    }

    /// A client that pauses once at a chosen program counter.
    struct BreakClient {
        io: BufferedClient,
        break_at: usize,
    }

    impl Client for BreakClient {
        fn notify_step(&mut self, counter: usize) -> bool {
            counter != self.break_at
        }
        fn notify_input(&mut self) -> Reply {
            self.io.notify_input()
        }
        fn notify_output(&mut self, value: u32) {
            self.io.notify_output(value);
        }
    }

    #[test]
    fn test_break_and_resume() {
        let mut sim = Simulator::default();
        sim.load_words(ADD_PROGRAM).unwrap();

        let io = BufferedClient::with_inputs([123, 123]);
        sim.connect(BreakClient { io: io.clone(), break_at: 3 });

        sim.run().unwrap();
        assert!(sim.is_waiting_for_step());
        assert_eq!(sim.counter, 3);
        assert!(io.take_outputs().is_empty());

        // Resuming executes the instruction that was paused on and runs
        // to the halt, with the same output as an uninterrupted run.
        sim.resume().unwrap();
        assert!(!sim.is_waiting_for_step());
        assert_eq!(io.take_outputs(), vec![246]);
        assert_eq!(sim.counter, 5);
    }
}
