//! Execution events
//!
//! The processor owns a set of listeners and notifies them synchronously, in
//! registration order, on the same thread that invoked
//! [step](crate::processor::Processor::step).  Listeners must not re-enter the
//! processor.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// An observable execution event
pub enum Event {
    /// An instruction at `pc` is about to execute
    Stepping { pc: usize },
    /// The instruction at `pc` executed and the program counter moved to `next_pc`
    Stepped { pc: usize, next_pc: usize },
    /// A routine call pushed a frame
    EnterFrame { caller: usize, routine: usize },
    /// A routine return popped a frame
    ExitFrame { routine: usize, caller: usize },
    /// A local variable of the current frame was written
    LocalVariableChanged { variable: u8, old: u16, new: u16 },
    /// The story executed QUIT
    Quit,
}

/// Observer of processor execution
pub trait EventListener {
    /// Receive an [Event].
    ///
    /// # Arguments
    /// * `event` - the event
    fn event(&mut self, event: &Event);
}
