//! Processor
//!
//! Owns the memory map, the frame stack and the program counter, and runs the
//! fetch-decode-execute loop one instruction at a time.  A host drives it:
//!
//! * [step](Processor::step) executes exactly one instruction;
//! * READ/READ_CHAR park the processor in a pending-input state that the host
//!   completes with [resume_read](Processor::resume_read) or
//!   [resume_read_char](Processor::resume_read_char), so `step` never blocks;
//! * registered [EventListener]s observe stepping, frame transitions and
//!   local-variable writes, synchronously and in registration order.
//!
//! On error the program counter is left at the faulting instruction's start
//! address; a later `step` re-attempts the same instruction.
use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Config;
use crate::error::{ErrorCode, RuntimeError};
use crate::event::{Event, EventListener};
use crate::instruction::{cache::InstructionCache, opcode, Instruction, NextAddress, Variable};
use crate::memory::{
    header::{self, Flags1v3, Flags1v4, Flags2, HeaderField},
    Memory,
};
use crate::screen::Screen;
use crate::text;
use crate::{fatal_error, recoverable_error};

use self::frame::Frame;
use self::rng::{chacha_rng::ChaChaRng, ZRng};

pub mod frame;
pub mod handlers;
pub mod rng;

/// Capability surface opcode handlers execute against.
///
/// [Processor] is the only production implementation; the indirection keeps
/// handlers free of processor internals and pins down exactly what an opcode
/// may touch.
pub trait ExecutionContext {
    fn version(&self) -> u8;

    // Memory
    fn read_byte(&self, address: usize) -> Result<u8, RuntimeError>;
    fn read_word(&self, address: usize) -> Result<u16, RuntimeError>;
    fn write_byte(&mut self, address: usize, value: u8) -> Result<(), RuntimeError>;
    fn write_word(&mut self, address: usize, value: u16) -> Result<(), RuntimeError>;
    fn header_byte(&self, field: HeaderField) -> Result<u8, RuntimeError>;
    fn header_word(&self, field: HeaderField) -> Result<u16, RuntimeError>;

    // Variables
    /// Read a variable; reading the stack pops it
    fn variable(&mut self, variable: Variable) -> Result<u16, RuntimeError>;
    /// Read a variable in-place; reading the stack peeks the top
    fn peek_variable(&self, variable: Variable) -> Result<u16, RuntimeError>;
    /// Write a variable; writing the stack pushes
    fn set_variable(&mut self, variable: Variable, value: u16) -> Result<(), RuntimeError>;
    /// Write a variable in-place; writing the stack overwrites the top
    fn set_variable_indirect(&mut self, variable: Variable, value: u16)
        -> Result<(), RuntimeError>;

    // Frames
    fn argument_count(&self) -> Result<u8, RuntimeError>;
    fn frame_count(&self) -> usize;
    /// Push a frame for the routine at (unpacked) `address`
    fn call_routine(
        &mut self,
        address: usize,
        arguments: &[u16],
        result: Option<Variable>,
        return_address: usize,
    ) -> Result<NextAddress, RuntimeError>;
    /// Pop the current frame, storing `value` in the caller's context
    fn return_routine(&mut self, value: u16) -> Result<NextAddress, RuntimeError>;
    /// Unwind to frame `depth`, then return `value`
    fn throw(&mut self, depth: u16, value: u16) -> Result<NextAddress, RuntimeError>;

    // Control transfer
    /// Resolve an instruction's branch for an evaluated `condition`
    fn branch(
        &mut self,
        instruction: &Instruction,
        condition: bool,
    ) -> Result<NextAddress, RuntimeError>;

    // Addresses and Z-text
    fn packed_routine_address(&self, address: u16) -> Result<usize, RuntimeError>;
    fn packed_string_address(&self, address: u16) -> Result<usize, RuntimeError>;
    /// Read Z-text words at `address` up to and including the terminator word
    fn string_literal(&self, address: usize) -> Result<Vec<u16>, RuntimeError>;

    // Output
    /// Route ZSCII text to the selected output stream
    fn print(&mut self, text: &[u16]) -> Result<(), RuntimeError>;
    fn print_char(&mut self, zscii: u16) -> Result<(), RuntimeError>;
    fn new_line(&mut self) -> Result<(), RuntimeError>;
    /// Select or deselect an output stream; stream 3 requires a table address
    fn output_stream(&mut self, stream: i16, table: Option<usize>) -> Result<(), RuntimeError>;
    fn screen(&mut self) -> Result<&mut dyn Screen, RuntimeError>;

    // RNG
    fn random(&mut self, range: u16) -> u16;
    fn seed_random(&mut self, seed: u16);
    fn predictable_random(&mut self, range: u16);

    // Session
    fn verify_checksum(&self) -> Result<bool, RuntimeError>;
    /// Reset dynamic memory and the frame stack, returning the new PC
    fn restart(&mut self) -> Result<usize, RuntimeError>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// A pending request for player input
pub enum InputRequest {
    /// READ_CHAR wants a single keypress
    ReadChar { time: u16 },
    /// READ wants a line of input
    ReadLine {
        /// Maximum input length, in characters
        length: u8,
        /// ZSCII values that terminate input (13 always does)
        terminators: Vec<u16>,
        /// Input already in the buffer that should be re-displayed
        existing: Vec<u16>,
        time: u16,
    },
}

#[derive(Debug)]
enum Pending {
    Char {
        request: InputRequest,
        pc: usize,
        next: usize,
        store: Option<Variable>,
    },
    Line {
        request: InputRequest,
        pc: usize,
        next: usize,
        text_buffer: usize,
        parse_buffer: usize,
        length: u8,
        store: Option<Variable>,
    },
}

#[derive(Debug)]
/// Stream 3 memory table
struct Stream3 {
    /// Table address to write to when the stream is closed
    address: usize,
    /// Stream buffer
    buffer: Vec<u16>,
}

impl Stream3 {
    fn new(address: usize) -> Stream3 {
        Stream3 {
            address,
            buffer: Vec::new(),
        }
    }

    fn push(&mut self, c: u16) {
        self.buffer.push(c);
    }
}

/// The Z-Machine processor
pub struct Processor {
    /// ZCode version
    version: u8,
    /// Memory map
    memory: Memory,
    /// Decoded-instruction cache
    cache: InstructionCache,
    /// Frame stack; never empty between steps
    frames: Vec<Frame>,
    /// Program counter
    pc: usize,
    /// RNG
    rng: Box<dyn ZRng>,
    /// Output sink, registered by the host
    screen: Option<Box<dyn Screen>>,
    /// Execution observers, notified in registration order
    listeners: Vec<Rc<RefCell<dyn EventListener>>>,
    /// Instruction currently (or last) executed
    executing: Option<Rc<Instruction>>,
    /// Pending input request, if READ/READ_CHAR suspended execution
    pending: Option<Pending>,
    /// Stream 3 stack
    stream_3: Vec<Stream3>,
    /// Stream 1 (screen) selected?
    screen_output: bool,
    /// Has QUIT executed?
    quit: bool,
    /// Interpreter identification for the header
    interpreter_number: u8,
    interpreter_version: u8,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("version", &self.version)
            .field("pc", &self.pc)
            .finish_non_exhaustive()
    }
}

impl Processor {
    /// Constructor
    ///
    /// # Arguments
    /// * `memory` - story memory map
    /// * `config` - runtime configuration
    pub fn new(memory: Memory, config: &Config) -> Result<Processor, RuntimeError> {
        let version = header::field_byte(&memory, HeaderField::Version)?;
        if !(1..=8).contains(&version) {
            return fatal_error!(
                ErrorCode::UnsupportedVersion,
                "Version {} is not supported",
                version
            );
        }

        let mut rng = ChaChaRng::new();
        if let Some(seed) = config.random_seed() {
            rng.seed(seed);
        }

        let mut processor = Processor {
            version,
            memory,
            cache: InstructionCache::new(),
            frames: Vec::new(),
            pc: 0,
            rng: Box::new(rng),
            screen: None,
            listeners: Vec::new(),
            executing: None,
            pending: None,
            stream_3: Vec::new(),
            screen_output: true,
            quit: false,
            interpreter_number: config.interpreter_number(),
            interpreter_version: config.interpreter_version(),
        };
        processor.initialize()?;
        Ok(processor)
    }

    /// Set up header fields and the bottom frame
    fn initialize(&mut self) -> Result<(), RuntimeError> {
        header::set_byte(
            &mut self.memory,
            HeaderField::InterpreterNumber,
            self.interpreter_number,
        )?;
        header::set_byte(
            &mut self.memory,
            HeaderField::InterpreterVersion,
            self.interpreter_version,
        )?;
        header::set_word(&mut self.memory, HeaderField::Revision, 0x0100)?;

        if self.version < 4 {
            header::clear_flag1(&mut self.memory, Flags1v3::StatusLineNotAvailable as u8)?;
            header::set_flag1(&mut self.memory, Flags1v3::ScreenSplitAvailable as u8)?;
            header::clear_flag1(&mut self.memory, Flags1v3::VariablePitchDefault as u8)?;
        }

        // No pictures, sound, mouse, or undo here
        if self.version > 4 {
            header::clear_flag1(&mut self.memory, Flags1v4::PicturesAvailable as u8)?;
            header::clear_flag1(&mut self.memory, Flags1v4::SoundEffectsAvailable as u8)?;
            header::clear_flag2(&mut self.memory, Flags2::RequestPictures)?;
            header::clear_flag2(&mut self.memory, Flags2::RequestSoundEffects)?;
            header::clear_flag2(&mut self.memory, Flags2::RequestUndo)?;
            header::clear_flag2(&mut self.memory, Flags2::RequestMouse)?;
        }

        self.apply_screen_header()?;

        if self.frames.is_empty() {
            let pc = header::field_word(&self.memory, HeaderField::InitialPC)? as usize;
            if self.version == 6 {
                // V6 stories start with a call to a packed main routine
                let address = self.memory.packed_routine_address(pc as u16)?;
                let (initial_pc, local_variables) = self.routine_header(address)?;
                self.frames
                    .push(Frame::new(address, &[], &local_variables, None, None));
                self.pc = initial_pc;
            } else {
                self.frames.push(Frame::new(pc, &[], &[], None, None));
                self.pc = pc;
            }
        }

        Ok(())
    }

    /// Copy screen dimensions and capabilities into the header
    fn apply_screen_header(&mut self) -> Result<(), RuntimeError> {
        let Some(screen) = &self.screen else {
            return Ok(());
        };
        let rows = screen.rows();
        let columns = screen.columns();
        let colours = screen.supports_colours();
        let bold = screen.supports_bold();
        let italic = screen.supports_italic();
        let fixed = screen.supports_fixed_font();

        if self.version > 3 {
            header::set_byte(&mut self.memory, HeaderField::ScreenLines, rows as u8)?;
            header::set_byte(&mut self.memory, HeaderField::ScreenColumns, columns as u8)?;
            for (available, flag) in [
                (bold, Flags1v4::BoldfaceAvailable),
                (italic, Flags1v4::ItalicAvailable),
                (fixed, Flags1v4::FixedSpaceAvailable),
            ] {
                if available {
                    header::set_flag1(&mut self.memory, flag as u8)?;
                } else {
                    header::clear_flag1(&mut self.memory, flag as u8)?;
                }
            }
        }
        if self.version > 4 {
            header::set_word(&mut self.memory, HeaderField::ScreenHeight, rows)?;
            header::set_word(&mut self.memory, HeaderField::ScreenWidth, columns)?;
            header::set_byte(&mut self.memory, HeaderField::FontWidth, 1)?;
            header::set_byte(&mut self.memory, HeaderField::FontHeight, 1)?;
            if colours {
                header::set_flag1(&mut self.memory, Flags1v4::ColoursAvailable as u8)?;
            } else {
                header::clear_flag1(&mut self.memory, Flags1v4::ColoursAvailable as u8)?;
            }
        }
        Ok(())
    }

    /// Install the output sink
    pub fn register_screen(&mut self, screen: Box<dyn Screen>) -> Result<(), RuntimeError> {
        self.screen = Some(screen);
        self.apply_screen_header()
    }

    /// Re-read the registered screen's dimensions into the header after the
    /// host's display changed size
    pub fn screen_dimensions_changed(&mut self) -> Result<(), RuntimeError> {
        self.apply_screen_header()
    }

    /// Register an execution observer
    pub fn add_listener(&mut self, listener: Rc<RefCell<dyn EventListener>>) {
        self.listeners.push(listener);
    }

    fn notify(&self, event: Event) {
        for listener in &self.listeners {
            listener.borrow_mut().event(&event);
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    /// The instruction being (or last) executed, for the debugger
    pub fn executing_instruction(&self) -> Option<Rc<Instruction>> {
        self.executing.clone()
    }

    /// The frame stack, bottom first, for the debugger
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The current (top) frame
    pub fn current_frame(&self) -> Result<&Frame, RuntimeError> {
        if let Some(frame) = self.frames.last() {
            Ok(frame)
        } else {
            fatal_error!(ErrorCode::NoFrame, "No runtime frame")
        }
    }

    fn current_frame_mut(&mut self) -> Result<&mut Frame, RuntimeError> {
        if let Some(frame) = self.frames.last_mut() {
            Ok(frame)
        } else {
            fatal_error!(ErrorCode::NoFrame, "No runtime frame")
        }
    }

    /// The pending input request, if execution is suspended on READ/READ_CHAR
    pub fn pending_input(&self) -> Option<&InputRequest> {
        match &self.pending {
            Some(Pending::Char { request, .. }) | Some(Pending::Line { request, .. }) => {
                Some(request)
            }
            None => None,
        }
    }

    /// Execute exactly one instruction at the program counter.
    ///
    /// # Returns
    /// Empty [Result] or a [RuntimeError]; on error the program counter is
    /// unchanged and points at the faulting instruction.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        if self.quit {
            return fatal_error!(ErrorCode::IllegalState, "Step after QUIT");
        }
        if self.pending.is_some() {
            return fatal_error!(ErrorCode::IllegalState, "Step while awaiting input");
        }

        let pc = self.pc;
        let instruction = self.cache.fetch(&self.memory, pc)?;
        self.notify(Event::Stepping { pc });
        self.executing = Some(Rc::clone(&instruction));

        let opcode = *instruction.opcode();
        let entry = opcode::entry(opcode.version(), opcode.kind(), opcode.number())?;
        let next = (entry.handler())(self, &instruction)?;
        self.apply(pc, &instruction, next)
    }

    fn apply(
        &mut self,
        pc: usize,
        instruction: &Instruction,
        next: NextAddress,
    ) -> Result<(), RuntimeError> {
        match next {
            NextAddress::Address(next_pc) => {
                self.pc = next_pc;
                self.notify(Event::Stepped { pc, next_pc });
                Ok(())
            }
            NextAddress::ReadChar { next, time } => {
                self.pending = Some(Pending::Char {
                    request: InputRequest::ReadChar { time },
                    pc,
                    next,
                    store: instruction.store(),
                });
                Ok(())
            }
            NextAddress::ReadLine {
                next,
                text_buffer,
                parse_buffer,
                length,
                time,
            } => {
                let terminators = self.terminators()?;
                let existing = self.existing_input(text_buffer)?;
                self.pending = Some(Pending::Line {
                    request: InputRequest::ReadLine {
                        length,
                        terminators,
                        existing,
                        time,
                    },
                    pc,
                    next,
                    text_buffer,
                    parse_buffer,
                    length,
                    store: instruction.store(),
                });
                Ok(())
            }
            NextAddress::Quit => {
                self.quit = true;
                self.notify(Event::Quit);
                Ok(())
            }
        }
    }

    /// ZSCII values that terminate a READ: 13, plus the V5+ terminating
    /// characters table
    fn terminators(&self) -> Result<Vec<u16>, RuntimeError> {
        let mut terminators = vec![13];
        if self.version > 4 {
            let table = header::field_word(&self.memory, HeaderField::TerminatorTable)? as usize;
            if table > 0 {
                let mut i = 0;
                loop {
                    let b = self.memory.read_byte(table + i)?;
                    match b {
                        0 => break,
                        129..=154 | 252..=255 => terminators.push(b as u16),
                        _ => {}
                    }
                    i += 1;
                }
            }
        }
        Ok(terminators)
    }

    /// Input already in a V5+ text buffer when READ starts
    fn existing_input(&self, text_buffer: usize) -> Result<Vec<u16>, RuntimeError> {
        let mut existing = Vec::new();
        if self.version > 4 {
            let len = self.memory.read_byte(text_buffer + 1)? as usize;
            for i in 0..len {
                existing.push(self.memory.read_byte(text_buffer + 2 + i)? as u16);
            }
        }
        Ok(existing)
    }

    /// Complete a pending READ_CHAR with a keypress.
    ///
    /// # Arguments
    /// * `zchar` - ZSCII value of the key, or 0 for a timeout
    pub fn resume_read_char(&mut self, zchar: u16) -> Result<(), RuntimeError> {
        match self.pending.take() {
            Some(Pending::Char {
                pc, next, store, ..
            }) => {
                if let Some(variable) = store {
                    self.set_variable(variable, zchar)?;
                }
                self.pc = next;
                self.notify(Event::Stepped { pc, next_pc: next });
                Ok(())
            }
            other => {
                self.pending = other;
                fatal_error!(ErrorCode::IllegalState, "No READ_CHAR is pending")
            }
        }
    }

    /// Complete a pending READ with a line of input.
    ///
    /// Writes the text buffer, runs lexical analysis into the parse buffer if
    /// one was given, and (V5+) stores the terminator.
    ///
    /// # Arguments
    /// * `input` - ZSCII input values, terminator excluded
    /// * `terminator` - ZSCII value that ended input, 0 for a timeout
    pub fn resume_read(&mut self, input: &[u16], terminator: u16) -> Result<(), RuntimeError> {
        match self.pending.take() {
            Some(Pending::Line {
                pc,
                next,
                text_buffer,
                parse_buffer,
                length,
                store,
                ..
            }) => {
                let input: Vec<u16> = input
                    .iter()
                    .take(length as usize)
                    .map(|c| text::to_lowercase(*c))
                    .collect();
                if self.version < 5 {
                    for (i, c) in input.iter().enumerate() {
                        self.write_byte(text_buffer + 1 + i, *c as u8)?;
                    }
                    self.write_byte(text_buffer + 1 + input.len(), 0)?;
                } else {
                    self.write_byte(text_buffer + 1, input.len() as u8)?;
                    for (i, c) in input.iter().enumerate() {
                        self.write_byte(text_buffer + 2 + i, *c as u8)?;
                    }
                }

                if parse_buffer > 0 {
                    let dictionary =
                        header::field_word(&self.memory, HeaderField::Dictionary)? as usize;
                    text::tokenise(self, text_buffer, parse_buffer, dictionary, false)?;
                }

                if self.version > 4 {
                    if let Some(variable) = store {
                        self.set_variable(variable, terminator)?;
                    }
                }
                self.pc = next;
                self.notify(Event::Stepped { pc, next_pc: next });
                Ok(())
            }
            other => {
                self.pending = other;
                fatal_error!(ErrorCode::IllegalState, "No READ is pending")
            }
        }
    }

    /// Address of global variable `index`
    fn global_variable_address(&self, index: u8) -> Result<usize, RuntimeError> {
        let table = header::field_word(&self.memory, HeaderField::GlobalTable)? as usize;
        Ok(table + (index as usize * 2))
    }

    /// Decode a routine header
    ///
    /// # Arguments
    /// * `address` - Address of the routine header
    ///
    /// # Returns
    /// [Result] with a tuple of (instruction address, initial local variables)
    /// or a [RuntimeError]
    fn routine_header(&self, address: usize) -> Result<(usize, Vec<u16>), RuntimeError> {
        let variable_count = self.memory.read_byte(address)? as usize;
        if variable_count > 15 {
            return fatal_error!(
                ErrorCode::InvalidRoutine,
                "Routines can have at most 15 local variables: {}",
                variable_count
            );
        }

        if self.version < 5 {
            let mut local_variables = Vec::new();
            for i in 0..variable_count {
                local_variables.push(self.memory.read_word(address + 1 + (i * 2))?);
            }
            Ok((address + 1 + (variable_count * 2), local_variables))
        } else {
            Ok((address + 1, vec![0; variable_count]))
        }
    }
}

impl ExecutionContext for Processor {
    fn version(&self) -> u8 {
        self.version
    }

    fn read_byte(&self, address: usize) -> Result<u8, RuntimeError> {
        self.memory.read_byte(address)
    }

    fn read_word(&self, address: usize) -> Result<u16, RuntimeError> {
        self.memory.read_word(address)
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<(), RuntimeError> {
        self.memory.write_byte(address, value)
    }

    fn write_word(&mut self, address: usize, value: u16) -> Result<(), RuntimeError> {
        self.memory.write_word(address, value)
    }

    fn header_byte(&self, field: HeaderField) -> Result<u8, RuntimeError> {
        header::field_byte(&self.memory, field)
    }

    fn header_word(&self, field: HeaderField) -> Result<u16, RuntimeError> {
        header::field_word(&self.memory, field)
    }

    fn variable(&mut self, variable: Variable) -> Result<u16, RuntimeError> {
        match variable {
            Variable::Stack => self.current_frame_mut()?.pop(),
            Variable::Local(index) => self.current_frame()?.local_variable(index),
            Variable::Global(index) => {
                let address = self.global_variable_address(index)?;
                self.memory.read_word(address)
            }
        }
    }

    fn peek_variable(&self, variable: Variable) -> Result<u16, RuntimeError> {
        match variable {
            Variable::Stack => self.current_frame()?.peek(),
            Variable::Local(index) => self.current_frame()?.local_variable(index),
            Variable::Global(index) => {
                let address = self.global_variable_address(index)?;
                self.memory.read_word(address)
            }
        }
    }

    fn set_variable(&mut self, variable: Variable, value: u16) -> Result<(), RuntimeError> {
        debug!(target: "app::state", "Set {} to {:04x}", variable, value);
        match variable {
            Variable::Stack => {
                self.current_frame_mut()?.push(value);
                Ok(())
            }
            Variable::Local(index) => {
                let old = self.current_frame()?.local_variable(index)?;
                self.current_frame_mut()?.set_local_variable(index, value)?;
                self.notify(Event::LocalVariableChanged {
                    variable: index,
                    old,
                    new: value,
                });
                Ok(())
            }
            Variable::Global(index) => {
                let address = self.global_variable_address(index)?;
                self.memory.write_word(address, value)
            }
        }
    }

    fn set_variable_indirect(
        &mut self,
        variable: Variable,
        value: u16,
    ) -> Result<(), RuntimeError> {
        match variable {
            Variable::Stack => {
                let frame = self.current_frame_mut()?;
                frame.pop()?;
                frame.push(value);
                Ok(())
            }
            _ => self.set_variable(variable, value),
        }
    }

    fn argument_count(&self) -> Result<u8, RuntimeError> {
        Ok(self.current_frame()?.argument_count())
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn call_routine(
        &mut self,
        address: usize,
        arguments: &[u16],
        result: Option<Variable>,
        return_address: usize,
    ) -> Result<NextAddress, RuntimeError> {
        // Call to address 0 stores FALSE and pushes nothing
        if address == 0 {
            if let Some(variable) = result {
                self.set_variable(variable, 0)?;
            }
            return Ok(NextAddress::Address(return_address));
        }

        let (initial_pc, local_variables) = self.routine_header(address)?;
        let caller = self.current_frame()?.address();
        let frame = Frame::call_routine(address, arguments, local_variables, result, return_address);
        self.frames.push(frame);
        self.notify(Event::EnterFrame {
            caller,
            routine: address,
        });
        Ok(NextAddress::Address(initial_pc))
    }

    fn return_routine(&mut self, value: u16) -> Result<NextAddress, RuntimeError> {
        if self.frames.len() < 2 {
            return fatal_error!(
                ErrorCode::ReturnNoCaller,
                "Return from routine with nowhere to return to"
            );
        }

        if let Some(frame) = self.frames.pop() {
            debug!(target: "app::state", "Return {:04x} => {:?} to {:?}", value, frame.result(), frame.return_address());
            if let Some(variable) = frame.result() {
                self.set_variable(variable, value)?;
            }
            let caller = self.current_frame()?.address();
            self.notify(Event::ExitFrame {
                routine: frame.address(),
                caller,
            });

            match frame.return_address() {
                Some(address) => Ok(NextAddress::Address(address)),
                None => fatal_error!(
                    ErrorCode::IllegalState,
                    "Popped frame has no return address"
                ),
            }
        } else {
            fatal_error!(ErrorCode::NoFrame, "No runtime frame")
        }
    }

    fn throw(&mut self, depth: u16, value: u16) -> Result<NextAddress, RuntimeError> {
        if depth == 0 || depth as usize > self.frames.len() {
            return fatal_error!(
                ErrorCode::IllegalState,
                "THROW to frame {} of {}",
                depth,
                self.frames.len()
            );
        }
        self.frames.truncate(depth as usize);
        self.return_routine(value)
    }

    fn branch(
        &mut self,
        instruction: &Instruction,
        condition: bool,
    ) -> Result<NextAddress, RuntimeError> {
        use crate::instruction::BranchTarget;

        match instruction.branch() {
            Some(branch) if condition == branch.condition() => match branch.target() {
                BranchTarget::ReturnFalse => self.return_routine(0),
                BranchTarget::ReturnTrue => self.return_routine(1),
                BranchTarget::Address(offset) => Ok(NextAddress::Address(
                    (instruction.next_address() as isize + *offset as isize - 2) as usize,
                )),
            },
            _ => Ok(NextAddress::Address(instruction.next_address())),
        }
    }

    fn packed_routine_address(&self, address: u16) -> Result<usize, RuntimeError> {
        self.memory.packed_routine_address(address)
    }

    fn packed_string_address(&self, address: u16) -> Result<usize, RuntimeError> {
        self.memory.packed_string_address(address)
    }

    fn string_literal(&self, address: usize) -> Result<Vec<u16>, RuntimeError> {
        let mut words = Vec::new();
        // Read until bit 15 of the word is set
        loop {
            let w = self.memory.read_word(address + (words.len() * 2))?;
            words.push(w);
            if w & 0x8000 == 0x8000 {
                return Ok(words);
            }
        }
    }

    fn print(&mut self, text: &[u16]) -> Result<(), RuntimeError> {
        // Stream 3 overrides every other output stream
        if let Some(stream_3) = self.stream_3.last_mut() {
            for c in text {
                stream_3.push(*c);
            }
            Ok(())
        } else if self.screen_output {
            let s = text::zscii_to_string(text);
            match &mut self.screen {
                Some(screen) => {
                    screen.print(&s);
                    Ok(())
                }
                None => fatal_error!(ErrorCode::NoScreen, "No screen is registered"),
            }
        } else {
            Ok(())
        }
    }

    fn print_char(&mut self, zscii: u16) -> Result<(), RuntimeError> {
        self.print(&[zscii])
    }

    fn new_line(&mut self) -> Result<(), RuntimeError> {
        if let Some(stream_3) = self.stream_3.last_mut() {
            stream_3.push(13);
            Ok(())
        } else if self.screen_output {
            match &mut self.screen {
                Some(screen) => {
                    screen.new_line();
                    Ok(())
                }
                None => fatal_error!(ErrorCode::NoScreen, "No screen is registered"),
            }
        } else {
            Ok(())
        }
    }

    fn output_stream(&mut self, stream: i16, table: Option<usize>) -> Result<(), RuntimeError> {
        debug!(target: "app::screen", "Output stream {}, table {:?}", stream, table);
        match stream {
            1 => {
                self.screen_output = true;
                Ok(())
            }
            -1 => {
                self.screen_output = false;
                Ok(())
            }
            // Transcripting and command recording are host concerns; the
            // transcript bit is still kept honest
            2 => header::set_flag2(&mut self.memory, Flags2::Transcripting),
            -2 => header::clear_flag2(&mut self.memory, Flags2::Transcripting),
            4 | -4 => Ok(()),
            3 => {
                if self.stream_3.len() >= 16 {
                    fatal_error!(ErrorCode::Stream3Depth, "Stream 3 nested deeper than 16")
                } else {
                    match table {
                        Some(address) => {
                            self.stream_3.push(Stream3::new(address));
                            Ok(())
                        }
                        None => fatal_error!(
                            ErrorCode::Stream3Depth,
                            "Stream 3 selected without a table"
                        ),
                    }
                }
            }
            -3 => match self.stream_3.pop() {
                Some(stream_3) => {
                    self.write_word(stream_3.address, stream_3.buffer.len() as u16)?;
                    for (i, c) in stream_3.buffer.iter().enumerate() {
                        self.write_byte(stream_3.address + 2 + i, *c as u8)?;
                    }
                    Ok(())
                }
                None => fatal_error!(ErrorCode::Stream3Depth, "Stream 3 closed when not open"),
            },
            _ => recoverable_error!(ErrorCode::IllegalState, "Invalid output stream {}", stream),
        }
    }

    fn screen(&mut self) -> Result<&mut dyn Screen, RuntimeError> {
        match &mut self.screen {
            Some(screen) => Ok(screen.as_mut()),
            None => fatal_error!(ErrorCode::NoScreen, "No screen is registered"),
        }
    }

    fn random(&mut self, range: u16) -> u16 {
        self.rng.random(range)
    }

    fn seed_random(&mut self, seed: u16) {
        self.rng.seed(seed)
    }

    fn predictable_random(&mut self, range: u16) {
        self.rng.predictable(range)
    }

    fn verify_checksum(&self) -> Result<bool, RuntimeError> {
        let checksum = header::field_word(&self.memory, HeaderField::Checksum)?;
        Ok(self.memory.checksum()? == checksum)
    }

    fn restart(&mut self) -> Result<usize, RuntimeError> {
        // Flags2 (transcripting, fixed pitch) survives a restart
        let flags2 = header::field_word(&self.memory, HeaderField::Flags2)?;
        self.memory.reset();
        self.frames.clear();
        self.stream_3.clear();
        self.screen_output = true;
        self.rng.seed(0);
        self.initialize()?;
        header::set_word(&mut self.memory, HeaderField::Flags2, flags2)?;
        Ok(self.pc)
    }
}
