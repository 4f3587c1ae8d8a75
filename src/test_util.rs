//! Shared test fixtures: a minimal story map, mock instruction builders, a
//! recording screen, and an event recorder.
use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Config;
use crate::error::RuntimeError;
use crate::event::{Event, EventListener};
use crate::instruction::{Branch, Instruction, Opcode, Operand, Variable};
use crate::memory::Memory;
use crate::processor::Processor;
use crate::screen::Screen;

#[macro_export]
macro_rules! assert_ok {
    ($expression:expr) => {{
        let result = $expression;
        assert!(result.is_ok(), "{:?}", result.err());
        result.unwrap()
    }};
}

#[macro_export]
macro_rules! assert_ok_eq {
    ($expression:expr, $value:expr) => {{
        let result = $expression;
        assert!(result.is_ok(), "{:?}", result.err());
        assert_eq!(result.unwrap(), $value);
    }};
    ($expression:expr, $value:expr, $($arg:tt)+) => {{
        let result = $expression;
        assert!(result.is_ok(), "{:?}", result.err());
        assert_eq!(result.unwrap(), $value, $($arg)+);
    }};
}

#[macro_export]
macro_rules! assert_some_eq {
    ($expression:expr, $value:expr) => {{
        let option = $expression;
        assert!(option.is_some());
        assert_eq!(option.unwrap(), $value);
    }};
}

/// A minimal story map: initial PC at $0400, globals at $0100, objects at
/// $0200, dictionary slot at $0340, static memory from $0400
pub fn test_map(version: u8) -> Vec<u8> {
    let mut v = vec![0; 0x800];
    v[0x00] = version;
    // Initial PC at $0400
    v[0x06] = 0x04;
    // Dictionary at $0340
    v[0x08] = 0x03;
    v[0x09] = 0x40;
    // Object table at $0200
    v[0x0A] = 0x02;
    // Global variables at $0100
    v[0x0C] = 0x01;
    // Static mark at $0400
    v[0x0E] = 0x04;
    // Scaled file length covering the whole 0x800-byte map
    v[0x1A] = match version {
        1..=3 => 0x04,
        4 | 5 => 0x02,
        _ => 0x01,
    };
    v
}

/// Set a global variable in the map; `variable` is the wire number (16..)
pub fn set_variable(map: &mut [u8], variable: u8, value: u16) {
    let address = 0x100 + ((variable - 16) as usize * 2);
    map[address] = (value >> 8) as u8;
    map[address + 1] = value as u8;
}

/// A small object tree: object 1 contains 2 and 3; every object is named
/// "pod" and object 1 carries a word property 16 and a byte property 5
pub fn add_object_tables(map: &mut [u8], version: u8) {
    // Default for property 10
    map[0x212] = 0x0A;
    map[0x213] = 0x0A;

    if version < 4 {
        // Entries start after 31 default words
        // Object 1: attributes 0 and 17, child 2
        map[0x23E] = 0x80;
        map[0x240] = 0x40;
        map[0x244] = 2;
        map[0x245] = 0x03;
        map[0x246] = 0x00;
        // Object 2: parent 1, sibling 3
        map[0x247 + 4] = 1;
        map[0x247 + 5] = 3;
        map[0x247 + 7] = 0x03;
        map[0x247 + 8] = 0x10;
        // Object 3: parent 1
        map[0x250 + 4] = 1;
        map[0x250 + 7] = 0x03;
        map[0x250 + 8] = 0x20;

        // Property tables; names are "pod"
        let p1 = [0x01, 0xD6, 0x89, 0x30, 0x12, 0x34, 0x05, 0xAB, 0x00];
        map[0x300..0x300 + p1.len()].copy_from_slice(&p1);
        let p2 = [0x01, 0xD6, 0x89, 0x05, 0xCD, 0x00];
        map[0x310..0x310 + p2.len()].copy_from_slice(&p2);
        let p3 = [0x01, 0xD6, 0x89, 0x00];
        map[0x320..0x320 + p3.len()].copy_from_slice(&p3);
    } else {
        // Entries start after 63 default words
        // Object 1: attribute 0, child 2
        map[0x27E] = 0x80;
        map[0x27E + 11] = 2;
        map[0x27E + 12] = 0x03;
        map[0x27E + 13] = 0x00;
        // Object 2: parent 1, sibling 3
        map[0x28C + 7] = 1;
        map[0x28C + 9] = 3;
        map[0x28C + 12] = 0x03;
        map[0x28C + 13] = 0x10;
        // Object 3: parent 1
        map[0x29A + 7] = 1;
        map[0x29A + 12] = 0x03;
        map[0x29A + 13] = 0x20;

        let p1 = [0x01, 0xD6, 0x89, 0x50, 0x12, 0x34, 0x05, 0xAB, 0x00];
        map[0x300..0x300 + p1.len()].copy_from_slice(&p1);
        // Object 2 carries a 4-byte property 12 in the two-size-byte form
        let p2 = [
            0x01, 0xD6, 0x89, 0x8C, 0x84, 0xDE, 0xAD, 0xBE, 0xEF, 0x05, 0xCD, 0x00,
        ];
        map[0x310..0x310 + p2.len()].copy_from_slice(&p2);
        let p3 = [0x01, 0xD6, 0x89, 0x00];
        map[0x320..0x320 + p3.len()].copy_from_slice(&p3);
    }
}

pub const DICTIONARY_ADDRESS: usize = 0x340;

/// A two-word dictionary ("look", "take") with ',' as a separator
pub fn add_dictionary(map: &mut [u8], version: u8) {
    map[0x340] = 0x01;
    map[0x341] = b',';
    map[0x343] = 0x00;
    map[0x344] = 0x02;
    if version < 4 {
        map[0x342] = 0x07;
        let look = [0x46, 0x94, 0xC0, 0xA5];
        map[0x345..0x349].copy_from_slice(&look);
        let take = [0x64, 0xD0, 0xA8, 0xA5];
        map[0x34C..0x350].copy_from_slice(&take);
    } else {
        map[0x342] = 0x09;
        let look = [0x46, 0x94, 0x40, 0xA5, 0x94, 0xA5];
        map[0x345..0x34B].copy_from_slice(&look);
        let take = [0x64, 0xD0, 0x28, 0xA5, 0x94, 0xA5];
        map[0x34E..0x354].copy_from_slice(&take);
    }
}

pub fn mock_processor(map: Vec<u8>) -> Processor {
    let memory = Memory::new(map);
    let processor = Processor::new(memory, &Config::default());
    assert!(processor.is_ok(), "{:?}", processor.err());
    processor.unwrap()
}

pub fn mock_instruction(
    address: usize,
    opcode: Opcode,
    operands: Vec<Operand>,
    length: usize,
) -> Instruction {
    Instruction::new(address, length, opcode, operands, None, None, None)
}

pub fn mock_store_instruction(
    address: usize,
    opcode: Opcode,
    operands: Vec<Operand>,
    length: usize,
    store: Variable,
) -> Instruction {
    Instruction::new(address, length, opcode, operands, Some(store), None, None)
}

pub fn mock_branch_instruction(
    address: usize,
    opcode: Opcode,
    operands: Vec<Operand>,
    length: usize,
    branch: Branch,
) -> Instruction {
    Instruction::new(address, length, opcode, operands, None, Some(branch), None)
}

pub fn mock_store_branch_instruction(
    address: usize,
    opcode: Opcode,
    operands: Vec<Operand>,
    length: usize,
    store: Variable,
    branch: Branch,
) -> Instruction {
    Instruction::new(
        address,
        length,
        opcode,
        operands,
        Some(store),
        Some(branch),
        None,
    )
}

pub fn mock_ztext_instruction(address: usize, opcode: Opcode, ztext: Vec<u16>) -> Instruction {
    let length = 1 + (ztext.len() * 2);
    Instruction::new(address, length, opcode, vec![], None, None, Some(ztext))
}

#[derive(Debug, Default)]
/// Everything a [TestScreen] was asked to do
pub struct ScreenLog {
    text: String,
    status: (String, String),
    window: u16,
    split: u16,
    style: u16,
    foreground: u16,
    background: u16,
    font: u16,
    cursor: (u16, u16),
    erased_windows: Vec<u16>,
    erased_all: bool,
    erased_line: bool,
    buffer_mode: u16,
}

impl ScreenLog {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> (String, String) {
        self.status.clone()
    }

    pub fn window(&self) -> u16 {
        self.window
    }

    pub fn split(&self) -> u16 {
        self.split
    }

    pub fn style(&self) -> u16 {
        self.style
    }

    pub fn colours(&self) -> (u16, u16) {
        (self.foreground, self.background)
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn erased_windows(&self) -> &[u16] {
        &self.erased_windows
    }

    pub fn erased_all(&self) -> bool {
        self.erased_all
    }

    pub fn erased_line(&self) -> bool {
        self.erased_line
    }

    pub fn buffer_mode(&self) -> u16 {
        self.buffer_mode
    }
}

/// Screen that records everything into a shared [ScreenLog]
pub struct TestScreen {
    log: Rc<RefCell<ScreenLog>>,
}

impl Screen for TestScreen {
    fn rows(&self) -> u16 {
        24
    }

    fn columns(&self) -> u16 {
        80
    }

    fn print(&mut self, text: &str) {
        self.log.borrow_mut().text.push_str(text);
    }

    fn print_char(&mut self, c: char) {
        self.log.borrow_mut().text.push(c);
    }

    fn new_line(&mut self) {
        self.log.borrow_mut().text.push('\n');
    }

    fn split_window(&mut self, lines: u16) {
        self.log.borrow_mut().split = lines;
    }

    fn unsplit_window(&mut self) {
        self.log.borrow_mut().split = 0;
    }

    fn select_window(&mut self, window: u16) -> Result<(), RuntimeError> {
        self.log.borrow_mut().window = window;
        Ok(())
    }

    fn erase_window(&mut self, window: u16) {
        self.log.borrow_mut().erased_windows.push(window);
    }

    fn erase_all(&mut self, unsplit: bool) {
        let mut log = self.log.borrow_mut();
        log.erased_all = true;
        if unsplit {
            log.split = 0;
        }
    }

    fn erase_line(&mut self) {
        self.log.borrow_mut().erased_line = true;
    }

    fn cursor(&self) -> (u16, u16) {
        self.log.borrow().cursor
    }

    fn set_cursor(&mut self, row: u16, column: u16) {
        self.log.borrow_mut().cursor = (row, column);
    }

    fn set_text_style(&mut self, style: u16) {
        self.log.borrow_mut().style = style;
    }

    fn set_foreground(&mut self, colour: u16) {
        self.log.borrow_mut().foreground = colour;
    }

    fn set_background(&mut self, colour: u16) {
        self.log.borrow_mut().background = colour;
    }

    fn set_font(&mut self, font: u16) -> u16 {
        let mut log = self.log.borrow_mut();
        let previous = log.font;
        log.font = font;
        previous
    }

    fn buffer_mode(&mut self, mode: u16) {
        self.log.borrow_mut().buffer_mode = mode;
    }

    fn show_status(&mut self, left: &str, right: &str) {
        self.log.borrow_mut().status = (left.to_string(), right.to_string());
    }

    fn supports_colours(&self) -> bool {
        true
    }

    fn supports_bold(&self) -> bool {
        true
    }

    fn supports_italic(&self) -> bool {
        true
    }

    fn supports_fixed_font(&self) -> bool {
        true
    }
}

/// Register a recording screen, returning the shared log
pub fn test_screen(processor: &mut Processor) -> Rc<RefCell<ScreenLog>> {
    let log = Rc::new(RefCell::new(ScreenLog::default()));
    let screen = TestScreen {
        log: Rc::clone(&log),
    };
    processor
        .register_screen(Box::new(screen))
        .expect("register screen");
    log
}

#[derive(Debug, Default)]
/// Listener that records every event in order
pub struct EventRecorder {
    events: Vec<Event>,
}

impl EventRecorder {
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl EventListener for EventRecorder {
    fn event(&mut self, event: &Event) {
        self.events.push(*event);
    }
}

/// Register an [EventRecorder], returning the shared handle
pub fn event_recorder(processor: &mut Processor) -> Rc<RefCell<EventRecorder>> {
    let recorder = Rc::new(RefCell::new(EventRecorder::default()));
    let listener: Rc<RefCell<dyn EventListener>> = recorder.clone();
    processor.add_listener(listener);
    recorder
}
