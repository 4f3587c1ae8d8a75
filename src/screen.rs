//! Host screen capability
//!
//! The processor never draws anything itself.  A host registers a [Screen]
//! implementation and the print/window/cursor opcodes call through it.
//! Keyboard input does _not_ flow through this trait; READ and READ_CHAR park
//! the processor in a pending-input state that the host completes with
//! [resume_read](crate::processor::Processor::resume_read) or
//! [resume_read_char](crate::processor::Processor::resume_read_char).
use crate::error::RuntimeError;

/// Text style bits, additive except for [ROMAN]
pub const ROMAN: u16 = 0x0;
pub const REVERSE: u16 = 0x1;
pub const BOLD: u16 = 0x2;
pub const ITALIC: u16 = 0x4;
pub const FIXED_PITCH: u16 = 0x8;

/// The lower (main) window
pub const WINDOW_LOWER: u16 = 0;
/// The upper (status/split) window
pub const WINDOW_UPPER: u16 = 1;

/// Host-provided presentation surface
pub trait Screen {
    /// Screen height in rows
    fn rows(&self) -> u16;

    /// Screen width in columns
    fn columns(&self) -> u16;

    /// Print text at the cursor in the selected window
    fn print(&mut self, text: &str);

    /// Print a single character at the cursor in the selected window
    fn print_char(&mut self, c: char);

    /// Move the cursor to the start of the next line
    fn new_line(&mut self);

    /// Split the upper window to `lines` rows
    fn split_window(&mut self, lines: u16);

    /// Remove the upper window
    fn unsplit_window(&mut self);

    /// Select the window subsequent output goes to
    fn select_window(&mut self, window: u16) -> Result<(), RuntimeError>;

    /// Erase a single window
    fn erase_window(&mut self, window: u16);

    /// Erase the whole screen, optionally unsplitting first
    fn erase_all(&mut self, unsplit: bool);

    /// Erase from the cursor to the end of the current line
    fn erase_line(&mut self);

    /// Cursor position `(row, column)`, 1-based, in the selected window
    fn cursor(&self) -> (u16, u16);

    /// Move the cursor in the selected window
    fn set_cursor(&mut self, row: u16, column: u16);

    /// Set the text style bits
    fn set_text_style(&mut self, style: u16);

    /// Set the foreground colour
    fn set_foreground(&mut self, colour: u16);

    /// Set the background colour
    fn set_background(&mut self, colour: u16);

    /// Select a font, returning the previous font or 0 if unavailable
    fn set_font(&mut self, font: u16) -> u16;

    /// Enable or disable buffered (word-wrapped) output
    fn buffer_mode(&mut self, mode: u16);

    /// Draw the V3 status line
    fn show_status(&mut self, left: &str, right: &str);

    fn supports_colours(&self) -> bool {
        false
    }

    fn supports_bold(&self) -> bool {
        false
    }

    fn supports_italic(&self) -> bool {
        false
    }

    fn supports_fixed_font(&self) -> bool {
        false
    }
}
