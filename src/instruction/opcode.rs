//! Opcode table
//!
//! One static entry per `(version, kind, number)` triple carrying the
//! mnemonic, the decode flags (store/branch/ztext/double-variable) and the
//! handler.  The decoder and the processor share this table, so an opcode's
//! wire shape and its semantics can never disagree.
use crate::error::{ErrorCode, RuntimeError};
use crate::fatal_error;
use crate::instruction::{Instruction, NextAddress};
use crate::processor::handlers::{handlers_0op, handlers_1op, handlers_2op, handlers_ext, handlers_var};
use crate::processor::ExecutionContext;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
/// Operand-count table an opcode number indexes into
pub enum OpcodeKind {
    ZeroOp,
    OneOp,
    TwoOp,
    VarOp,
    Ext,
}

/// Per-opcode semantics, executed against the [ExecutionContext] capability
pub type OpcodeHandler =
    fn(&mut dyn ExecutionContext, &Instruction) -> Result<NextAddress, RuntimeError>;

/// Static opcode metadata
#[derive(Debug)]
pub struct OpcodeEntry {
    name: &'static str,
    store: bool,
    branch: bool,
    ztext: bool,
    double_variable: bool,
    call: bool,
    jump: bool,
    handler: OpcodeHandler,
}

impl OpcodeEntry {
    const fn new(name: &'static str, handler: OpcodeHandler) -> OpcodeEntry {
        OpcodeEntry {
            name,
            store: false,
            branch: false,
            ztext: false,
            double_variable: false,
            call: false,
            jump: false,
            handler,
        }
    }

    const fn store(mut self) -> Self {
        self.store = true;
        self
    }

    const fn branch(mut self) -> Self {
        self.branch = true;
        self
    }

    const fn ztext(mut self) -> Self {
        self.ztext = true;
        self
    }

    const fn double_variable(mut self) -> Self {
        self.double_variable = true;
        self
    }

    const fn call(mut self) -> Self {
        self.call = true;
        self
    }

    const fn jump(mut self) -> Self {
        self.jump = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A store-variable byte follows the operands
    pub fn has_store(&self) -> bool {
        self.store
    }

    /// A branch descriptor follows the operands (and store byte)
    pub fn has_branch(&self) -> bool {
        self.branch
    }

    /// In-line Z-text follows
    pub fn has_ztext(&self) -> bool {
        self.ztext
    }

    /// Two operand-kind bytes, up to 8 operands
    pub fn is_double_variable(&self) -> bool {
        self.double_variable
    }

    /// Transfers control via the call protocol
    pub fn is_call(&self) -> bool {
        self.call
    }

    /// Unconditional jump
    pub fn is_jump(&self) -> bool {
        self.jump
    }

    pub fn handler(&self) -> OpcodeHandler {
        self.handler
    }
}

// 2OP
const JE: OpcodeEntry = OpcodeEntry::new("je", handlers_2op::je).branch();
const JL: OpcodeEntry = OpcodeEntry::new("jl", handlers_2op::jl).branch();
const JG: OpcodeEntry = OpcodeEntry::new("jg", handlers_2op::jg).branch();
const DEC_CHK: OpcodeEntry = OpcodeEntry::new("dec_chk", handlers_2op::dec_chk).branch();
const INC_CHK: OpcodeEntry = OpcodeEntry::new("inc_chk", handlers_2op::inc_chk).branch();
const JIN: OpcodeEntry = OpcodeEntry::new("jin", handlers_2op::jin).branch();
const TEST: OpcodeEntry = OpcodeEntry::new("test", handlers_2op::test).branch();
const OR: OpcodeEntry = OpcodeEntry::new("or", handlers_2op::or).store();
const AND: OpcodeEntry = OpcodeEntry::new("and", handlers_2op::and).store();
const TEST_ATTR: OpcodeEntry = OpcodeEntry::new("test_attr", handlers_2op::test_attr).branch();
const SET_ATTR: OpcodeEntry = OpcodeEntry::new("set_attr", handlers_2op::set_attr);
const CLEAR_ATTR: OpcodeEntry = OpcodeEntry::new("clear_attr", handlers_2op::clear_attr);
const STORE: OpcodeEntry = OpcodeEntry::new("store", handlers_2op::store);
const INSERT_OBJ: OpcodeEntry = OpcodeEntry::new("insert_obj", handlers_2op::insert_obj);
const LOADW: OpcodeEntry = OpcodeEntry::new("loadw", handlers_2op::loadw).store();
const LOADB: OpcodeEntry = OpcodeEntry::new("loadb", handlers_2op::loadb).store();
const GET_PROP: OpcodeEntry = OpcodeEntry::new("get_prop", handlers_2op::get_prop).store();
const GET_PROP_ADDR: OpcodeEntry =
    OpcodeEntry::new("get_prop_addr", handlers_2op::get_prop_addr).store();
const GET_NEXT_PROP: OpcodeEntry =
    OpcodeEntry::new("get_next_prop", handlers_2op::get_next_prop).store();
const ADD: OpcodeEntry = OpcodeEntry::new("add", handlers_2op::add).store();
const SUB: OpcodeEntry = OpcodeEntry::new("sub", handlers_2op::sub).store();
const MUL: OpcodeEntry = OpcodeEntry::new("mul", handlers_2op::mul).store();
const DIV: OpcodeEntry = OpcodeEntry::new("div", handlers_2op::div).store();
const MOD: OpcodeEntry = OpcodeEntry::new("mod", handlers_2op::modulus).store();
const CALL_2S: OpcodeEntry = OpcodeEntry::new("call_2s", handlers_2op::call_2s)
    .store()
    .call();
const CALL_2N: OpcodeEntry = OpcodeEntry::new("call_2n", handlers_2op::call_2n).call();
const SET_COLOUR: OpcodeEntry = OpcodeEntry::new("set_colour", handlers_2op::set_colour);
const THROW: OpcodeEntry = OpcodeEntry::new("throw", handlers_2op::throw);

// 1OP
const JZ: OpcodeEntry = OpcodeEntry::new("jz", handlers_1op::jz).branch();
const GET_SIBLING: OpcodeEntry = OpcodeEntry::new("get_sibling", handlers_1op::get_sibling)
    .store()
    .branch();
const GET_CHILD: OpcodeEntry = OpcodeEntry::new("get_child", handlers_1op::get_child)
    .store()
    .branch();
const GET_PARENT: OpcodeEntry = OpcodeEntry::new("get_parent", handlers_1op::get_parent).store();
const GET_PROP_LEN: OpcodeEntry =
    OpcodeEntry::new("get_prop_len", handlers_1op::get_prop_len).store();
const INC: OpcodeEntry = OpcodeEntry::new("inc", handlers_1op::inc);
const DEC: OpcodeEntry = OpcodeEntry::new("dec", handlers_1op::dec);
const PRINT_ADDR: OpcodeEntry = OpcodeEntry::new("print_addr", handlers_1op::print_addr);
const CALL_1S: OpcodeEntry = OpcodeEntry::new("call_1s", handlers_1op::call_1s)
    .store()
    .call();
const REMOVE_OBJ: OpcodeEntry = OpcodeEntry::new("remove_obj", handlers_1op::remove_obj);
const PRINT_OBJ: OpcodeEntry = OpcodeEntry::new("print_obj", handlers_1op::print_obj);
const RET: OpcodeEntry = OpcodeEntry::new("ret", handlers_1op::ret);
const JUMP: OpcodeEntry = OpcodeEntry::new("jump", handlers_1op::jump).jump();
const PRINT_PADDR: OpcodeEntry = OpcodeEntry::new("print_paddr", handlers_1op::print_paddr);
const LOAD: OpcodeEntry = OpcodeEntry::new("load", handlers_1op::load).store();
const NOT_1OP: OpcodeEntry = OpcodeEntry::new("not", handlers_1op::not).store();
const CALL_1N: OpcodeEntry = OpcodeEntry::new("call_1n", handlers_1op::call_1n).call();

// 0OP
const RTRUE: OpcodeEntry = OpcodeEntry::new("rtrue", handlers_0op::rtrue);
const RFALSE: OpcodeEntry = OpcodeEntry::new("rfalse", handlers_0op::rfalse);
const PRINT: OpcodeEntry = OpcodeEntry::new("print", handlers_0op::print).ztext();
const PRINT_RET: OpcodeEntry = OpcodeEntry::new("print_ret", handlers_0op::print_ret).ztext();
const NOP: OpcodeEntry = OpcodeEntry::new("nop", handlers_0op::nop);
const SAVE_V1: OpcodeEntry = OpcodeEntry::new("save", handlers_0op::save).branch();
const SAVE_V4: OpcodeEntry = OpcodeEntry::new("save", handlers_0op::save).store();
const RESTORE_V1: OpcodeEntry = OpcodeEntry::new("restore", handlers_0op::restore).branch();
const RESTORE_V4: OpcodeEntry = OpcodeEntry::new("restore", handlers_0op::restore).store();
const RESTART: OpcodeEntry = OpcodeEntry::new("restart", handlers_0op::restart);
const RET_POPPED: OpcodeEntry = OpcodeEntry::new("ret_popped", handlers_0op::ret_popped);
const POP: OpcodeEntry = OpcodeEntry::new("pop", handlers_0op::pop);
const CATCH: OpcodeEntry = OpcodeEntry::new("catch", handlers_0op::catch).store();
const QUIT: OpcodeEntry = OpcodeEntry::new("quit", handlers_0op::quit);
const NEW_LINE: OpcodeEntry = OpcodeEntry::new("new_line", handlers_0op::new_line);
const SHOW_STATUS: OpcodeEntry = OpcodeEntry::new("show_status", handlers_0op::show_status);
const VERIFY: OpcodeEntry = OpcodeEntry::new("verify", handlers_0op::verify).branch();
const PIRACY: OpcodeEntry = OpcodeEntry::new("piracy", handlers_0op::piracy).branch();

// VAR
const CALL: OpcodeEntry = OpcodeEntry::new("call", handlers_var::call_vs)
    .store()
    .call();
const CALL_VS: OpcodeEntry = OpcodeEntry::new("call_vs", handlers_var::call_vs)
    .store()
    .call();
const STOREW: OpcodeEntry = OpcodeEntry::new("storew", handlers_var::storew);
const STOREB: OpcodeEntry = OpcodeEntry::new("storeb", handlers_var::storeb);
const PUT_PROP: OpcodeEntry = OpcodeEntry::new("put_prop", handlers_var::put_prop);
const SREAD: OpcodeEntry = OpcodeEntry::new("sread", handlers_var::read);
const AREAD: OpcodeEntry = OpcodeEntry::new("aread", handlers_var::read).store();
const PRINT_CHAR: OpcodeEntry = OpcodeEntry::new("print_char", handlers_var::print_char);
const PRINT_NUM: OpcodeEntry = OpcodeEntry::new("print_num", handlers_var::print_num);
const RANDOM: OpcodeEntry = OpcodeEntry::new("random", handlers_var::random).store();
const PUSH: OpcodeEntry = OpcodeEntry::new("push", handlers_var::push);
const PULL: OpcodeEntry = OpcodeEntry::new("pull", handlers_var::pull);
const SPLIT_WINDOW: OpcodeEntry = OpcodeEntry::new("split_window", handlers_var::split_window);
const SET_WINDOW: OpcodeEntry = OpcodeEntry::new("set_window", handlers_var::set_window);
const CALL_VS2: OpcodeEntry = OpcodeEntry::new("call_vs2", handlers_var::call_vs2)
    .store()
    .call()
    .double_variable();
const ERASE_WINDOW: OpcodeEntry = OpcodeEntry::new("erase_window", handlers_var::erase_window);
const ERASE_LINE: OpcodeEntry = OpcodeEntry::new("erase_line", handlers_var::erase_line);
const SET_CURSOR: OpcodeEntry = OpcodeEntry::new("set_cursor", handlers_var::set_cursor);
const GET_CURSOR: OpcodeEntry = OpcodeEntry::new("get_cursor", handlers_var::get_cursor);
const SET_TEXT_STYLE: OpcodeEntry =
    OpcodeEntry::new("set_text_style", handlers_var::set_text_style);
const BUFFER_MODE: OpcodeEntry = OpcodeEntry::new("buffer_mode", handlers_var::buffer_mode);
const OUTPUT_STREAM: OpcodeEntry = OpcodeEntry::new("output_stream", handlers_var::output_stream);
const INPUT_STREAM: OpcodeEntry = OpcodeEntry::new("input_stream", handlers_var::input_stream);
const SOUND_EFFECT: OpcodeEntry = OpcodeEntry::new("sound_effect", handlers_var::sound_effect);
const READ_CHAR: OpcodeEntry = OpcodeEntry::new("read_char", handlers_var::read_char).store();
const SCAN_TABLE: OpcodeEntry = OpcodeEntry::new("scan_table", handlers_var::scan_table)
    .store()
    .branch();
const NOT_VAR: OpcodeEntry = OpcodeEntry::new("not", handlers_var::not).store();
const CALL_VN: OpcodeEntry = OpcodeEntry::new("call_vn", handlers_var::call_vn).call();
const CALL_VN2: OpcodeEntry = OpcodeEntry::new("call_vn2", handlers_var::call_vn2)
    .call()
    .double_variable();
const TOKENISE: OpcodeEntry = OpcodeEntry::new("tokenise", handlers_var::tokenise);
const ENCODE_TEXT: OpcodeEntry = OpcodeEntry::new("encode_text", handlers_var::encode_text);
const COPY_TABLE: OpcodeEntry = OpcodeEntry::new("copy_table", handlers_var::copy_table);
const PRINT_TABLE: OpcodeEntry = OpcodeEntry::new("print_table", handlers_var::print_table);
const CHECK_ARG_COUNT: OpcodeEntry =
    OpcodeEntry::new("check_arg_count", handlers_var::check_arg_count).branch();

// EXT
const SAVE_EXT: OpcodeEntry = OpcodeEntry::new("save", handlers_ext::save).store();
const RESTORE_EXT: OpcodeEntry = OpcodeEntry::new("restore", handlers_ext::restore).store();
const LOG_SHIFT: OpcodeEntry = OpcodeEntry::new("log_shift", handlers_ext::log_shift).store();
const ART_SHIFT: OpcodeEntry = OpcodeEntry::new("art_shift", handlers_ext::art_shift).store();
const SET_FONT: OpcodeEntry = OpcodeEntry::new("set_font", handlers_ext::set_font).store();
const SAVE_UNDO: OpcodeEntry = OpcodeEntry::new("save_undo", handlers_ext::save_undo).store();
const RESTORE_UNDO: OpcodeEntry =
    OpcodeEntry::new("restore_undo", handlers_ext::restore_undo).store();
const PRINT_UNICODE: OpcodeEntry = OpcodeEntry::new("print_unicode", handlers_ext::print_unicode);
const CHECK_UNICODE: OpcodeEntry =
    OpcodeEntry::new("check_unicode", handlers_ext::check_unicode).store();

/// Look up the opcode table entry for `(version, kind, number)`.
///
/// # Returns
/// [Result] with the entry, or an [ErrorCode::InvalidInstruction] error when
/// the triple names no opcode in this version.
pub fn entry(
    version: u8,
    kind: OpcodeKind,
    number: u8,
) -> Result<&'static OpcodeEntry, RuntimeError> {
    let e = match kind {
        OpcodeKind::TwoOp => match (number, version) {
            (0x01, _) => Some(&JE),
            (0x02, _) => Some(&JL),
            (0x03, _) => Some(&JG),
            (0x04, _) => Some(&DEC_CHK),
            (0x05, _) => Some(&INC_CHK),
            (0x06, _) => Some(&JIN),
            (0x07, _) => Some(&TEST),
            (0x08, _) => Some(&OR),
            (0x09, _) => Some(&AND),
            (0x0A, _) => Some(&TEST_ATTR),
            (0x0B, _) => Some(&SET_ATTR),
            (0x0C, _) => Some(&CLEAR_ATTR),
            (0x0D, _) => Some(&STORE),
            (0x0E, _) => Some(&INSERT_OBJ),
            (0x0F, _) => Some(&LOADW),
            (0x10, _) => Some(&LOADB),
            (0x11, _) => Some(&GET_PROP),
            (0x12, _) => Some(&GET_PROP_ADDR),
            (0x13, _) => Some(&GET_NEXT_PROP),
            (0x14, _) => Some(&ADD),
            (0x15, _) => Some(&SUB),
            (0x16, _) => Some(&MUL),
            (0x17, _) => Some(&DIV),
            (0x18, _) => Some(&MOD),
            (0x19, 4..) => Some(&CALL_2S),
            (0x1A, 5..) => Some(&CALL_2N),
            (0x1B, 5..) => Some(&SET_COLOUR),
            (0x1C, 5..) => Some(&THROW),
            (_, _) => None,
        },
        OpcodeKind::OneOp => match (number, version) {
            (0x00, _) => Some(&JZ),
            (0x01, _) => Some(&GET_SIBLING),
            (0x02, _) => Some(&GET_CHILD),
            (0x03, _) => Some(&GET_PARENT),
            (0x04, _) => Some(&GET_PROP_LEN),
            (0x05, _) => Some(&INC),
            (0x06, _) => Some(&DEC),
            (0x07, _) => Some(&PRINT_ADDR),
            (0x08, 4..) => Some(&CALL_1S),
            (0x09, _) => Some(&REMOVE_OBJ),
            (0x0A, _) => Some(&PRINT_OBJ),
            (0x0B, _) => Some(&RET),
            (0x0C, _) => Some(&JUMP),
            (0x0D, _) => Some(&PRINT_PADDR),
            (0x0E, _) => Some(&LOAD),
            (0x0F, 1..=4) => Some(&NOT_1OP),
            (0x0F, _) => Some(&CALL_1N),
            (_, _) => None,
        },
        OpcodeKind::ZeroOp => match (number, version) {
            (0x00, _) => Some(&RTRUE),
            (0x01, _) => Some(&RFALSE),
            (0x02, _) => Some(&PRINT),
            (0x03, _) => Some(&PRINT_RET),
            (0x04, _) => Some(&NOP),
            (0x05, 1..=3) => Some(&SAVE_V1),
            (0x05, 4) => Some(&SAVE_V4),
            (0x06, 1..=3) => Some(&RESTORE_V1),
            (0x06, 4) => Some(&RESTORE_V4),
            (0x07, _) => Some(&RESTART),
            (0x08, _) => Some(&RET_POPPED),
            (0x09, 1..=4) => Some(&POP),
            (0x09, _) => Some(&CATCH),
            (0x0A, _) => Some(&QUIT),
            (0x0B, _) => Some(&NEW_LINE),
            (0x0C, 3) => Some(&SHOW_STATUS),
            (0x0D, 3..) => Some(&VERIFY),
            (0x0F, 5..) => Some(&PIRACY),
            (_, _) => None,
        },
        OpcodeKind::VarOp => match (number, version) {
            (0x00, 1..=3) => Some(&CALL),
            (0x00, _) => Some(&CALL_VS),
            (0x01, _) => Some(&STOREW),
            (0x02, _) => Some(&STOREB),
            (0x03, _) => Some(&PUT_PROP),
            (0x04, 1..=4) => Some(&SREAD),
            (0x04, _) => Some(&AREAD),
            (0x05, _) => Some(&PRINT_CHAR),
            (0x06, _) => Some(&PRINT_NUM),
            (0x07, _) => Some(&RANDOM),
            (0x08, _) => Some(&PUSH),
            (0x09, _) => Some(&PULL),
            (0x0A, 3..) => Some(&SPLIT_WINDOW),
            (0x0B, 3..) => Some(&SET_WINDOW),
            (0x0C, 4..) => Some(&CALL_VS2),
            (0x0D, 4..) => Some(&ERASE_WINDOW),
            (0x0E, 4..) => Some(&ERASE_LINE),
            (0x0F, 4..) => Some(&SET_CURSOR),
            (0x10, 4..) => Some(&GET_CURSOR),
            (0x11, 4..) => Some(&SET_TEXT_STYLE),
            (0x12, 4..) => Some(&BUFFER_MODE),
            (0x13, 3..) => Some(&OUTPUT_STREAM),
            (0x14, 3..) => Some(&INPUT_STREAM),
            (0x15, 3..) => Some(&SOUND_EFFECT),
            (0x16, 4..) => Some(&READ_CHAR),
            (0x17, 4..) => Some(&SCAN_TABLE),
            (0x18, 5..) => Some(&NOT_VAR),
            (0x19, 5..) => Some(&CALL_VN),
            (0x1A, 5..) => Some(&CALL_VN2),
            (0x1B, 5..) => Some(&TOKENISE),
            (0x1C, 5..) => Some(&ENCODE_TEXT),
            (0x1D, 5..) => Some(&COPY_TABLE),
            (0x1E, 5..) => Some(&PRINT_TABLE),
            (0x1F, 5..) => Some(&CHECK_ARG_COUNT),
            (_, _) => None,
        },
        OpcodeKind::Ext => match (number, version) {
            (0x00, 5..) => Some(&SAVE_EXT),
            (0x01, 5..) => Some(&RESTORE_EXT),
            (0x02, 5..) => Some(&LOG_SHIFT),
            (0x03, 5..) => Some(&ART_SHIFT),
            (0x04, 5..) => Some(&SET_FONT),
            (0x09, 5..) => Some(&SAVE_UNDO),
            (0x0A, 5..) => Some(&RESTORE_UNDO),
            (0x0B, 5..) => Some(&PRINT_UNICODE),
            (0x0C, 5..) => Some(&CHECK_UNICODE),
            (_, _) => None,
        },
    };

    match e {
        Some(e) => Ok(e),
        None => fatal_error!(
            ErrorCode::InvalidInstruction,
            "No {:?}:{:02x} opcode in version {}",
            kind,
            number,
            version
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_ok;

    use super::*;

    #[test]
    fn test_entry_flags() {
        let add = assert_ok!(entry(3, OpcodeKind::TwoOp, 0x14));
        assert_eq!(add.name(), "add");
        assert!(add.has_store());
        assert!(!add.has_branch());
        assert!(!add.has_ztext());
        assert!(!add.is_double_variable());
        assert!(!add.is_call());
        assert!(!add.is_jump());

        let je = assert_ok!(entry(3, OpcodeKind::TwoOp, 0x01));
        assert_eq!(je.name(), "je");
        assert!(je.has_branch());
        assert!(!je.has_store());

        let print = assert_ok!(entry(3, OpcodeKind::ZeroOp, 0x02));
        assert!(print.has_ztext());

        let jump = assert_ok!(entry(3, OpcodeKind::OneOp, 0x0C));
        assert!(jump.is_jump());

        let call_vs2 = assert_ok!(entry(5, OpcodeKind::VarOp, 0x0C));
        assert!(call_vs2.is_double_variable());
        assert!(call_vs2.is_call());
        assert!(call_vs2.has_store());

        let call_vn2 = assert_ok!(entry(5, OpcodeKind::VarOp, 0x1A));
        assert!(call_vn2.is_double_variable());
        assert!(!call_vn2.has_store());
    }

    #[test]
    fn test_entry_store_and_branch() {
        let get_sibling = assert_ok!(entry(3, OpcodeKind::OneOp, 0x01));
        assert!(get_sibling.has_store());
        assert!(get_sibling.has_branch());

        let scan_table = assert_ok!(entry(5, OpcodeKind::VarOp, 0x17));
        assert!(scan_table.has_store());
        assert!(scan_table.has_branch());
    }

    #[test]
    fn test_entry_version_gating() {
        // call_1s arrives in V4
        assert!(entry(3, OpcodeKind::OneOp, 0x08).is_err());
        assert!(entry(4, OpcodeKind::OneOp, 0x08).is_ok());
        // 1OP:0F is not in V3/V4 and call_1n from V5
        assert_eq!(assert_ok!(entry(3, OpcodeKind::OneOp, 0x0F)).name(), "not");
        assert_eq!(
            assert_ok!(entry(5, OpcodeKind::OneOp, 0x0F)).name(),
            "call_1n"
        );
        // 0OP:09 is pop through V4, catch after
        assert_eq!(assert_ok!(entry(4, OpcodeKind::ZeroOp, 0x09)).name(), "pop");
        assert_eq!(
            assert_ok!(entry(5, OpcodeKind::ZeroOp, 0x09)).name(),
            "catch"
        );
        // sread becomes the storing aread in V5
        assert!(!assert_ok!(entry(4, OpcodeKind::VarOp, 0x04)).has_store());
        assert!(assert_ok!(entry(5, OpcodeKind::VarOp, 0x04)).has_store());
        // V3 save branches, V4 save stores
        assert!(assert_ok!(entry(3, OpcodeKind::ZeroOp, 0x05)).has_branch());
        assert!(assert_ok!(entry(4, OpcodeKind::ZeroOp, 0x05)).has_store());
        assert!(entry(5, OpcodeKind::ZeroOp, 0x05).is_err());
    }

    #[test]
    fn test_entry_unknown() {
        let e = entry(3, OpcodeKind::TwoOp, 0x00).unwrap_err();
        assert_eq!(e.code(), ErrorCode::InvalidInstruction);
        assert!(entry(3, OpcodeKind::TwoOp, 0x1D).is_err());
        assert!(entry(3, OpcodeKind::ZeroOp, 0x0E).is_err());
        assert!(entry(3, OpcodeKind::Ext, 0x02).is_err());
        assert!(entry(5, OpcodeKind::Ext, 0x1F).is_err());
    }
}
