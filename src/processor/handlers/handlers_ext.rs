use super::*;
use crate::error::{ErrorCode, RuntimeError};
use crate::fatal_error;

/// EXT save/restore need a persistence layer this core does not carry;
/// report failure the way the Z-Machine expects
pub fn save(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    warn!(target: "app::state", "SAVE is not provided; reporting failure");
    store_result(ctx, instruction, 0)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn restore(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    warn!(target: "app::state", "RESTORE is not provided; reporting failure");
    store_result(ctx, instruction, 0)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn log_shift(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let places = operands[1] as i16;
    if places.unsigned_abs() > 15 {
        return fatal_error!(
            ErrorCode::InvalidShift,
            "LOG_SHIFT by {} places",
            places
        );
    }
    let value = if places < 0 {
        operands[0] >> places.unsigned_abs()
    } else {
        operands[0] << places
    };
    store_result(ctx, instruction, value)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn art_shift(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let places = operands[1] as i16;
    if places.unsigned_abs() > 15 {
        return fatal_error!(
            ErrorCode::InvalidShift,
            "ART_SHIFT by {} places",
            places
        );
    }
    let value = if places < 0 {
        ((operands[0] as i16) >> places.unsigned_abs()) as u16
    } else {
        ((operands[0] as i16) << places) as u16
    };
    store_result(ctx, instruction, value)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn set_font(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let previous = ctx.screen()?.set_font(operands[0]);
    store_result(ctx, instruction, previous)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

/// Undo is unavailable; -1 tells the story so
pub fn save_undo(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    store_result(ctx, instruction, 0xFFFF)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn restore_undo(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    store_result(ctx, instruction, 0)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

/// ZSCII output only; anything else prints a placeholder
pub fn print_unicode(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    match operands[0] {
        32..=126 => ctx.print_char(operands[0])?,
        _ => ctx.print_char(b'?' as u16)?,
    }
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn check_unicode(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    // Bit 0: can print; bit 1: can receive
    let result = if (32..=126).contains(&operands[0]) {
        3
    } else {
        0
    };
    store_result(ctx, instruction, result)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

#[cfg(test)]
mod tests {
    use crate::{
        assert_ok_eq,
        instruction::{opcode::OpcodeKind, Opcode, Operand, Variable},
        test_util::{mock_store_instruction, mock_processor, test_map},
    };

    use super::*;

    fn opcode(number: u8) -> Opcode {
        Opcode::new(5, number, OpcodeKind::Ext, number)
    }

    #[test]
    fn test_log_shift() {
        let mut p = mock_processor(test_map(5));
        let i = mock_store_instruction(
            0x480,
            opcode(0x02),
            vec![Operand::LargeConstant(0x8001), Operand::SmallConstant(1)],
            7,
            Variable::Global(0x70),
        );
        assert_ok_eq!(log_shift(&mut p, &i), NextAddress::Address(0x487));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0x0002);
        // Logical right shift pulls zeros in at the top
        let i = mock_store_instruction(
            0x480,
            opcode(0x02),
            vec![
                Operand::LargeConstant(0x8000),
                Operand::LargeConstant((-1i16) as u16),
            ],
            8,
            Variable::Global(0x70),
        );
        assert!(log_shift(&mut p, &i).is_ok());
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0x4000);
    }

    #[test]
    fn test_art_shift() {
        let mut p = mock_processor(test_map(5));
        // Arithmetic right shift keeps the sign
        let i = mock_store_instruction(
            0x480,
            opcode(0x03),
            vec![
                Operand::LargeConstant(0x8000),
                Operand::LargeConstant((-1i16) as u16),
            ],
            8,
            Variable::Global(0x70),
        );
        assert_ok_eq!(art_shift(&mut p, &i), NextAddress::Address(0x488));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0xC000);
        let i = mock_store_instruction(
            0x480,
            opcode(0x03),
            vec![Operand::SmallConstant(3), Operand::SmallConstant(2)],
            6,
            Variable::Global(0x70),
        );
        assert!(art_shift(&mut p, &i).is_ok());
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 12);
    }

    #[test]
    fn test_shift_out_of_range() {
        let mut p = mock_processor(test_map(5));
        let i = mock_store_instruction(
            0x480,
            opcode(0x02),
            vec![Operand::SmallConstant(1), Operand::SmallConstant(16)],
            6,
            Variable::Global(0x70),
        );
        let e = log_shift(&mut p, &i).unwrap_err();
        assert_eq!(e.code(), ErrorCode::InvalidShift);
        let i = mock_store_instruction(
            0x480,
            opcode(0x03),
            vec![
                Operand::SmallConstant(1),
                Operand::LargeConstant((-16i16) as u16),
            ],
            7,
            Variable::Global(0x70),
        );
        assert!(art_shift(&mut p, &i).is_err());
    }

    #[test]
    fn test_save_undo_unavailable() {
        let mut p = mock_processor(test_map(5));
        let i = mock_store_instruction(0x480, opcode(0x09), vec![], 4, Variable::Global(0x70));
        assert_ok_eq!(save_undo(&mut p, &i), NextAddress::Address(0x484));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0xFFFF);
    }

    #[test]
    fn test_restore_undo() {
        let mut p = mock_processor(test_map(5));
        let i = mock_store_instruction(0x480, opcode(0x0A), vec![], 4, Variable::Global(0x70));
        assert_ok_eq!(restore_undo(&mut p, &i), NextAddress::Address(0x484));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0);
    }

    #[test]
    fn test_check_unicode() {
        let mut p = mock_processor(test_map(5));
        let i = mock_store_instruction(
            0x480,
            opcode(0x0C),
            vec![Operand::SmallConstant(b'a')],
            5,
            Variable::Global(0x70),
        );
        assert!(check_unicode(&mut p, &i).is_ok());
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 3);
        let i = mock_store_instruction(
            0x480,
            opcode(0x0C),
            vec![Operand::LargeConstant(0x263A)],
            6,
            Variable::Global(0x70),
        );
        assert!(check_unicode(&mut p, &i).is_ok());
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0);
    }
}
