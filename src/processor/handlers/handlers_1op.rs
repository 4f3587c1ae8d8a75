use super::*;
use crate::error::RuntimeError;

pub fn jz(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.branch(instruction, operands[0] == 0)
}

pub fn get_sibling(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let sibling = object::sibling(ctx, operands[0] as usize)?;
    store_result(ctx, instruction, sibling as u16)?;
    ctx.branch(instruction, sibling != 0)
}

pub fn get_child(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let child = object::child(ctx, operands[0] as usize)?;
    store_result(ctx, instruction, child as u16)?;
    ctx.branch(instruction, child != 0)
}

pub fn get_parent(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let parent = object::parent(ctx, operands[0] as usize)?;
    store_result(ctx, instruction, parent as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn get_prop_len(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let length = object::property_length(ctx, operands[0] as usize)?;
    store_result(ctx, instruction, length as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn inc(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let variable = Variable::from(operands[0] as u8);
    let value = ctx.peek_variable(variable)? as i16;
    ctx.set_variable_indirect(variable, i16::overflowing_add(value, 1).0 as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn dec(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let variable = Variable::from(operands[0] as u8);
    let value = ctx.peek_variable(variable)? as i16;
    ctx.set_variable_indirect(variable, i16::overflowing_sub(value, 1).0 as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn print_addr(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let ztext = ctx.string_literal(operands[0] as usize)?;
    let zscii = text::zscii_from_ztext(&*ctx, &ztext)?;
    ctx.print(&zscii)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn call_1s(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    call_fn(
        ctx,
        operands[0],
        instruction.next_address(),
        &[],
        instruction.store(),
    )
}

pub fn remove_obj(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    object::remove(ctx, operands[0] as usize)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn print_obj(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let name = object::short_name(ctx, operands[0] as usize)?;
    let zscii = text::zscii_from_ztext(&*ctx, &name)?;
    ctx.print(&zscii)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn ret(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.return_routine(operands[0])
}

pub fn jump(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let offset = operands[0] as i16;
    Ok(NextAddress::Address(
        (instruction.next_address() as isize + offset as isize - 2) as usize,
    ))
}

pub fn print_paddr(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let address = ctx.packed_string_address(operands[0])?;
    let ztext = ctx.string_literal(address)?;
    let zscii = text::zscii_from_ztext(&*ctx, &ztext)?;
    ctx.print(&zscii)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn load(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    // An indirect read never pops the stack
    let value = ctx.peek_variable(Variable::from(operands[0] as u8))?;
    store_result(ctx, instruction, value)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn not(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    store_result(ctx, instruction, !operands[0])?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn call_1n(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    call_fn(ctx, operands[0], instruction.next_address(), &[], None)
}

#[cfg(test)]
mod tests {
    use crate::{
        assert_ok_eq,
        instruction::{opcode::OpcodeKind, Branch, BranchTarget, Opcode, Operand},
        test_util::{
            add_object_tables, mock_branch_instruction, mock_instruction, mock_processor,
            mock_store_branch_instruction, mock_store_instruction, test_map, test_screen,
        },
    };

    use super::*;

    fn opcode(version: u8, number: u8) -> Opcode {
        Opcode::new(version, 0x80 | number, OpcodeKind::OneOp, number)
    }

    #[test]
    fn test_jz() {
        let mut p = mock_processor(test_map(5));
        let i = mock_branch_instruction(
            0x480,
            opcode(5, 0x00),
            vec![Operand::SmallConstant(0)],
            4,
            Branch::new(true, BranchTarget::Address(5)),
        );
        assert_ok_eq!(jz(&mut p, &i), NextAddress::Address(0x487));
        let i = mock_branch_instruction(
            0x480,
            opcode(5, 0x00),
            vec![Operand::SmallConstant(1)],
            4,
            Branch::new(true, BranchTarget::Address(5)),
        );
        assert_ok_eq!(jz(&mut p, &i), NextAddress::Address(0x484));
    }

    #[test]
    fn test_get_sibling_stores_and_branches() {
        let mut map = test_map(3);
        add_object_tables(&mut map, 3);
        let mut p = mock_processor(map);
        let i = mock_store_branch_instruction(
            0x480,
            opcode(3, 0x01),
            vec![Operand::SmallConstant(2)],
            5,
            Variable::Global(0x70),
            Branch::new(true, BranchTarget::Address(5)),
        );
        assert_ok_eq!(get_sibling(&mut p, &i), NextAddress::Address(0x488));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 3);
        // Object 3 has no sibling: store 0, no branch
        let i = mock_store_branch_instruction(
            0x480,
            opcode(3, 0x01),
            vec![Operand::SmallConstant(3)],
            5,
            Variable::Global(0x70),
            Branch::new(true, BranchTarget::Address(5)),
        );
        assert_ok_eq!(get_sibling(&mut p, &i), NextAddress::Address(0x485));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0);
    }

    #[test]
    fn test_get_child_get_parent() {
        let mut map = test_map(3);
        add_object_tables(&mut map, 3);
        let mut p = mock_processor(map);
        let i = mock_store_branch_instruction(
            0x480,
            opcode(3, 0x02),
            vec![Operand::SmallConstant(1)],
            5,
            Variable::Global(0x70),
            Branch::new(true, BranchTarget::Address(5)),
        );
        assert_ok_eq!(get_child(&mut p, &i), NextAddress::Address(0x488));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 2);
        let i = mock_store_instruction(
            0x480,
            opcode(3, 0x03),
            vec![Operand::SmallConstant(2)],
            4,
            Variable::Global(0x71),
        );
        assert_ok_eq!(get_parent(&mut p, &i), NextAddress::Address(0x484));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x71)), 1);
    }

    #[test]
    fn test_inc_dec() {
        let mut p = mock_processor(test_map(5));
        p.set_variable(Variable::Stack, 0x7FFF).expect("push");
        let i = mock_instruction(
            0x480,
            opcode(5, 0x05),
            vec![Operand::SmallConstant(0x00)],
            3,
        );
        assert_ok_eq!(inc(&mut p, &i), NextAddress::Address(0x483));
        // Increment wraps and updates the stack top in place
        assert_eq!(p.current_frame().expect("frame").stack(), &[0x8000]);
        let i = mock_instruction(
            0x480,
            opcode(5, 0x06),
            vec![Operand::SmallConstant(0x00)],
            3,
        );
        assert_ok_eq!(dec(&mut p, &i), NextAddress::Address(0x483));
        assert_eq!(p.current_frame().expect("frame").stack(), &[0x7FFF]);
    }

    #[test]
    fn test_ret() {
        let mut map = test_map(5);
        map[0x500] = 0;
        let mut p = mock_processor(map);
        p.call_routine(0x500, &[], Some(Variable::Global(0x70)), 0x484)
            .expect("call");
        let i = mock_instruction(
            0x501,
            opcode(5, 0x0B),
            vec![Operand::LargeConstant(0xBEEF)],
            4,
        );
        assert_ok_eq!(ret(&mut p, &i), NextAddress::Address(0x484));
        assert_eq!(p.frame_count(), 1);
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0xBEEF);
    }

    #[test]
    fn test_jump() {
        let mut p = mock_processor(test_map(5));
        let i = mock_instruction(
            0x480,
            opcode(5, 0x0C),
            vec![Operand::LargeConstant(0x10)],
            4,
        );
        assert_ok_eq!(jump(&mut p, &i), NextAddress::Address(0x492));
    }

    #[test]
    fn test_jump_negative_offset() {
        let mut p = mock_processor(test_map(5));
        let i = mock_instruction(
            0x480,
            opcode(5, 0x0C),
            vec![Operand::LargeConstant((-0x20i16) as u16)],
            4,
        );
        assert_ok_eq!(jump(&mut p, &i), NextAddress::Address(0x462));
    }

    #[test]
    fn test_load_peeks() {
        let mut p = mock_processor(test_map(5));
        p.set_variable(Variable::Stack, 0x1234).expect("push");
        let i = mock_store_instruction(
            0x480,
            opcode(5, 0x0E),
            vec![Operand::SmallConstant(0x00)],
            4,
            Variable::Global(0x70),
        );
        assert_ok_eq!(load(&mut p, &i), NextAddress::Address(0x484));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0x1234);
        // The stack was not popped
        assert_eq!(p.current_frame().expect("frame").stack(), &[0x1234]);
    }

    #[test]
    fn test_not() {
        let mut p = mock_processor(test_map(3));
        let i = mock_store_instruction(
            0x480,
            opcode(3, 0x0F),
            vec![Operand::LargeConstant(0xF0F0)],
            5,
            Variable::Global(0x70),
        );
        assert_ok_eq!(not(&mut p, &i), NextAddress::Address(0x485));
        assert_ok_eq!(p.peek_variable(Variable::Global(0x70)), 0x0F0F);
    }

    #[test]
    fn test_print_obj() {
        let mut map = test_map(3);
        add_object_tables(&mut map, 3);
        let mut p = mock_processor(map);
        let screen = test_screen(&mut p);
        let i = mock_instruction(
            0x480,
            opcode(3, 0x0A),
            vec![Operand::SmallConstant(1)],
            3,
        );
        assert_ok_eq!(print_obj(&mut p, &i), NextAddress::Address(0x483));
        assert_eq!(screen.borrow().text(), "pod");
    }

    #[test]
    fn test_call_1n_no_store() {
        let mut map = test_map(5);
        map[0x500] = 1;
        let mut p = mock_processor(map);
        let i = mock_instruction(
            0x480,
            opcode(5, 0x0F),
            vec![Operand::LargeConstant(0x140)],
            4,
        );
        assert_ok_eq!(call_1n(&mut p, &i), NextAddress::Address(0x501));
        assert_eq!(p.frame_count(), 2);
        assert!(p.current_frame().expect("frame").result().is_none());
        assert_eq!(p.current_frame().expect("frame").local_variables(), &[0]);
    }
}
