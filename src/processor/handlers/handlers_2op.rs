use super::*;
use crate::error::{ErrorCode, RuntimeError};
use crate::fatal_error;
use crate::object;

pub fn je(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let mut equal = false;
    for value in &operands[1..] {
        if operands[0] as i16 == *value as i16 {
            equal = true;
            break;
        }
    }
    ctx.branch(instruction, equal)
}

pub fn jl(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.branch(instruction, (operands[0] as i16) < (operands[1] as i16))
}

pub fn jg(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.branch(instruction, (operands[0] as i16) > (operands[1] as i16))
}

pub fn dec_chk(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let variable = Variable::from(operands[0] as u8);
    let value = ctx.peek_variable(variable)? as i16;
    let new_value = i16::overflowing_sub(value, 1).0;
    ctx.set_variable_indirect(variable, new_value as u16)?;
    ctx.branch(instruction, new_value < operands[1] as i16)
}

pub fn inc_chk(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let variable = Variable::from(operands[0] as u8);
    let value = ctx.peek_variable(variable)? as i16;
    let new_value = i16::overflowing_add(value, 1).0;
    ctx.set_variable_indirect(variable, new_value as u16)?;
    ctx.branch(instruction, new_value > operands[1] as i16)
}

pub fn jin(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let parent = object::parent(ctx, operands[0] as usize)?;
    ctx.branch(instruction, parent == operands[1] as usize)
}

pub fn test(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.branch(instruction, operands[0] & operands[1] == operands[1])
}

pub fn or(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let mut result = operands[0];
    for value in operands[1..].iter() {
        result |= *value;
    }
    store_result(ctx, instruction, result)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn and(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let mut result = operands[0];
    for value in operands[1..].iter() {
        result &= *value;
    }
    store_result(ctx, instruction, result)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn test_attr(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let set = object::attribute(ctx, operands[0] as usize, operands[1] as u8)?;
    ctx.branch(instruction, set)
}

pub fn set_attr(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    object::set_attribute(ctx, operands[0] as usize, operands[1] as u8)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn clear_attr(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    object::clear_attribute(ctx, operands[0] as usize, operands[1] as u8)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn store(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.set_variable_indirect(Variable::from(operands[0] as u8), operands[1])?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn insert_obj(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    object::insert(ctx, operands[0] as usize, operands[1] as usize)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn loadw(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let address = (operands[0] as isize + (operands[1] as i16 as isize * 2)) as usize;
    let value = ctx.read_word(address)?;
    store_result(ctx, instruction, value)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn loadb(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let address = (operands[0] as isize + (operands[1] as i16 as isize)) as usize;
    let value = ctx.read_byte(address)? as u16;
    store_result(ctx, instruction, value)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn get_prop(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let value = object::property(ctx, operands[0] as usize, operands[1] as u8)?;
    store_result(ctx, instruction, value)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn get_prop_addr(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let address = object::property_data_address(ctx, operands[0] as usize, operands[1] as u8)?;
    store_result(ctx, instruction, address as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn get_next_prop(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let property = object::next_property(ctx, operands[0] as usize, operands[1] as u8)?;
    store_result(ctx, instruction, property as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn add(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let value = i16::overflowing_add(operands[0] as i16, operands[1] as i16).0;
    store_result(ctx, instruction, value as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn sub(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let value = i16::overflowing_sub(operands[0] as i16, operands[1] as i16).0;
    store_result(ctx, instruction, value as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn mul(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let value = i16::overflowing_mul(operands[0] as i16, operands[1] as i16).0;
    store_result(ctx, instruction, value as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn div(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    if operands[1] == 0 {
        return fatal_error!(ErrorCode::DivideByZero, "Divide by zero");
    }
    let value = i16::overflowing_div(operands[0] as i16, operands[1] as i16).0;
    store_result(ctx, instruction, value as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn modulus(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    if operands[1] == 0 {
        return fatal_error!(ErrorCode::DivideByZero, "Modulo by zero");
    }
    let value = i16::overflowing_rem(operands[0] as i16, operands[1] as i16).0;
    store_result(ctx, instruction, value as u16)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn call_2s(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    call_fn(
        ctx,
        operands[0],
        instruction.next_address(),
        &operands[1..],
        instruction.store(),
    )
}

pub fn call_2n(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    call_fn(
        ctx,
        operands[0],
        instruction.next_address(),
        &operands[1..],
        None,
    )
}

pub fn set_colour(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let screen = ctx.screen()?;
    screen.set_foreground(operands[0]);
    screen.set_background(operands[1]);
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn throw(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.throw(operands[1], operands[0])
}
