use super::*;
use crate::error::{ErrorCode, RuntimeError};
use crate::fatal_error;

pub fn rtrue(
    ctx: &mut dyn ExecutionContext,
    _instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    ctx.return_routine(1)
}

pub fn rfalse(
    ctx: &mut dyn ExecutionContext,
    _instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    ctx.return_routine(0)
}

pub fn print(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    match instruction.ztext() {
        Some(ztext) => {
            let zscii = text::zscii_from_ztext(&*ctx, ztext)?;
            ctx.print(&zscii)?;
            Ok(NextAddress::Address(instruction.next_address()))
        }
        None => fatal_error!(
            ErrorCode::IllegalState,
            "PRINT instruction decoded without text"
        ),
    }
}

pub fn print_ret(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    match instruction.ztext() {
        Some(ztext) => {
            let zscii = text::zscii_from_ztext(&*ctx, ztext)?;
            ctx.print(&zscii)?;
            ctx.new_line()?;
            ctx.return_routine(1)
        }
        None => fatal_error!(
            ErrorCode::IllegalState,
            "PRINT_RET instruction decoded without text"
        ),
    }
}

pub fn nop(
    _ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    Ok(NextAddress::Address(instruction.next_address()))
}

/// Game saving needs a persistence layer this core does not carry; report
/// failure the way the Z-Machine expects
pub fn save(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    warn!(target: "app::state", "SAVE is not provided; reporting failure");
    if ctx.version() < 4 {
        ctx.branch(instruction, false)
    } else {
        store_result(ctx, instruction, 0)?;
        Ok(NextAddress::Address(instruction.next_address()))
    }
}

pub fn restore(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    warn!(target: "app::state", "RESTORE is not provided; reporting failure");
    if ctx.version() < 4 {
        ctx.branch(instruction, false)
    } else {
        store_result(ctx, instruction, 0)?;
        Ok(NextAddress::Address(instruction.next_address()))
    }
}

pub fn restart(
    ctx: &mut dyn ExecutionContext,
    _instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let pc = ctx.restart()?;
    Ok(NextAddress::Address(pc))
}

pub fn ret_popped(
    ctx: &mut dyn ExecutionContext,
    _instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let value = ctx.variable(Variable::Stack)?;
    ctx.return_routine(value)
}

pub fn pop(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    ctx.variable(Variable::Stack)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn catch(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let depth = ctx.frame_count() as u16;
    store_result(ctx, instruction, depth)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn quit(
    _ctx: &mut dyn ExecutionContext,
    _instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    Ok(NextAddress::Quit)
}

pub fn new_line(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    ctx.new_line()?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn show_status(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let (left, right) = status_line(ctx)?;
    ctx.screen()?.show_status(&left, &right);
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn verify(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let valid = ctx.verify_checksum()?;
    ctx.branch(instruction, valid)
}

pub fn piracy(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    // Interpreters are asked to be gullible
    ctx.branch(instruction, true)
}
