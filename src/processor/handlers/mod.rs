//! Opcode handlers
//!
//! Each opcode is a free function over the [ExecutionContext] capability,
//! referenced from the opcode table.  Handlers never touch the program
//! counter directly; they return the [NextAddress] the processor applies.
use crate::error::RuntimeError;
use crate::instruction::{Instruction, NextAddress, Operand, Variable};
use crate::memory::header::{Flags1v3, HeaderField};
use crate::object;
use crate::processor::ExecutionContext;
use crate::text;

pub mod handlers_0op;
pub mod handlers_1op;
pub mod handlers_2op;
pub mod handlers_ext;
pub mod handlers_var;

fn operand_value(
    ctx: &mut dyn ExecutionContext,
    operand: &Operand,
) -> Result<u16, RuntimeError> {
    match operand {
        Operand::LargeConstant(v) => Ok(*v),
        Operand::SmallConstant(v) => Ok(*v as u16),
        Operand::Variable(variable) => ctx.variable(*variable),
    }
}

/// Evaluate an instruction's operands, left to right.
///
/// The order is observable: a stack operand pops, so an opcode listing the
/// stack twice pops twice.
pub fn operand_values(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<Vec<u16>, RuntimeError> {
    let mut values = Vec::new();
    for operand in instruction.operands() {
        values.push(operand_value(ctx, operand)?);
    }
    if !values.is_empty() {
        debug!(target: "app::instruction", "Operand values: {:?}", values);
    }
    Ok(values)
}

fn store_result(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
    value: u16,
) -> Result<(), RuntimeError> {
    match instruction.store() {
        Some(variable) => ctx.set_variable(variable, value),
        None => Ok(()),
    }
}

/// Shared call protocol: unpack, or store FALSE when the packed address is 0
fn call_fn(
    ctx: &mut dyn ExecutionContext,
    packed: u16,
    return_address: usize,
    arguments: &[u16],
    result: Option<Variable>,
) -> Result<NextAddress, RuntimeError> {
    if packed == 0 {
        if let Some(variable) = result {
            ctx.set_variable(variable, 0)?;
        }
        Ok(NextAddress::Address(return_address))
    } else {
        let address = ctx.packed_routine_address(packed)?;
        ctx.call_routine(address, arguments, result, return_address)
    }
}

/// V3 status line text: current room on the left, score/turns or the clock
/// on the right
fn status_line(ctx: &mut dyn ExecutionContext) -> Result<(String, String), RuntimeError> {
    let object = ctx.peek_variable(Variable::Global(0))? as usize;
    let name = object::short_name(&*ctx, object)?;
    let left = text::zscii_to_string(&text::zscii_from_ztext(&*ctx, &name)?);

    let g1 = ctx.peek_variable(Variable::Global(1))?;
    let g2 = ctx.peek_variable(Variable::Global(2))?;
    let timed = ctx.header_byte(HeaderField::Flags1)? & Flags1v3::StatusLineType as u8 != 0;
    let right = if timed {
        format!("{}:{:02}", g1, g2)
    } else {
        format!("{}/{}", g1 as i16, g2)
    };
    Ok((left, right))
}
