use super::*;
use crate::error::{ErrorCode, RuntimeError};
use crate::fatal_error;
use crate::object;

pub fn call_vs(
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

pub fn call_vs2(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    call_vs(ctx, instruction)
}

pub fn call_vn(
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

pub fn call_vn2(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    call_vn(ctx, instruction)
}

pub fn storew(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let address = (operands[0] as isize + (operands[1] as i16 as isize * 2)) as usize;
    ctx.write_word(address, operands[2])?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn storeb(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let address = (operands[0] as isize + (operands[1] as i16 as isize)) as usize;
    ctx.write_byte(address, operands[2] as u8)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn put_prop(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    object::set_property(ctx, operands[0] as usize, operands[1] as u8, operands[2])?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn read(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let text_buffer = operands[0] as usize;
    let parse_buffer = if operands.len() > 1 {
        operands[1] as usize
    } else {
        0
    };
    let time = if operands.len() > 2 { operands[2] } else { 0 };

    // V1-3 redraws the status line before input
    if ctx.version() < 4 {
        let (left, right) = status_line(ctx)?;
        ctx.screen()?.show_status(&left, &right);
    }

    let length = ctx.read_byte(text_buffer)?;
    Ok(NextAddress::ReadLine {
        next: instruction.next_address(),
        text_buffer,
        parse_buffer,
        length,
        time,
    })
}

pub fn print_char(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.print_char(operands[0])?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn print_num(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let zscii: Vec<u16> = (operands[0] as i16)
        .to_string()
        .bytes()
        .map(|b| b as u16)
        .collect();
    ctx.print(&zscii)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn random(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let range = operands[0] as i16;
    let value = if range > 0 {
        ctx.random(range as u16)
    } else {
        let seed = range.unsigned_abs();
        if seed == 0 {
            ctx.seed_random(0);
        } else if seed < 1000 {
            // Small seeds select the predictable 1..seed cycle
            ctx.predictable_random(seed);
        } else {
            ctx.seed_random(seed);
        }
        0
    };
    store_result(ctx, instruction, value)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn push(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.set_variable(Variable::Stack, operands[0])?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn pull(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let value = ctx.variable(Variable::Stack)?;
    ctx.set_variable_indirect(Variable::from(operands[0] as u8), value)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn split_window(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let screen = ctx.screen()?;
    if operands[0] == 0 {
        screen.unsplit_window();
    } else {
        screen.split_window(operands[0]);
    }
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn set_window(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.screen()?.select_window(operands[0])?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn erase_window(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let screen = ctx.screen()?;
    match operands[0] as i16 {
        -1 => screen.erase_all(true),
        -2 => screen.erase_all(false),
        window => screen.erase_window(window as u16),
    }
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn erase_line(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    if operands[0] == 1 {
        ctx.screen()?.erase_line();
    }
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn set_cursor(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.screen()?.set_cursor(operands[0], operands[1]);
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn get_cursor(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let (row, column) = ctx.screen()?.cursor();
    ctx.write_word(operands[0] as usize, row)?;
    ctx.write_word(operands[0] as usize + 2, column)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn set_text_style(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.screen()?.set_text_style(operands[0]);
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn buffer_mode(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    ctx.screen()?.buffer_mode(operands[0]);
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn output_stream(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let stream = operands[0] as i16;
    let table = if stream == 3 {
        Some(operands[1] as usize)
    } else {
        None
    };
    ctx.output_stream(stream, table)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn input_stream(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    // Command files are a host concern; the keyboard is the only stream here
    info!(target: "app::screen", "INPUT_STREAM {} ignored", operands[0]);
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn sound_effect(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    match operands[0] {
        // Bleeps pass; sampled sound is out of scope
        1 | 2 => Ok(NextAddress::Address(instruction.next_address())),
        _ => fatal_error!(
            ErrorCode::UnimplementedInstruction,
            "SOUND_EFFECT {} is not implemented",
            operands[0]
        ),
    }
}

pub fn read_char(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    if operands[0] != 1 {
        return fatal_error!(
            ErrorCode::InvalidInstruction,
            "READ_CHAR first operand must be 1: {}",
            operands[0]
        );
    }
    let time = if operands.len() > 1 { operands[1] } else { 0 };
    Ok(NextAddress::ReadChar {
        next: instruction.next_address(),
        time,
    })
}

pub fn scan_table(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let value = operands[0];
    let table = operands[1] as usize;
    let count = operands[2] as usize;
    let form = if operands.len() > 3 { operands[3] } else { 0x82 };
    let words = form & 0x80 == 0x80;
    let entry_size = (form & 0x7F) as usize;

    for i in 0..count {
        let address = table + (i * entry_size);
        let entry = if words {
            ctx.read_word(address)?
        } else {
            ctx.read_byte(address)? as u16
        };
        if entry == value {
            store_result(ctx, instruction, address as u16)?;
            return ctx.branch(instruction, true);
        }
    }
    store_result(ctx, instruction, 0)?;
    ctx.branch(instruction, false)
}

pub fn not(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    store_result(ctx, instruction, !operands[0])?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn tokenise(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let text_buffer = operands[0] as usize;
    let parse_buffer = operands[1] as usize;
    let dictionary = if operands.len() > 2 && operands[2] != 0 {
        operands[2] as usize
    } else {
        ctx.header_word(HeaderField::Dictionary)? as usize
    };
    let skip_unknown = operands.len() > 3 && operands[3] != 0;
    text::tokenise(ctx, text_buffer, parse_buffer, dictionary, skip_unknown)?;
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn encode_text(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let text = operands[0] as usize;
    let length = operands[1] as usize;
    let from = operands[2] as usize;
    let coded = operands[3] as usize;

    let mut zscii = Vec::new();
    for i in 0..length {
        zscii.push(ctx.read_byte(text + from + i)? as u16);
    }
    let encoded = text::encode(&*ctx, &zscii)?;
    for (i, w) in encoded.iter().enumerate() {
        ctx.write_word(coded + (i * 2), *w)?;
    }
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn copy_table(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let first = operands[0] as usize;
    let second = operands[1] as usize;
    let size = operands[2] as i16;

    if second == 0 {
        // Zero out the source table
        for i in 0..size.unsigned_abs() as usize {
            ctx.write_byte(first + i, 0)?;
        }
    } else if size < 0 {
        // Negative size forces a forward byte-by-byte copy
        for i in 0..size.unsigned_abs() as usize {
            let b = ctx.read_byte(first + i)?;
            ctx.write_byte(second + i, b)?;
        }
    } else {
        // Buffer the source so overlapping tables cannot corrupt
        let mut bytes = Vec::new();
        for i in 0..size as usize {
            bytes.push(ctx.read_byte(first + i)?);
        }
        for (i, b) in bytes.iter().enumerate() {
            ctx.write_byte(second + i, *b)?;
        }
    }
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn print_table(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let mut address = operands[0] as usize;
    let width = operands[1] as usize;
    let height = if operands.len() > 2 { operands[2] } else { 1 };
    let skip = if operands.len() > 3 {
        operands[3] as usize
    } else {
        0
    };

    for row in 0..height {
        if row > 0 {
            ctx.new_line()?;
        }
        let mut zscii = Vec::new();
        for i in 0..width {
            zscii.push(ctx.read_byte(address + i)? as u16);
        }
        ctx.print(&zscii)?;
        address += width + skip;
    }
    Ok(NextAddress::Address(instruction.next_address()))
}

pub fn check_arg_count(
    ctx: &mut dyn ExecutionContext,
    instruction: &Instruction,
) -> Result<NextAddress, RuntimeError> {
    let operands = operand_values(ctx, instruction)?;
    let provided = ctx.argument_count()? as u16;
    ctx.branch(instruction, provided >= operands[0])
}
