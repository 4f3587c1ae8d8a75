//! Instruction decoder
//!
//! Reads one instruction at an address, consuming the opcode byte(s), the
//! operand kinds, the operands, and then, as the opcode table dictates, the
//! store variable, the branch descriptor, and any in-line Z-text.
use crate::error::RuntimeError;
use crate::memory::{reader::MemoryReader, Memory};

use super::{
    opcode::{self, OpcodeKind},
    Instruction, Opcode, Operand,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OperandKind {
    LargeConstant,
    SmallConstant,
    Variable,
}

/// Decode one 2-bit field of an operand-kinds byte, high to low.
///
/// `0b11` is the Omitted marker and decodes to [None].
fn operand_kind(kinds_byte: u8, index: u8) -> Option<OperandKind> {
    match (kinds_byte >> (6 - (index * 2))) & 3 {
        0 => Some(OperandKind::LargeConstant),
        1 => Some(OperandKind::SmallConstant),
        2 => Some(OperandKind::Variable),
        _ => None,
    }
}

/// Long-form operand kind from an opcode bit: set means Variable, clear
/// means SmallConstant
fn long_operand_kind(opcode_byte: u8, index: u8) -> OperandKind {
    if opcode_byte >> (6 - index) & 1 == 1 {
        OperandKind::Variable
    } else {
        OperandKind::SmallConstant
    }
}

/// Walk one kinds byte, halting at the first Omitted field
fn kinds_from_byte(kinds: &mut Vec<OperandKind>, kinds_byte: u8) {
    for i in 0..4 {
        match operand_kind(kinds_byte, i) {
            Some(k) => kinds.push(k),
            None => break,
        }
    }
}

fn operands(
    reader: &mut MemoryReader,
    kinds: &[OperandKind],
) -> Result<Vec<Operand>, RuntimeError> {
    let mut operands = Vec::new();
    for kind in kinds {
        operands.push(match kind {
            OperandKind::LargeConstant => Operand::LargeConstant(reader.next_word()?),
            OperandKind::SmallConstant => Operand::SmallConstant(reader.next_byte()?),
            OperandKind::Variable => Operand::Variable(reader.next_variable()?),
        });
    }
    Ok(operands)
}

/// Decode the instruction at `address`.
///
/// # Arguments
/// * `memory` - memory to decode from
/// * `address` - address of the first opcode byte
///
/// # Returns
/// [Result] with the decoded [Instruction] or a [RuntimeError]
pub fn decode_instruction(memory: &Memory, address: usize) -> Result<Instruction, RuntimeError> {
    let version = memory.version();
    let mut reader = MemoryReader::new(memory, address);

    let b = reader.next_byte()?;
    let mut kinds = Vec::new();
    let (kind, number) = match b {
        // Long form: 2OP, operand kinds in opcode bits 6 and 5
        0x00..=0x7F => {
            kinds.push(long_operand_kind(b, 0));
            kinds.push(long_operand_kind(b, 1));
            (OpcodeKind::TwoOp, b & 0x1F)
        }
        // Extended form: opcode number in the next byte, kinds byte follows
        0xBE => (OpcodeKind::Ext, reader.next_byte()?),
        // Short form: operand kind in opcode bits 5 and 4
        0x80..=0xBF => match (b >> 4) & 3 {
            0 => {
                kinds.push(OperandKind::LargeConstant);
                (OpcodeKind::OneOp, b & 0x0F)
            }
            1 => {
                kinds.push(OperandKind::SmallConstant);
                (OpcodeKind::OneOp, b & 0x0F)
            }
            2 => {
                kinds.push(OperandKind::Variable);
                (OpcodeKind::OneOp, b & 0x0F)
            }
            _ => (OpcodeKind::ZeroOp, b & 0x0F),
        },
        // Variable form: kinds byte(s) follow
        _ => {
            if b & 0x20 == 0x20 {
                (OpcodeKind::VarOp, b & 0x1F)
            } else {
                (OpcodeKind::TwoOp, b & 0x1F)
            }
        }
    };

    let entry = opcode::entry(version, kind, number)?;

    if let OpcodeKind::VarOp | OpcodeKind::Ext = kind {
        let kinds_byte = reader.next_byte()?;
        kinds_from_byte(&mut kinds, kinds_byte);
        if entry.is_double_variable() {
            // A second kinds byte is only walked when the first was full
            if kinds.len() == 4 {
                let kinds_byte = reader.next_byte()?;
                kinds_from_byte(&mut kinds, kinds_byte);
            } else {
                reader.next_byte()?;
            }
        }
    }

    let operands = operands(&mut reader, &kinds)?;
    let store = if entry.has_store() {
        Some(reader.next_variable()?)
    } else {
        None
    };
    let branch = if entry.has_branch() {
        Some(reader.next_branch()?)
    } else {
        None
    };
    let ztext = if entry.has_ztext() {
        Some(reader.next_z_words()?)
    } else {
        None
    };

    let instruction = Instruction::new(
        address,
        reader.address() - address,
        Opcode::new(version, b, kind, number),
        operands,
        store,
        branch,
        ztext,
    );
    debug!(target: "app::instruction", "decode: {}", instruction);
    Ok(instruction)
}
