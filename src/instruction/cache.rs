//! Decoded-instruction cache
//!
//! Code lives in high memory, which is immutable by contract, so cached
//! instructions never need invalidating: writes to dynamic memory cannot
//! change what decodes at a code address.
use std::{collections::HashMap, rc::Rc};

use crate::error::RuntimeError;
use crate::memory::Memory;

use super::{decoder, Instruction};

#[derive(Debug, Default)]
pub struct InstructionCache {
    instructions: HashMap<usize, Rc<Instruction>>,
}

impl InstructionCache {
    pub fn new() -> InstructionCache {
        InstructionCache {
            instructions: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Get the instruction at `address`, decoding and caching on a miss.
    ///
    /// # Arguments
    /// * `memory` - memory to decode from
    /// * `address` - instruction address
    ///
    /// # Returns
    /// [Result] with a shared [Instruction] or a [RuntimeError]
    pub fn fetch(
        &mut self,
        memory: &Memory,
        address: usize,
    ) -> Result<Rc<Instruction>, RuntimeError> {
        if let Some(instruction) = self.instructions.get(&address) {
            debug!(target: "app::instruction", "cache hit: ${:05x}", address);
            Ok(Rc::clone(instruction))
        } else {
            let instruction = Rc::new(decoder::decode_instruction(memory, address)?);
            self.instructions
                .insert(address, Rc::clone(&instruction));
            Ok(instruction)
        }
    }
}
