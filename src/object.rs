//! [Object table](https://inform-fiction.org/zmachine/standards/z1point1/sect12.html) accessors
//!
//! V1-3 entries are 9 bytes (32 attributes, byte-sized links, 31 property
//! defaults); V4+ entries are 14 bytes (48 attributes, word-sized links, 63
//! property defaults).  All consumers go through these functions; the byte
//! layout stays private.
use crate::error::{ErrorCode, RuntimeError};
use crate::fatal_error;
use crate::memory::header::HeaderField;
use crate::processor::ExecutionContext;

fn table_address(ctx: &dyn ExecutionContext) -> Result<usize, RuntimeError> {
    Ok(ctx.header_word(HeaderField::ObjectTable)? as usize)
}

fn entry_size(ctx: &dyn ExecutionContext) -> usize {
    if ctx.version() < 4 {
        9
    } else {
        14
    }
}

fn max_properties(ctx: &dyn ExecutionContext) -> u8 {
    if ctx.version() < 4 {
        31
    } else {
        63
    }
}

fn object_address(ctx: &dyn ExecutionContext, object: usize) -> Result<usize, RuntimeError> {
    if object == 0 {
        return fatal_error!(ErrorCode::IllegalState, "Object 0 has no table entry");
    }
    let table = table_address(ctx)?;
    let defaults = max_properties(ctx) as usize * 2;
    Ok(table + defaults + ((object - 1) * entry_size(ctx)))
}

fn relation_offset(ctx: &dyn ExecutionContext, relation: usize) -> usize {
    if ctx.version() < 4 {
        4 + relation
    } else {
        6 + (relation * 2)
    }
}

fn relation(
    ctx: &dyn ExecutionContext,
    object: usize,
    offset: usize,
) -> Result<usize, RuntimeError> {
    if object == 0 {
        return Ok(0);
    }
    let address = object_address(ctx, object)? + offset;
    if ctx.version() < 4 {
        Ok(ctx.read_byte(address)? as usize)
    } else {
        Ok(ctx.read_word(address)? as usize)
    }
}

fn set_relation(
    ctx: &mut dyn ExecutionContext,
    object: usize,
    offset: usize,
    value: usize,
) -> Result<(), RuntimeError> {
    let address = object_address(ctx, object)? + offset;
    if ctx.version() < 4 {
        ctx.write_byte(address, value as u8)
    } else {
        ctx.write_word(address, value as u16)
    }
}

pub fn parent(ctx: &dyn ExecutionContext, object: usize) -> Result<usize, RuntimeError> {
    relation(ctx, object, relation_offset(ctx, 0))
}

pub fn sibling(ctx: &dyn ExecutionContext, object: usize) -> Result<usize, RuntimeError> {
    relation(ctx, object, relation_offset(ctx, 1))
}

pub fn child(ctx: &dyn ExecutionContext, object: usize) -> Result<usize, RuntimeError> {
    relation(ctx, object, relation_offset(ctx, 2))
}

pub fn set_parent(
    ctx: &mut dyn ExecutionContext,
    object: usize,
    value: usize,
) -> Result<(), RuntimeError> {
    let offset = relation_offset(ctx, 0);
    set_relation(ctx, object, offset, value)
}

pub fn set_sibling(
    ctx: &mut dyn ExecutionContext,
    object: usize,
    value: usize,
) -> Result<(), RuntimeError> {
    let offset = relation_offset(ctx, 1);
    set_relation(ctx, object, offset, value)
}

pub fn set_child(
    ctx: &mut dyn ExecutionContext,
    object: usize,
    value: usize,
) -> Result<(), RuntimeError> {
    let offset = relation_offset(ctx, 2);
    set_relation(ctx, object, offset, value)
}

fn attribute_check(ctx: &dyn ExecutionContext, attribute: u8) -> Result<(), RuntimeError> {
    let max = if ctx.version() < 4 { 32 } else { 48 };
    if attribute < max {
        Ok(())
    } else {
        fatal_error!(
            ErrorCode::IllegalState,
            "Attribute {} out of range for version {}",
            attribute,
            ctx.version()
        )
    }
}

pub fn attribute(
    ctx: &dyn ExecutionContext,
    object: usize,
    attribute: u8,
) -> Result<bool, RuntimeError> {
    if object == 0 {
        return Ok(false);
    }
    attribute_check(ctx, attribute)?;
    let address = object_address(ctx, object)? + (attribute as usize / 8);
    let mask = 0x80 >> (attribute % 8);
    Ok(ctx.read_byte(address)? & mask == mask)
}

pub fn set_attribute(
    ctx: &mut dyn ExecutionContext,
    object: usize,
    attribute: u8,
) -> Result<(), RuntimeError> {
    attribute_check(ctx, attribute)?;
    let address = object_address(ctx, object)? + (attribute as usize / 8);
    let mask = 0x80 >> (attribute % 8);
    let b = ctx.read_byte(address)?;
    ctx.write_byte(address, b | mask)
}

pub fn clear_attribute(
    ctx: &mut dyn ExecutionContext,
    object: usize,
    attribute: u8,
) -> Result<(), RuntimeError> {
    attribute_check(ctx, attribute)?;
    let address = object_address(ctx, object)? + (attribute as usize / 8);
    let mask = 0x80 >> (attribute % 8);
    let b = ctx.read_byte(address)?;
    ctx.write_byte(address, b & !mask)
}

fn property_table_address(
    ctx: &dyn ExecutionContext,
    object: usize,
) -> Result<usize, RuntimeError> {
    let offset = if ctx.version() < 4 { 7 } else { 12 };
    Ok(ctx.read_word(object_address(ctx, object)? + offset)? as usize)
}

/// Z-text words of the object's short name
pub fn short_name(ctx: &dyn ExecutionContext, object: usize) -> Result<Vec<u16>, RuntimeError> {
    let table = property_table_address(ctx, object)?;
    let words = ctx.read_byte(table)? as usize;
    let mut ztext = Vec::new();
    for i in 0..words {
        ztext.push(ctx.read_word(table + 1 + (i * 2))?);
    }
    Ok(ztext)
}

/// One property block: (number, data address, data length, next block address)
fn property_block(
    ctx: &dyn ExecutionContext,
    address: usize,
) -> Result<(u8, usize, usize, usize), RuntimeError> {
    let size = ctx.read_byte(address)?;
    if size == 0 {
        return Ok((0, address, 0, address));
    }
    if ctx.version() < 4 {
        let number = size & 0x1F;
        let length = (size as usize >> 5) + 1;
        Ok((number, address + 1, length, address + 1 + length))
    } else {
        let number = size & 0x3F;
        if size & 0x80 == 0x80 {
            let mut length = (ctx.read_byte(address + 1)? & 0x3F) as usize;
            if length == 0 {
                length = 64;
            }
            Ok((number, address + 2, length, address + 2 + length))
        } else {
            let length = if size & 0x40 == 0x40 { 2 } else { 1 };
            Ok((number, address + 1, length, address + 1 + length))
        }
    }
}

fn first_property_address(
    ctx: &dyn ExecutionContext,
    object: usize,
) -> Result<usize, RuntimeError> {
    let table = property_table_address(ctx, object)?;
    let words = ctx.read_byte(table)? as usize;
    Ok(table + 1 + (words * 2))
}

fn property_check(ctx: &dyn ExecutionContext, property: u8) -> Result<(), RuntimeError> {
    if property == 0 || property > max_properties(ctx) {
        fatal_error!(
            ErrorCode::InvalidObjectProperty,
            "Property {} out of range for version {}",
            property,
            ctx.version()
        )
    } else {
        Ok(())
    }
}

/// Default value of a property, from the front of the object table
pub fn default_property(ctx: &dyn ExecutionContext, property: u8) -> Result<u16, RuntimeError> {
    property_check(ctx, property)?;
    let table = table_address(ctx)?;
    ctx.read_word(table + ((property as usize - 1) * 2))
}

/// GET_PROP: a 1- or 2-byte property value, or its default when absent
pub fn property(
    ctx: &dyn ExecutionContext,
    object: usize,
    property: u8,
) -> Result<u16, RuntimeError> {
    property_check(ctx, property)?;
    let mut address = first_property_address(ctx, object)?;
    loop {
        let (number, data, length, next) = property_block(ctx, address)?;
        if number == 0 {
            return default_property(ctx, property);
        }
        if number == property {
            return match length {
                1 => Ok(ctx.read_byte(data)? as u16),
                2 => ctx.read_word(data),
                _ => fatal_error!(
                    ErrorCode::InvalidObjectProperty,
                    "GET_PROP on property {} of object {} with length {}",
                    property,
                    object,
                    length
                ),
            };
        }
        address = next;
    }
}

/// GET_PROP_ADDR: address of a property's data, or 0 when absent
pub fn property_data_address(
    ctx: &dyn ExecutionContext,
    object: usize,
    property: u8,
) -> Result<usize, RuntimeError> {
    property_check(ctx, property)?;
    let mut address = first_property_address(ctx, object)?;
    loop {
        let (number, data, _, next) = property_block(ctx, address)?;
        if number == 0 {
            return Ok(0);
        }
        if number == property {
            return Ok(data);
        }
        address = next;
    }
}

/// GET_PROP_LEN: data length for a property data address, 0 for address 0
pub fn property_length(
    ctx: &dyn ExecutionContext,
    data_address: usize,
) -> Result<usize, RuntimeError> {
    if data_address == 0 {
        return Ok(0);
    }
    let size = ctx.read_byte(data_address - 1)?;
    if ctx.version() < 4 {
        Ok((size as usize >> 5) + 1)
    } else if size & 0x80 == 0x80 {
        let length = (size & 0x3F) as usize;
        if length == 0 {
            Ok(64)
        } else {
            Ok(length)
        }
    } else if size & 0x40 == 0x40 {
        Ok(2)
    } else {
        Ok(1)
    }
}

/// GET_NEXT_PROP: the property number after `property`, or the first when
/// `property` is 0; 0 marks the end of the list
pub fn next_property(
    ctx: &dyn ExecutionContext,
    object: usize,
    property: u8,
) -> Result<u8, RuntimeError> {
    let mut address = first_property_address(ctx, object)?;
    if property == 0 {
        let (number, _, _, _) = property_block(ctx, address)?;
        return Ok(number);
    }
    loop {
        let (number, _, _, next) = property_block(ctx, address)?;
        if number == 0 {
            return fatal_error!(
                ErrorCode::InvalidObjectProperty,
                "GET_NEXT_PROP: object {} has no property {}",
                object,
                property
            );
        }
        if number == property {
            let (number, _, _, _) = property_block(ctx, next)?;
            return Ok(number);
        }
        address = next;
    }
}

/// PUT_PROP: write a 1- or 2-byte property value
pub fn set_property(
    ctx: &mut dyn ExecutionContext,
    object: usize,
    property: u8,
    value: u16,
) -> Result<(), RuntimeError> {
    property_check(ctx, property)?;
    let mut address = first_property_address(ctx, object)?;
    loop {
        let (number, data, length, next) = property_block(ctx, address)?;
        if number == 0 {
            return fatal_error!(
                ErrorCode::InvalidObjectProperty,
                "PUT_PROP: object {} has no property {}",
                object,
                property
            );
        }
        if number == property {
            return match length {
                1 => ctx.write_byte(data, value as u8),
                2 => ctx.write_word(data, value),
                _ => fatal_error!(
                    ErrorCode::InvalidObjectProperty,
                    "PUT_PROP on property {} of object {} with length {}",
                    property,
                    object,
                    length
                ),
            };
        }
        address = next;
    }
}

/// Detach an object from its parent and siblings
pub fn remove(ctx: &mut dyn ExecutionContext, object: usize) -> Result<(), RuntimeError> {
    if object == 0 {
        return Ok(());
    }
    let old_parent = parent(ctx, object)?;
    if old_parent != 0 {
        let next_sibling = sibling(ctx, object)?;
        if child(ctx, old_parent)? == object {
            set_child(ctx, old_parent, next_sibling)?;
        } else {
            // Walk the sibling chain to unlink
            let mut cursor = child(ctx, old_parent)?;
            while cursor != 0 {
                let s = sibling(ctx, cursor)?;
                if s == object {
                    set_sibling(ctx, cursor, next_sibling)?;
                    break;
                }
                cursor = s;
            }
        }
        set_parent(ctx, object, 0)?;
        set_sibling(ctx, object, 0)?;
    }
    Ok(())
}

/// Move an object to be the first child of `destination`
pub fn insert(
    ctx: &mut dyn ExecutionContext,
    object: usize,
    destination: usize,
) -> Result<(), RuntimeError> {
    if object == 0 {
        return Ok(());
    }
    debug!(target: "app::state", "Insert object {} into {}", object, destination);
    remove(ctx, object)?;
    if destination != 0 {
        let first = child(ctx, destination)?;
        set_sibling(ctx, object, first)?;
        set_child(ctx, destination, object)?;
        set_parent(ctx, object, destination)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        assert_ok, assert_ok_eq,
        test_util::{add_object_tables, mock_processor, test_map},
    };

    use super::*;

    fn ctx(version: u8) -> crate::processor::Processor {
        let mut map = test_map(version);
        add_object_tables(&mut map, version);
        mock_processor(map)
    }

    #[test]
    fn test_relations_v3() {
        let p = ctx(3);
        assert_ok_eq!(parent(&p, 1), 0);
        assert_ok_eq!(child(&p, 1), 2);
        assert_ok_eq!(sibling(&p, 1), 0);
        assert_ok_eq!(parent(&p, 2), 1);
        assert_ok_eq!(sibling(&p, 2), 3);
        assert_ok_eq!(parent(&p, 3), 1);
        assert_ok_eq!(child(&p, 3), 0);
        // Object 0 has no relations
        assert_ok_eq!(parent(&p, 0), 0);
        assert_ok_eq!(child(&p, 0), 0);
        assert_ok_eq!(sibling(&p, 0), 0);
    }

    #[test]
    fn test_relations_v5() {
        let p = ctx(5);
        assert_ok_eq!(parent(&p, 2), 1);
        assert_ok_eq!(sibling(&p, 2), 3);
        assert_ok_eq!(child(&p, 1), 2);
    }

    #[test]
    fn test_attributes_v3() {
        let mut p = ctx(3);
        assert_ok_eq!(attribute(&p, 1, 0), true);
        assert_ok_eq!(attribute(&p, 1, 17), true);
        assert_ok_eq!(attribute(&p, 1, 16), false);
        assert_ok_eq!(attribute(&p, 0, 3), false);
        assert!(attribute(&p, 1, 32).is_err());
        assert!(set_attribute(&mut p, 1, 16).is_ok());
        assert_ok_eq!(attribute(&p, 1, 16), true);
        assert!(clear_attribute(&mut p, 1, 16).is_ok());
        assert_ok_eq!(attribute(&p, 1, 16), false);
    }

    #[test]
    fn test_attributes_v5() {
        let mut p = ctx(5);
        assert_ok_eq!(attribute(&p, 1, 0), true);
        assert_ok_eq!(attribute(&p, 1, 47), false);
        assert!(set_attribute(&mut p, 1, 47).is_ok());
        assert_ok_eq!(attribute(&p, 1, 47), true);
        assert!(attribute(&p, 1, 48).is_err());
    }

    #[test]
    fn test_short_name() {
        let p = ctx(3);
        let name = assert_ok!(short_name(&p, 1));
        assert_eq!(name.len(), 1);
        assert_eq!(name[0] & 0x8000, 0x8000);
    }

    #[test]
    fn test_property() {
        let p = ctx(3);
        assert_ok_eq!(property(&p, 1, 16), 0x1234);
        assert_ok_eq!(property(&p, 1, 5), 0x00AB);
        // Absent property reads the default
        assert_ok_eq!(property(&p, 1, 10), 0x0A0A);
        assert!(property(&p, 1, 0).is_err());
        assert!(property(&p, 1, 32).is_err());
    }

    #[test]
    fn test_property_v5() {
        let p = ctx(5);
        assert_ok_eq!(property(&p, 1, 16), 0x1234);
        assert_ok_eq!(property(&p, 1, 5), 0x00AB);
        assert_ok_eq!(property(&p, 1, 10), 0x0A0A);
    }

    #[test]
    fn test_property_data_address_and_length() {
        let p = ctx(3);
        let a = assert_ok!(property_data_address(&p, 1, 16));
        assert_ne!(a, 0);
        assert_ok_eq!(property_length(&p, a), 2);
        let a = assert_ok!(property_data_address(&p, 1, 5));
        assert_ok_eq!(property_length(&p, a), 1);
        assert_ok_eq!(property_data_address(&p, 1, 10), 0);
        assert_ok_eq!(property_length(&p, 0), 0);
    }

    #[test]
    fn test_next_property() {
        let p = ctx(3);
        assert_ok_eq!(next_property(&p, 1, 0), 16);
        assert_ok_eq!(next_property(&p, 1, 16), 5);
        assert_ok_eq!(next_property(&p, 1, 5), 0);
        assert!(next_property(&p, 1, 10).is_err());
    }

    #[test]
    fn test_set_property() {
        let mut p = ctx(3);
        assert!(set_property(&mut p, 1, 16, 0x5678).is_ok());
        assert_ok_eq!(property(&p, 1, 16), 0x5678);
        assert!(set_property(&mut p, 1, 5, 0x12CD).is_ok());
        // One-byte property keeps the low byte
        assert_ok_eq!(property(&p, 1, 5), 0x00CD);
        assert!(set_property(&mut p, 1, 10, 0).is_err());
    }

    #[test]
    fn test_remove() {
        let mut p = ctx(3);
        // Object 2 is the first child of 1
        assert!(remove(&mut p, 2).is_ok());
        assert_ok_eq!(parent(&p, 2), 0);
        assert_ok_eq!(sibling(&p, 2), 0);
        assert_ok_eq!(child(&p, 1), 3);
    }

    #[test]
    fn test_remove_middle_sibling() {
        let mut p = ctx(3);
        assert!(remove(&mut p, 3).is_ok());
        assert_ok_eq!(parent(&p, 3), 0);
        assert_ok_eq!(child(&p, 1), 2);
        assert_ok_eq!(sibling(&p, 2), 0);
    }

    #[test]
    fn test_insert() {
        let mut p = ctx(3);
        assert!(insert(&mut p, 3, 2).is_ok());
        assert_ok_eq!(parent(&p, 3), 2);
        assert_ok_eq!(child(&p, 2), 3);
        assert_ok_eq!(child(&p, 1), 2);
        assert_ok_eq!(sibling(&p, 2), 0);
    }
}
