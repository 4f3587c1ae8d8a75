//! [Z-text](https://inform-fiction.org/zmachine/standards/z1point1/sect03.html)
//!
//! Each Z-word packs three 5-bit Z-characters; bit 15 terminates a string.
//! Decoding produces ZSCII values, encoding produces the fixed-resolution
//! Z-words dictionary entries are compared against.
use crate::error::{ErrorCode, RuntimeError};
use crate::memory::header::HeaderField;
use crate::processor::ExecutionContext;
use crate::recoverable_error;

const ALPHABET_0: [u16; 26] = [
    b'a' as u16,
    b'b' as u16,
    b'c' as u16,
    b'd' as u16,
    b'e' as u16,
    b'f' as u16,
    b'g' as u16,
    b'h' as u16,
    b'i' as u16,
    b'j' as u16,
    b'k' as u16,
    b'l' as u16,
    b'm' as u16,
    b'n' as u16,
    b'o' as u16,
    b'p' as u16,
    b'q' as u16,
    b'r' as u16,
    b's' as u16,
    b't' as u16,
    b'u' as u16,
    b'v' as u16,
    b'w' as u16,
    b'x' as u16,
    b'y' as u16,
    b'z' as u16,
];

const ALPHABET_1: [u16; 26] = [
    b'A' as u16,
    b'B' as u16,
    b'C' as u16,
    b'D' as u16,
    b'E' as u16,
    b'F' as u16,
    b'G' as u16,
    b'H' as u16,
    b'I' as u16,
    b'J' as u16,
    b'K' as u16,
    b'L' as u16,
    b'M' as u16,
    b'N' as u16,
    b'O' as u16,
    b'P' as u16,
    b'Q' as u16,
    b'R' as u16,
    b'S' as u16,
    b'T' as u16,
    b'U' as u16,
    b'V' as u16,
    b'W' as u16,
    b'X' as u16,
    b'Y' as u16,
    b'Z' as u16,
];

// Position 0 is the ZSCII escape, position 1 the newline; the sentinels here
// never match a real character during encoding
const ALPHABET_2: [u16; 26] = [
    0,
    13,
    b'0' as u16,
    b'1' as u16,
    b'2' as u16,
    b'3' as u16,
    b'4' as u16,
    b'5' as u16,
    b'6' as u16,
    b'7' as u16,
    b'8' as u16,
    b'9' as u16,
    b'.' as u16,
    b',' as u16,
    b'!' as u16,
    b'?' as u16,
    b'_' as u16,
    b'#' as u16,
    b'\'' as u16,
    b'"' as u16,
    b'/' as u16,
    b'\\' as u16,
    b'-' as u16,
    b':' as u16,
    b'(' as u16,
    b')' as u16,
];

// V1 has no newline in A2 and a '<' instead
const ALPHABET_2_V1: [u16; 26] = [
    0,
    b'0' as u16,
    b'1' as u16,
    b'2' as u16,
    b'3' as u16,
    b'4' as u16,
    b'5' as u16,
    b'6' as u16,
    b'7' as u16,
    b'8' as u16,
    b'9' as u16,
    b'.' as u16,
    b',' as u16,
    b'!' as u16,
    b'?' as u16,
    b'_' as u16,
    b'#' as u16,
    b'\'' as u16,
    b'"' as u16,
    b'/' as u16,
    b'\\' as u16,
    b'<' as u16,
    b'-' as u16,
    b':' as u16,
    b'(' as u16,
    b')' as u16,
];

/// Default translations for ZSCII 155..=223
const DEFAULT_EXTRA: &str = "äöüÄÖÜß»«ëïÿËÏáéíóúýÁÉÍÓÚÝàèìòùÀÈÌÒÙâêîôûÂÊÎÔÛåÅøØãñõÃÑÕæÆçÇþðÞÐ£œŒ¡¿";

/// The three alphabet rows, honoring a V5+ custom alphabet table
fn alphabets(ctx: &dyn ExecutionContext) -> Result<[[u16; 26]; 3], RuntimeError> {
    if ctx.version() >= 5 {
        let table = ctx.header_word(HeaderField::AlphabetTable)? as usize;
        if table > 0 {
            let mut rows = [[0; 26]; 3];
            for (r, row) in rows.iter_mut().enumerate() {
                for (i, c) in row.iter_mut().enumerate() {
                    *c = ctx.read_byte(table + (r * 26) + i)? as u16;
                }
            }
            // Escape and newline positions are fixed regardless of the table
            rows[2][0] = 0;
            rows[2][1] = 13;
            return Ok(rows);
        }
    }
    if ctx.version() == 1 {
        Ok([ALPHABET_0, ALPHABET_1, ALPHABET_2_V1])
    } else {
        Ok([ALPHABET_0, ALPHABET_1, ALPHABET_2])
    }
}

fn zchars(ztext: &[u16]) -> Vec<u16> {
    let mut zchars = Vec::new();
    for w in ztext {
        zchars.push((w >> 10) & 0x1F);
        zchars.push((w >> 5) & 0x1F);
        zchars.push(w & 0x1F);
        if w & 0x8000 == 0x8000 {
            break;
        }
    }
    zchars
}

fn abbreviation(
    ctx: &dyn ExecutionContext,
    row: u16,
    index: u16,
) -> Result<Vec<u16>, RuntimeError> {
    let table = ctx.header_word(HeaderField::AbbreviationsTable)? as usize;
    let entry = (32 * (row as usize - 1)) + index as usize;
    let word_address = ctx.read_word(table + (entry * 2))? as usize;
    let ztext = ctx.string_literal(word_address * 2)?;
    decode(ctx, &ztext, false)
}

fn decode(
    ctx: &dyn ExecutionContext,
    ztext: &[u16],
    allow_abbreviations: bool,
) -> Result<Vec<u16>, RuntimeError> {
    let version = ctx.version();
    let alphabets = alphabets(ctx)?;
    let zchars = zchars(ztext);
    let mut zscii = Vec::new();

    // `base` is the locked alphabet (always A0 from V3 on), `current` the
    // alphabet for the next character
    let mut base = 0;
    let mut current = 0;
    let mut i = 0;
    while i < zchars.len() {
        let z = zchars[i];
        match z {
            0 => {
                zscii.push(32);
                current = base;
            }
            1 if version == 1 => {
                zscii.push(13);
                current = base;
            }
            1..=3 if version >= 3 || (version == 2 && z == 1) => {
                if allow_abbreviations {
                    if i + 1 < zchars.len() {
                        zscii.append(&mut abbreviation(ctx, z, zchars[i + 1])?);
                    }
                    i += 1;
                } else {
                    return recoverable_error!(
                        ErrorCode::InvalidAbbreviation,
                        "Abbreviation inside an abbreviation"
                    );
                }
                current = base;
            }
            2 | 3 if version < 3 => current = (base + z as usize - 1) % 3,
            4 | 5 if version < 3 => {
                base = (base + z as usize - 3) % 3;
                current = base;
            }
            4 | 5 => current = z as usize - 3,
            6 if current == 2 => {
                // 10-bit ZSCII escape
                if i + 2 < zchars.len() {
                    zscii.push((zchars[i + 1] << 5) | zchars[i + 2]);
                }
                i += 2;
                current = base;
            }
            7 if current == 2 && version >= 2 => {
                zscii.push(13);
                current = base;
            }
            _ => {
                zscii.push(alphabets[current][z as usize - 6]);
                current = base;
            }
        }
        i += 1;
    }

    Ok(zscii)
}

/// Decode Z-text to ZSCII values
pub fn zscii_from_ztext(
    ctx: &dyn ExecutionContext,
    ztext: &[u16],
) -> Result<Vec<u16>, RuntimeError> {
    decode(ctx, ztext, true)
}

/// Translate one ZSCII value for display, [None] for non-printing values
pub fn zscii_to_char(zscii: u16) -> Option<char> {
    match zscii {
        13 => Some('\n'),
        32..=126 => Some(zscii as u8 as char),
        155..=223 => DEFAULT_EXTRA.chars().nth(zscii as usize - 155),
        _ => None,
    }
}

/// Translate ZSCII values for display
pub fn zscii_to_string(zscii: &[u16]) -> String {
    zscii.iter().filter_map(|c| zscii_to_char(*c)).collect()
}

/// Lower-case a ZSCII value (input buffers store lower-case text)
pub fn to_lowercase(zscii: u16) -> u16 {
    if (65..=90).contains(&zscii) {
        zscii + 32
    } else {
        zscii
    }
}

/// Encode ZSCII to the dictionary resolution: 6 Z-characters in 2 words for
/// V1-3, 9 in 3 words after
pub fn encode(ctx: &dyn ExecutionContext, zscii: &[u16]) -> Result<Vec<u16>, RuntimeError> {
    let version = ctx.version();
    let resolution = if version < 4 { 2 } else { 3 };
    let alphabets = alphabets(ctx)?;
    let (shift_1, shift_2) = if version < 3 { (2, 3) } else { (4, 5) };

    let mut zchars: Vec<u16> = Vec::new();
    for c in zscii {
        if let Some(position) = alphabets[0].iter().position(|a| a == c) {
            zchars.push(position as u16 + 6);
        } else if let Some(position) = alphabets[1].iter().position(|a| a == c) {
            zchars.push(shift_1);
            zchars.push(position as u16 + 6);
        } else if let Some(position) = alphabets[2][2..].iter().position(|a| a == c) {
            zchars.push(shift_2);
            zchars.push(position as u16 + 8);
        } else {
            // 10-bit ZSCII escape
            zchars.push(shift_2);
            zchars.push(6);
            zchars.push((c >> 5) & 0x1F);
            zchars.push(c & 0x1F);
        }
    }
    zchars.resize(resolution * 3, 5);

    let mut words = Vec::new();
    for i in 0..resolution {
        let chunk = &zchars[i * 3..(i * 3) + 3];
        words.push((chunk[0] << 10) | (chunk[1] << 5) | chunk[2]);
    }
    words[resolution - 1] |= 0x8000;
    Ok(words)
}

/// Word separators declared at the front of a dictionary
pub fn separators(
    ctx: &dyn ExecutionContext,
    dictionary: usize,
) -> Result<Vec<u16>, RuntimeError> {
    let n = ctx.read_byte(dictionary)? as usize;
    let mut separators = Vec::new();
    for i in 0..n {
        separators.push(ctx.read_byte(dictionary + 1 + i)? as u16);
    }
    Ok(separators)
}

/// Look a word up in a dictionary.
///
/// # Arguments
/// * `ctx` - execution context
/// * `dictionary` - dictionary table address
/// * `word` - ZSCII values of the word
///
/// # Returns
/// [Result] with the entry address, or 0 when the word is not in the
/// dictionary
pub fn lookup(
    ctx: &dyn ExecutionContext,
    dictionary: usize,
    word: &[u16],
) -> Result<usize, RuntimeError> {
    let encoded = encode(ctx, word)?;
    let n = ctx.read_byte(dictionary)? as usize;
    let entry_length = ctx.read_byte(dictionary + n + 1)? as usize;
    // A negative count marks an unsorted (user) dictionary; the scan below
    // doesn't care about order
    let count = (ctx.read_word(dictionary + n + 2)? as i16).unsigned_abs() as usize;
    let entries = dictionary + n + 4;

    for i in 0..count {
        let address = entries + (i * entry_length);
        let mut matched = true;
        for (j, w) in encoded.iter().enumerate() {
            if ctx.read_word(address + (j * 2))? != *w {
                matched = false;
                break;
            }
        }
        if matched {
            debug!(target: "app::state", "Dictionary: {:?} at {:04x}", word, address);
            return Ok(address);
        }
    }
    Ok(0)
}

/// Lexical analysis: split the text buffer into words and write dictionary
/// matches to the parse buffer.
///
/// # Arguments
/// * `ctx` - execution context
/// * `text_buffer` - READ text buffer address
/// * `parse_buffer` - parse buffer address
/// * `dictionary` - dictionary to look words up in
/// * `skip_unknown` - leave parse entries for unmatched words untouched
///   (TOKENISE's flag operand)
pub fn tokenise(
    ctx: &mut dyn ExecutionContext,
    text_buffer: usize,
    parse_buffer: usize,
    dictionary: usize,
    skip_unknown: bool,
) -> Result<(), RuntimeError> {
    let version = ctx.version();
    // Input text and the buffer offset of its first character
    let (chars, offset) = if version < 5 {
        let mut chars = Vec::new();
        let mut i = text_buffer + 1;
        loop {
            let b = ctx.read_byte(i)?;
            if b == 0 {
                break;
            }
            chars.push(b as u16);
            i += 1;
        }
        (chars, 1)
    } else {
        let length = ctx.read_byte(text_buffer + 1)? as usize;
        let mut chars = Vec::new();
        for i in 0..length {
            chars.push(ctx.read_byte(text_buffer + 2 + i)? as u16);
        }
        (chars, 2)
    };

    let separators = separators(&*ctx, dictionary)?;

    // Split into (buffer position, word) pairs; separators are words of
    // their own
    let mut words: Vec<(usize, Vec<u16>)> = Vec::new();
    let mut current: Vec<u16> = Vec::new();
    let mut start = 0;
    for (i, c) in chars.iter().enumerate() {
        if *c == 32 {
            if !current.is_empty() {
                words.push((start, std::mem::take(&mut current)));
            }
        } else if separators.contains(c) {
            if !current.is_empty() {
                words.push((start, std::mem::take(&mut current)));
            }
            words.push((i, vec![*c]));
        } else {
            if current.is_empty() {
                start = i;
            }
            current.push(*c);
        }
    }
    if !current.is_empty() {
        words.push((start, current));
    }

    let max = ctx.read_byte(parse_buffer)? as usize;
    let count = usize::min(words.len(), max);
    ctx.write_byte(parse_buffer + 1, count as u8)?;
    for (index, (position, word)) in words.iter().take(count).enumerate() {
        let entry = lookup(&*ctx, dictionary, word)?;
        let record = parse_buffer + 2 + (index * 4);
        if entry != 0 || !skip_unknown {
            ctx.write_word(record, entry as u16)?;
            ctx.write_byte(record + 2, word.len() as u8)?;
            ctx.write_byte(record + 3, (position + offset) as u8)?;
        }
    }

    Ok(())
}
