//! Binary persistence for the classifier.
//!
//! Layout, little-endian, field order fixed: a header of
//! `input_bits: i32, ram_bits: i32, classes: i32`, then for each class in
//! order, for each RAM node in order, the node's address mapping (`ram_bits`
//! positions as `i32`) followed by its full counter table (`2^ram_bits`
//! `u16` entries). Import reconstructs mappings bit-exact and validates the
//! header and every position before touching any table.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::EngineError;

use super::discriminator::Discriminator;
use super::ram::{RamNode, MAX_RAM_BITS};
use super::wisard::ModelState;

pub(crate) fn export(state: &ModelState, path: &Path) -> Result<(), EngineError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    write_i32(&mut out, state.input_bits as i32)?;
    write_i32(&mut out, state.ram_bits as i32)?;
    write_i32(&mut out, state.discriminators.len() as i32)?;

    for discriminator in &state.discriminators {
        for node in discriminator.nodes() {
            for &position in node.mapping() {
                write_i32(&mut out, position as i32)?;
            }
            for &counter in node.table() {
                write_u16(&mut out, counter)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

pub(crate) fn import(path: &Path) -> Result<ModelState, EngineError> {
    let file = File::open(path)?;
    let mut input = BufReader::new(file);

    let input_bits = read_i32(&mut input)?;
    let ram_bits = read_i32(&mut input)?;
    let classes = read_i32(&mut input)?;

    if input_bits < 1 {
        return Err(EngineError::Corrupted(format!(
            "input_bits {} out of range",
            input_bits
        )));
    }
    if ram_bits < 1 || ram_bits as usize > MAX_RAM_BITS || ram_bits > input_bits {
        return Err(EngineError::Corrupted(format!(
            "ram_bits {} out of range",
            ram_bits
        )));
    }
    if classes < 1 {
        return Err(EngineError::Corrupted(format!(
            "classes {} out of range",
            classes
        )));
    }

    let input_bits = input_bits as usize;
    let ram_bits = ram_bits as usize;
    let num_nodes = input_bits.div_ceil(ram_bits);
    let table_len = 1usize << ram_bits;

    let mut discriminators = Vec::with_capacity(classes as usize);
    for _ in 0..classes {
        let mut nodes = Vec::with_capacity(num_nodes);
        for _ in 0..num_nodes {
            let mut mapping = Vec::with_capacity(ram_bits);
            for _ in 0..ram_bits {
                let position = read_i32(&mut input)?;
                if position < 0 || position as usize >= input_bits {
                    return Err(EngineError::Corrupted(format!(
                        "mapping position {} out of range",
                        position
                    )));
                }
                mapping.push(position as u32);
            }
            let mut table = Vec::with_capacity(table_len);
            for _ in 0..table_len {
                table.push(read_u16(&mut input)?);
            }
            nodes.push(RamNode::from_parts(mapping, table));
        }
        discriminators.push(Discriminator::from_nodes(nodes));
    }

    let mut trailing = [0u8; 1];
    if input.read(&mut trailing)? != 0 {
        return Err(EngineError::Corrupted("trailing data".into()));
    }

    Ok(ModelState::from_parts(input_bits, ram_bits, discriminators))
}

fn write_i32<W: Write>(out: &mut W, value: i32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn write_u16<W: Write>(out: &mut W, value: u16) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn read_i32<R: Read>(input: &mut R) -> Result<i32, EngineError> {
    let mut bytes = [0u8; 4];
    read_fully(input, &mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

fn read_u16<R: Read>(input: &mut R) -> Result<u16, EngineError> {
    let mut bytes = [0u8; 2];
    read_fully(input, &mut bytes)?;
    Ok(u16::from_le_bytes(bytes))
}

fn read_fully<R: Read>(input: &mut R, bytes: &mut [u8]) -> Result<(), EngineError> {
    input.read_exact(bytes).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            EngineError::Corrupted("unexpected end of file".into())
        } else {
            EngineError::Io(err)
        }
    })
}
