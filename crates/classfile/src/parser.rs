// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Class-file parsing: bytes → [`ClassMetadata`]

use crate::pool::ConstantPool;
use crate::reader::ByteReader;
use bh_core::{ClassMetadata, FieldSig, MethodSig};
use thiserror::Error;

const MAGIC: u32 = 0xCAFE_BABE;

/// Errors from parsing a class artifact.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("truncated class file: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },
    #[error("bad magic: 0x{0:08x}")]
    BadMagic(u32),
    #[error("unknown constant pool tag {tag} at entry {index}")]
    UnknownPoolTag { tag: u8, index: u16 },
    #[error("constant pool index {index} out of range")]
    BadPoolIndex { index: u16 },
    #[error("constant pool entry {index} is not {expected}")]
    WrongPoolTag { index: u16, expected: &'static str },
    #[error("invalid utf8 in constant pool entry {index}")]
    BadUtf8 { index: u16 },
}

/// Parse a class artifact into its metadata.
///
/// Pure and deterministic: reads only the supplied bytes. Attribute bodies
/// (including method code) are skipped: the analyzer extracts declarations,
/// not behavior.
pub fn parse(bytes: &[u8]) -> Result<ClassMetadata, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut r = ByteReader::new(bytes);

    let magic = r.u32()?;
    if magic != MAGIC {
        return Err(ParseError::BadMagic(magic));
    }
    let _minor = r.u16()?;
    let _major = r.u16()?;

    let pool = ConstantPool::parse(&mut r)?;

    let _access_flags = r.u16()?;
    let this_class = r.u16()?;
    let class_name = pool.class_name(this_class)?;

    let super_index = r.u16()?;
    // Index 0 is legal only for java.lang.Object itself.
    let superclass = if super_index == 0 {
        None
    } else {
        Some(pool.class_name(super_index)?)
    };

    let interface_count = r.u16()?;
    let mut interfaces = std::collections::BTreeSet::new();
    for _ in 0..interface_count {
        let index = r.u16()?;
        interfaces.insert(pool.class_name(index)?);
    }

    let field_count = r.u16()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let (name, descriptor, access_flags) = member(&mut r, &pool)?;
        fields.push(FieldSig { name, descriptor, access_flags });
    }

    let method_count = r.u16()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        let (name, descriptor, access_flags) = member(&mut r, &pool)?;
        methods.push(MethodSig { name, descriptor, access_flags });
    }

    // Trailing class attributes are not needed for redefinition analysis.

    Ok(ClassMetadata { class_name, superclass, interfaces, fields, methods })
}

/// Parse one field_info / method_info entry, skipping its attributes.
fn member(
    r: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<(smol_str::SmolStr, smol_str::SmolStr, u16), ParseError> {
    let access_flags = r.u16()?;
    let name_index = r.u16()?;
    let descriptor_index = r.u16()?;
    let name = smol_str::SmolStr::new(pool.utf8(name_index)?);
    let descriptor = smol_str::SmolStr::new(pool.utf8(descriptor_index)?);

    let attribute_count = r.u16()?;
    for _ in 0..attribute_count {
        let _attr_name = r.u16()?;
        let attr_len = r.u32()?;
        r.skip(attr_len as usize)?;
    }
    Ok((name, descriptor, access_flags))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
