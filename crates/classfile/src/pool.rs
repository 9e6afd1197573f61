// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Constant-pool parsing

use crate::parser::ParseError;
use crate::reader::ByteReader;
use smol_str::SmolStr;

/// One parsed constant-pool entry. Only the shapes the analyzer resolves
/// (Utf8, Class) keep their payload; everything else is recorded as `Other`
/// so indices still line up.
#[derive(Debug, Clone)]
pub(crate) enum PoolEntry {
    Utf8(SmolStr),
    Class { name_index: u16 },
    Other,
    /// Second slot of an 8-byte (Long/Double) entry. The format counts these
    /// as two entries.
    WideContinuation,
}

#[derive(Debug)]
pub(crate) struct ConstantPool {
    /// 1-indexed; entry 0 is a placeholder.
    entries: Vec<PoolEntry>,
}

impl ConstantPool {
    pub fn parse(r: &mut ByteReader<'_>) -> Result<Self, ParseError> {
        let count = r.u16()?;
        let mut entries = vec![PoolEntry::Other]; // index 0 unused
        let mut index: u16 = 1;
        while index < count {
            let tag = r.u8()?;
            let entry = match tag {
                // CONSTANT_Utf8
                1 => {
                    let len = r.u16()? as usize;
                    let bytes = r.bytes(len)?;
                    let s = std::str::from_utf8(bytes)
                        .map_err(|_| ParseError::BadUtf8 { index })?;
                    PoolEntry::Utf8(SmolStr::new(s))
                }
                // CONSTANT_Integer, CONSTANT_Float
                3 | 4 => {
                    r.skip(4)?;
                    PoolEntry::Other
                }
                // CONSTANT_Long, CONSTANT_Double take two pool slots
                5 | 6 => {
                    r.skip(8)?;
                    entries.push(PoolEntry::Other);
                    entries.push(PoolEntry::WideContinuation);
                    index = index.saturating_add(2);
                    continue;
                }
                // CONSTANT_Class
                7 => PoolEntry::Class { name_index: r.u16()? },
                // CONSTANT_String, CONSTANT_MethodType, CONSTANT_Module, CONSTANT_Package
                8 | 16 | 19 | 20 => {
                    r.skip(2)?;
                    PoolEntry::Other
                }
                // Fieldref, Methodref, InterfaceMethodref, NameAndType,
                // Dynamic, InvokeDynamic
                9 | 10 | 11 | 12 | 17 | 18 => {
                    r.skip(4)?;
                    PoolEntry::Other
                }
                // CONSTANT_MethodHandle
                15 => {
                    r.skip(3)?;
                    PoolEntry::Other
                }
                other => return Err(ParseError::UnknownPoolTag { tag: other, index }),
            };
            entries.push(entry);
            index = index.saturating_add(1);
        }
        Ok(Self { entries })
    }

    fn entry(&self, index: u16) -> Result<&PoolEntry, ParseError> {
        if index == 0 {
            return Err(ParseError::BadPoolIndex { index });
        }
        self.entries
            .get(index as usize)
            .ok_or(ParseError::BadPoolIndex { index })
    }

    /// Resolve a Utf8 entry.
    pub fn utf8(&self, index: u16) -> Result<&str, ParseError> {
        match self.entry(index)? {
            PoolEntry::Utf8(s) => Ok(s),
            _ => Err(ParseError::WrongPoolTag { index, expected: "Utf8" }),
        }
    }

    /// Resolve a Class entry to its dotted name (`java/lang/Object` →
    /// `java.lang.Object`).
    pub fn class_name(&self, index: u16) -> Result<SmolStr, ParseError> {
        match self.entry(index)? {
            PoolEntry::Class { name_index } => {
                let internal = self.utf8(*name_index)?;
                Ok(SmolStr::new(internal.replace('/', ".")))
            }
            _ => Err(ParseError::WrongPoolTag { index, expected: "Class" }),
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
