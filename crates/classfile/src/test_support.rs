// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Class-file synthesis for tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`. Builds real
//! class-file bytes (magic, constant pool, member tables) so parser and
//! validator tests exercise the actual grammar.

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_SUPER: u16 = 0x0020;

/// The `return` instruction, the smallest plausible method body.
const RETURN_BODY: &[u8] = &[0xb1];

struct Member {
    name: String,
    descriptor: String,
    access: u16,
    code: Vec<u8>,
}

enum PoolItem {
    Utf8(String),
    Class { name_index: u16 },
    Long(i64),
}

impl PoolItem {
    /// Long and Double entries occupy two pool slots.
    fn width(&self) -> u16 {
        match self {
            PoolItem::Long(_) => 2,
            _ => 1,
        }
    }
}

/// Builds valid class-file bytes for tests.
///
/// Class and interface names are given dotted (`java.lang.Object`); the
/// builder writes internal form.
pub struct ClassFileBuilder {
    class_name: String,
    superclass: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    long_constants: Vec<i64>,
}

impl ClassFileBuilder {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            superclass: Some("java.lang.Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            long_constants: Vec::new(),
        }
    }

    pub fn superclass(mut self, name: &str) -> Self {
        self.superclass = Some(name.to_string());
        self
    }

    /// Build a hierarchy-root class (super_class index 0).
    pub fn root(mut self) -> Self {
        self.superclass = None;
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        self.fields.push(Member {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: ACC_PRIVATE,
            code: Vec::new(),
        });
        self
    }

    pub fn method(self, name: &str, descriptor: &str) -> Self {
        self.method_with_code(name, descriptor, RETURN_BODY)
    }

    /// A method whose attribute body is `code`; vary the bytes to produce
    /// a body-only difference between two builds.
    pub fn method_with_code(mut self, name: &str, descriptor: &str, code: &[u8]) -> Self {
        self.methods.push(Member {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: ACC_PUBLIC,
            code: code.to_vec(),
        });
        self
    }

    /// Inject a Long constant so the pool exercises two-slot entries.
    pub fn long_constant(mut self, value: i64) -> Self {
        self.long_constants.push(value);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::default();

        // Wide entries first so later indices must account for the extra slot
        for value in &self.long_constants {
            pool.push(PoolItem::Long(*value));
        }

        let this_index = pool.class(&self.class_name);
        let super_index = self.superclass.as_deref().map(|s| pool.class(s));
        let interface_indices: Vec<u16> =
            self.interfaces.iter().map(|i| pool.class(i)).collect();
        let code_attr_name = pool.utf8("Code");

        let resolve = |pool: &mut Pool, members: &[Member]| -> Vec<(u16, u16, u16, Vec<u8>)> {
            members
                .iter()
                .map(|m| {
                    (pool.utf8(&m.name), pool.utf8(&m.descriptor), m.access, m.code.clone())
                })
                .collect()
        };
        let fields = resolve(&mut pool, &self.fields);
        let methods = resolve(&mut pool, &self.methods);

        let mut out = Vec::new();
        push_u32(&mut out, 0xCAFE_BABE);
        push_u16(&mut out, 0); // minor
        push_u16(&mut out, 52); // major (Java 8)

        push_u16(&mut out, pool.slot_count + 1);
        for item in &pool.items {
            match item {
                PoolItem::Utf8(s) => {
                    let internal = s.replace('.', "/");
                    out.push(1);
                    push_u16(&mut out, internal.len() as u16);
                    out.extend_from_slice(internal.as_bytes());
                }
                PoolItem::Class { name_index } => {
                    out.push(7);
                    push_u16(&mut out, *name_index);
                }
                PoolItem::Long(v) => {
                    out.push(5);
                    out.extend_from_slice(&v.to_be_bytes());
                }
            }
        }

        push_u16(&mut out, ACC_PUBLIC | ACC_SUPER);
        push_u16(&mut out, this_index);
        push_u16(&mut out, super_index.unwrap_or(0));

        push_u16(&mut out, interface_indices.len() as u16);
        for index in interface_indices {
            push_u16(&mut out, index);
        }

        for table in [&fields, &methods] {
            push_u16(&mut out, table.len() as u16);
            for (name_index, descriptor_index, access, code) in table.iter() {
                push_u16(&mut out, *access);
                push_u16(&mut out, *name_index);
                push_u16(&mut out, *descriptor_index);
                if code.is_empty() {
                    push_u16(&mut out, 0); // no attributes
                } else {
                    push_u16(&mut out, 1);
                    push_u16(&mut out, code_attr_name);
                    push_u32(&mut out, code.len() as u32);
                    out.extend_from_slice(code);
                }
            }
        }

        push_u16(&mut out, 0); // class attributes

        out
    }
}

#[derive(Default)]
struct Pool {
    items: Vec<PoolItem>,
    slot_count: u16,
    utf8_index: HashMap<String, u16>,
    class_index: HashMap<String, u16>,
}

impl Pool {
    fn push(&mut self, item: PoolItem) -> u16 {
        let index = self.slot_count + 1;
        self.slot_count += item.width();
        self.items.push(item);
        index
    }

    /// Intern a Utf8 entry. Dotted names convert to internal form at write
    /// time.
    fn utf8(&mut self, s: &str) -> u16 {
        if let Some(&index) = self.utf8_index.get(s) {
            return index;
        }
        let index = self.push(PoolItem::Utf8(s.to_string()));
        self.utf8_index.insert(s.to_string(), index);
        index
    }

    fn class(&mut self, dotted: &str) -> u16 {
        if let Some(&index) = self.class_index.get(dotted) {
            return index;
        }
        let name_index = self.utf8(dotted);
        let index = self.push(PoolItem::Class { name_index });
        self.class_index.insert(dotted.to_string(), index);
        index
    }
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}
