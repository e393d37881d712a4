//! Decoder for JVM `.class` files.
//!
//! Only the parts call-site detectors need are kept: the class hierarchy,
//! annotations (both retention kinds), `invoke*` instructions and the
//! line number table. Everything else in the constant pool and attribute
//! tables is skipped over.

use std::path::Path;

use crate::error::{LintError, Result};
use crate::ir::bytecode::{
    internal_to_dotted, BytecodeAnnotation, CallInsn, ClassArtifact, FieldInfo, InvokeKind,
    MethodInfo,
};

use super::MAX_NESTING;

const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone)]
enum Constant {
    Unused,
    Utf8(String),
    Class(u16),
    String(u16),
    MethodRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    Other,
}

struct Reader<'a> {
    path: &'a Path,
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(path: &'a Path, data: &'a [u8]) -> Self {
        Self { path, data, pos: 0 }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                LintError::parse(self.path, format!("truncated class file at byte {}", self.pos))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u1(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn u2(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u4(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn error(&self, message: impl Into<String>) -> LintError {
        LintError::parse(self.path, message)
    }
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let count = r.u2()? as usize;
        let mut entries = vec![Constant::Unused];
        while entries.len() < count {
            let tag = r.u1()?;
            let entry = match tag {
                1 => {
                    let len = r.u2()? as usize;
                    Constant::Utf8(decode_modified_utf8(r.bytes(len)?))
                }
                3 | 4 => {
                    r.u4()?;
                    Constant::Other
                }
                5 | 6 => {
                    r.bytes(8)?;
                    // Long and double occupy two slots.
                    entries.push(Constant::Other);
                    Constant::Unused
                }
                7 => Constant::Class(r.u2()?),
                8 => Constant::String(r.u2()?),
                9 | 17 | 18 => {
                    r.u4()?;
                    Constant::Other
                }
                10 | 11 => Constant::MethodRef {
                    class: r.u2()?,
                    name_and_type: r.u2()?,
                },
                12 => Constant::NameAndType {
                    name: r.u2()?,
                    descriptor: r.u2()?,
                },
                15 => {
                    r.bytes(3)?;
                    Constant::Other
                }
                16 | 19 | 20 => {
                    r.u2()?;
                    Constant::Other
                }
                other => return Err(r.error(format!("unknown constant pool tag {other}"))),
            };
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Option<&str> {
        match self.entries.get(index as usize)? {
            Constant::Utf8(s) => Some(s),
            _ => None,
        }
    }

    fn class_name(&self, index: u16) -> Option<String> {
        match self.entries.get(index as usize)? {
            Constant::Class(name) => self.utf8(*name).map(internal_to_dotted),
            _ => None,
        }
    }

    fn string(&self, index: u16) -> Option<&str> {
        match self.entries.get(index as usize)? {
            Constant::String(utf8) => self.utf8(*utf8),
            Constant::Utf8(s) => Some(s),
            _ => None,
        }
    }

    /// (owner, name, descriptor) of a method reference.
    fn method_ref(&self, index: u16) -> Option<(String, &str, &str)> {
        let Constant::MethodRef {
            class,
            name_and_type,
        } = self.entries.get(index as usize)?
        else {
            return None;
        };
        let Constant::NameAndType { name, descriptor } =
            self.entries.get(*name_and_type as usize)?
        else {
            return None;
        };
        Some((
            self.class_name(*class)?,
            self.utf8(*name)?,
            self.utf8(*descriptor)?,
        ))
    }
}

/// Class files store strings as modified UTF-8; fall back to a lossy
/// decode for the encodings that differ from standard UTF-8.
fn decode_modified_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Decode a class file.
pub fn parse(path: &Path, data: &[u8]) -> Result<ClassArtifact> {
    let mut r = Reader::new(path, data);
    if r.u4()? != MAGIC {
        return Err(r.error("not a class file (bad magic)"));
    }
    let _minor = r.u2()?;
    let _major = r.u2()?;
    let pool = ConstantPool::read(&mut r)?;

    let access = r.u2()?;
    let this_class = r.u2()?;
    let name = pool
        .class_name(this_class)
        .ok_or_else(|| r.error("this_class does not name a class"))?;
    let super_class = r.u2()?;

    let mut class = ClassArtifact::new(path, name);
    class.access = access;
    class.super_name = if super_class == 0 {
        None
    } else {
        pool.class_name(super_class)
    };

    let interface_count = r.u2()?;
    for _ in 0..interface_count {
        let index = r.u2()?;
        class.interfaces.extend(pool.class_name(index));
    }

    let field_count = r.u2()?;
    for _ in 0..field_count {
        let member = read_member(&mut r, &pool)?;
        class.fields.push(FieldInfo {
            access: member.access,
            name: member.name,
            descriptor: member.descriptor,
            annotations: member.annotations,
        });
    }

    let method_count = r.u2()?;
    for _ in 0..method_count {
        let member = read_member(&mut r, &pool)?;
        let first_line = member.lines.iter().map(|(_, line)| *line).min();
        class.methods.push(MethodInfo {
            access: member.access,
            name: member.name,
            descriptor: member.descriptor,
            annotations: member.annotations,
            calls: member.calls,
            first_line,
        });
    }

    let attribute_count = r.u2()?;
    for _ in 0..attribute_count {
        let (attr_name, body) = read_attribute(&mut r, &pool)?;
        let mut body_reader = Reader::new(path, body);
        match attr_name {
            "SourceFile" => {
                let index = body_reader.u2()?;
                class.source_file = pool.utf8(index).map(str::to_string);
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                class
                    .annotations
                    .extend(read_annotations(&mut body_reader, &pool)?);
            }
            _ => {}
        }
    }

    tracing::trace!(
        class = %class.name,
        methods = class.methods.len(),
        "decoded class file"
    );
    Ok(class)
}

struct Member {
    access: u16,
    name: String,
    descriptor: String,
    annotations: Vec<BytecodeAnnotation>,
    calls: Vec<CallInsn>,
    /// (start_pc, line)
    lines: Vec<(usize, usize)>,
}

fn read_attribute<'a, 'p>(
    r: &mut Reader<'a>,
    pool: &'p ConstantPool,
) -> Result<(&'p str, &'a [u8])> {
    let name_index = r.u2()?;
    let len = r.u4()? as usize;
    let body = r.bytes(len)?;
    Ok((pool.utf8(name_index).unwrap_or(""), body))
}

fn read_member(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<Member> {
    let access = r.u2()?;
    let name_index = r.u2()?;
    let descriptor_index = r.u2()?;
    let mut member = Member {
        access,
        name: pool.utf8(name_index).unwrap_or("").to_string(),
        descriptor: pool.utf8(descriptor_index).unwrap_or("").to_string(),
        annotations: Vec::new(),
        calls: Vec::new(),
        lines: Vec::new(),
    };

    let attribute_count = r.u2()?;
    for _ in 0..attribute_count {
        let name_index = r.u2()?;
        let len = r.u4()? as usize;
        let body = r.bytes(len)?;
        let mut body_reader = Reader::new(r.path, body);
        match pool.utf8(name_index).unwrap_or("") {
            "Code" => read_code(&mut body_reader, pool, &mut member)?,
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                member
                    .annotations
                    .extend(read_annotations(&mut body_reader, pool)?);
            }
            _ => {}
        }
    }
    Ok(member)
}

fn read_code(r: &mut Reader<'_>, pool: &ConstantPool, member: &mut Member) -> Result<()> {
    let _max_stack = r.u2()?;
    let _max_locals = r.u2()?;
    let code_len = r.u4()? as usize;
    let code = r.bytes(code_len)?;
    let exception_table_len = r.u2()? as usize;
    r.bytes(exception_table_len * 8)?;

    let attribute_count = r.u2()?;
    for _ in 0..attribute_count {
        let name_index = r.u2()?;
        let len = r.u4()? as usize;
        let body = r.bytes(len)?;
        if pool.utf8(name_index) == Some("LineNumberTable") {
            let mut table = Reader::new(r.path, body);
            let count = table.u2()?;
            for _ in 0..count {
                let start_pc = table.u2()? as usize;
                let line = table.u2()? as usize;
                member.lines.push((start_pc, line));
            }
        }
    }
    member.lines.sort_unstable();

    let mut calls = scan_invokes(r.path, code, pool)?;
    for call in &mut calls {
        call.line = line_for_pc(&member.lines, call.pc);
    }
    member.calls = calls;
    Ok(())
}

fn line_for_pc(lines: &[(usize, usize)], pc: usize) -> Option<usize> {
    lines
        .iter()
        .take_while(|(start, _)| *start <= pc)
        .last()
        .map(|(_, line)| *line)
}

/// Walk the instruction stream and collect `invoke*` instructions.
fn scan_invokes(path: &Path, code: &[u8], pool: &ConstantPool) -> Result<Vec<CallInsn>> {
    let mut calls = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let opcode = code[pc];
        let kind = match opcode {
            0xb6 => Some(InvokeKind::Virtual),
            0xb7 => Some(InvokeKind::Special),
            0xb8 => Some(InvokeKind::Static),
            0xb9 => Some(InvokeKind::Interface),
            _ => None,
        };
        if let Some(kind) = kind {
            let index = code
                .get(pc + 1..pc + 3)
                .map(|b| u16::from_be_bytes([b[0], b[1]]))
                .ok_or_else(|| LintError::parse(path, format!("truncated invoke at pc {pc}")))?;
            if let Some((owner, name, descriptor)) = pool.method_ref(index) {
                calls.push(CallInsn {
                    kind,
                    owner,
                    name: name.to_string(),
                    descriptor: descriptor.to_string(),
                    pc,
                    line: None,
                });
            }
        }
        pc += instruction_len(code, pc)
            .ok_or_else(|| LintError::parse(path, format!("bad opcode 0x{opcode:02x} at pc {pc}")))?;
    }
    Ok(calls)
}

fn read_i32(code: &[u8], at: usize) -> Option<i32> {
    let b = code.get(at..at + 4)?;
    Some(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Length in bytes of the instruction at `pc`.
fn instruction_len(code: &[u8], pc: usize) -> Option<usize> {
    let len = match code[pc] {
        0x00..=0x0f => 1,
        0x10 => 2,
        0x11 => 3,
        0x12 => 2,
        0x13 | 0x14 => 3,
        0x15..=0x19 => 2,
        0x1a..=0x35 => 1,
        0x36..=0x3a => 2,
        0x3b..=0x83 => 1,
        0x84 => 3,
        0x85..=0x98 => 1,
        0x99..=0xa8 => 3,
        0xa9 => 2,
        0xaa => {
            let pad = (4 - (pc + 1) % 4) % 4;
            let base = pc + 1 + pad;
            let low = read_i32(code, base + 4)?;
            let high = read_i32(code, base + 8)?;
            let count = usize::try_from(i64::from(high) - i64::from(low) + 1).ok()?;
            1 + pad + 12 + count.checked_mul(4)?
        }
        0xab => {
            let pad = (4 - (pc + 1) % 4) % 4;
            let base = pc + 1 + pad;
            let pairs = usize::try_from(read_i32(code, base + 4)?).ok()?;
            1 + pad + 8 + pairs.checked_mul(8)?
        }
        0xac..=0xb1 => 1,
        0xb2..=0xb8 => 3,
        0xb9 | 0xba => 5,
        0xbb => 3,
        0xbc => 2,
        0xbd => 3,
        0xbe | 0xbf => 1,
        0xc0 | 0xc1 => 3,
        0xc2 | 0xc3 => 1,
        0xc4 => {
            if *code.get(pc + 1)? == 0x84 {
                6
            } else {
                4
            }
        }
        0xc5 => 4,
        0xc6 | 0xc7 => 3,
        0xc8 | 0xc9 => 5,
        0xca | 0xfe | 0xff => 1,
        _ => return None,
    };
    Some(len)
}

fn read_annotations(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<Vec<BytecodeAnnotation>> {
    let count = r.u2()?;
    (0..count).map(|_| read_annotation(r, pool, 0)).collect()
}

fn read_annotation(
    r: &mut Reader<'_>,
    pool: &ConstantPool,
    depth: usize,
) -> Result<BytecodeAnnotation> {
    if depth > MAX_NESTING {
        return Err(r.error(format!("annotations nested deeper than {MAX_NESTING} levels")));
    }
    let type_index = r.u2()?;
    let pairs = r.u2()?;
    let mut values = Vec::new();
    for _ in 0..pairs {
        let _element_name = r.u2()?;
        read_element_value(r, pool, &mut values, depth + 1)?;
    }
    Ok(BytecodeAnnotation {
        descriptor: pool.utf8(type_index).unwrap_or("").to_string(),
        values,
    })
}

/// Collect string constants from an element value, recursing into arrays.
fn read_element_value(
    r: &mut Reader<'_>,
    pool: &ConstantPool,
    values: &mut Vec<String>,
    depth: usize,
) -> Result<()> {
    if depth > MAX_NESTING {
        return Err(r.error(format!("annotations nested deeper than {MAX_NESTING} levels")));
    }
    match r.u1()? {
        b's' => {
            let index = r.u2()?;
            values.extend(pool.string(index).map(str::to_string));
        }
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'c' => {
            r.u2()?;
        }
        b'e' => {
            r.u4()?;
        }
        b'@' => {
            read_annotation(r, pool, depth + 1)?;
        }
        b'[' => {
            let count = r.u2()?;
            for _ in 0..count {
                read_element_value(r, pool, values, depth + 1)?;
            }
        }
        tag => return Err(r.error(format!("unknown element value tag {tag}"))),
    }
    Ok(())
}
