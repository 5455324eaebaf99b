//! Class file structure
//!
//! A hand-rolled, big-endian reader/writer for the subset of the JVM class
//! file format the weaver needs to touch: the constant pool, field table,
//! method table, and the handful of attributes (`RuntimeVisibleAnnotations`,
//! `Code`) that field-injection weaving reads or generates. Nothing here
//! understands method bodies beyond the `Code` attribute shape needed to
//! synthesize a trivial setter; every other attribute is carried through as
//! an opaque byte blob.

use loam_core::error::weave::WeaveError;

const MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;
pub const ACC_MODULE: u16 = 0x8000;

/// A cursor over a class file's bytes, reading big-endian primitives
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WeaveError> {
        if self.remaining() < n {
            return Err(WeaveError::malformed(format!(
                "unexpected end of class file at offset {} (needed {n} more bytes)",
                self.pos
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, WeaveError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, WeaveError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, WeaveError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32, WeaveError> {
        Ok(self.u32()? as i32)
    }

    fn u64(&mut self) -> Result<u64, WeaveError> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

/// A writer that accumulates big-endian bytes
#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    fn bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }
}

/// One constant pool entry
///
/// Index 0 is never addressable in the class file format; this crate
/// represents it with [`ConstantPoolEntry::Unusable`], which also fills the
/// slot immediately after a `Long`/`Double` entry (those occupy two pool
/// indices but only one logical entry).
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    /// The unaddressable index-0 slot, or the filler after a wide constant
    Unusable,
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    Fieldref {
        class_index: u16,
        name_and_type_index: u16,
    },
    Methodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
}

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_INVOKE_DYNAMIC: u8 = 18;

impl ConstantPoolEntry {
    /// Whether this entry occupies two constant pool indices (`Long`/`Double`)
    fn is_wide(&self) -> bool {
        matches!(self, ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_))
    }

    fn parse(cursor: &mut Cursor) -> Result<Self, WeaveError> {
        let tag = cursor.u8()?;
        Ok(match tag {
            TAG_UTF8 => {
                let len = cursor.u16()? as usize;
                let raw = cursor.take(len)?;
                let text = String::from_utf8(raw.to_vec())
                    .map_err(|_| WeaveError::malformed("Utf8 constant is not valid UTF-8"))?;
                ConstantPoolEntry::Utf8(text)
            }
            TAG_INTEGER => ConstantPoolEntry::Integer(cursor.i32()?),
            TAG_FLOAT => ConstantPoolEntry::Float(f32::from_bits(cursor.u32()?)),
            TAG_LONG => ConstantPoolEntry::Long(cursor.u64()? as i64),
            TAG_DOUBLE => ConstantPoolEntry::Double(f64::from_bits(cursor.u64()?)),
            TAG_CLASS => ConstantPoolEntry::Class {
                name_index: cursor.u16()?,
            },
            TAG_STRING => ConstantPoolEntry::String {
                string_index: cursor.u16()?,
            },
            TAG_FIELDREF => ConstantPoolEntry::Fieldref {
                class_index: cursor.u16()?,
                name_and_type_index: cursor.u16()?,
            },
            TAG_METHODREF => ConstantPoolEntry::Methodref {
                class_index: cursor.u16()?,
                name_and_type_index: cursor.u16()?,
            },
            TAG_INTERFACE_METHODREF => ConstantPoolEntry::InterfaceMethodref {
                class_index: cursor.u16()?,
                name_and_type_index: cursor.u16()?,
            },
            TAG_NAME_AND_TYPE => ConstantPoolEntry::NameAndType {
                name_index: cursor.u16()?,
                descriptor_index: cursor.u16()?,
            },
            TAG_METHOD_HANDLE => ConstantPoolEntry::MethodHandle {
                reference_kind: cursor.u8()?,
                reference_index: cursor.u16()?,
            },
            TAG_METHOD_TYPE => ConstantPoolEntry::MethodType {
                descriptor_index: cursor.u16()?,
            },
            TAG_INVOKE_DYNAMIC => ConstantPoolEntry::InvokeDynamic {
                bootstrap_method_attr_index: cursor.u16()?,
                name_and_type_index: cursor.u16()?,
            },
            other => {
                return Err(WeaveError::malformed(format!(
                    "unknown constant pool tag {other}"
                )));
            }
        })
    }

    fn write(&self, w: &mut Writer) {
        match self {
            ConstantPoolEntry::Unusable => {}
            ConstantPoolEntry::Utf8(s) => {
                w.u8(TAG_UTF8);
                w.u16(s.len() as u16);
                w.bytes(s.as_bytes());
            }
            ConstantPoolEntry::Integer(v) => {
                w.u8(TAG_INTEGER);
                w.u32(*v as u32);
            }
            ConstantPoolEntry::Float(v) => {
                w.u8(TAG_FLOAT);
                w.u32(v.to_bits());
            }
            ConstantPoolEntry::Long(v) => {
                w.u8(TAG_LONG);
                w.u64(*v as u64);
            }
            ConstantPoolEntry::Double(v) => {
                w.u8(TAG_DOUBLE);
                w.u64(v.to_bits());
            }
            ConstantPoolEntry::Class { name_index } => {
                w.u8(TAG_CLASS);
                w.u16(*name_index);
            }
            ConstantPoolEntry::String { string_index } => {
                w.u8(TAG_STRING);
                w.u16(*string_index);
            }
            ConstantPoolEntry::Fieldref {
                class_index,
                name_and_type_index,
            } => {
                w.u8(TAG_FIELDREF);
                w.u16(*class_index);
                w.u16(*name_and_type_index);
            }
            ConstantPoolEntry::Methodref {
                class_index,
                name_and_type_index,
            } => {
                w.u8(TAG_METHODREF);
                w.u16(*class_index);
                w.u16(*name_and_type_index);
            }
            ConstantPoolEntry::InterfaceMethodref {
                class_index,
                name_and_type_index,
            } => {
                w.u8(TAG_INTERFACE_METHODREF);
                w.u16(*class_index);
                w.u16(*name_and_type_index);
            }
            ConstantPoolEntry::NameAndType {
                name_index,
                descriptor_index,
            } => {
                w.u8(TAG_NAME_AND_TYPE);
                w.u16(*name_index);
                w.u16(*descriptor_index);
            }
            ConstantPoolEntry::MethodHandle {
                reference_kind,
                reference_index,
            } => {
                w.u8(TAG_METHOD_HANDLE);
                w.u8(*reference_kind);
                w.u16(*reference_index);
            }
            ConstantPoolEntry::MethodType { descriptor_index } => {
                w.u8(TAG_METHOD_TYPE);
                w.u16(*descriptor_index);
            }
            ConstantPoolEntry::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                w.u8(TAG_INVOKE_DYNAMIC);
                w.u16(*bootstrap_method_attr_index);
                w.u16(*name_and_type_index);
            }
        }
    }
}

/// The constant pool, indexed exactly as the class file format addresses it
/// (1-based; `entries[0]` is the unaddressable filler slot)
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolEntry>,
}

impl ConstantPool {
    fn parse(cursor: &mut Cursor, count: u16) -> Result<Self, WeaveError> {
        let mut entries = vec![ConstantPoolEntry::Unusable];
        let mut index = 1u16;
        while index < count {
            let entry = ConstantPoolEntry::parse(cursor)?;
            let wide = entry.is_wide();
            entries.push(entry);
            index += 1;
            if wide {
                entries.push(ConstantPoolEntry::Unusable);
                index += 1;
            }
        }
        Ok(Self { entries })
    }

    fn write(&self, w: &mut Writer) {
        w.u16(self.entries.len() as u16);
        for entry in self.entries.iter().skip(1) {
            entry.write(w);
        }
    }

    /// Looks up an entry by its 1-based constant pool index
    pub fn get(&self, index: u16) -> Option<&ConstantPoolEntry> {
        self.entries.get(index as usize)
    }

    /// Resolves a `Utf8` entry by index, if the index points to one
    pub fn utf8(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            ConstantPoolEntry::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Finds an existing `Utf8` entry with this exact text, or appends one
    pub fn find_or_add_utf8(&mut self, text: &str) -> u16 {
        if let Some(index) = self
            .entries
            .iter()
            .position(|e| matches!(e, ConstantPoolEntry::Utf8(s) if s == text))
        {
            return index as u16;
        }
        self.entries.push(ConstantPoolEntry::Utf8(text.to_string()));
        (self.entries.len() - 1) as u16
    }

    /// Finds an existing `NameAndType` entry, or appends one (and its
    /// backing `Utf8` entries)
    pub fn find_or_add_name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.find_or_add_utf8(name);
        let descriptor_index = self.find_or_add_utf8(descriptor);
        if let Some(index) = self.entries.iter().position(|e| {
            matches!(e, ConstantPoolEntry::NameAndType { name_index: n, descriptor_index: d }
                if *n == name_index && *d == descriptor_index)
        }) {
            return index as u16;
        }
        self.entries.push(ConstantPoolEntry::NameAndType {
            name_index,
            descriptor_index,
        });
        (self.entries.len() - 1) as u16
    }

    /// Finds an existing `Fieldref` entry for `(class_index, name_and_type_index)`,
    /// or appends one
    pub fn find_or_add_fieldref(&mut self, class_index: u16, name_and_type_index: u16) -> u16 {
        if let Some(index) = self.entries.iter().position(|e| {
            matches!(e, ConstantPoolEntry::Fieldref { class_index: c, name_and_type_index: n }
                if *c == class_index && *n == name_and_type_index)
        }) {
            return index as u16;
        }
        self.entries.push(ConstantPoolEntry::Fieldref {
            class_index,
            name_and_type_index,
        });
        (self.entries.len() - 1) as u16
    }
}

/// An attribute, carried as an opaque blob unless specifically interpreted
/// (currently only `RuntimeVisibleAnnotations` and `RuntimeInvisibleAnnotations`)
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl Attribute {
    fn parse(cursor: &mut Cursor) -> Result<Self, WeaveError> {
        let name_index = cursor.u16()?;
        let length = cursor.u32()? as usize;
        let info = cursor.take(length)?.to_vec();
        Ok(Self { name_index, info })
    }

    fn write(&self, w: &mut Writer) {
        w.u16(self.name_index);
        w.u32(self.info.len() as u32);
        w.bytes(&self.info);
    }

    fn name<'a>(&self, pool: &'a ConstantPool) -> Option<&'a str> {
        pool.utf8(self.name_index)
    }
}

fn parse_attributes(cursor: &mut Cursor) -> Result<Vec<Attribute>, WeaveError> {
    let count = cursor.u16()?;
    (0..count).map(|_| Attribute::parse(cursor)).collect()
}

fn write_attributes(w: &mut Writer, attributes: &[Attribute]) {
    w.u16(attributes.len() as u16);
    for attribute in attributes {
        attribute.write(w);
    }
}

/// A field_info structure
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl FieldInfo {
    fn parse(cursor: &mut Cursor) -> Result<Self, WeaveError> {
        Ok(Self {
            access_flags: cursor.u16()?,
            name_index: cursor.u16()?,
            descriptor_index: cursor.u16()?,
            attributes: parse_attributes(cursor)?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.u16(self.access_flags);
        w.u16(self.name_index);
        w.u16(self.descriptor_index);
        write_attributes(w, &self.attributes);
    }

    pub fn is_public(&self) -> bool {
        self.access_flags & ACC_PUBLIC != 0
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }

    pub fn is_final(&self) -> bool {
        self.access_flags & ACC_FINAL != 0
    }

    pub fn strip_final(&mut self) -> bool {
        if self.is_final() {
            self.access_flags &= !ACC_FINAL;
            true
        } else {
            false
        }
    }
}

/// A method_info structure
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl MethodInfo {
    fn parse(cursor: &mut Cursor) -> Result<Self, WeaveError> {
        Ok(Self {
            access_flags: cursor.u16()?,
            name_index: cursor.u16()?,
            descriptor_index: cursor.u16()?,
            attributes: parse_attributes(cursor)?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.u16(self.access_flags);
        w.u16(self.name_index);
        w.u16(self.descriptor_index);
        write_attributes(w, &self.attributes);
    }
}

/// A parsed class file
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Parses a class file from its raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, WeaveError> {
        let mut cursor = Cursor::new(bytes);
        let magic = cursor.u32()?;
        if magic != MAGIC {
            return Err(WeaveError::malformed(format!(
                "bad magic number 0x{magic:08x}"
            )));
        }
        let minor_version = cursor.u16()?;
        let major_version = cursor.u16()?;
        let constant_pool_count = cursor.u16()?;
        let constant_pool = ConstantPool::parse(&mut cursor, constant_pool_count)?;
        let access_flags = cursor.u16()?;
        let this_class = cursor.u16()?;
        let super_class = cursor.u16()?;

        let interfaces_count = cursor.u16()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            interfaces.push(cursor.u16()?);
        }

        let fields_count = cursor.u16()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            fields.push(FieldInfo::parse(&mut cursor)?);
        }

        let methods_count = cursor.u16()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            methods.push(MethodInfo::parse(&mut cursor)?);
        }

        let attributes = parse_attributes(&mut cursor)?;

        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Serializes the class file back to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::default();
        w.u32(MAGIC);
        w.u16(self.minor_version);
        w.u16(self.major_version);
        self.constant_pool.write(&mut w);
        w.u16(self.access_flags);
        w.u16(self.this_class);
        w.u16(self.super_class);
        w.u16(self.interfaces.len() as u16);
        for interface in &self.interfaces {
            w.u16(*interface);
        }
        w.u16(self.fields.len() as u16);
        for field in &self.fields {
            field.write(&mut w);
        }
        w.u16(self.methods.len() as u16);
        for method in &self.methods {
            method.write(&mut w);
        }
        write_attributes(&mut w, &self.attributes);
        w.buf
    }

    /// The class's own fully-qualified internal name (`com/example/Foo`)
    pub fn class_name(&self) -> Option<&str> {
        let ConstantPoolEntry::Class { name_index } = self.constant_pool.get(self.this_class)? else {
            return None;
        };
        self.constant_pool.utf8(*name_index)
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags & ACC_ENUM != 0
    }

    pub fn is_module(&self) -> bool {
        self.access_flags & ACC_MODULE != 0
    }

    pub fn field_name(&self, field: &FieldInfo) -> Option<&str> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Option<&str> {
        self.constant_pool.utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Option<&str> {
        self.constant_pool.utf8(method.name_index)
    }

    /// Whether a method with this exact name already exists
    pub fn has_method_named(&self, name: &str) -> bool {
        self.methods
            .iter()
            .any(|m| self.method_name(m) == Some(name))
    }

    /// The simple annotation names (`Inject`, `Value`, ...) present on a
    /// field's `RuntimeVisibleAnnotations`/`RuntimeInvisibleAnnotations`
    /// attributes
    pub fn field_annotation_simple_names(&self, field: &FieldInfo) -> Vec<String> {
        let mut names = Vec::new();
        for attribute in &field.attributes {
            let Some(attr_name) = attribute.name(&self.constant_pool) else {
                continue;
            };
            if attr_name != "RuntimeVisibleAnnotations" && attr_name != "RuntimeInvisibleAnnotations" {
                continue;
            }
            names.extend(self.parse_annotation_names(&attribute.info));
        }
        names
    }

    fn parse_annotation_names(&self, info: &[u8]) -> Vec<String> {
        let mut cursor = Cursor::new(info);
        let mut names = Vec::new();
        let Ok(num_annotations) = cursor.u16() else {
            return names;
        };
        for _ in 0..num_annotations {
            let Ok(type_index) = cursor.u16() else {
                break;
            };
            if let Some(descriptor) = self.constant_pool.utf8(type_index) {
                if let Some(simple) = simple_annotation_name(descriptor) {
                    names.push(simple.to_string());
                }
            }
            let Ok(num_pairs) = cursor.u16() else {
                break;
            };
            let mut ok = true;
            for _ in 0..num_pairs {
                if cursor.u16().is_err() || skip_element_value(&mut cursor).is_err() {
                    ok = false;
                    break;
                }
            }
            if !ok {
                break;
            }
        }
        names
    }
}

/// Strips the `L...;` wrapper and package path from a type descriptor,
/// returning the simple class name (`"Inject"` from `"Ljavax/inject/Inject;"`)
fn simple_annotation_name(descriptor: &str) -> Option<&str> {
    let inner = descriptor.strip_prefix('L')?.strip_suffix(';')?;
    Some(inner.rsplit('/').next().unwrap_or(inner))
}

fn skip_element_value(cursor: &mut Cursor) -> Result<(), WeaveError> {
    let tag = cursor.u8()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
            cursor.u16()?;
        }
        b'e' => {
            cursor.u16()?;
            cursor.u16()?;
        }
        b'c' => {
            cursor.u16()?;
        }
        b'@' => {
            cursor.u16()?; // nested annotation type_index
            let num_pairs = cursor.u16()?;
            for _ in 0..num_pairs {
                cursor.u16()?;
                skip_element_value(cursor)?;
            }
        }
        b'[' => {
            let num_values = cursor.u16()?;
            for _ in 0..num_values {
                skip_element_value(cursor)?;
            }
        }
        other => {
            return Err(WeaveError::malformed(format!(
                "unknown annotation element_value tag '{}'",
                other as char
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_annotation_name_strips_package_and_wrapper() {
        assert_eq!(
            simple_annotation_name("Ljavax/inject/Inject;"),
            Some("Inject")
        );
        assert_eq!(
            simple_annotation_name("Lcom/veld/annotation/Inject;"),
            Some("Inject")
        );
        assert_eq!(simple_annotation_name("I"), None);
    }

    #[test]
    fn constant_pool_find_or_add_is_stable() {
        let mut pool = ConstantPool::default();
        pool.entries.push(ConstantPoolEntry::Unusable);
        let a = pool.find_or_add_utf8("hello");
        let b = pool.find_or_add_utf8("hello");
        assert_eq!(a, b);
        let c = pool.find_or_add_utf8("world");
        assert_ne!(a, c);
    }
}
