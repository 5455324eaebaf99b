//! Loam bytecode weaver - field injection without reflection
//!
//! `#[autowired]` fields are usually private, and sometimes `final`. Rather
//! than reaching for `java.lang.reflect.Field::setAccessible` at runtime (a
//! cost per injection, and a recurring complaint from users running under a
//! security manager or a native-image build), Loam weaves a synthetic
//! setter directly into the compiled class after `javac` runs:
//!
//! * the field's `final` bit, if set, is cleared;
//! * a `public synthetic` `__di_set_<field>(T)V` method is added that does
//!   exactly `this.field = arg; return;` (or the static equivalent).
//!
//! Generated component wiring calls the setter instead of touching the
//! field directly, so injected state behaves like constructor injection
//! from the JVM's perspective: no reflection, no `setAccessible`, and a
//! `final` field that stays logically immutable after the one synthetic
//! write during startup.
//!
//! [`weave_class`] operates on a single in-memory class file;
//! [`weave_directory`] walks a compiled output directory and rewrites every
//! `.class` file in place. Both are safe to run repeatedly over the same
//! input: a field that already lost `final` and already has its setter is
//! left untouched.

mod classfile;
mod weaver;

pub use classfile::{
    Attribute, ClassFile, ConstantPool, ConstantPoolEntry, FieldInfo, MethodInfo, ACC_ENUM,
    ACC_FINAL, ACC_INTERFACE, ACC_MODULE, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC,
    ACC_SYNTHETIC,
};
pub use weaver::{weave_class, weave_directory, WeaveResult};
