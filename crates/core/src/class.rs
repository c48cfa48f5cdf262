//! Class and instance model (§4.5).

use ahash::AHashMap;

use crate::ast::FunctionDecl;
use crate::environment::EnvId;
use crate::function::Function;
use crate::heap::HeapId;
use crate::value::Value;
use std::rc::Rc;

/// A class. `methods`/`statics` are plain maps -- the teacher's per-instance method
/// memoization (§9 Decision) applies to *bound* methods on [`Instance`], not to this
/// class-level table, which is static dispatch with no caching needed.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<HeapId>,
    pub methods: AHashMap<String, Rc<FunctionDecl>>,
    pub statics: AHashMap<String, Value>,
    pub closure: EnvId,
    pub is_builtin: bool,
}

impl Class {
    #[must_use]
    pub fn new(name: String, superclass: Option<HeapId>, closure: EnvId) -> Self {
        Self { name, superclass, methods: AHashMap::new(), statics: AHashMap::new(), closure, is_builtin: false }
    }

    /// Walks the superclass chain for `name`. The caller resolves `superclass` handles
    /// through the heap one hop at a time (this struct alone cannot walk further than
    /// its immediate parent without heap access).
    #[must_use]
    pub fn own_method(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        self.methods.get(name).cloned()
    }
}

/// A live instance. `method_cache` memoizes bound-method callables by name so repeated
/// `obj.method` access returns the same callable identity (§4.4, tested at §8 scenario 6).
#[derive(Debug)]
pub struct Instance {
    pub class: HeapId,
    pub class_name: String,
    pub fields: AHashMap<String, Value>,
    pub method_cache: AHashMap<String, HeapId>,
}

impl Instance {
    #[must_use]
    pub fn new(class: HeapId, class_name: String) -> Self {
        Self { class, class_name, fields: AHashMap::new(), method_cache: AHashMap::new() }
    }
}

/// Convenience re-export so call sites that only need the bound-callable shape do not
/// have to reach into `function::Function` directly.
pub type BoundFunction = Function;

/// A user-declared enum type (§3 `enum`): a fixed, ordered set of named members.
/// Unlike [`Class`] this carries no methods -- member access is the whole surface.
#[derive(Debug)]
pub struct LoxEnum {
    pub name: String,
    pub members: Vec<HeapId>,
}

/// One member of a [`LoxEnum`] (§3 `enum-member`): a name plus ordinal index,
/// comparable and hashable by identity of its owning enum and ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub enum_name: String,
    pub name: String,
    pub ordinal: usize,
}

impl EnumMember {
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}.{}", self.enum_name, self.name)
    }
}
