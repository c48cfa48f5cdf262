//! Lexical scopes (§4.2).
//!
//! Grounded on the teacher's arena-of-handles pattern (functions/instances addressed
//! by `HeapId` rather than `Rc`): environments form a singly-linked chain of
//! arena-allocated frames addressed by [`EnvId`], so a closure can capture "a reference
//! to an environment" without fighting the borrow checker, and later mutations through
//! one handle are visible through every other handle that shares it.

use ahash::AHashMap;

use crate::error::{CodeLoc, LoxError, RunResult};
use crate::value::Value;

/// A handle into the [`EnvironmentArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(usize);

struct EnvNode {
    parent: Option<EnvId>,
    bindings: AHashMap<String, Value>,
}

/// Owns every environment frame ever created during one interpreter run. Frames are
/// never freed (matching the heap's grow-only design, §3 Representation note): a
/// frame may outlive its lexical scope because a closure still references it.
#[derive(Default)]
pub struct EnvironmentArena {
    nodes: Vec<EnvNode>,
}

impl EnvironmentArena {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[must_use]
    pub fn new_global(&mut self) -> EnvId {
        self.nodes.push(EnvNode { parent: None, bindings: AHashMap::new() });
        EnvId(self.nodes.len() - 1)
    }

    #[must_use]
    pub fn child_of(&mut self, parent: EnvId) -> EnvId {
        self.nodes.push(EnvNode { parent: Some(parent), bindings: AHashMap::new() });
        EnvId(self.nodes.len() - 1)
    }

    /// Installs a fresh binding in the innermost (given) frame. Re-defining a name in
    /// the same frame silently overwrites, matching `var` redeclaration semantics and
    /// the idempotent built-in install rule (§4.2).
    pub fn define(&mut self, env: EnvId, name: &str, value: Value) {
        self.nodes[env.0].bindings.insert(name.to_owned(), value);
    }

    /// Walks from `env` up through `depth` enclosing frames and reads `name`, which the
    /// parser has already resolved to live exactly there.
    pub fn get_at(&self, env: EnvId, depth: usize, name: &str, at: CodeLoc) -> RunResult<Value> {
        let target = self.ancestor(env, depth);
        self.nodes[target.0]
            .bindings
            .get(name)
            .copied()
            .ok_or_else(|| LoxError::undefined_variable(name, at))
    }

    /// As [`Self::get_at`] but walks upward until the binding is found, used for
    /// unresolved (global) references.
    pub fn get_global(&self, globals: EnvId, name: &str, at: CodeLoc) -> RunResult<Value> {
        self.nodes[globals.0]
            .bindings
            .get(name)
            .copied()
            .ok_or_else(|| LoxError::undefined_variable(name, at))
    }

    pub fn assign_at(&mut self, env: EnvId, depth: usize, name: &str, value: Value, at: CodeLoc) -> RunResult<()> {
        let target = self.ancestor(env, depth);
        let slot = self.nodes[target.0]
            .bindings
            .get_mut(name)
            .ok_or_else(|| LoxError::undefined_variable(name, at))?;
        *slot = value;
        Ok(())
    }

    /// Assignment without a resolved depth: walks upward from `env` until the binding
    /// is found, failing with "undefined variable" otherwise (§4.2).
    pub fn assign_unresolved(&mut self, env: EnvId, name: &str, value: Value, at: CodeLoc) -> RunResult<()> {
        let mut cursor = Some(env);
        while let Some(id) = cursor {
            if let Some(slot) = self.nodes[id.0].bindings.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            cursor = self.nodes[id.0].parent;
        }
        Err(LoxError::undefined_variable(name, at))
    }

    pub fn get_unresolved(&self, env: EnvId, name: &str, at: CodeLoc) -> RunResult<Value> {
        let mut cursor = Some(env);
        while let Some(id) = cursor {
            if let Some(v) = self.nodes[id.0].bindings.get(name) {
                return Ok(*v);
            }
            cursor = self.nodes[id.0].parent;
        }
        Err(LoxError::undefined_variable(name, at))
    }

    fn ancestor(&self, env: EnvId, depth: usize) -> EnvId {
        let mut cursor = env;
        for _ in 0..depth {
            cursor = self.nodes[cursor.0].parent.expect("resolver produced an out-of-range depth");
        }
        cursor
    }
}
