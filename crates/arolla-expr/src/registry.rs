//! Named operator registry.
//!
//! Entries are immutable [`Operator`] snapshots. Adding an overload builds a
//! new dispatcher snapshot and swaps it in under the write lock, so readers
//! see either the old or the new candidate list, never a partial one. Every
//! mutation bumps that registry's own [`Registry::generation`]. Late-bound
//! resolutions made inside [`track_resolutions`] are reported as
//! [`RegistryStamp`]s, so a cache can tell when an artifact depends on an
//! entry that has since changed.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use arolla_core::FingerprintHasher;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{ExprError, Result};
use crate::expr::Expr;
use crate::operator::{Operator, OperatorKind, Overload};
use crate::signature::Signature;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);
static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

thread_local! {
    static RESOLUTIONS: RefCell<Vec<Vec<RegistryStamp>>> = const { RefCell::new(Vec::new()) };
}

struct RegistryInner {
    id: u64,
    generation: AtomicU64,
    operators: RwLock<IndexMap<String, Operator>>,
}

impl RegistryInner {
    /// Caller holds the write lock.
    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
                generation: AtomicU64::new(0),
                operators: RwLock::new(IndexMap::new()),
            }),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Counter bumped by every mutation of this registry.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Register `op` under its own name.
    ///
    /// If the name already holds an overloaded operator, `op` is attached as
    /// a new candidate selected whenever its qtype inference succeeds.
    pub fn register(&self, op: Operator) -> Result<Operator> {
        let mut operators = self.inner.operators.write();
        match operators.get(op.name()) {
            None => {
                operators.insert(op.name().to_owned(), op.clone());
                self.inner.bump_generation();
                tracing::debug!(operator = op.name(), "registered operator");
                Ok(op)
            }
            Some(existing)
                if matches!(existing.kind(), OperatorKind::Overloaded(_))
                    && !matches!(op.kind(), OperatorKind::Overloaded(_)) =>
            {
                let existing = existing.clone();
                let updated = with_overload(&existing, Overload::accepting(op))?;
                operators.insert(updated.name().to_owned(), updated.clone());
                self.inner.bump_generation();
                tracing::debug!(operator = updated.name(), "added overload");
                Ok(updated)
            }
            Some(_) => Err(ExprError::AlreadyRegistered(op.name().to_owned())),
        }
    }

    /// Register an overloaded operator with no candidates yet.
    pub fn register_overloaded(
        &self,
        name: &str,
        signature: Signature,
        doc: &str,
    ) -> Result<Operator> {
        let op = Operator::builder(name)
            .signature(signature)
            .doc(doc)
            .overloaded(Vec::new())?;
        self.register(op)
    }

    /// Append a candidate to the overloaded operator registered as `name`.
    pub fn add_overload(&self, name: &str, overload: Overload) -> Result<Operator> {
        let mut operators = self.inner.operators.write();
        let existing = operators
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::OperatorNotFound(name.to_owned()))?;
        let updated = with_overload(&existing, overload)?;
        operators.insert(name.to_owned(), updated.clone());
        self.inner.bump_generation();
        tracing::debug!(operator = name, "added overload");
        Ok(updated)
    }

    pub fn lookup(&self, name: &str) -> Result<Operator> {
        self.get(name)
            .ok_or_else(|| ExprError::OperatorNotFound(name.to_owned()))
    }

    pub fn get(&self, name: &str) -> Option<Operator> {
        self.inner.operators.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.operators.read().contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner.operators.read().keys().cloned().collect()
    }

    /// Operator that looks `name` up again at every dispatch, so overloads
    /// added later are visible to expressions built earlier.
    pub fn late_bound(&self, name: &str) -> Result<Operator> {
        let current = self.lookup(name)?;
        let registered = RegisteredOperator {
            name: name.to_owned(),
            registry_id: self.inner.id,
            registry: Arc::downgrade(&self.inner),
        };
        Ok(Operator::from_parts(
            name.to_owned(),
            current.doc().to_owned(),
            current.signature().clone(),
            OperatorKind::Registered(registered),
        ))
    }

    /// Build a call to the operator currently registered as `name`.
    pub fn call(&self, name: &str, args: impl IntoIterator<Item = Expr>) -> Result<Expr> {
        Expr::call(&self.lookup(name)?, args)
    }

    pub fn call_with_kwargs(
        &self,
        name: &str,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    ) -> Result<Expr> {
        Expr::call_with_kwargs(&self.lookup(name)?, args, kwargs)
    }
}

fn with_overload(existing: &Operator, overload: Overload) -> Result<Operator> {
    let OperatorKind::Overloaded(overloaded) = existing.kind() else {
        return Err(ExprError::NotOverloaded(existing.name().to_owned()));
    };
    let mut overloads: Vec<Overload> = overloaded.overloads().to_vec();
    overloads.push(overload);
    Operator::builder(existing.name())
        .signature(existing.signature().clone())
        .doc(existing.doc())
        .overloaded(overloads)
}

/// Late-bound reference to a registry entry.
#[derive(Clone)]
pub struct RegisteredOperator {
    name: String,
    registry_id: u64,
    registry: Weak<RegistryInner>,
}

impl RegisteredOperator {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operator currently registered under the name.
    pub fn resolve(&self) -> Result<Operator> {
        let inner = self
            .registry
            .upgrade()
            .ok_or_else(|| ExprError::RegistryDropped(self.name.clone()))?;
        let (op, generation) = {
            let operators = inner.operators.read();
            (operators.get(&self.name).cloned(), inner.generation.load(Ordering::Acquire))
        };
        record_resolution(RegistryStamp {
            registry_id: self.registry_id,
            registry: Arc::downgrade(&inner),
            generation,
        });
        op.ok_or_else(|| ExprError::OperatorNotFound(self.name.clone()))
    }

    pub(crate) fn hash_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_u64(self.registry_id).combine_str(&self.name);
    }
}

impl std::fmt::Debug for RegisteredOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredOperator")
            .field("name", &self.name)
            .field("registry_id", &self.registry_id)
            .finish()
    }
}

/// A registry generation observed by a late-bound resolution.
#[derive(Clone)]
pub struct RegistryStamp {
    registry_id: u64,
    registry: Weak<RegistryInner>,
    generation: u64,
}

impl RegistryStamp {
    /// Whether the registry still exists and has not been mutated since.
    pub fn is_current(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.generation.load(Ordering::Acquire) == self.generation)
    }

    fn same_observation(&self, other: &RegistryStamp) -> bool {
        self.registry_id == other.registry_id && self.generation == other.generation
    }
}

impl std::fmt::Debug for RegistryStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryStamp")
            .field("registry_id", &self.registry_id)
            .field("generation", &self.generation)
            .finish()
    }
}

fn record_resolution(stamp: RegistryStamp) {
    RESOLUTIONS.with(|frames| {
        if let Some(frame) = frames.borrow_mut().last_mut()
            && !frame.iter().any(|seen| seen.same_observation(&stamp))
        {
            frame.push(stamp);
        }
    });
}

/// Pops its thread-local frame on drop, including on unwind.
struct ResolutionFrame;

impl ResolutionFrame {
    fn push() -> Self {
        RESOLUTIONS.with(|frames| frames.borrow_mut().push(Vec::new()));
        Self
    }

    fn take(self) -> Vec<RegistryStamp> {
        std::mem::forget(self);
        pop_frame()
    }
}

impl Drop for ResolutionFrame {
    fn drop(&mut self) {
        pop_frame();
    }
}

/// Pop the innermost frame and report its stamps to the enclosing one.
fn pop_frame() -> Vec<RegistryStamp> {
    let stamps = RESOLUTIONS.with(|frames| frames.borrow_mut().pop().unwrap_or_default());
    for stamp in &stamps {
        record_resolution(stamp.clone());
    }
    stamps
}

/// Run `f`, collecting a stamp for every late-bound registry entry it
/// resolves on this thread. Nested calls also report to the enclosing one.
pub fn track_resolutions<T>(f: impl FnOnce() -> T) -> (T, Vec<RegistryStamp>) {
    let frame = ResolutionFrame::push();
    let value = f();
    (value, frame.take())
}
