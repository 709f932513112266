//! [Context] and [Ptr] together provide memory management for the IR.

use crate::{
    basic_block::BasicBlock,
    common_traits::Verify,
    function::Function,
    operation::Operation,
    printable::{self, Printable},
    result::Result,
};
use slotmap::{DefaultKey, SlotMap};
use std::{
    any::TypeId,
    cell::{Ref, RefCell, RefMut},
    hash::Hash,
    marker::PhantomData,
};

pub type ArenaCell<T> = SlotMap<DefaultKey, RefCell<T>>;
pub type ArenaIndex = DefaultKey;

/// A context stores all IR data of this compilation session.
#[derive(Default)]
pub struct Context {
    /// Allocation pool for [Function]s.
    pub functions: ArenaCell<Function>,
    /// Allocation pool for [BasicBlock]s.
    pub basic_blocks: ArenaCell<BasicBlock>,
    /// Allocation pool for [Operation]s.
    pub operations: ArenaCell<Operation>,
}

impl Context {
    pub fn new() -> Context {
        Self::default()
    }
}

pub(crate) mod private {
    use std::{cell::RefCell, marker::PhantomData};

    use super::{ArenaCell, ArenaIndex, Context, Ptr};

    /// An IR object owned by Context
    pub trait ArenaObj
    where
        Self: Sized,
    {
        /// Get the arena that has allocated this object.
        fn get_arena(ctx: &Context) -> &ArenaCell<Self>;
        /// Get the arena that has allocated this object.
        fn get_arena_mut(ctx: &mut Context) -> &mut ArenaCell<Self>;
        /// If this object contains any ArenaObj itself, it must dealloc()
        /// all of those sub-objects. This is called when self is deallocated.
        fn dealloc_sub_objects(ptr: Ptr<Self>, ctx: &mut Context);

        /// Allocates object on the arena, given a creator function.
        fn alloc<T: FnOnce(Ptr<Self>) -> Self>(ctx: &mut Context, f: T) -> Ptr<Self> {
            let creator = |idx: ArenaIndex| {
                RefCell::new(f(Ptr::<Self> {
                    idx,
                    _dummy: PhantomData::<Self>,
                }))
            };
            Ptr::<Self> {
                idx: Self::get_arena_mut(ctx).insert_with_key(creator),
                _dummy: PhantomData,
            }
        }

        /// Deallocates this object from the arena.
        fn dealloc(ptr: Ptr<Self>, ctx: &mut Context) {
            Self::dealloc_sub_objects(ptr, ctx);
            Self::get_arena_mut(ctx).remove(ptr.idx);
        }
    }
}

use private::ArenaObj;

/// Pointer to an IR Object owned by Context.
#[derive(Debug)]
pub struct Ptr<T: ArenaObj> {
    pub(crate) idx: ArenaIndex,
    pub(crate) _dummy: PhantomData<T>,
}

impl<'a, T: ArenaObj> Ptr<T> {
    /// Return a [Ref] to the pointee.
    /// This borrows from a RefCell and the borrow is live
    /// as long as the returned Ref lives.
    pub fn deref(&self, ctx: &'a Context) -> Ref<'a, T> {
        T::get_arena(ctx)[self.idx].borrow()
    }

    /// Return a RefMut to the pointee.
    /// This mutably borrows from a RefCell and the borrow is live
    /// as long as the returned RefMut lives.
    pub fn deref_mut(&self, ctx: &'a Context) -> RefMut<'a, T> {
        T::get_arena(ctx)[self.idx].borrow_mut()
    }

    /// Is the pointee still allocated?
    pub fn is_live(&self, ctx: &Context) -> bool {
        T::get_arena(ctx).contains_key(self.idx)
    }
}

impl<T: ArenaObj> Clone for Ptr<T> {
    fn clone(&self) -> Ptr<T> {
        *self
    }
}

impl<T: ArenaObj> Copy for Ptr<T> {}

impl<T: ArenaObj> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl<T: ArenaObj> Eq for Ptr<T> {}

impl<T: ArenaObj + 'static> Hash for Ptr<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        TypeId::of::<T>().hash(state);
        self.idx.hash(state);
    }
}

impl<T: ArenaObj + Printable> Printable for Ptr<T> {
    fn fmt(
        &self,
        ctx: &Context,
        state: &printable::State,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        self.deref(ctx).fmt(ctx, state, f)
    }
}

impl<T: ArenaObj + Verify> Verify for Ptr<T> {
    fn verify(&self, ctx: &Context) -> Result<()> {
        self.deref(ctx).verify(ctx)
    }
}
