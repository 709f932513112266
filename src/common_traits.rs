//! Utility traits such as [Verify], [Named] etc.

use crate::{context::Context, result::Result};

/// Share self, by incrementing reference count.
pub trait RcShare {
    fn share(&self) -> Self;
}

/// Check and ensure correctness.
pub trait Verify {
    fn verify(&self, ctx: &Context) -> Result<()>;
}

/// Anything that has a name.
pub trait Named {
    fn get_name(&self, ctx: &Context) -> String;
}
