//! Test support.


pub(crate) use context::TestContext;
