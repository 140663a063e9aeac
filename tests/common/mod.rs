#![allow(dead_code)]

pub use mergewatch_test_utils::{init_tracing, with_timeout};
