use crate::*;

mod wide_uint;

pub use wide_uint::WideUint;
