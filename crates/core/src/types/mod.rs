//! Built-in container and value-support types (§3).
//!
//! Split from the teacher's single monolithic `types/` directory into one file per
//! family: `containers` (dict/set/range/deque), `date` (date/duration/stopwatch),
//! `iterator` (the iterator protocol and combinators).

pub mod bignum;
pub mod containers;
pub mod date;
pub mod iterator;
