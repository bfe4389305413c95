//! Circuit design domain module.
//!
//! # Module Structure
//!
//! - `schema`: the design document model (`CircuitDesign`, `Block`, `Port`, ...)
//!   and the signal-type vocabulary
//! - `extract`: pulls a candidate JSON document out of free-form text
//! - `validate`: structural and referential checks over an untyped document
//! - `layout`: deterministic 2-D placement for blocks without a position
//!
//! Everything here is pure and stateless, so it can be shared freely across
//! sessions and threads.

mod extract;
mod layout;
mod schema;
mod validate;

pub use extract::{ExtractionError, RawDocument, extract};
pub use layout::{BlockCategory, assign_positions, classify, relayout};
pub use schema::{
    Alternative, Block, CircuitDesign, CircuitInfo, Port, Position, SignalFlow, SignalType,
};
pub use validate::{ValidationResult, validate};
