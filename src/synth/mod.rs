// Purpose: Per-note envelope generators, the partial and the partial pool
// This layer sits above the dsp primitives and drives them from note state

pub mod context;
pub mod partial;
pub mod pool;
pub mod tva;
pub mod tvf;
pub mod tvp;

pub use context::{HeldNote, NoteContext, Part, Poly, StaticPart};
pub use partial::{Generator, MixType, Partial, StructurePosition};
pub use pool::PartialPool;
pub use tva::{Tva, TvaPhase};
pub use tvf::{Tvf, TvfSegment};
pub use tvp::{Tvp, TvpPhase};
