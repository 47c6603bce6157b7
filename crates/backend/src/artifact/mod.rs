//! Artifacts exchanged with the compiler and the debugger front-end.

mod compilation;
mod debug;
mod micheline;

pub use compilation::{ArgDecl, DebugData, DeclRange, EntrypointDecl, FieldDecl, Interface};
pub use debug::{ArchetypeTrace, StackItemValue, Step};
pub use micheline::{Bound, DebugAnnotation, DeclBound, Micheline, Position, Prim, SourceRange, StackName};
