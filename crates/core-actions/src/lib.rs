//! Editing actions layered over `core-state`.
//!
//! * `text_object`   - `iw`, `a"`, `i(` ... range resolution
//! * `span_resolver` - motion targets and the spans operators act on
//! * `operator`      - pending-operator state and operator application
//! * `dispatcher`    - per-mode keystroke handling
//! * `editor`        - `Editor`, the single owning session facade

pub mod dispatcher;
pub mod editor;
pub mod operator;
pub mod span_resolver;
pub mod text_object;

pub use dispatcher::{DispatchResult, ModeChange, ModeState, handle_key};
pub use editor::{Editor, StatusFacts};
pub use operator::{OperatorEngine, OperatorKind, OperatorOutcome};
pub use span_resolver::{MotionKind, Span, SpanKind};
pub use text_object::{ObjectScope, TextRange};
