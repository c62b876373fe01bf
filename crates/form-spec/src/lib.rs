#![allow(missing_docs)]

pub mod compile;
pub mod condition;
pub mod exclusive;
pub mod export;
pub mod render;
pub mod spec;
pub mod validate;

pub use compile::{CompileError, compile, map_field};
pub use condition::{
    ConditionOperator, ConditionValue, Conditional, ConditionalLogic, GroupOperator,
    MultipleConditions, compile_condition, compile_conditional,
};
pub use exclusive::{
    ExclusiveGroup, GroupState, NONE_SELECTED_CLASS, PresentationEffect, ValueChange,
    managed_groups, none_token,
};
pub use export::{
    DocOptions, DocumentRenderer, ExportOutcome, FlattenError, Margins, PrintableRow, RenderError,
    artifact_filename, export_artifact, export_blank_form, flattened_schema, printable_rows,
    sanitize_schema,
};
pub use render::{RenderChoice, RenderElement, RenderPage, RenderSchema, RenderValidator};
pub use spec::{
    AbstractField, AbstractForm, AbstractSection, FieldOption, FieldWidth, FormEnvelope, FormTheme,
};
pub use validate::{ParseError, ShapeError, check_shape, is_valid_form, parse_form};
