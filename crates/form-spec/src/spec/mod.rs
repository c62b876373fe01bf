pub mod field;
pub mod form;

pub use field::{AbstractField, FieldOption, FieldWidth};
pub use form::{AbstractForm, AbstractSection, FormEnvelope, FormTheme};
