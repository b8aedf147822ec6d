//! Object factories for domain objects
//!
//! A [`Builder`] produces a fully initialised object on every call. Builders
//! hold configured field values only, so building twice yields two equal but
//! independent objects. Builders compose: a company builder embeds the output
//! of its employee builders.

pub mod company_builder;
pub mod employee_builder;

pub use company_builder::CompanyBuilder;
pub use employee_builder::EmployeeBuilder;

use crate::errors::ExError;

/// Factory producing a `T` on demand
pub trait Builder<T> {
    /// Build a new instance
    ///
    /// Pure builders never fail; decorating builders that touch storage
    /// surface the storage error here.
    fn build(&self) -> Result<T, ExError>;

    /// Label naming the built type in reports (`CompanyBuilder` -> `Company`)
    fn label(&self) -> String {
        type_label(std::any::type_name::<Self>())
    }
}

impl<T, B: Builder<T> + ?Sized> Builder<T> for Box<B> {
    fn build(&self) -> Result<T, ExError> {
        (**self).build()
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

impl<T, B: Builder<T> + ?Sized> Builder<T> for &B {
    fn build(&self) -> Result<T, ExError> {
        (**self).build()
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

/// Derive a report label from a builder's type name
///
/// Drops the module path, any generic arguments and a trailing `Builder`.
pub fn type_label(type_name: &str) -> String {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    let simple = without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics);
    match simple.strip_suffix("Builder") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => simple.to_string(),
    }
}

/// Builder backed by a closure, labelled explicitly
pub struct FnBuilder<F> {
    label: String,
    build: F,
}

/// Wrap a closure as a [`Builder`]
pub fn builder_fn<T, F>(label: impl Into<String>, build: F) -> FnBuilder<F>
where
    F: Fn() -> Result<T, ExError>,
{
    FnBuilder {
        label: label.into(),
        build,
    }
}

impl<T, F> Builder<T> for FnBuilder<F>
where
    F: Fn() -> Result<T, ExError>,
{
    fn build(&self) -> Result<T, ExError> {
        (self.build)()
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}
