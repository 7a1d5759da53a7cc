//! Dialect hooks used by the compiler.

/// Target-specific rendering of identifiers and placeholders.
pub trait Dialect {
    /// Character written on both sides of an identifier.
    ///
    /// Embedded occurrences are not escaped; builders must not produce them.
    fn identifier_wrapper(&self) -> char {
        '"'
    }

    /// Placeholder text for the binding at zero-based `index`.
    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }
}

/// Double-quoted identifiers and zero-based `$n` placeholders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultDialect;

impl Dialect for DefaultDialect {}

impl<D: Dialect + ?Sized> Dialect for &D {
    fn identifier_wrapper(&self) -> char {
        (**self).identifier_wrapper()
    }

    fn placeholder(&self, index: usize) -> String {
        (**self).placeholder(index)
    }
}
