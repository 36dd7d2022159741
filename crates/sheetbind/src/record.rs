//! Record types: the property table behind `populate` and `convert_to`
//!
//! A [`Record`] lists its properties as [`FieldDef`]s and reads or writes them
//! by name. The [`record!`](crate::record!) macro implements the trait for a
//! plain struct:
//!
//! ```rust
//! use sheetbind::record;
//!
//! #[derive(Debug, Default)]
//! struct Employee {
//!     name: String,
//!     age: u32,
//!     salary: Option<f64>,
//!     internal_id: u64,
//! }
//!
//! record!(Employee {
//!     name: String => "Full Name",
//!     age: u32,
//!     salary: Option<f64>,
//!     #[not_mapped]
//!     internal_id: u64,
//! });
//! ```

use crate::value::{FieldKind, FieldType, FieldValue};

/// Description of one record property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Property name, as written in the struct
    pub name: &'static str,
    /// Declared type
    pub kind: FieldKind,
    /// Header text preferred over the property name when reading
    pub display_name: Option<&'static str>,
    /// `false` excludes the property from header-based reads
    pub mapped: bool,
    /// Whether the property is an `Option`
    pub nullable: bool,
}

impl FieldDef {
    /// Create a mapped, non-nullable field
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            display_name: None,
            mapped: true,
            nullable: false,
        }
    }

    /// Create a field definition from the property's Rust type
    pub fn of<T: FieldType>(name: &'static str) -> Self {
        Self {
            nullable: T::NULLABLE,
            ..Self::new(name, T::KIND)
        }
    }

    /// Set the display name
    pub fn display(mut self, display_name: &'static str) -> Self {
        self.display_name = Some(display_name);
        self
    }

    /// Exclude the field from header-based reads
    pub fn not_mapped(mut self) -> Self {
        self.mapped = false;
        self
    }

    /// Names a header may carry for this field, most specific first
    pub fn header_names(&self) -> impl Iterator<Item = &'static str> {
        self.display_name.into_iter().chain(std::iter::once(self.name))
    }
}

/// A struct whose properties can be written to and read from worksheet rows
pub trait Record: Default {
    /// Name used in error messages
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The property table, in declaration order
    fn fields() -> Vec<FieldDef>;

    /// Read a property, `None` if there is no property with that name
    fn get_field(&self, name: &str) -> Option<FieldValue>;

    /// Write a property; `false` if the name is unknown or the value does not fit
    fn set_field(&mut self, name: &str, value: FieldValue) -> bool;
}

/// Find a field by exact name, then by case-insensitive name
pub(crate) fn find_field<'f>(fields: &'f [FieldDef], name: &str) -> Option<&'f FieldDef> {
    fields
        .iter()
        .find(|f| f.name == name)
        .or_else(|| fields.iter().find(|f| eq_ignore_case(f.name, name)))
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Implement [`Record`] for a struct with named fields.
///
/// Each entry is `field: Type`, optionally followed by `=> "Display Name"`.
/// Prefix an entry with `#[not_mapped]` to leave it out of header-based reads.
/// Every listed type must implement [`FieldType`].
#[macro_export]
macro_rules! record {
    (
        $name:ident {
            $( $(#[$flag:ident])* $field:ident : $fty:ty $(=> $display:literal)? ),* $(,)?
        }
    ) => {
        impl $crate::Record for $name {
            fn type_name() -> &'static str {
                stringify!($name)
            }

            fn fields() -> ::std::vec::Vec<$crate::FieldDef> {
                ::std::vec![
                    $(
                        $crate::FieldDef::of::<$fty>(stringify!($field))
                            $( .display($display) )?
                            $( .$flag() )*
                    ),*
                ]
            }

            fn get_field(&self, name: &str) -> ::std::option::Option<$crate::FieldValue> {
                match name {
                    $(
                        stringify!($field) => ::std::option::Option::Some(
                            $crate::FieldType::to_field_value(&self.$field),
                        ),
                    )*
                    _ => ::std::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(&mut self, name: &str, value: $crate::FieldValue) -> bool {
                match name {
                    $(
                        stringify!($field) => {
                            match <$fty as $crate::FieldType>::from_field_value(value) {
                                ::std::option::Option::Some(v) => {
                                    self.$field = v;
                                    true
                                }
                                ::std::option::Option::None => false,
                            }
                        }
                    )*
                    _ => false,
                }
            }
        }
    };
}
