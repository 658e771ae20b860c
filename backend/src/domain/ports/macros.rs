//! Declarative builder for port error enums.
//!
//! Each variant carries its display message and may name the domain error it
//! surfaces as: `as unavailable` for outages a client can retry later, and
//! `as internal` for failures that are redacted before leaving the server.
//! Variants without a mapping need context only the calling service has
//! (which content was missing, which email clashed) and report `None` from
//! [`PortFailure::as_domain_error`](crate::domain::ports::PortFailure).
//!
//! Every variant also gets a snake_case constructor taking `impl Into<_>`
//! for each field, so adapters can write
//! `ReportRepositoryError::query(err.to_string())`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),+ }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                Self::$variant { $($field: $field.into()),+ }
            }
        }
    };

    (@surface unavailable, $message:expr) => {
        $crate::domain::Error::service_unavailable($message)
    };

    (@surface internal, $message:expr) => {
        $crate::domain::Error::internal($message)
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),+ $(,)? } )?
                    => $message:literal $(as $surface:ident)?
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),+ } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),+ } )?);
            )*
        }

        impl $crate::domain::ports::PortFailure for $name {
            #[allow(unreachable_patterns, clippy::match_single_binding)]
            fn as_domain_error(&self) -> Option<$crate::domain::Error> {
                match self {
                    $($(
                        Self::$variant { .. } => {
                            Some(define_port_error!(@surface $surface, self.to_string()))
                        }
                    )?)*
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use define_port_error;
