/// Declares a wire-coded enum with a fallback `Unknown(T)` variant. Encoding
/// and decoding round-trip every known value plus any unrecognised one,
/// matching the "tolerate unknown tags, preserve framing" rule the wire
/// protocol depends on (spec.md §9).
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$outer:meta])*
        $vis:vis enum $name:ident: $T:ty {
            $(
                $(#[$inner:ident $($args:tt)*])*
                $value_name:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        $vis enum $name {
            $(
                $(#[$inner $($args)*])*
                $value_name,
            )*
            Unknown($T)
        }

        impl From<$T> for $name {
            fn from(value: $T) -> Self {
                match value {
                    $(
                        $value => Self::$value_name,
                    )*
                    other => Self::Unknown(other)
                }
            }
        }

        impl From<$name> for $T {
            fn from(value: $name) -> Self {
                match value {
                    $(
                        $name::$value_name => $value,
                    )*
                    $name::Unknown(other) => other
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$value_name => write!(formatter, stringify!($value_name)),
                    )*
                    Self::Unknown(value) => write!(formatter, "Unknown({value})"),
                }
            }
        }
    };
}
