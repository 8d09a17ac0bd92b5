/// Configuration macros for zero-repetition config definitions
///
/// `config_struct!` defines a configuration struct together with its
/// defaults. It generates the struct with public fields, a `Default` impl
/// built from the embedded values, serde support with `#[serde(default)]`
/// (a partial TOML section only overrides the keys it names) and a `FIELDS`
/// list used to flag unknown keys at load time.
///
/// ```ignore
/// config_struct! {
///     pub struct CacheTierConfig {
///         ttl_secs: u64 = 60,
///         capacity: usize = 16,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl $name {
            /// Keys accepted in this section
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field_name)),*];
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
