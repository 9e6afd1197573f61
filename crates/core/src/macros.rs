// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.

/// Bind each unit variant of an enum to its stable wire name.
///
/// The wire name is what events, config files, and log lines show for the
/// variant, so it is generated once as a `const fn` and `Display` delegates
/// to it. Keep the names in sync with the enum's serde renames.
///
/// ```ignore
/// crate::wire_names! {
///     UpdateMethod {
///         Automatic => "AUTOMATIC",
///         NoUpdate => "NO_UPDATE",
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_names {
    ($enum:ident { $( $variant:ident => $name:literal ),+ $(,)? }) => {
        impl $enum {
            /// Stable name carried in events, config, and log lines.
            pub const fn wire_name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }
        }

        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.wire_name())
            }
        }
    };
}
