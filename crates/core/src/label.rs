//! Closed sets of lowercase string labels (statuses, platforms, priorities).

/// Declare a `Copy` enum that round-trips through a fixed lowercase label.
///
/// Generates `as_str`, `ALL`, `Display`, serde (de)serialization by label and a
/// `FromStr` that reports the accepted labels in a [`crate::DomainError::Validation`].
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($what:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $(if wanted == $text {
                    return Ok($name::$variant);
                })+
                Err($crate::DomainError::validation(format!(
                    "Invalid {}: must be one of {}",
                    $what,
                    [$($text),+].join(", ")
                )))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::string_enum! {
        enum Colour("colour") {
            Red => "red",
            DarkBlue => "dark_blue",
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" RED ".parse::<Colour>().unwrap(), Colour::Red);
        assert_eq!("dark_blue".parse::<Colour>().unwrap(), Colour::DarkBlue);
    }

    #[test]
    fn lists_accepted_labels_on_error() {
        let err = "green".parse::<Colour>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid colour: must be one of red, dark_blue");
    }

    #[test]
    fn serde_uses_labels() {
        assert_eq!(serde_json::to_value(Colour::DarkBlue).unwrap(), "dark_blue");
        let c: Colour = serde_json::from_value(serde_json::json!("red")).unwrap();
        assert_eq!(c, Colour::Red);
        assert_eq!(Colour::ALL.len(), 2);
    }
}
