/// 生成以小写字符串存储的枚举
///
/// 自动生成：
/// - `as_str()` / `ALL`
/// - `Display` / `FromStr`
/// - 以字符串形式的 `Serialize` / `Deserialize`（非法值给出可读的错误信息）
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($label:literal) {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!(
                        "Invalid {} '{}', expected one of: {}",
                        $label,
                        s,
                        [$($value),+].join(", ")
                    )),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::string_enum! {
        enum Color("color") {
            Red => "red",
            DarkBlue => "dark_blue",
        }
    }

    #[test]
    fn test_round_trip_and_error() {
        assert_eq!("dark_blue".parse::<Color>(), Ok(Color::DarkBlue));
        assert_eq!(Color::Red.to_string(), "red");
        assert_eq!(Color::ALL.len(), 2);

        let err = "green".parse::<Color>().unwrap_err();
        assert_eq!(err, "Invalid color 'green', expected one of: red, dark_blue");

        let parsed: Color = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(parsed, Color::Red);
        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }
}
