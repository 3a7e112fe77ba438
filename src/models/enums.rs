use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

use super::record::FieldValue;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(FieldType {
    Date => "date",
    Number => "number",
    Text => "text",
    Textarea => "textarea",
});

impl FieldType {
    /// Value backfilled into rows that predate the field.
    pub fn zero_value(&self) -> FieldValue {
        match self {
            FieldType::Number => FieldValue::Integer(0),
            FieldType::Date | FieldType::Text | FieldType::Textarea => {
                FieldValue::Text(String::new())
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number)
    }
}

str_enum!(NoticeLevel {
    Success => "success",
    Warning => "warning",
    Danger => "danger",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn field_type_round_trips_through_str() {
        for t in [FieldType::Date, FieldType::Number, FieldType::Text, FieldType::Textarea] {
            assert_eq!(FieldType::from_str(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        let err = FieldType::from_str("checkbox").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn field_type_serializes_lowercase() {
        let json = serde_json::to_string(&FieldType::Textarea).unwrap();
        assert_eq!(json, "\"textarea\"");
        let parsed: FieldType = serde_json::from_str("\"number\"").unwrap();
        assert_eq!(parsed, FieldType::Number);
    }

    #[test]
    fn zero_values_follow_type() {
        assert_eq!(FieldType::Number.zero_value(), FieldValue::Integer(0));
        assert_eq!(FieldType::Date.zero_value(), FieldValue::Text(String::new()));
        assert_eq!(FieldType::Textarea.zero_value(), FieldValue::Text(String::new()));
    }
}
