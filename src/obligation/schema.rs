//! Object decoding rules shared by every record type
//!
//! Records are written by a JSON encoder that matches object keys without
//! regard to ASCII case and treats an explicit `null` as "leave the zero
//! value". `schema_struct!` generates a serde `Deserialize` that follows the
//! same rules so a value the writer can read back is never classified
//! corrupt:
//!
//! - keys match their field name case-insensitively
//! - a repeated key overwrites the earlier value
//! - unknown keys are skipped
//! - `null` for a field yields that field's zero value, unless the field
//!   type has no zero form (hashes, unlock hashes)
//!
//! Structs declared `required` reject missing fields. Structs declared
//! `defaulted` fill them with zero values and also accept `null` for the
//! whole object.

use serde::de::{self, Deserialize, Deserializer};

/// Zero value produced by an explicit `null`, if the type has one.
pub(crate) trait NullValue: Sized {
    fn null_value() -> Option<Self>;
}

macro_rules! null_as_default {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NullValue for $ty {
                fn null_value() -> Option<Self> {
                    Some(Self::default())
                }
            }
        )*
    };
}

null_as_default!(bool, u64);

impl<T> NullValue for Vec<T> {
    fn null_value() -> Option<Self> {
        Some(Vec::new())
    }
}

/// Field wrapper applying the `null` rule before the inner type sees the value.
pub(crate) struct Nullable<T>(pub T);

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: Deserialize<'de> + NullValue,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<T>::deserialize(deserializer)? {
            Some(value) => Ok(Nullable(value)),
            None => T::null_value()
                .map(Nullable)
                .ok_or_else(|| de::Error::invalid_type(de::Unexpected::Unit, &"a non-null value")),
        }
    }
}

fn fold(c: char) -> char {
    match c {
        // Non-ASCII characters whose simple case fold lands on ASCII.
        '\u{212A}' => 'k',
        '\u{017F}' => 's',
        other => other.to_ascii_lowercase(),
    }
}

/// Returns whether an object key names the given field.
pub(crate) fn key_matches(key: &str, field: &str) -> bool {
    key == field || key.chars().map(fold).eq(field.chars().map(fold))
}

macro_rules! take_field {
    (required, $slot:ident, $key:literal) => {
        match $slot {
            Some(value) => value,
            None => return Err(de::Error::missing_field($key)),
        }
    };
    (defaulted, $slot:ident, $key:literal) => {
        $slot.unwrap_or_default()
    };
}

macro_rules! null_object {
    (required, $name:ident) => {
        None
    };
    (defaulted, $name:ident) => {
        Some($name::default())
    };
}

/// Declares a record struct with its JSON keys and decoding rules.
macro_rules! schema_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident ($presence:ident) {
            $(
                $(#[$field_meta:meta])*
                $key:literal => pub $field:ident : $ty:ty,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(serde::Serialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(rename = $key)]
                pub $field: $ty,
            )+
        }

        impl $crate::obligation::schema::NullValue for $name {
            fn null_value() -> Option<Self> {
                null_object!($presence, $name)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                use serde::de::{self, MapAccess, Visitor};
                use $crate::obligation::schema::{key_matches, NullValue, Nullable};

                struct FieldsVisitor;

                impl<'de> Visitor<'de> for FieldsVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        f.write_str(concat!("a ", stringify!($name), " object"))
                    }

                    fn visit_unit<E: de::Error>(self) -> Result<$name, E> {
                        <$name as NullValue>::null_value()
                            .ok_or_else(|| de::Error::invalid_type(de::Unexpected::Unit, &self))
                    }

                    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<$name, A::Error> {
                        $( let mut $field: Option<$ty> = None; )+
                        while let Some(key) = map.next_key::<String>()? {
                            $(
                                if key_matches(&key, $key) {
                                    $field = Some(map.next_value::<Nullable<$ty>>()?.0);
                                    continue;
                                }
                            )+
                            map.next_value::<de::IgnoredAny>()?;
                        }
                        Ok($name {
                            $( $field: take_field!($presence, $field, $key), )+
                        })
                    }
                }

                deserializer.deserialize_any(FieldsVisitor)
            }
        }
    };
}
