use thiserror::Error;

/// More than one alternative of a mutually exclusive group was populated.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{group}: only one of [{}] may be set, found [{}]", .choices.join(", "), .found.join(", "))]
pub struct OneOfError {
    pub group: &'static str,
    pub choices: &'static [&'static str],
    pub found: Vec<&'static str>,
}

/// Declares a oneOf group as an enum plus its document form.
///
/// In a document every alternative is an optional sibling key. The generated
/// `$slots` struct mirrors that shape (one `Option` per alternative, unknown
/// keys rejected) and `from_slots`/`into_slots` convert between the two.
/// `deserialize_slot`/`serialize_slot` are meant for `#[serde(with)]`-style
/// use on an `Option<$name>` field whose group sits under its own key.
macro_rules! one_of {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $slots:ident {
            $( $(#[$vmeta:meta])* $key:literal => $field:ident: $variant:ident($ty:ty), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant($ty), )+
        }

        #[derive(Debug, Default, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $slots {
            $(
                #[serde(rename = $key, default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )+
        }

        impl $name {
            pub const KEYS: &'static [&'static str] = &[$($key),+];

            /// Document key of the selected alternative.
            pub fn key(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $key, )+
                }
            }

            pub fn from_slots(slots: $slots) -> Result<Option<Self>, $crate::schema::OneOfError> {
                let mut chosen = None;
                let mut found = Vec::new();
                $(
                    if let Some(value) = slots.$field {
                        found.push($key);
                        chosen = Some(Self::$variant(value));
                    }
                )+
                if found.len() > 1 {
                    return Err($crate::schema::OneOfError {
                        group: stringify!($name),
                        choices: Self::KEYS,
                        found,
                    });
                }
                Ok(chosen)
            }

            pub fn into_slots(value: Option<Self>) -> $slots {
                let mut slots = $slots::default();
                match value {
                    $( Some(Self::$variant(inner)) => slots.$field = Some(inner), )+
                    None => {}
                }
                slots
            }

            pub fn deserialize_slot<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let slots: Option<$slots> = ::serde::Deserialize::deserialize(deserializer)?;
                Self::from_slots(slots.unwrap_or_default()).map_err(::serde::de::Error::custom)
            }

            pub fn serialize_slot<S>(value: &Option<Self>, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                ::serde::Serialize::serialize(&Self::into_slots(value.clone()), serializer)
            }
        }
    };
}
