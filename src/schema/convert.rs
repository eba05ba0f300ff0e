use std::collections::BTreeMap;

/// Field-for-field conversion of a released shape into the identically
/// shaped type of the next schema version.
pub trait IntoNext<T> {
    fn into_next(self) -> T;
}

macro_rules! identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoNext<$ty> for $ty {
                fn into_next(self) -> $ty {
                    self
                }
            }
        )*
    };
}

identity!(String, bool, i64, u32, u16, serde_json::Value, serde_yaml::Value);

impl<A: IntoNext<B>, B> IntoNext<Option<B>> for Option<A> {
    fn into_next(self) -> Option<B> {
        self.map(IntoNext::into_next)
    }
}

impl<A: IntoNext<B>, B> IntoNext<Vec<B>> for Vec<A> {
    fn into_next(self) -> Vec<B> {
        self.into_iter().map(IntoNext::into_next).collect()
    }
}

impl<K: Ord, A: IntoNext<B>, B> IntoNext<BTreeMap<K, B>> for BTreeMap<K, A> {
    fn into_next(self) -> BTreeMap<K, B> {
        self.into_iter().map(|(k, v)| (k, v.into_next())).collect()
    }
}

/// Mapping table for types whose shape did not change in a transition.
///
/// Both sides are destructured exhaustively, so a field added to or removed
/// from either version fails to compile until the table is updated.
macro_rules! carry_over {
    ($next:ident => $( $ty:ident { $($field:ident),* $(,)? } ),+ $(,)?) => {
        $(
            impl $crate::schema::IntoNext<$next::$ty> for $ty {
                fn into_next(self) -> $next::$ty {
                    let $ty { $($field),* } = self;
                    $next::$ty {
                        $( $field: $crate::schema::IntoNext::into_next($field), )*
                    }
                }
            }
        )+
    };
}
