//! Declaration macros for vocabularies and structured models.

/// Declares a closed vocabulary enum.
///
/// ```
/// wirebind::wire_enum! {
///     pub enum Distribution as "Distribution" {
///         Uniform => "UNIFORM",
///         Weighted => "WEIGHTED",
///     }
/// }
///
/// use wirebind::WireEnum;
/// assert_eq!(Distribution::from_wire("UNIFORM"), Ok(Distribution::Uniform));
/// assert_eq!(Distribution::Weighted.to_string(), "WEIGHTED");
/// ```
///
/// The enum derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq` and `Hash`, and
/// gets `WireEnum`, `Display`, `FromStr` and `ToValue` impls.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $type_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),*
        }

        impl $crate::WireEnum for $name {
            const VOCABULARY: $crate::Vocabulary<Self> =
                $crate::Vocabulary::new($type_name, &[ $( ($wire, $name::$variant) ),* ]);

            fn to_wire(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),*
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::WireEnum::to_wire(*self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::UnknownVariantError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                <Self as $crate::WireEnum>::from_wire(s)
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(&self) -> ::std::option::Option<$crate::Value<'_>> {
                ::std::option::Option::Some($crate::Value::Enum($crate::WireEnum::to_wire(*self)))
            }
        }
    };
}

/// Binds the fields of a struct to wire locations, in order.
///
/// ```
/// use wirebind::{Binding, Location};
///
/// pub struct DescribeDomain {
///     pub name: Option<String>,
/// }
///
/// wirebind::structured!(DescribeDomain as "DescribeDomainInput" {
///     name => Binding::scalar("name", Location::PayloadField),
/// });
/// ```
///
/// Every listed field must implement `ToValue`. The binding table becomes the
/// type's `StaticShape::SHAPE`; an illegal binding, or a table that fails
/// [`Shape::validate`](crate::Shape::validate), fails constant evaluation:
///
/// ```compile_fail
/// use wirebind::{Binding, Location};
///
/// pub struct Upload {
///     pub body: Option<String>,
///     pub extra: Option<String>,
/// }
///
/// wirebind::structured!(Upload as "Upload" {
///     body => Binding::scalar("body", Location::PayloadRoot),
///     extra => Binding::scalar("extra", Location::PayloadField),
/// });
/// ```
#[macro_export]
macro_rules! structured {
    ($ty:ty as $name:literal { $( $field:ident => $binding:expr ),* $(,)? }) => {
        impl $ty {
            #[doc(hidden)]
            pub const WIRE_FIELDS: &'static [$crate::Binding] = &[ $( $binding ),* ];
        }

        impl $crate::StaticShape for $ty {
            const SHAPE: &'static $crate::Shape = &$crate::Shape::new($name, <$ty>::WIRE_FIELDS);
        }

        const _: () = match <$ty as $crate::StaticShape>::SHAPE.validate() {
            ::std::result::Result::Ok(()) => (),
            ::std::result::Result::Err(_) => {
                panic!(concat!("binding table of ", $name, " binds a wire name twice or conflicts with its payload root"))
            }
        };

        impl $crate::Structured for $ty {
            fn shape(&self) -> &'static $crate::Shape {
                <Self as $crate::StaticShape>::SHAPE
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field(&self, index: usize) -> ::std::option::Option<$crate::Value<'_>> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return $crate::ToValue::to_value(&self.$field);
                    }
                    position += 1;
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::ToValue for $ty {
            fn to_value(&self) -> ::std::option::Option<$crate::Value<'_>> {
                ::std::option::Option::Some($crate::Value::Structured(self))
            }
        }
    };
}
