/// Builds a [`Value`](crate::Value) from a literal-like syntax.
///
/// Lists use `[...]`, maps use `{ key => value, ... }` with any value as a key, and
/// `null`, `true` and `false` are constants. Anything else is converted through
/// [`ToValue`](crate::ToValue); a conversion failure yields `Value::Null`.
///
/// ```rust
/// use sigma::{sigma, to_string};
///
/// let value = sigma!({ "name" => "Alice", "tags" => ["a", "b"], 1 => null });
/// assert_eq!(to_string(&value).unwrap(), r#"{"name"="Alice","tags"=["a","b"],1=&n}"#);
/// ```
#[macro_export]
macro_rules! sigma {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::List(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(vec![$($crate::sigma!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::SigmaMap::new())
    };

    ({ $($key:tt => $value:tt),* $(,)? }) => {{
        let mut map = $crate::SigmaMap::new();
        $(
            map.insert($crate::sigma!($key), $crate::sigma!($value));
        )*
        $crate::Value::Map(map)
    }};

    ($other:expr) => {
        $crate::ToValue::to_value(&$other).unwrap_or($crate::Value::Null)
    };
}

/// Implements [`Record`](crate::Record), [`Coerce`](crate::Coerce) and
/// [`ToValue`](crate::ToValue) for a struct with named fields.
///
/// Each listed field is read-write and must implement both `ToValue` and `Coerce`.
/// `field as "name"` changes the name used on the wire. Entries in the optional
/// `readonly` block are computed from the whole record; they are never written and
/// assigning them while reading is an error.
///
/// ```rust
/// use sigma::{sigma_record, Types, Value};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Rect {
///     width: u32,
///     height: u32,
///     label: Option<String>,
/// }
///
/// sigma_record!(Rect {
///     width as "w",
///     height as "h",
///     label,
/// } readonly {
///     "area" => |r| Ok(Value::from(r.width * r.height)),
/// });
///
/// Types::register::<Rect>("rect").unwrap();
/// let rect = Rect { width: 2, height: 3, label: None };
/// assert_eq!(sigma::to_string(&rect).unwrap(), "rect{w=2,h=3,label=&n}");
/// ```
#[macro_export]
macro_rules! sigma_record {
    (@name $field:ident) => {
        stringify!($field)
    };

    (@name $field:ident $name:literal) => {
        $name
    };

    (
        $ty:ident {
            $($field:ident $(as $name:literal)?),* $(,)?
        }
        $(readonly {
            $($ro_name:literal => $getter:expr),* $(,)?
        })?
    ) => {
        impl $crate::Record for $ty {
            fn fields() -> ::std::vec::Vec<$crate::Field<Self>> {
                vec![
                    $(
                        $crate::Field::<Self>::new(
                            $crate::sigma_record!(@name $field $($name)?),
                            |r| $crate::ToValue::to_value(&r.$field),
                            |r, v| {
                                r.$field = $crate::coerce(v)?;
                                Ok(())
                            },
                        ),
                    )*
                    $($(
                        $crate::Field::<Self>::read_only($ro_name, $getter),
                    )*)?
                ]
            }
        }

        impl $crate::Coerce for $ty {
            fn coerce(value: $crate::Value) -> $crate::Result<Self> {
                $crate::record::record_from_value(value)
            }
        }

        impl $crate::ToValue for $ty {
            fn to_value(&self) -> $crate::Result<$crate::Value> {
                $crate::record::record_to_value(self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Number, Record, SigmaMap, Value};

    #[test]
    fn test_sigma_macro_primitives() {
        assert_eq!(sigma!(null), Value::Null);
        assert_eq!(sigma!(true), Value::Bool(true));
        assert_eq!(sigma!(false), Value::Bool(false));
        assert_eq!(sigma!(42), Value::Number(Number::from(42)));
        assert_eq!(sigma!(3.5), Value::Number("3.5".parse().unwrap()));
        assert_eq!(sigma!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_sigma_macro_lists() {
        assert_eq!(sigma!([]), Value::List(vec![]));
        assert_eq!(
            sigma!([1, "two", null]),
            Value::List(vec![Value::from(1), Value::from("two"), Value::Null])
        );
    }

    #[test]
    fn test_sigma_macro_maps() {
        assert_eq!(sigma!({}), Value::Map(SigmaMap::new()));

        let map = sigma!({
            "name" => "Alice",
            "age" => 30,
            [1, 2] => { "nested" => true }
        });
        let map = map.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Value::from("age")), Some(&Value::from(30)));
        assert!(map.contains_key(&sigma!([1, 2])));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(sigma!(f64::NAN), Value::Null);
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Pair {
        left: i32,
        right: Option<String>,
    }

    sigma_record!(Pair { left as "l", right } readonly { "sum" => |p| Ok(Value::from(p.left)) });

    #[test]
    fn test_sigma_record_field_table() {
        let fields = Pair::fields();
        let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["l", "right", "sum"]);
        assert!(fields[0].is_writable());
        assert!(!fields[2].is_writable());

        let pair = Pair {
            left: 4,
            right: Some("r".into()),
        };
        assert_eq!(fields[0].get(&pair).unwrap(), Value::from(4));
        assert_eq!(fields[2].get(&pair).unwrap(), Value::from(4));
    }

    #[test]
    fn test_sigma_record_coerce_from_map() {
        let value = sigma!({ "L" => 9, "right" => null });
        let pair: Pair = crate::coerce(value).unwrap();
        assert_eq!(pair, Pair { left: 9, right: None });
    }
}
