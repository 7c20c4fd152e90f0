//! The [`cton!`] macro for building [`crate::Value`] trees inline.

/// Builds a [`crate::Value`] from JSON-like syntax.
///
/// ```rust
/// use cton::cton;
///
/// let data = cton!({
///     "name": "Alice",
///     "age": 30,
///     "tags": ["rust", "llm"]
/// });
/// assert!(data.is_object());
/// ```
///
/// Multi-token expressions in value position need parentheses:
/// `cton!({"limit": (f64::INFINITY)})`.
#[macro_export]
macro_rules! cton {
    // Literals
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    // Arrays
    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::cton!($elem)),*])
    };

    // Objects
    ({}) => {
        $crate::Value::Object($crate::CtonMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::CtonMap::new();
        $(
            object.insert($key.to_string(), $crate::cton!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Anything else projects through serde.
    ($other:expr) => {{
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    }};
}
