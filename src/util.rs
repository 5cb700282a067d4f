/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```
/// # use pursuit_rl::assert_interval;
/// let alpha = 0.6;
/// assert_interval!(alpha, 0.0, 1.0);
/// ```
/// With `alpha = 2.0` this would panic with the message "Invalid value for \`alpha\`. Must be in the interval \[0.0, 1.0\]."
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}
