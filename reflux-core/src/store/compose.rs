//! Function Composition
//!
//! Combines unary transforms right-to-left: `compose(vec![f, g, h])(x)` is
//! `f(g(h(x)))`. The store uses this to fold a middleware list into a single
//! dispatch function, and enhancers can be stacked the same way.

/// A boxed unary transform.
pub type Transform<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Compose transforms right-to-left.
///
/// - no transforms: the identity
/// - one transform: returned as-is, without an extra layer
/// - many: `f(g(h(x)))` for `[f, g, h]`
pub fn compose<T: 'static>(funcs: Vec<Transform<T>>) -> Transform<T> {
    funcs
        .into_iter()
        .reduce(|outer, inner| Box::new(move |x| outer(inner(x))))
        .unwrap_or_else(|| Box::new(|x| x))
}

/// Compose closures of possibly different types, right-to-left.
///
/// ```rust
/// use reflux_core::compose;
///
/// let describe = compose!(|n: usize| format!("{n} chars"), |s: &str| s.len());
/// assert_eq!(describe("hello"), "5 chars");
/// ```
#[macro_export]
macro_rules! compose {
    () => {
        |x| x
    };
    ($f:expr $(,)?) => {
        $f
    };
    ($f:expr, $($rest:expr),+ $(,)?) => {{
        let outer = $f;
        let inner = $crate::compose!($($rest),+);
        move |x| outer(inner(x))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(f: impl Fn(i32) -> i32 + Send + Sync + 'static) -> Transform<i32> {
        Box::new(f)
    }

    #[test]
    fn empty_compose_is_identity() {
        let id = compose::<i32>(Vec::new());
        assert_eq!(id(7), 7);

        let id = compose::<String>(Vec::new());
        assert_eq!(id("same".to_string()), "same");
    }

    #[test]
    fn single_transform_behaves_like_itself() {
        let double = compose(vec![boxed(|x| x * 2)]);
        assert_eq!(double(21), 42);
    }

    #[test]
    fn composes_right_to_left() {
        let f = boxed(|x| x + 1);
        let g = boxed(|x| x * 10);
        let h = boxed(|x| x - 3);

        // f(g(h(5))) = ((5 - 3) * 10) + 1
        let composed = compose(vec![f, g, h]);
        assert_eq!(composed(5), 21);
    }

    #[test]
    fn macro_composes_heterogeneous_closures() {
        let id = compose!();
        assert_eq!(id(3), 3);

        let single = compose!(|x: i32| x + 1);
        assert_eq!(single(1), 2);

        let render = compose!(
            |n: i32| format!("<{n}>"),
            |n: i32| n * 2,
            |s: &str| s.len() as i32,
        );
        assert_eq!(render("abc"), "<6>");
    }
}
