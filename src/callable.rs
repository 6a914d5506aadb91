/// Call signature of a function container.
///
/// `Args` is a tuple of the parameter types, `Output` the return type.
/// Implemented for every `FnMut` closure or function taking up to eight arguments,
/// so `FnMut(u32, &str) -> bool` is `Callable<(u32, &str), Output = bool>`.
pub trait Callable<Args> {
    /// Return type of the call.
    type Output;

    /// Calls the callable with unpacked `args`.
    fn invoke(&mut self, args: Args) -> Self::Output;
}

macro_rules! impl_callable {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> Callable<($($arg,)*)> for F
        where
            F: FnMut($($arg),*) -> R,
        {
            type Output = R;

            #[inline(always)]
            #[allow(non_snake_case)]
            fn invoke(&mut self, ($($arg,)*): ($($arg,)*)) -> R {
                self($($arg),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A1);
impl_callable!(A1, A2);
impl_callable!(A1, A2, A3);
impl_callable!(A1, A2, A3, A4);
impl_callable!(A1, A2, A3, A4, A5);
impl_callable!(A1, A2, A3, A4, A5, A6);
impl_callable!(A1, A2, A3, A4, A5, A6, A7);
impl_callable!(A1, A2, A3, A4, A5, A6, A7, A8);
