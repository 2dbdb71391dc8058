// key
/// Build a composite key (`Vec<Option<KeyComponent>>`) from plain values.
///
/// Every part goes through `IntoKeyPart`, so `Option`s and [`UNDEFINED`]
/// produce an unset component.
///
/// [`UNDEFINED`]: crate::key::UNDEFINED
#[macro_export]
macro_rules! key {
    () => {
        ::std::vec::Vec::<::std::option::Option<$crate::key::KeyComponent>>::new()
    };
    ($($part:expr),+ $(,)?) => {
        ::std::vec![$($crate::key::IntoKeyPart::into_key_part($part)),+]
    };
}
