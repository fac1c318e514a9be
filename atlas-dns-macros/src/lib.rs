#[macro_export]
/// The `facade_methods!` macro expands one operation table into client methods.
///
/// The same table is expanded twice, once per scheduling model, so the blocking
/// and async clients expose exactly the same operations with the same arguments.
///
/// Each entry names an operation constructor returning `Result<Operation<T>>`;
/// the generated method forwards its arguments to that constructor and hands
/// the result to the client's `call` method.
///
/// # Usage
///
/// ```rust,ignore
/// impl Client {
///     facade_methods! { blocking;
///         /// Get a specific zone.
///         fn get_zone(zone_id: &str) -> Result<Zone> => operations::get_zone;
///     }
/// }
/// ```
///
/// Where:
/// - `blocking` generates `pub fn name(&self, ..) -> R { self.call(op(..)) }`
/// - `suspending` generates `pub async fn name(&self, ..) -> R { self.call(op(..)).await }`
/// - attributes (including doc comments) are copied onto the generated method
///
macro_rules! facade_methods {
    (
        blocking;
        $(
            $(#[$meta:meta])*
            fn $name:ident ( $( $arg:ident : $arg_ty:ty ),* $(,)? ) -> $ret:ty => $op:path;
        )*
    ) => {
        $(
            $(#[$meta])*
            pub fn $name(&self, $( $arg: $arg_ty ),*) -> $ret {
                self.call($op($( $arg ),*))
            }
        )*
    };

    (
        suspending;
        $(
            $(#[$meta:meta])*
            fn $name:ident ( $( $arg:ident : $arg_ty:ty ),* $(,)? ) -> $ret:ty => $op:path;
        )*
    ) => {
        $(
            $(#[$meta])*
            pub async fn $name(&self, $( $arg: $arg_ty ),*) -> $ret {
                self.call($op($( $arg ),*)).await
            }
        )*
    };
}
