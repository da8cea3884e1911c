//! Small macros shared by the HTTP apps.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web as __actix_web;

/// Generates a `pub fn routes(cfg: &mut ServiceConfig)` registering every listed
/// actix service (handlers annotated with `#[get]`, `#[post]`, ...).
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     route metrics_route,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $route:path),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::__actix_web::web::ServiceConfig) {
            $( cfg.service($route); )*
        }
    };
}
