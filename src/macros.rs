// Logging is opt-in via the 'logging' feature. When it's disabled, these
// macros expand to nothing, which means their arguments are never evaluated.
// So don't put anything with side effects in them.

macro_rules! log {
    ($($tt:tt)*) => {
        #[cfg(feature = "logging")]
        {
            $($tt)*
        }
    }
}

macro_rules! debug {
    ($($tt:tt)*) => { log!(log::debug!($($tt)*)) }
}

macro_rules! trace {
    ($($tt:tt)*) => { log!(log::trace!($($tt)*)) }
}
