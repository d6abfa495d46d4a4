// Logging macro that passes free text through a redactor
#[macro_export]
macro_rules! redacted_info {
    ($redactor:expr, $($arg:tt)*) => {
        tracing::info!("{}", $redactor.redact(&format!($($arg)*)))
    };
}
