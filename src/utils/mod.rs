pub mod locale;
pub mod logging;
