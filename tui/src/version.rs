/// The tutor client version.
///
/// Defaults to the workspace package version. Release builds may inject a tag version through the
/// `TUTOR_VERSION` environment variable at compile time.
pub const TUTOR_VERSION: &str = match option_env!("TUTOR_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
