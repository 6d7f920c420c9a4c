/// Get the version string for berth and libberth
pub fn get_version_string() -> String {
    format!(
        "berth {}\nlibberth {}",
        env!("CARGO_PKG_VERSION"),
        libberth::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
