//! Common error types for the system utilities

/// A common error type for registration and construction of system utilities.
///
/// Interactive input never produces one of these: the shell reports typing
/// mistakes on its own output. These are returned to the firmware when a
/// command table, timer table or similar fixed resource is set up wrongly.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A required parameter was empty or otherwise unusable (e.g. a command
    /// registered with an empty name).
    InvalidParameter,
    /// An alias points outside its command table or at another alias.
    InvalidAlias,
    /// A fixed-capacity container has no free slot left.
    Full,
    /// A handle does not refer to a live entry.
    NotFound,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::InvalidParameter => defmt::write!(f, "InvalidParameter"),
            Error::InvalidAlias => defmt::write!(f, "InvalidAlias"),
            Error::Full => defmt::write!(f, "Full"),
            Error::NotFound => defmt::write!(f, "NotFound"),
        }
    }
}
