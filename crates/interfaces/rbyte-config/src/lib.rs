//! Central configuration constants for the lead funnel client.

/// Number of digits in a one-time code.
pub const OTP_LENGTH: usize = 6;

/// How long a toast stays registered before it is dismissed automatically.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 5000;

/// Dial code preselected in every phone field.
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Dial codes offered by the phone selector.
pub const SUPPORTED_COUNTRY_CODES: [&str; 8] =
    ["+91", "+1", "+44", "+61", "+65", "+971", "+81", "+49"];

/// Base URL of the training-program backend.
pub const DEFAULT_API_BASE_URL: &str = "https://bytex-backend.onrender.com/api";

/// Rows per page on the admin lead tables.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page the backend is asked for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Per-request timeout for backend calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const USER_AGENT: &str = concat!("rbyte/", env!("CARGO_PKG_VERSION"));

/// Clamp a requested page size into the allowed range.
pub fn clamp_page_size(v: u32) -> u32 {
    v.clamp(1, MAX_PAGE_SIZE)
}

pub fn is_supported_country_code(code: &str) -> bool {
    SUPPORTED_COUNTRY_CODES.contains(&code.trim())
}
