//! Stamps the CLI with its build date and time.
//!
//! `TSF_BUILD_DATE` / `TSF_BUILD_TIME` in the environment take precedence,
//! for reproducible builds.

use time::format_description;
use time::OffsetDateTime;

fn stamp(var: &str, now: OffsetDateTime, pattern: &str) {
    println!("cargo:rerun-if-env-changed={var}");
    let value = std::env::var(var).unwrap_or_else(|_| {
        format_description::parse(pattern)
            .ok()
            .and_then(|fmt| now.format(&fmt).ok())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env={var}={value}");
}

fn main() {
    let now = OffsetDateTime::now_utc();
    stamp("TSF_BUILD_DATE", now, "[year]-[month]-[day]");
    stamp("TSF_BUILD_TIME", now, "[hour]:[minute]:[second]");
}
