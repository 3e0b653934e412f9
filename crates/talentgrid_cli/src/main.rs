//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `talentgrid_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("talentgrid_core ping={}", talentgrid_core::ping());
    println!("talentgrid_core version={}", talentgrid_core::core_version());
}
