//! Binary unit conversions between bytes, MiB, and GiB.

pub const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;
pub const MIB_PER_GIB: u64 = 1024;

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB as f64
}

/// Convert a (possibly fractional) GiB amount to whole bytes, rounding up
/// so that a converted requirement is never weaker than the original.
pub fn gib_to_bytes(gib: f64) -> u64 {
    if gib <= 0.0 {
        return 0;
    }
    (gib * BYTES_PER_GIB as f64).ceil() as u64
}

pub fn gib_to_mib(gib: f64) -> f64 {
    gib * MIB_PER_GIB as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_gib_round_trips_through_bytes() {
        assert_eq!(gib_to_bytes(2.0), 2 * BYTES_PER_GIB);
        assert_eq!(bytes_to_gib(2 * BYTES_PER_GIB), 2.0);
    }

    #[test]
    fn fractional_gib_rounds_up() {
        let bytes = gib_to_bytes(0.5);
        assert_eq!(bytes, BYTES_PER_GIB / 2);
        assert!(gib_to_bytes(1e-12) >= 1);
    }

    #[test]
    fn negative_gib_is_zero_bytes() {
        assert_eq!(gib_to_bytes(-4.0), 0);
    }

    #[test]
    fn summary_gib_to_mib() {
        assert_eq!(gib_to_mib(64.0), 65536.0);
    }
}
