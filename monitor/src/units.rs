//! Display-unit conversions applied at assembly time.

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn bytes_to_mb(bytes: f64) -> f64 {
    bytes / BYTES_PER_MB
}

pub fn bytes_to_gb(bytes: f64) -> f64 {
    bytes / BYTES_PER_GB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mb_conversion_is_exact() {
        assert_eq!(bytes_to_mb(1_048_576.0), 1.0);
        assert_eq!(bytes_to_mb(0.0), 0.0);
        assert_eq!(bytes_to_mb(524_288.0), 0.5);
    }

    #[test]
    fn gb_conversion_is_exact() {
        assert_eq!(bytes_to_gb(1_073_741_824.0), 1.0);
        assert_eq!(bytes_to_gb(2_147_483_648.0), 2.0);
    }
}
