//! Human-readable byte sizes with binary (1024-based) units.

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;
const TIB: u64 = 1024 * GIB;
const PIB: u64 = 1024 * TIB;

fn unit_multiplier(unit: &str) -> Option<u64> {
    let multiplier = match unit {
        "" | "b" | "byte" | "bytes" => 1,
        "k" | "kb" | "kib" => KIB,
        "m" | "mb" | "mib" => MIB,
        "g" | "gb" | "gib" => GIB,
        "t" | "tb" | "tib" => TIB,
        "p" | "pb" | "pib" => PIB,
        _ => return None,
    };
    Some(multiplier)
}

/// Parse a size such as `8388608`, `8mb`, `8 MiB` or `1.5g` into bytes.
///
/// Units are case-insensitive and always binary, so `1kb` is 1024 bytes.
/// Fractional values are truncated to whole bytes.
pub fn parse_size(input: &str) -> crate::Result<u64> {
    let invalid = || crate::Error::InvalidSize(input.to_string());

    let normalized = input.trim().to_ascii_lowercase();
    let split = normalized
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(normalized.len());
    let (number, unit) = normalized.split_at(split);
    if number.is_empty() {
        return Err(invalid());
    }
    let multiplier = unit_multiplier(unit.trim()).ok_or_else(invalid)?;

    if number.contains('.') {
        let value: f64 = number.parse().map_err(|_| invalid())?;
        let bytes = value * multiplier as f64;
        if !bytes.is_finite() || bytes >= u64::MAX as f64 {
            return Err(invalid());
        }
        Ok(bytes as u64)
    } else {
        let value: u64 = number.parse().map_err(|_| invalid())?;
        value.checked_mul(multiplier).ok_or_else(invalid)
    }
}

/// Format a byte count for log output.
pub fn format_size(bytes: u64) -> String {
    if bytes >= TIB {
        format!("{:.2} TiB", bytes as f64 / TIB as f64)
    } else if bytes >= GIB {
        format!("{:.2} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
