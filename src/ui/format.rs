/// `1234567.891` → `"1,234,567.89"` with `decimals = 2`. Non-finite values read "n/a".
pub fn thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = text.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Dollar amount with cents.
pub fn money(value: f64) -> String {
    match thousands(value, 2) {
        s if s == "n/a" => s,
        s => format!("${s}"),
    }
}

pub fn count(n: usize) -> String {
    thousands(n as f64, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits() {
        assert_eq!(thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(thousands(999.0, 0), "999");
        assert_eq!(thousands(1000.0, 0), "1,000");
        assert_eq!(thousands(-25000.5, 1), "-25,000.5");
        assert_eq!(count(558_837), "558,837");
    }

    #[test]
    fn money_and_missing_values() {
        assert_eq!(money(11000.0), "$11,000.00");
        assert_eq!(money(f64::NAN), "n/a");
        assert_eq!(thousands(-0.001, 2), "0.00");
    }
}
