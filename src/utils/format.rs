/// Formats a count with `,` between groups of three digits
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Signed variant of [`group_digits`], used for database ids
pub fn group_digits_signed(value: i64) -> String {
    if value < 0 {
        format!("-{}", group_digits(value.unsigned_abs()))
    } else {
        group_digits(value.unsigned_abs())
    }
}
