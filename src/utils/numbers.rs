/// 천 단위 구분 쉼표 포맷 (12345 -> "12,345")
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// 소수 첫째 자리 반올림
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 소수 둘째 자리 반올림
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
