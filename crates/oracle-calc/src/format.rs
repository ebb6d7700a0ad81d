use crate::policy::OraclePolicyView;

/// `1199.1` -> `$1,199.10` (prefix and grouping per policy).
pub fn format_amount(value: f64, policy: &OraclePolicyView) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let whole = if policy.group_thousands {
        group(whole)
    } else {
        whole.to_string()
    };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}{whole}.{cents}", policy.currency_prefix)
}

fn group(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
