//! Upstream adapters, one per wire format.
//!
//! Quote feeds: [`SinaSource`], [`TencentSource`], [`YahooSource`].
//! Daily history: [`EastmoneySource`] (domestic listings) and [`YahooSource`].

mod eastmoney;
mod sina;
mod tencent;
mod yahoo;

pub use eastmoney::EastmoneySource;
pub use sina::SinaSource;
pub use tencent::TencentSource;
pub use yahoo::YahooSource;

/// Body of the first `="..."` assignment in a JS-style payload.
///
/// `None` when the marker is missing or the quoted value is empty.
pub(crate) fn quoted_payload(payload: &str) -> Option<&str> {
    let start = payload.find("=\"")? + 2;
    let len = payload[start..].find('"')?;
    let body = &payload[start..start + len];
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

/// Lenient numeric field: anything unparseable reads as 0.
pub(crate) fn number(field: Option<&str>) -> f64 {
    field
        .and_then(|f| f.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_payload() {
        assert_eq!(
            quoted_payload("var hq_str_sh600000=\"PF,1,2\";\n"),
            Some("PF,1,2")
        );
        assert_eq!(quoted_payload("var hq_str_sh600000=\"\";"), None);
        assert_eq!(quoted_payload("pv_none_match=1;"), None);
        assert_eq!(quoted_payload("v_x=\"unterminated"), None);
    }

    #[test]
    fn test_number_is_lenient() {
        assert_eq!(number(Some(" 12.40 ")), 12.40);
        assert_eq!(number(Some("-")), 0.0);
        assert_eq!(number(Some("")), 0.0);
        assert_eq!(number(None), 0.0);
    }
}
